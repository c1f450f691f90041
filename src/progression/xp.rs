use serde::{Deserialize, Serialize};

use crate::catalog::Complexity;
use crate::sanitize::{sanitize_seconds, unit_interval};

pub const BASE_XP_PER_QUESTION: f64 = 10.0;

/// Per-answer XP with each bonus fraction kept for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpAward {
    pub base: f64,
    pub accuracy_bonus: f64,
    pub time_bonus: f64,
    pub difficulty_bonus: f64,
    pub multiplier: f64,
    pub total: u64,
}

pub fn accuracy_bonus(score01: f64) -> f64 {
    if score01 >= 1.0 {
        0.5
    } else if score01 >= 0.9 {
        0.25
    } else if score01 >= 0.8 {
        0.1
    } else {
        0.0
    }
}

pub fn time_bonus(seconds: f64) -> f64 {
    if seconds < 30.0 {
        0.2
    } else if seconds < 60.0 {
        0.1
    } else {
        0.0
    }
}

pub fn difficulty_bonus(complexity: Complexity, score01: f64) -> f64 {
    match complexity {
        Complexity::Advanced if score01 >= 0.8 => 0.15,
        Complexity::Expert if score01 >= 0.7 => 0.25,
        _ => 0.0,
    }
}

pub fn compute_xp(score01: f64, seconds: f64, complexity: Complexity, multiplier: f64) -> XpAward {
    let score01 = unit_interval(score01);
    let seconds = sanitize_seconds(seconds);
    let multiplier = if multiplier.is_finite() && multiplier > 0.0 {
        multiplier
    } else {
        1.0
    };

    let base = score01 * BASE_XP_PER_QUESTION;
    let accuracy = accuracy_bonus(score01);
    let time = time_bonus(seconds);
    let difficulty = difficulty_bonus(complexity, score01);
    let raw = (base + base * accuracy + base * time + base * difficulty) * multiplier;

    XpAward {
        base,
        accuracy_bonus: accuracy,
        time_bonus: time,
        difficulty_bonus: difficulty,
        multiplier,
        total: raw.round().max(0.0) as u64,
    }
}
