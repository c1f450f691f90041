use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const STREAK_TIMEOUT_HOURS: i64 = 24;

/// Step function from consecutive-correct count to XP multiplier.
pub fn multiplier_for(count: u32) -> f64 {
    match count {
        20.. => 2.0,
        15..=19 => 1.75,
        10..=14 => 1.5,
        5..=9 => 1.25,
        3..=4 => 1.1,
        _ => 1.0,
    }
}

const MULTIPLIER_STEPS: [u32; 5] = [3, 5, 10, 15, 20];

/// First streak count above `count` that raises the multiplier, with the
/// multiplier it brings. `None` once the top step is reached.
pub fn next_multiplier_step(count: u32) -> Option<(u32, f64)> {
    MULTIPLIER_STEPS
        .iter()
        .copied()
        .find(|&step| step > count)
        .map(|step| (step, multiplier_for(step)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreakState {
    pub count: u32,
    pub longest: u32,
    pub multiplier: f64,
    pub last_correct_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
}

impl Default for StreakState {
    fn default() -> Self {
        Self {
            count: 0,
            longest: 0,
            multiplier: 1.0,
            last_correct_at: None,
            started_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreakUpdate {
    pub count: u32,
    pub multiplier: f64,
    /// The previous streak lapsed before this answer was counted.
    pub expired: bool,
    pub broken: bool,
}

impl StreakState {
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.last_correct_at
            .is_some_and(|last| now - last > Duration::hours(STREAK_TIMEOUT_HOURS))
    }

    pub fn record(&mut self, correct: bool, now: DateTime<Utc>) -> StreakUpdate {
        if !correct {
            let broken = self.count > 0;
            self.count = 0;
            self.multiplier = 1.0;
            return StreakUpdate {
                count: 0,
                multiplier: 1.0,
                expired: false,
                broken,
            };
        }

        let expired = self.is_stale(now);
        if expired {
            self.count = 0;
        }
        if self.count == 0 {
            self.started_at = Some(now);
        }
        self.count = self.count.saturating_add(1);
        self.last_correct_at = Some(now);
        self.longest = self.longest.max(self.count);
        self.multiplier = multiplier_for(self.count);

        StreakUpdate {
            count: self.count,
            multiplier: self.multiplier,
            expired,
            broken: false,
        }
    }

    /// Re-derives fields that must agree with `count`.
    pub fn normalize(&mut self) {
        self.multiplier = multiplier_for(self.count);
        self.longest = self.longest.max(self.count);
    }
}
