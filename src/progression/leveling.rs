use serde::{Deserialize, Serialize};

pub const BASE_LEVEL_XP: f64 = 100.0;
pub const LEVEL_GROWTH: f64 = 1.5;
pub const MAX_LEVEL: u32 = 100;

/// XP needed to advance from `level` to `level + 1`.
pub fn xp_to_advance(level: u32) -> u64 {
    let exponent = level.max(1).saturating_sub(1) as i32;
    // `as` saturates at u64::MAX for very deep levels.
    (BASE_LEVEL_XP * LEVEL_GROWTH.powi(exponent)).floor() as u64
}

/// Cumulative XP at which `level` is reached. Level 1 starts at 0.
pub fn level_threshold(level: u32) -> u64 {
    (1..level.clamp(1, MAX_LEVEL)).fold(0u64, |acc, n| acc.saturating_add(xp_to_advance(n)))
}

/// Largest level whose cumulative threshold does not exceed `experience`.
pub fn level_for_xp(experience: u64) -> u32 {
    let mut level = 1;
    let mut threshold = 0u64;
    while level < MAX_LEVEL {
        let next = threshold.saturating_add(xp_to_advance(level));
        if next > experience {
            break;
        }
        threshold = next;
        level += 1;
    }
    level
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    pub level: u32,
    pub experience: u64,
    pub level_floor: u64,
    pub next_level_xp: Option<u64>,
    pub xp_into_level: u64,
    pub xp_needed: u64,
    pub progress_percent: f64,
}

pub fn level_progress(experience: u64) -> LevelProgress {
    let level = level_for_xp(experience);
    let level_floor = level_threshold(level);
    let xp_into_level = experience.saturating_sub(level_floor);

    if level >= MAX_LEVEL {
        return LevelProgress {
            level,
            experience,
            level_floor,
            next_level_xp: None,
            xp_into_level,
            xp_needed: 0,
            progress_percent: 100.0,
        };
    }

    let span = xp_to_advance(level);
    let next = level_floor.saturating_add(span);
    LevelProgress {
        level,
        experience,
        level_floor,
        next_level_xp: Some(next),
        xp_into_level,
        xp_needed: next.saturating_sub(experience),
        progress_percent: if span == 0 {
            100.0
        } else {
            xp_into_level as f64 / span as f64 * 100.0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increments() {
        assert_eq!(xp_to_advance(1), 100);
        assert_eq!(xp_to_advance(2), 150);
        assert_eq!(xp_to_advance(3), 225);
        assert_eq!(xp_to_advance(4), 337);
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(level_threshold(1), 0);
        assert_eq!(level_threshold(2), 100);
        assert_eq!(level_threshold(3), 250);
        assert_eq!(level_threshold(4), 475);
    }

    #[test]
    fn test_level_for_xp_boundaries() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(249), 2);
        assert_eq!(level_for_xp(250), 3);
        assert_eq!(level_for_xp(u64::MAX), MAX_LEVEL);
    }

    #[test]
    fn test_level_progress() {
        let progress = level_progress(175);
        assert_eq!(progress.level, 2);
        assert_eq!(progress.level_floor, 100);
        assert_eq!(progress.next_level_xp, Some(250));
        assert_eq!(progress.xp_needed, 75);
        assert!((progress.progress_percent - 50.0).abs() < 1e-9);
    }
}
