use std::collections::{BTreeMap, BTreeSet, VecDeque};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::streak::StreakState;
use super::xp::XpAward;
use crate::catalog::{AgeGroup, Complexity};

pub const RECENT_WINDOW_CAP: usize = 20;
pub const MAX_SPECIALTY_LEVEL: u8 = 10;

/// `min(10, floor(10 * correct / attempts) + 1)`, and 1 with no attempts.
pub fn specialty_level(attempts: u32, correct: u32) -> u8 {
    if attempts == 0 {
        return 1;
    }
    let correct = u64::from(correct.min(attempts));
    let tenths = correct * 10 / u64::from(attempts);
    (tenths as u8 + 1).min(MAX_SPECIALTY_LEVEL)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecialtyProficiency {
    pub attempts: u32,
    pub correct: u32,
    pub level: u8,
    pub xp_earned: u64,
    pub last_practiced: Option<DateTime<Utc>>,
}

impl Default for SpecialtyProficiency {
    fn default() -> Self {
        Self {
            attempts: 0,
            correct: 0,
            level: 1,
            xp_earned: 0,
            last_practiced: None,
        }
    }
}

impl SpecialtyProficiency {
    /// Accuracy in percent; 0 with no attempts.
    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.attempts) * 100.0
        }
    }

    pub fn record(&mut self, correct: bool, xp: u64, now: DateTime<Utc>) {
        self.attempts = self.attempts.saturating_add(1);
        if correct {
            self.correct = self.correct.saturating_add(1);
        }
        self.xp_earned = self.xp_earned.saturating_add(xp);
        self.last_practiced = Some(now);
        self.recompute();
    }

    pub fn recompute(&mut self) {
        self.correct = self.correct.min(self.attempts);
        self.level = specialty_level(self.attempts, self.correct);
    }

    /// Folds another bucket for the same category into this one.
    pub fn absorb(&mut self, other: SpecialtyProficiency) {
        self.attempts = self.attempts.saturating_add(other.attempts);
        self.correct = self.correct.saturating_add(other.correct);
        self.xp_earned = self.xp_earned.saturating_add(other.xp_earned);
        self.last_practiced = self.last_practiced.max(other.last_practiced);
        self.recompute();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnedAchievement {
    pub awarded_at: DateTime<Utc>,
    #[serde(default)]
    pub xp_reward: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentAnswer {
    pub correct: bool,
    pub score: f64,
    pub seconds: f64,
    pub category: String,
    #[serde(default = "unknown_age")]
    pub age_group: AgeGroup,
    #[serde(default = "unknown_complexity")]
    pub complexity: Complexity,
    pub answered_at: DateTime<Utc>,
}

fn unknown_age() -> AgeGroup {
    AgeGroup::Unknown
}

fn unknown_complexity() -> Complexity {
    Complexity::Unknown
}

/// One graded answer as the tracker consumes it. `score` is the fraction of
/// the question's maximum score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub category: String,
    pub age_group: AgeGroup,
    pub complexity: Complexity,
    pub is_correct: bool,
    pub score: f64,
    pub time_taken_seconds: f64,
}

impl AnswerOutcome {
    pub fn new(category: impl Into<String>, complexity: Complexity, is_correct: bool) -> Self {
        Self {
            category: category.into(),
            age_group: AgeGroup::Unknown,
            complexity,
            is_correct,
            score: if is_correct { 1.0 } else { 0.0 },
            time_taken_seconds: 0.0,
        }
    }

    pub fn with_age_group(mut self, age_group: AgeGroup) -> Self {
        self.age_group = age_group;
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn with_time(mut self, seconds: f64) -> Self {
        self.time_taken_seconds = seconds;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeReceipt {
    pub xp_awarded: u64,
    pub xp: XpAward,
    pub experience: u64,
    pub level: u32,
    pub leveled_up: bool,
    pub streak: u32,
    pub multiplier: f64,
    pub streak_expired: bool,
    pub specialty_level: u8,
    pub newly_unlocked_tiers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardedAchievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub badge: String,
    pub xp_reward: u64,
    pub awarded_at: DateTime<Utc>,
}

/// Durable gamification state for one user. Mutated only through
/// [`super::ProgressionTracker`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionState {
    pub user_id: String,
    pub display_name: String,
    pub experience: u64,
    pub level: u32,
    pub streak: StreakState,
    pub specialties: BTreeMap<String, SpecialtyProficiency>,
    pub achievements: BTreeMap<String, EarnedAchievement>,
    pub unlocked_tiers: BTreeSet<String>,
    pub total_answers: u64,
    pub total_correct: u64,
    pub sessions_completed: u64,
    pub xp_from_cases: u64,
    pub xp_from_achievements: u64,
    pub recent: VecDeque<RecentAnswer>,
    pub daily_activity: BTreeMap<NaiveDate, u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProgressionState {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            experience: 0,
            level: 1,
            streak: StreakState::default(),
            specialties: BTreeMap::new(),
            achievements: BTreeMap::new(),
            unlocked_tiers: BTreeSet::new(),
            total_answers: 0,
            total_correct: 0,
            sessions_completed: 0,
            xp_from_cases: 0,
            xp_from_achievements: 0,
            recent: VecDeque::with_capacity(RECENT_WINDOW_CAP),
            daily_activity: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.contains_key(id)
    }

    pub fn specialty(&self, category: &str) -> Option<&SpecialtyProficiency> {
        self.specialties
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(category))
            .map(|(_, prof)| prof)
    }

    /// Bucket for `category`, matched case-insensitively. A category seen for
    /// the first time keeps the spelling it arrived with.
    pub fn specialty_mut(&mut self, category: &str) -> &mut SpecialtyProficiency {
        let key = self
            .specialties
            .keys()
            .find(|name| name.eq_ignore_ascii_case(category))
            .cloned()
            .unwrap_or_else(|| category.to_string());
        self.specialties.entry(key).or_default()
    }

    pub fn categories_explored(&self) -> usize {
        self.specialties.values().filter(|s| s.attempts > 0).count()
    }

    pub fn push_recent(&mut self, answer: RecentAnswer) {
        if self.recent.len() == RECENT_WINDOW_CAP {
            self.recent.pop_front();
        }
        self.recent.push_back(answer);
    }

    pub fn overall_accuracy(&self) -> f64 {
        if self.total_answers == 0 {
            0.0
        } else {
            self.total_correct as f64 / self.total_answers as f64 * 100.0
        }
    }
}
