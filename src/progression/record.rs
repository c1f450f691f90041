use std::collections::{BTreeMap, BTreeSet, VecDeque};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::streak::StreakState;
use super::types::{
    EarnedAchievement, ProgressionState, RecentAnswer, SpecialtyProficiency, RECENT_WINDOW_CAP,
};

pub const RECORD_SCHEMA_VERSION: u32 = 1;

/// Full-state export handed to the profile store. Every field defaults so
/// older or partial records still import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressionRecord {
    pub schema_version: u32,
    pub user_id: String,
    pub display_name: String,
    pub experience: u64,
    /// Informational; recomputed from `experience` on import.
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
    pub recent: Vec<RecentAnswer>,
    pub daily_activity: BTreeMap<NaiveDate, u32>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for ProgressionRecord {
    fn default() -> Self {
        Self {
            schema_version: RECORD_SCHEMA_VERSION,
            user_id: String::new(),
            display_name: String::new(),
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
            recent: Vec::new(),
            daily_activity: BTreeMap::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl From<&ProgressionState> for ProgressionRecord {
    fn from(state: &ProgressionState) -> Self {
        Self {
            schema_version: RECORD_SCHEMA_VERSION,
            user_id: state.user_id.clone(),
            display_name: state.display_name.clone(),
            experience: state.experience,
            level: state.level,
            streak: state.streak.clone(),
            specialties: state.specialties.clone(),
            achievements: state.achievements.clone(),
            unlocked_tiers: state.unlocked_tiers.clone(),
            total_answers: state.total_answers,
            total_correct: state.total_correct,
            sessions_completed: state.sessions_completed,
            xp_from_cases: state.xp_from_cases,
            xp_from_achievements: state.xp_from_achievements,
            recent: state.recent.iter().cloned().collect(),
            daily_activity: state.daily_activity.clone(),
            created_at: Some(state.created_at),
            updated_at: Some(state.updated_at),
        }
    }
}

impl ProgressionRecord {
    /// Raw state before derived fields are re-derived by the tracker.
    pub(crate) fn into_state(self, now: DateTime<Utc>) -> ProgressionState {
        let skip = self.recent.len().saturating_sub(RECENT_WINDOW_CAP);
        let recent: VecDeque<RecentAnswer> = self.recent.into_iter().skip(skip).collect();
        let created_at = self.created_at.unwrap_or(now);

        ProgressionState {
            user_id: self.user_id,
            display_name: self.display_name,
            experience: self.experience,
            level: self.level.max(1),
            streak: self.streak,
            specialties: self.specialties,
            achievements: self.achievements,
            unlocked_tiers: self.unlocked_tiers,
            total_answers: self.total_answers,
            total_correct: self.total_correct.min(self.total_answers),
            sessions_completed: self.sessions_completed,
            xp_from_cases: self.xp_from_cases,
            xp_from_achievements: self.xp_from_achievements,
            recent,
            daily_activity: self.daily_activity,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        }
    }
}
