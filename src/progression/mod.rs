//! Per-user gamification state: experience and levels, streaks, specialty
//! proficiency, achievements, tier unlocks and difficulty recommendations.

pub mod achievements;
pub mod leveling;
mod record;
mod registry;
mod rules;
pub mod streak;
pub mod tiers;
mod types;
pub mod xp;

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Complexity;
use crate::sanitize::{mean, normalize_label, sanitize_seconds, unit_interval};
use crate::scoring::SessionStats;

pub use achievements::{AchievementCondition, AchievementDefinition, QuizProspect};
pub use leveling::LevelProgress;
pub use record::{ProgressionRecord, RECORD_SCHEMA_VERSION};
pub use registry::{SharedTracker, TrackerRegistry};
pub use rules::ProgressionRules;
pub use streak::StreakState;
pub use tiers::DifficultyTier;
pub use types::{
    specialty_level, AnswerOutcome, AwardedAchievement, EarnedAchievement, OutcomeReceipt,
    ProgressionState, RecentAnswer, SpecialtyProficiency,
};

/// Answers considered by the difficulty recommendation.
pub const RECOMMENDATION_WINDOW: usize = 10;
pub const NEAR_ACHIEVEMENT_FRACTION: f64 = 0.7;
pub const FOCUS_ACCURACY_THRESHOLD: f64 = 70.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyRecommendation {
    pub tier: String,
    pub rank: u8,
    pub window: usize,
    pub recent_accuracy: Option<f64>,
    pub recent_avg_seconds: Option<f64>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextTier {
    pub tier: String,
    pub min_level: u32,
    pub levels_needed: u32,
    pub required_achievement: Option<String>,
    pub achievement_held: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearAchievement {
    pub id: String,
    pub name: String,
    pub progress_percent: f64,
    pub current: f64,
    pub target: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusArea {
    pub category: String,
    pub accuracy: f64,
    pub cases_needed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockRecommendations {
    pub next_tier: Option<NextTier>,
    pub xp_to_next_level: u64,
    pub near_achievements: Vec<NearAchievement>,
    pub focus_areas: Vec<FocusArea>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpBreakdown {
    pub total: u64,
    pub from_cases: u64,
    pub from_achievements: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub total_answers: u64,
    pub overall_accuracy: f64,
    pub recent_accuracy: Option<f64>,
    pub recent_avg_seconds: Option<f64>,
    /// Accuracy of the newer half of the recent window minus the older half.
    pub improvement_trend: f64,
    pub sessions_completed: u64,
    pub longest_streak: u32,
    pub active_days: usize,
}

/// Sole writer of one user's [`ProgressionState`].
#[derive(Debug, Clone)]
pub struct ProgressionTracker {
    state: ProgressionState,
    rules: Arc<ProgressionRules>,
}

impl ProgressionTracker {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::with_rules(user_id, display_name, Arc::new(ProgressionRules::default()))
    }

    pub fn with_rules(
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        rules: Arc<ProgressionRules>,
    ) -> Self {
        let now = Utc::now();
        let mut tracker = Self {
            state: ProgressionState::new(user_id, display_name, now),
            rules,
        };
        tracker.refresh_unlocks();
        tracker
    }

    /// Imports a persisted record, re-deriving level, multiplier, specialty
    /// levels and tier unlocks so a stale or hand-edited record cannot break
    /// the invariants.
    pub fn from_record(record: ProgressionRecord, rules: Arc<ProgressionRules>) -> Self {
        let mut state = record.into_state(Utc::now());
        state.level = leveling::level_for_xp(state.experience);
        state.streak.normalize();
        for (category, mut prof) in std::mem::take(&mut state.specialties) {
            prof.recompute();
            state.specialty_mut(&normalize_label(&category)).absorb(prof);
        }

        let mut tracker = Self { state, rules };
        tracker.refresh_unlocks();
        tracing::debug!(
            user_id = %tracker.state.user_id,
            level = tracker.state.level,
            experience = tracker.state.experience,
            "progression record imported"
        );
        tracker
    }

    pub fn to_record(&self) -> ProgressionRecord {
        ProgressionRecord::from(&self.state)
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn rules(&self) -> &Arc<ProgressionRules> {
        &self.rules
    }

    pub fn user_id(&self) -> &str {
        &self.state.user_id
    }

    pub fn experience(&self) -> u64 {
        self.state.experience
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    pub fn streak(&self) -> &StreakState {
        &self.state.streak
    }

    pub fn specialty(&self, category: &str) -> Option<&SpecialtyProficiency> {
        self.state.specialty(category)
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.state.has_achievement(id)
    }

    pub fn level_progress(&self) -> LevelProgress {
        leveling::level_progress(self.state.experience)
    }

    pub fn record_outcome(&mut self, outcome: &AnswerOutcome) -> OutcomeReceipt {
        self.record_outcome_at(outcome, Utc::now())
    }

    /// Applies one graded answer: streak first, then XP at the resulting
    /// multiplier, then specialty and level.
    pub fn record_outcome_at(&mut self, outcome: &AnswerOutcome, now: DateTime<Utc>) -> OutcomeReceipt {
        let category = normalize_label(&outcome.category);
        let score = unit_interval(outcome.score);
        let seconds = sanitize_seconds(outcome.time_taken_seconds);

        let streak = self.state.streak.record(outcome.is_correct, now);
        if streak.expired {
            tracing::debug!(user_id = %self.state.user_id, "streak lapsed before this answer");
        }
        let award = xp::compute_xp(score, seconds, outcome.complexity, streak.multiplier);

        let specialty_level = {
            let prof = self.state.specialty_mut(&category);
            prof.record(outcome.is_correct, award.total, now);
            prof.level
        };

        self.state.total_answers = self.state.total_answers.saturating_add(1);
        if outcome.is_correct {
            self.state.total_correct = self.state.total_correct.saturating_add(1);
        }
        self.state.xp_from_cases = self.state.xp_from_cases.saturating_add(award.total);
        *self
            .state
            .daily_activity
            .entry(now.date_naive())
            .or_default() += 1;
        self.state.push_recent(RecentAnswer {
            correct: outcome.is_correct,
            score,
            seconds,
            category,
            age_group: outcome.age_group,
            complexity: outcome.complexity,
            answered_at: now,
        });

        let previous_level = self.state.level;
        let newly_unlocked_tiers = self.add_experience(award.total);
        self.state.updated_at = now;

        OutcomeReceipt {
            xp_awarded: award.total,
            xp: award,
            experience: self.state.experience,
            level: self.state.level,
            leveled_up: self.state.level > previous_level,
            streak: streak.count,
            multiplier: streak.multiplier,
            streak_expired: streak.expired,
            specialty_level,
            newly_unlocked_tiers,
        }
    }

    pub fn complete_session(&mut self) {
        self.state.sessions_completed = self.state.sessions_completed.saturating_add(1);
    }

    pub fn evaluate_achievements(&mut self, session: Option<&SessionStats>) -> Vec<AwardedAchievement> {
        self.evaluate_achievements_at(session, Utc::now())
    }

    /// Awards every newly satisfied achievement once. Rewards can raise the
    /// level, so evaluation repeats until a pass awards nothing.
    pub fn evaluate_achievements_at(
        &mut self,
        session: Option<&SessionStats>,
        now: DateTime<Utc>,
    ) -> Vec<AwardedAchievement> {
        let rules = Arc::clone(&self.rules);
        let mut awarded = Vec::new();

        loop {
            let mut progressed = false;
            for def in &rules.achievements {
                if self.state.has_achievement(&def.id)
                    || !def.condition.is_satisfied(&self.state, session)
                {
                    continue;
                }

                self.state.achievements.insert(
                    def.id.clone(),
                    EarnedAchievement {
                        awarded_at: now,
                        xp_reward: def.xp_reward,
                    },
                );
                self.state.xp_from_achievements =
                    self.state.xp_from_achievements.saturating_add(def.xp_reward);
                self.add_experience(def.xp_reward);
                self.refresh_unlocks();

                tracing::info!(
                    user_id = %self.state.user_id,
                    achievement = %def.id,
                    xp_reward = def.xp_reward,
                    "achievement awarded"
                );

                awarded.push(AwardedAchievement {
                    id: def.id.clone(),
                    name: def.name.clone(),
                    description: def.description.clone(),
                    badge: def.badge.clone(),
                    xp_reward: def.xp_reward,
                    awarded_at: now,
                });
                progressed = true;
            }
            if !progressed {
                break;
            }
        }

        if !awarded.is_empty() {
            self.state.updated_at = now;
        }
        awarded
    }

    /// Unlocked tiers in rank order; never empty.
    pub fn unlocked_tiers(&self) -> Vec<&DifficultyTier> {
        self.rules
            .tiers
            .iter()
            .filter(|t| self.state.unlocked_tiers.contains(&t.name))
            .collect()
    }

    pub fn unlocked_complexities(&self) -> BTreeSet<Complexity> {
        self.unlocked_tiers()
            .into_iter()
            .flat_map(|t| t.complexities.iter().copied())
            .collect()
    }

    pub fn recommend_difficulty(&self) -> DifficultyRecommendation {
        let skip = self.state.recent.len().saturating_sub(RECOMMENDATION_WINDOW);
        let window: Vec<&RecentAnswer> = self.state.recent.iter().skip(skip).collect();
        let unlocked = self.unlocked_tiers();
        let lowest = self.rules.lowest_tier();

        if window.is_empty() {
            return DifficultyRecommendation {
                tier: lowest.name.clone(),
                rank: lowest.rank,
                window: 0,
                recent_accuracy: None,
                recent_avg_seconds: None,
                reason: "no recent answers".to_string(),
            };
        }

        let correct = window.iter().filter(|a| a.correct).count();
        let accuracy = correct as f64 / window.len() as f64 * 100.0;
        let times: Vec<f64> = window.iter().map(|a| a.seconds).collect();
        let avg_seconds = mean(&times).unwrap_or(0.0);

        let (cap, reason) = if accuracy >= 90.0 && avg_seconds < 120.0 {
            (u8::MAX, "fast and highly accurate")
        } else if accuracy >= 75.0 {
            (2, "accuracy at or above 75%")
        } else if accuracy >= 60.0 {
            (1, "accuracy at or above 60%")
        } else {
            (0, "accuracy below 60%")
        };

        let tier = unlocked
            .iter()
            .rev()
            .find(|t| t.rank <= cap)
            .copied()
            .unwrap_or(lowest);

        DifficultyRecommendation {
            tier: tier.name.clone(),
            rank: tier.rank,
            window: window.len(),
            recent_accuracy: Some(accuracy),
            recent_avg_seconds: Some(avg_seconds),
            reason: reason.to_string(),
        }
    }

    pub fn unlock_recommendations(&self) -> UnlockRecommendations {
        let next_tier = self
            .rules
            .tiers
            .iter()
            .find(|t| !self.state.unlocked_tiers.contains(&t.name))
            .map(|t| NextTier {
                tier: t.name.clone(),
                min_level: t.min_level,
                levels_needed: t.min_level.saturating_sub(self.state.level),
                achievement_held: t
                    .required_achievement
                    .as_deref()
                    .map_or(true, |id| self.state.has_achievement(id)),
                required_achievement: t.required_achievement.clone(),
            });

        let near_achievements = self
            .rules
            .achievements
            .iter()
            .filter(|def| !self.state.has_achievement(&def.id))
            .filter_map(|def| {
                let progress = def.condition.progress(&self.state, None);
                let fraction = progress.fraction();
                (fraction >= NEAR_ACHIEVEMENT_FRACTION && fraction < 1.0).then(|| NearAchievement {
                    id: def.id.clone(),
                    name: def.name.clone(),
                    progress_percent: fraction * 100.0,
                    current: progress.current,
                    target: progress.target,
                })
            })
            .collect();

        let mut focus_areas: Vec<FocusArea> = self
            .state
            .specialties
            .iter()
            .filter(|(_, prof)| prof.attempts > 0 && prof.accuracy() < FOCUS_ACCURACY_THRESHOLD)
            .map(|(category, prof)| FocusArea {
                category: category.clone(),
                accuracy: prof.accuracy(),
                cases_needed: 10u32.saturating_sub(prof.attempts).max(5),
            })
            .collect();
        focus_areas.sort_by(|a, b| {
            a.accuracy
                .total_cmp(&b.accuracy)
                .then_with(|| a.category.cmp(&b.category))
        });

        UnlockRecommendations {
            next_tier,
            xp_to_next_level: self.level_progress().xp_needed,
            near_achievements,
            focus_areas,
        }
    }

    pub fn xp_breakdown(&self) -> XpBreakdown {
        XpBreakdown {
            total: self.state.experience,
            from_cases: self.state.xp_from_cases,
            from_achievements: self.state.xp_from_achievements,
        }
    }

    pub fn performance_summary(&self) -> PerformanceSummary {
        let recent: Vec<&RecentAnswer> = self.state.recent.iter().collect();
        let accuracy_of = |answers: &[&RecentAnswer]| {
            if answers.is_empty() {
                0.0
            } else {
                answers.iter().filter(|a| a.correct).count() as f64 / answers.len() as f64 * 100.0
            }
        };

        let improvement_trend = if recent.len() >= RECOMMENDATION_WINDOW {
            let (older, newer) = recent.split_at(recent.len() / 2);
            accuracy_of(newer) - accuracy_of(older)
        } else {
            0.0
        };
        let times: Vec<f64> = recent.iter().map(|a| a.seconds).collect();

        PerformanceSummary {
            total_answers: self.state.total_answers,
            overall_accuracy: self.state.overall_accuracy(),
            recent_accuracy: (!recent.is_empty()).then(|| accuracy_of(&recent)),
            recent_avg_seconds: mean(&times),
            improvement_trend,
            sessions_completed: self.state.sessions_completed,
            longest_streak: self.state.streak.longest,
            active_days: self.state.daily_activity.len(),
        }
    }

    /// Adds XP, re-derives the level and returns tiers unlocked as a result.
    fn add_experience(&mut self, amount: u64) -> Vec<String> {
        if amount == 0 {
            return Vec::new();
        }
        let previous = self.state.level;
        self.state.experience = self.state.experience.saturating_add(amount);
        self.state.level = leveling::level_for_xp(self.state.experience).max(previous);

        if self.state.level > previous {
            tracing::info!(
                user_id = %self.state.user_id,
                from = previous,
                to = self.state.level,
                experience = self.state.experience,
                "level up"
            );
        }
        self.refresh_unlocks()
    }

    fn refresh_unlocks(&mut self) -> Vec<String> {
        let lowest = self.rules.lowest_tier().name.clone();
        self.state.unlocked_tiers.insert(lowest);

        let mut newly = Vec::new();
        for tier in &self.rules.tiers {
            if self.state.unlocked_tiers.contains(&tier.name) {
                continue;
            }
            let state = &self.state;
            if tier.is_satisfied(state.level, |id| state.has_achievement(id)) {
                newly.push(tier.name.clone());
            }
        }
        for name in &newly {
            tracing::info!(user_id = %self.state.user_id, tier = %name, "tier unlocked");
            self.state.unlocked_tiers.insert(name.clone());
        }
        newly
    }
}
