//! Achievements are data: each definition carries a condition that one
//! interpreter evaluates against the user's state and, when available, the
//! statistics of the session that just finished.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::leveling::level_for_xp;
use super::types::ProgressionState;
use crate::scoring::SessionStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Progression,
    Streak,
    Accuracy,
    Speed,
    Specialty,
    Exploration,
    #[serde(other)]
    Other,
}

impl AchievementCategory {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "progression" => Self::Progression,
            "streak" => Self::Streak,
            "accuracy" => Self::Accuracy,
            "speed" => Self::Speed,
            "specialty" => Self::Specialty,
            "exploration" => Self::Exploration,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum AchievementCondition {
    Level {
        level: u32,
    },
    /// Best streak ever reached.
    Streak {
        count: u32,
    },
    CasesCompleted {
        count: u64,
    },
    SessionAccuracy {
        min_accuracy: f64,
        min_questions: usize,
    },
    FastCorrect {
        max_seconds: f64,
        count: usize,
    },
    CategoryMastery {
        category: String,
        min_attempts: u32,
        min_accuracy: f64,
    },
    CategoriesExplored {
        count: usize,
    },
    SessionsCompleted {
        count: u64,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "other_category")]
    pub category: AchievementCategory,
    #[serde(default)]
    pub badge: String,
    #[serde(default)]
    pub xp_reward: u64,
    pub condition: AchievementCondition,
}

fn other_category() -> AchievementCategory {
    AchievementCategory::Other
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionProgress {
    pub current: f64,
    pub target: f64,
}

impl ConditionProgress {
    pub fn fraction(&self) -> f64 {
        if self.target <= 0.0 {
            1.0
        } else {
            (self.current / self.target).clamp(0.0, 1.0)
        }
    }
}

impl AchievementCondition {
    pub fn is_satisfied(&self, state: &ProgressionState, session: Option<&SessionStats>) -> bool {
        match self {
            Self::Level { level } => state.level >= *level,
            Self::Streak { count } => state.streak.longest >= *count,
            Self::CasesCompleted { count } => state.total_answers >= *count,
            Self::SessionAccuracy {
                min_accuracy,
                min_questions,
            } => session.is_some_and(|stats| {
                stats.total_questions >= *min_questions
                    && stats.total_questions > 0
                    && stats.accuracy >= *min_accuracy
            }),
            Self::FastCorrect { max_seconds, count } => session.is_some_and(|stats| {
                fast_correct_count(stats, *max_seconds) >= *count && *count > 0
            }),
            Self::CategoryMastery {
                category,
                min_attempts,
                min_accuracy,
            } => state.specialty(category).is_some_and(|prof| {
                prof.attempts >= *min_attempts
                    && prof.attempts > 0
                    && prof.accuracy() >= *min_accuracy
            }),
            Self::CategoriesExplored { count } => state.categories_explored() >= *count,
            Self::SessionsCompleted { count } => state.sessions_completed >= *count,
            Self::Unsupported => false,
        }
    }

    /// How close the user is; session conditions report 0 without a session.
    pub fn progress(&self, state: &ProgressionState, session: Option<&SessionStats>) -> ConditionProgress {
        let (current, target) = match self {
            Self::Level { level } => (f64::from(state.level), f64::from(*level)),
            Self::Streak { count } => (f64::from(state.streak.longest), f64::from(*count)),
            Self::CasesCompleted { count } => (state.total_answers as f64, *count as f64),
            Self::SessionAccuracy { min_accuracy, .. } => (
                session.map_or(0.0, |stats| stats.accuracy),
                *min_accuracy,
            ),
            Self::FastCorrect { max_seconds, count } => (
                session.map_or(0.0, |stats| fast_correct_count(stats, *max_seconds) as f64),
                *count as f64,
            ),
            Self::CategoryMastery {
                category,
                min_attempts,
                min_accuracy,
            } => {
                let Some(prof) = state.specialty(category) else {
                    return ConditionProgress {
                        current: 0.0,
                        target: 1.0,
                    };
                };
                let attempts = if *min_attempts == 0 {
                    1.0
                } else {
                    (f64::from(prof.attempts) / f64::from(*min_attempts)).min(1.0)
                };
                let accuracy = if *min_accuracy <= 0.0 {
                    1.0
                } else {
                    (prof.accuracy() / min_accuracy).min(1.0)
                };
                (attempts.min(accuracy), 1.0)
            }
            Self::CategoriesExplored { count } => {
                (state.categories_explored() as f64, *count as f64)
            }
            Self::SessionsCompleted { count } => (state.sessions_completed as f64, *count as f64),
            Self::Unsupported => (0.0, 1.0),
        };
        ConditionProgress { current, target }
    }
}

/// Best case a quiz that has not been taken yet could add to a user's state:
/// every answer correct and fast, taken as one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuizProspect {
    pub answers: u32,
    /// Cases per category; keys differing only in case are one category.
    pub categories: BTreeMap<String, u32>,
    pub max_xp: u64,
}

impl QuizProspect {
    pub fn add_case(&mut self, category: &str) {
        self.answers = self.answers.saturating_add(1);
        let key = self
            .categories
            .keys()
            .find(|name| name.eq_ignore_ascii_case(category))
            .cloned()
            .unwrap_or_else(|| category.to_string());
        *self.categories.entry(key).or_default() += 1;
    }

    pub fn cases_in(&self, category: &str) -> u32 {
        self.categories
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(category))
            .map(|(_, n)| *n)
            .sum()
    }

    fn unexplored(&self, state: &ProgressionState) -> usize {
        self.categories
            .keys()
            .filter(|name| state.specialty(name).map_or(true, |prof| prof.attempts == 0))
            .count()
    }
}

impl AchievementCondition {
    /// Whether the quiz in `prospect` could satisfy this condition if
    /// answered perfectly. Streak expiry is not considered.
    pub fn reachable_with(&self, state: &ProgressionState, prospect: &QuizProspect) -> bool {
        let answers = prospect.answers;
        match self {
            Self::Level { level } => {
                level_for_xp(state.experience.saturating_add(prospect.max_xp)) >= *level
            }
            Self::Streak { count } => state.streak.count.saturating_add(answers) >= *count,
            Self::CasesCompleted { count } => {
                state.total_answers.saturating_add(u64::from(answers)) >= *count
            }
            Self::SessionAccuracy { min_questions, .. } => {
                answers > 0 && answers as usize >= *min_questions
            }
            Self::FastCorrect { count, .. } => *count > 0 && answers as usize >= *count,
            Self::CategoryMastery {
                category,
                min_attempts,
                min_accuracy,
            } => {
                let extra = prospect.cases_in(category);
                if extra == 0 {
                    return false;
                }
                let (attempts, correct) = state
                    .specialty(category)
                    .map_or((0, 0), |prof| (prof.attempts, prof.correct));
                let attempts = attempts.saturating_add(extra);
                let correct = correct.saturating_add(extra);
                attempts >= *min_attempts
                    && f64::from(correct) / f64::from(attempts) * 100.0 >= *min_accuracy
            }
            Self::CategoriesExplored { count } => {
                state.categories_explored() + prospect.unexplored(state) >= *count
            }
            Self::SessionsCompleted { count } => state.sessions_completed.saturating_add(1) >= *count,
            Self::Unsupported => false,
        }
    }
}

fn fast_correct_count(stats: &SessionStats, max_seconds: f64) -> usize {
    stats
        .correct_times
        .iter()
        .filter(|&&t| t < max_seconds)
        .count()
}

fn definition(
    id: &str,
    name: &str,
    description: &str,
    category: AchievementCategory,
    badge: &str,
    xp_reward: u64,
    condition: AchievementCondition,
) -> AchievementDefinition {
    AchievementDefinition {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category,
        badge: badge.to_string(),
        xp_reward,
        condition,
    }
}

fn mastery(category: &str, min_attempts: u32, min_accuracy: f64) -> AchievementCondition {
    AchievementCondition::CategoryMastery {
        category: category.to_string(),
        min_attempts,
        min_accuracy,
    }
}

pub fn default_achievements() -> Vec<AchievementDefinition> {
    use AchievementCategory as C;
    use AchievementCondition as Cond;

    vec![
        definition(
            "first_case",
            "First Diagnosis",
            "Complete your first case",
            C::Progression,
            "stethoscope",
            10,
            Cond::CasesCompleted { count: 1 },
        ),
        definition(
            "perfect_streak",
            "Perfect Streak",
            "Answer 10 cases correctly in a row",
            C::Streak,
            "flame",
            50,
            Cond::Streak { count: 10 },
        ),
        definition(
            "streak_master",
            "Streak Master",
            "Answer 20 cases correctly in a row",
            C::Streak,
            "bonfire",
            100,
            Cond::Streak { count: 20 },
        ),
        definition(
            "speed_demon",
            "Speed Demon",
            "Answer 5 cases correctly in under 2 minutes each during one session",
            C::Speed,
            "lightning",
            25,
            Cond::FastCorrect {
                max_seconds: 120.0,
                count: 5,
            },
        ),
        definition(
            "perfectionist",
            "Perfectionist",
            "Finish a session of at least 5 questions with 100% accuracy",
            C::Accuracy,
            "diamond",
            75,
            Cond::SessionAccuracy {
                min_accuracy: 100.0,
                min_questions: 5,
            },
        ),
        definition(
            "sharp_session",
            "Sharp Session",
            "Reach 90% accuracy in a session of 10 or more questions",
            C::Accuracy,
            "target",
            40,
            Cond::SessionAccuracy {
                min_accuracy: 90.0,
                min_questions: 10,
            },
        ),
        definition(
            "level_5",
            "Resident",
            "Reach level 5",
            C::Progression,
            "badge-bronze",
            25,
            Cond::Level { level: 5 },
        ),
        definition(
            "level_10",
            "Attending",
            "Reach level 10",
            C::Progression,
            "badge-silver",
            100,
            Cond::Level { level: 10 },
        ),
        definition(
            "level_25",
            "Department Chief",
            "Reach level 25",
            C::Progression,
            "badge-gold",
            250,
            Cond::Level { level: 25 },
        ),
        definition(
            "versatile_diagnostician",
            "Versatile Diagnostician",
            "Practice cases from 5 different categories",
            C::Exploration,
            "compass",
            50,
            Cond::CategoriesExplored { count: 5 },
        ),
        definition(
            "dedicated_learner",
            "Dedicated Learner",
            "Complete 10 quiz sessions",
            C::Progression,
            "calendar",
            50,
            Cond::SessionsCompleted { count: 10 },
        ),
        definition(
            "depressive_disorders_master",
            "Mood Specialist",
            "Diagnose 10 depressive disorder cases with at least 80% accuracy",
            C::Specialty,
            "cloud-sun",
            75,
            mastery("Depressive Disorders", 10, 80.0),
        ),
        definition(
            "schizophrenia_spectrum_expert",
            "Psychosis Expert",
            "Diagnose 10 psychotic disorder cases with at least 75% accuracy",
            C::Specialty,
            "brain",
            75,
            mastery("Schizophrenia Spectrum and Other Psychotic Disorders", 10, 75.0),
        ),
        definition(
            "anxiety_disorders_specialist",
            "Anxiety Specialist",
            "Diagnose 10 anxiety disorder cases with at least 80% accuracy",
            C::Specialty,
            "leaf",
            75,
            mastery("Anxiety Disorders", 10, 80.0),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::leveling::level_threshold;
    use chrono::Utc;

    fn state() -> ProgressionState {
        ProgressionState::new("u1", "Tester", Utc::now())
    }

    fn session(total: usize, correct: usize, times: Vec<f64>) -> SessionStats {
        let mut stats = SessionStats::empty();
        stats.total_questions = total;
        stats.answered = total;
        stats.correct_answers = correct;
        stats.accuracy = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64 * 100.0
        };
        stats.correct_times = times;
        stats
    }

    #[test]
    fn test_condition_json_shape() {
        let raw = r#"{"type": "category_mastery", "category": "Anxiety Disorders",
                      "minAttempts": 3, "minAccuracy": 60.0}"#;
        let cond: AchievementCondition = serde_json::from_str(raw).unwrap();
        assert_eq!(cond, mastery("Anxiety Disorders", 3, 60.0));

        let unknown: AchievementCondition =
            serde_json::from_str(r#"{"type": "moon_phase"}"#).unwrap();
        assert_eq!(unknown, AchievementCondition::Unsupported);
    }

    #[test]
    fn test_session_accuracy_requires_session() {
        let cond = AchievementCondition::SessionAccuracy {
            min_accuracy: 90.0,
            min_questions: 10,
        };
        let st = state();
        assert!(!cond.is_satisfied(&st, None));
        assert!(!cond.is_satisfied(&st, Some(&session(9, 9, vec![]))));
        assert!(cond.is_satisfied(&st, Some(&session(10, 9, vec![]))));
    }

    #[test]
    fn test_fast_correct_counts_strictly_under() {
        let cond = AchievementCondition::FastCorrect {
            max_seconds: 30.0,
            count: 2,
        };
        let st = state();
        assert!(!cond.is_satisfied(&st, Some(&session(3, 3, vec![10.0, 30.0, 45.0]))));
        assert!(cond.is_satisfied(&st, Some(&session(3, 3, vec![10.0, 29.9, 45.0]))));
    }

    #[test]
    fn test_streak_uses_longest() {
        let mut st = state();
        st.streak.longest = 12;
        st.streak.count = 0;
        assert!(AchievementCondition::Streak { count: 10 }.is_satisfied(&st, None));
    }

    #[test]
    fn test_progress_fraction() {
        let mut st = state();
        st.total_answers = 7;
        let progress = AchievementCondition::CasesCompleted { count: 10 }.progress(&st, None);
        assert!((progress.fraction() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_prospect_folds_category_case() {
        let mut prospect = QuizProspect::default();
        prospect.add_case("Anxiety Disorders");
        prospect.add_case("anxiety disorders");
        prospect.add_case("Depressive Disorders");
        assert_eq!(prospect.answers, 3);
        assert_eq!(prospect.categories.len(), 2);
        assert_eq!(prospect.cases_in("ANXIETY DISORDERS"), 2);
    }

    #[test]
    fn test_reachable_with_counts_and_sessions() {
        let mut st = state();
        st.total_answers = 8;
        st.streak.count = 7;
        let mut prospect = QuizProspect::default();
        for _ in 0..3 {
            prospect.add_case("Mood");
        }

        assert!(AchievementCondition::CasesCompleted { count: 10 }.reachable_with(&st, &prospect));
        assert!(!AchievementCondition::CasesCompleted { count: 12 }.reachable_with(&st, &prospect));
        assert!(AchievementCondition::Streak { count: 10 }.reachable_with(&st, &prospect));
        assert!(!AchievementCondition::Streak { count: 20 }.reachable_with(&st, &prospect));
        let sharp = AchievementCondition::SessionAccuracy {
            min_accuracy: 90.0,
            min_questions: 10,
        };
        assert!(!sharp.reachable_with(&st, &prospect));
        assert!(!AchievementCondition::Unsupported.reachable_with(&st, &prospect));
    }

    #[test]
    fn test_mastery_reachable_only_with_category_cases() {
        let now = Utc::now();
        let mut st = state();
        for i in 0..8 {
            st.specialty_mut("Anxiety Disorders").record(i != 0, 10, now);
        }
        let cond = mastery("Anxiety Disorders", 10, 80.0);

        let mut other = QuizProspect::default();
        other.add_case("Depressive Disorders");
        other.add_case("Depressive Disorders");
        assert!(!cond.reachable_with(&st, &other));

        let mut two = QuizProspect::default();
        two.add_case("Anxiety Disorders");
        two.add_case("Anxiety Disorders");
        // 9 of 10 correct.
        assert!(cond.reachable_with(&st, &two));
    }

    #[test]
    fn test_level_reachable_through_max_xp() {
        let st = state();
        let prospect = QuizProspect {
            answers: 1,
            max_xp: level_threshold(5),
            ..QuizProspect::default()
        };
        assert!(AchievementCondition::Level { level: 5 }.reachable_with(&st, &prospect));
        assert!(!AchievementCondition::Level { level: 6 }.reachable_with(&st, &prospect));
    }

    #[test]
    fn test_default_ids_unique() {
        let defs = default_achievements();
        let mut ids: Vec<_> = defs.iter().map(|d| d.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), defs.len());
    }
}
