//! Progression incentives attached to a freshly built quiz: which questions
//! carry bonus XP, whether a running streak is worth protecting, and which
//! unearned achievements the quiz could still award.

use serde::{Deserialize, Serialize};

use crate::catalog::{CaseRecord, Complexity};
use crate::progression::streak::{multiplier_for, next_multiplier_step};
use crate::progression::xp::{compute_xp, difficulty_bonus, BASE_XP_PER_QUESTION};
use crate::progression::{ProgressionTracker, QuizProspect};

/// Specialty level at which a category earns a mastery callout.
pub const MASTERY_BONUS_LEVEL: u8 = 7;
/// Running streak length that triggers a maintenance prompt.
pub const STREAK_PROMPT_MIN: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum BonusOpportunity {
    /// A correct answer earns the difficulty bonus on top of base XP.
    Complexity {
        question: usize,
        case_id: String,
        complexity: Complexity,
        bonus: f64,
    },
    Mastery {
        question: usize,
        case_id: String,
        category: String,
        specialty_level: u8,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakPrompt {
    pub current: u32,
    pub multiplier: f64,
    pub next_step: Option<u32>,
    pub next_multiplier: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementOpportunity {
    pub id: String,
    pub name: String,
    pub description: String,
    pub xp_reward: u64,
    pub progress_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOpportunities {
    /// Base XP if every case is answered with full credit.
    pub base_xp: u64,
    /// XP for a perfect, fast run at the multipliers the streak would reach.
    pub max_xp: u64,
    pub bonuses: Vec<BonusOpportunity>,
    pub streak: Option<StreakPrompt>,
    pub achievements: Vec<AchievementOpportunity>,
}

/// `cases` pairs each case with the 1-based number of its question, in quiz
/// order. Only the tracker snapshot is read, so the result is as
/// reproducible as the quiz itself.
pub fn assess(tracker: &ProgressionTracker, cases: &[(usize, &CaseRecord)]) -> QuizOpportunities {
    let streak = tracker.streak().count;
    let mut prospect = QuizProspect::default();
    let mut bonuses = Vec::new();

    for (offset, (question, case)) in cases.iter().enumerate() {
        prospect.add_case(&case.category);
        let projected = streak.saturating_add(u32::try_from(offset + 1).unwrap_or(u32::MAX));
        let award = compute_xp(1.0, 0.0, case.complexity, multiplier_for(projected));
        prospect.max_xp = prospect.max_xp.saturating_add(award.total);

        let bonus = difficulty_bonus(case.complexity, 1.0);
        if bonus > 0.0 {
            bonuses.push(BonusOpportunity::Complexity {
                question: *question,
                case_id: case.case_id.clone(),
                complexity: case.complexity,
                bonus,
            });
        }
        if let Some(prof) = tracker.specialty(&case.category) {
            if prof.level >= MASTERY_BONUS_LEVEL {
                bonuses.push(BonusOpportunity::Mastery {
                    question: *question,
                    case_id: case.case_id.clone(),
                    category: case.category.clone(),
                    specialty_level: prof.level,
                });
            }
        }
    }

    let streak_prompt = (streak >= STREAK_PROMPT_MIN).then(|| {
        let next = next_multiplier_step(streak);
        StreakPrompt {
            current: streak,
            multiplier: multiplier_for(streak),
            next_step: next.map(|(step, _)| step),
            next_multiplier: next.map(|(_, multiplier)| multiplier),
        }
    });

    let state = tracker.state();
    let achievements = tracker
        .rules()
        .achievements
        .iter()
        .filter(|def| !state.has_achievement(&def.id))
        .filter(|def| def.condition.reachable_with(state, &prospect))
        .map(|def| AchievementOpportunity {
            id: def.id.clone(),
            name: def.name.clone(),
            description: def.description.clone(),
            xp_reward: def.xp_reward,
            progress_percent: def.condition.progress(state, None).fraction() * 100.0,
        })
        .collect();

    QuizOpportunities {
        base_xp: (f64::from(prospect.answers) * BASE_XP_PER_QUESTION).round() as u64,
        max_xp: prospect.max_xp,
        bonuses,
        streak: streak_prompt,
        achievements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AgeGroup;
    use crate::progression::AnswerOutcome;

    fn case(id: &str, category: &str, complexity: Complexity) -> CaseRecord {
        CaseRecord {
            case_id: id.to_string(),
            category: category.to_string(),
            age_group: AgeGroup::Adult,
            complexity,
            prevalence_weight: 1.0,
            diagnosis: "X".to_string(),
            specifiers: Vec::new(),
            keywords: Vec::new(),
            narrative: None,
        }
    }

    fn numbered(cases: &[CaseRecord]) -> Vec<(usize, &CaseRecord)> {
        cases.iter().enumerate().map(|(i, c)| (i + 1, c)).collect()
    }

    #[test]
    fn test_new_user_sees_first_case_and_no_prompts() {
        let tracker = ProgressionTracker::new("u1", "User");
        let cases = vec![
            case("a", "Mood", Complexity::Basic),
            case("b", "Mood", Complexity::Basic),
        ];
        let found = assess(&tracker, &numbered(&cases));
        assert_eq!(found.base_xp, 20);
        // Two perfect answers at streaks 1 and 2: 17 each.
        assert_eq!(found.max_xp, 34);
        assert!(found.bonuses.is_empty());
        assert!(found.streak.is_none());
        let ids: Vec<_> = found.achievements.iter().map(|a| a.id.as_str()).collect();
        assert!(ids.contains(&"first_case"));
        assert!(!ids.contains(&"perfect_streak"));
        assert!(!ids.contains(&"perfectionist"));
    }

    #[test]
    fn test_complexity_bonus_only_for_hard_cases() {
        let tracker = ProgressionTracker::new("u1", "User");
        let cases = vec![
            case("a", "Mood", Complexity::Intermediate),
            case("b", "Mood", Complexity::Advanced),
            case("c", "Mood", Complexity::Expert),
        ];
        let found = assess(&tracker, &numbered(&cases));
        let questions: Vec<usize> = found
            .bonuses
            .iter()
            .map(|b| match b {
                BonusOpportunity::Complexity { question, .. } => *question,
                BonusOpportunity::Mastery { question, .. } => *question,
            })
            .collect();
        assert_eq!(questions, vec![2, 3]);
    }

    #[test]
    fn test_streak_and_mastery_prompts() {
        let mut tracker = ProgressionTracker::new("u1", "User");
        for _ in 0..6 {
            tracker.record_outcome(&AnswerOutcome::new("Mood", Complexity::Basic, true));
        }
        let cases = vec![
            case("a", "mood", Complexity::Basic),
            case("b", "Anxiety", Complexity::Basic),
        ];
        let found = assess(&tracker, &numbered(&cases));

        let prompt = found.streak.unwrap();
        assert_eq!(prompt.current, 6);
        assert_eq!(prompt.multiplier, 1.25);
        assert_eq!(prompt.next_step, Some(10));
        assert_eq!(prompt.next_multiplier, Some(1.5));

        assert_eq!(
            found.bonuses,
            vec![BonusOpportunity::Mastery {
                question: 1,
                case_id: "a".to_string(),
                category: "mood".to_string(),
                specialty_level: 10,
            }]
        );
    }

    #[test]
    fn test_streak_achievement_reachable_near_threshold() {
        let mut tracker = ProgressionTracker::new("u1", "User");
        for _ in 0..8 {
            tracker.record_outcome(&AnswerOutcome::new("Mood", Complexity::Basic, true));
        }
        tracker.evaluate_achievements(None);
        let cases = vec![
            case("a", "Mood", Complexity::Basic),
            case("b", "Mood", Complexity::Basic),
        ];
        let found = assess(&tracker, &numbered(&cases));
        let perfect = found
            .achievements
            .iter()
            .find(|a| a.id == "perfect_streak")
            .unwrap();
        assert!((perfect.progress_percent - 80.0).abs() < 1e-9);
        assert!(!found.achievements.iter().any(|a| a.id == "first_case"));
    }
}
