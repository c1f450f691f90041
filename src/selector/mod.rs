//! Quiz construction: which cases, in what order, with which options.
//!
//! Every random choice in one build comes from a single `ChaCha8Rng` seeded
//! from [`QuizConfig::seed`], so the same seed, pool and tracker snapshot
//! always produce the same quiz.

pub mod combination;
pub mod distractors;
pub mod opportunities;
mod sampling;
mod sequence;

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{AgeGroup, CaseFilter, CaseProvider, CaseRecord, Complexity};
use crate::error::{EngineError, Result};
use crate::progression::ProgressionTracker;

pub use combination::CombinationMode;
pub use distractors::{generate_distractors, DistractorRanking};
pub use opportunities::{AchievementOpportunity, BonusOpportunity, QuizOpportunities, StreakPrompt};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectorConfig {
    /// Specialty level below which a category counts as weak.
    pub weakness_level: u8,
    /// Specialty level at or above which a category counts as mastered.
    pub mastery_level: u8,
    pub option_count: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            weakness_level: 8,
            mastery_level: 9,
            option_count: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizConfig {
    pub num_questions: usize,
    /// Overrides [`SelectorConfig::option_count`].
    pub option_count: Option<usize>,
    /// Random when absent; the seed actually used is reported on the quiz.
    pub seed: Option<u64>,
    pub adaptive: bool,
    pub prevalence_weighting: bool,
    pub streak_sequencing: bool,
    pub filter: CaseFilter,
    pub distractor_ranking: DistractorRanking,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            num_questions: 10,
            option_count: None,
            seed: None,
            adaptive: false,
            prevalence_weighting: false,
            streak_sequencing: false,
            filter: CaseFilter::default(),
            distractor_ranking: DistractorRanking::default(),
        }
    }
}

impl QuizConfig {
    pub fn new(num_questions: usize) -> Self {
        Self {
            num_questions,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_filter(mut self, filter: CaseFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn adaptive(mut self) -> Self {
        self.adaptive = true;
        self
    }

    pub fn weighted(mut self) -> Self {
        self.prevalence_weighting = true;
        self
    }

    pub fn sequenced(mut self) -> Self {
        self.streak_sequencing = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "mode", rename_all = "snake_case")]
pub enum QuestionKind {
    Single,
    Combination(CombinationMode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// 1-based position in the quiz.
    pub number: usize,
    pub kind: QuestionKind,
    pub case_ids: Vec<String>,
    pub options: Vec<AnswerOption>,
    /// Aligned with `case_ids`.
    pub correct_ids: Vec<String>,
    pub category: String,
    pub age_group: AgeGroup,
    pub complexity: Complexity,
}

impl Question {
    pub fn is_combination(&self) -> bool {
        matches!(self.kind, QuestionKind::Combination(_))
    }

    pub fn option(&self, id: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.id == id)
    }

    pub fn option_text(&self, id: &str) -> Option<&str> {
        self.option(id).map(|o| o.text.as_str())
    }

    pub fn correct_texts(&self) -> Vec<&str> {
        self.correct_ids
            .iter()
            .filter_map(|id| self.option_text(id))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub seed: u64,
    pub questions: Vec<Question>,
    /// Cases eligible after tier and filter gating.
    pub pool_size: usize,
    /// Present when the quiz was built for a tracked user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunities: Option<QuizOpportunities>,
}

impl Quiz {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Every case id in question order, sub-cases flattened.
    pub fn case_ids(&self) -> Vec<&str> {
        self.questions
            .iter()
            .flat_map(|q| q.case_ids.iter().map(String::as_str))
            .collect()
    }

    /// Case records for a scoring session, in question order.
    pub fn case_set<P>(&self, provider: &P) -> Result<Vec<CaseRecord>>
    where
        P: CaseProvider + ?Sized,
    {
        self.case_ids()
            .into_iter()
            .map(|id| {
                provider
                    .case(id)
                    .cloned()
                    .ok_or_else(|| EngineError::malformed(format!("case {id} is not in the catalog")))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Weak,
    Mastered,
    Any,
}

const ADAPTIVE_PATTERN: [Slot; 4] = [Slot::Weak, Slot::Mastered, Slot::Weak, Slot::Any];

fn option_id(index: usize) -> String {
    if index < 26 {
        char::from(b'A' + index as u8).to_string()
    } else {
        format!("O{}", index + 1)
    }
}

fn labelled(texts: Vec<String>) -> Vec<AnswerOption> {
    texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| AnswerOption {
            id: option_id(i),
            text,
        })
        .collect()
}

fn correct_id(options: &[AnswerOption], diagnosis: &str) -> Option<String> {
    let wanted = diagnosis.trim();
    options
        .iter()
        .find(|o| o.text.trim().eq_ignore_ascii_case(wanted))
        .map(|o| o.id.clone())
}

#[derive(Debug, Clone, Default)]
pub struct AdaptiveSelector {
    config: SelectorConfig,
}

impl AdaptiveSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Cases the user may see: tier-gated when a tracker is given, then the
    /// caller's filter. Sorted by case id so draws do not depend on catalog
    /// order.
    fn eligible_pool<'a, P>(
        &self,
        provider: &'a P,
        tracker: Option<&ProgressionTracker>,
        filter: &CaseFilter,
    ) -> Vec<&'a CaseRecord>
    where
        P: CaseProvider + ?Sized,
    {
        let admitted = tracker.map(|t| t.unlocked_complexities());
        let mut pool: Vec<&CaseRecord> = provider
            .filter_cases(filter)
            .into_iter()
            .filter(|c| {
                admitted
                    .as_ref()
                    .map_or(true, |set| set.contains(&c.complexity))
            })
            .collect();
        pool.sort_by(|a, b| a.case_id.cmp(&b.case_id));
        pool
    }

    fn slot_matches(&self, slot: Slot, case: &CaseRecord, tracker: &ProgressionTracker) -> bool {
        let level = tracker.specialty(&case.category).map_or(1, |s| s.level);
        match slot {
            Slot::Weak => level < self.config.weakness_level,
            Slot::Mastered => level >= self.config.mastery_level,
            Slot::Any => true,
        }
    }

    /// Draws `n` cases slot by slot. Adaptive slots narrow the candidates to
    /// a weak or mastered category; streak sequencing then narrows them to
    /// the complexity nearest the slot's target. Either step falls back to
    /// the wider set when it would leave nothing.
    fn choose<'a, R: Rng>(
        &self,
        pool: Vec<&'a CaseRecord>,
        n: usize,
        tracker: Option<&ProgressionTracker>,
        config: &QuizConfig,
        rng: &mut R,
    ) -> Vec<&'a CaseRecord> {
        let weighted = config.prevalence_weighting;
        let adaptive = tracker.filter(|_| config.adaptive);
        if adaptive.is_none() && !config.streak_sequencing {
            return sampling::sample(pool, n, weighted, rng);
        }
        let streak = tracker.map_or(0, |t| t.streak().count);

        let mut remaining = pool;
        let mut picked = Vec::with_capacity(n);
        for (index, slot) in ADAPTIVE_PATTERN.iter().cycle().take(n).enumerate() {
            let mut candidates = remaining.clone();
            if let Some(tracker) = adaptive {
                let bucket: Vec<&CaseRecord> = candidates
                    .iter()
                    .copied()
                    .filter(|c| self.slot_matches(*slot, c, tracker))
                    .collect();
                if bucket.is_empty() {
                    tracing::debug!(?slot, "adaptive bucket empty, drawing from whole pool");
                } else {
                    candidates = bucket;
                }
            }
            if config.streak_sequencing {
                let target = sequence::slot_target(streak, index, &candidates);
                candidates = sequence::nearest_rank(&candidates, target);
            }
            let Some(idx) = sampling::pick_index(&candidates, weighted, rng) else {
                break;
            };
            let chosen = candidates[idx];
            remaining.retain(|c| c.case_id != chosen.case_id);
            picked.push(chosen);
        }
        picked
    }

    /// Single-diagnosis quiz. Fails with `InsufficientContent` when the
    /// eligible pool has fewer cases than requested; distractor shortfalls
    /// only shrink the option list.
    pub fn build_quiz<P>(
        &self,
        provider: &P,
        tracker: Option<&ProgressionTracker>,
        config: &QuizConfig,
    ) -> Result<Quiz>
    where
        P: CaseProvider + ?Sized,
    {
        let option_count = config.option_count.unwrap_or(self.config.option_count);
        if option_count == 0 {
            return Err(EngineError::malformed("option count must be at least 1"));
        }

        let pool = self.eligible_pool(provider, tracker, &config.filter);
        let pool_size = pool.len();
        if pool_size < config.num_questions {
            return Err(EngineError::InsufficientContent {
                requested: config.num_questions,
                available: pool_size,
            });
        }

        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let selected = self.choose(pool, config.num_questions, tracker, config, &mut rng);
        let opportunities = tracker.map(|t| {
            let numbered: Vec<(usize, &CaseRecord)> = selected
                .iter()
                .enumerate()
                .map(|(idx, case)| (idx + 1, *case))
                .collect();
            opportunities::assess(t, &numbered)
        });

        let diagnoses = provider.diagnoses();
        let mut questions = Vec::with_capacity(selected.len());
        for (idx, case) in selected.into_iter().enumerate() {
            let mut texts = vec![case.diagnosis.clone()];
            texts.extend(generate_distractors(
                case,
                diagnoses,
                option_count - 1,
                config.distractor_ranking,
                &mut rng,
            ));
            texts.shuffle(&mut rng);
            let options = labelled(texts);
            let correct = correct_id(&options, &case.diagnosis)
                .ok_or_else(|| EngineError::invalid_state("correct option missing after shuffle"))?;

            questions.push(Question {
                number: idx + 1,
                kind: QuestionKind::Single,
                case_ids: vec![case.case_id.clone()],
                options,
                correct_ids: vec![correct],
                category: case.category.clone(),
                age_group: case.age_group,
                complexity: case.complexity,
            });
        }

        tracing::info!(
            seed,
            questions = questions.len(),
            pool_size,
            adaptive = config.adaptive,
            sequenced = config.streak_sequencing,
            "quiz built"
        );
        Ok(Quiz {
            seed,
            questions,
            pool_size,
            opportunities,
        })
    }

    /// Multi-case quiz: each question holds `cases_per_question` cases related
    /// by `mode`. No case appears in more than one question.
    pub fn build_combination_quiz<P>(
        &self,
        provider: &P,
        tracker: Option<&ProgressionTracker>,
        config: &QuizConfig,
        mode: CombinationMode,
        cases_per_question: usize,
    ) -> Result<Quiz>
    where
        P: CaseProvider + ?Sized,
    {
        if cases_per_question < 2 {
            return Err(EngineError::malformed(
                "combination questions need at least two cases",
            ));
        }

        let pool = self.eligible_pool(provider, tracker, &config.filter);
        let pool_size = pool.len();
        let requested = config.num_questions.saturating_mul(cases_per_question);
        let shortfall = || EngineError::InsufficientContent {
            requested,
            available: pool_size,
        };
        if pool_size < requested {
            return Err(shortfall());
        }

        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut remaining = pool;
        let mut questions = Vec::with_capacity(config.num_questions);
        let mut numbered: Vec<(usize, &CaseRecord)> = Vec::with_capacity(requested);

        for number in 1..=config.num_questions {
            let group = combination::pick_group(
                &mut remaining,
                mode,
                cases_per_question,
                config.prevalence_weighting,
                &mut rng,
            )
            .ok_or_else(|| {
                tracing::warn!(%mode, number, "case pool cannot form another group");
                shortfall()
            })?;

            let mut seen = HashSet::new();
            let mut texts: Vec<String> = group
                .iter()
                .filter(|c| seen.insert(c.diagnosis.trim().to_lowercase()))
                .map(|c| c.diagnosis.clone())
                .collect();
            texts.shuffle(&mut rng);
            let options = labelled(texts);

            let correct_ids = group
                .iter()
                .map(|c| {
                    correct_id(&options, &c.diagnosis).ok_or_else(|| {
                        EngineError::invalid_state("combination option missing for sub-case")
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            numbered.extend(group.iter().map(|case| (number, *case)));
            let first = group[0];
            let shared_category = group
                .iter()
                .all(|c| c.category.eq_ignore_ascii_case(&first.category));
            let hardest = group
                .iter()
                .map(|c| c.complexity)
                .max_by_key(|c| c.rank())
                .unwrap_or(first.complexity);

            questions.push(Question {
                number,
                kind: QuestionKind::Combination(mode),
                case_ids: group.iter().map(|c| c.case_id.clone()).collect(),
                options,
                correct_ids,
                category: if shared_category {
                    first.category.clone()
                } else {
                    "mixed".to_string()
                },
                age_group: first.age_group,
                complexity: hardest,
            });
        }

        tracing::info!(seed, %mode, questions = questions.len(), pool_size, "combination quiz built");
        Ok(Quiz {
            seed,
            questions,
            pool_size,
            opportunities: tracker.map(|t| opportunities::assess(t, &numbered)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::catalog::{DiagnosisRecord, InMemoryCatalog};
    use crate::progression::{AnswerOutcome, ProgressionRules};

    fn case(id: &str, category: &str, complexity: Complexity, diagnosis: &str) -> CaseRecord {
        CaseRecord {
            case_id: id.to_string(),
            category: category.to_string(),
            age_group: AgeGroup::Adult,
            complexity,
            prevalence_weight: 1.0,
            diagnosis: diagnosis.to_string(),
            specifiers: Vec::new(),
            keywords: Vec::new(),
            narrative: None,
        }
    }

    fn dx(name: &str, category: &str) -> DiagnosisRecord {
        DiagnosisRecord {
            name: name.to_string(),
            category: category.to_string(),
            keywords: Vec::new(),
            age_groups: Vec::new(),
            typical_complexity: None,
            prevalence_rate: 0.0,
        }
    }

    fn catalog() -> InMemoryCatalog {
        let cases = vec![
            case("anx-1", "Anxiety", Complexity::Basic, "Generalized Anxiety Disorder"),
            case("anx-2", "Anxiety", Complexity::Intermediate, "Panic Disorder"),
            case("anx-3", "Anxiety", Complexity::Advanced, "Social Anxiety Disorder"),
            case("dep-1", "Depressive", Complexity::Basic, "Major Depressive Disorder"),
            case("dep-2", "Depressive", Complexity::Expert, "Persistent Depressive Disorder"),
            case("psy-1", "Psychotic", Complexity::Basic, "Schizophrenia"),
        ];
        let diagnoses = vec![
            dx("Generalized Anxiety Disorder", "Anxiety"),
            dx("Panic Disorder", "Anxiety"),
            dx("Social Anxiety Disorder", "Anxiety"),
            dx("Major Depressive Disorder", "Depressive"),
            dx("Persistent Depressive Disorder", "Depressive"),
            dx("Schizophrenia", "Psychotic"),
        ];
        InMemoryCatalog::new(cases, diagnoses).unwrap()
    }

    #[test]
    fn test_option_ids() {
        assert_eq!(option_id(0), "A");
        assert_eq!(option_id(25), "Z");
        assert_eq!(option_id(26), "O27");
    }

    #[test]
    fn test_build_quiz_shape() {
        let selector = AdaptiveSelector::default();
        let quiz = selector
            .build_quiz(&catalog(), None, &QuizConfig::new(4).with_seed(3))
            .unwrap();
        assert_eq!(quiz.len(), 4);
        assert_eq!(quiz.pool_size, 6);
        for (i, q) in quiz.questions.iter().enumerate() {
            assert_eq!(q.number, i + 1);
            assert_eq!(q.options.len(), 4);
            assert_eq!(q.correct_ids.len(), 1);
            let correct = q.option_text(&q.correct_ids[0]).unwrap();
            let record = catalog().case(&q.case_ids[0]).cloned().unwrap();
            assert_eq!(correct, record.diagnosis);
        }
    }

    #[test]
    fn test_same_seed_same_quiz() {
        let selector = AdaptiveSelector::default();
        let config = QuizConfig::new(5).with_seed(99).weighted();
        let a = selector.build_quiz(&catalog(), None, &config).unwrap();
        let b = selector.build_quiz(&catalog(), None, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_insufficient_content() {
        let selector = AdaptiveSelector::default();
        let err = selector
            .build_quiz(&catalog(), None, &QuizConfig::new(7).with_seed(1))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientContent {
                requested: 7,
                available: 6
            }
        ));
    }

    #[test]
    fn test_new_user_only_sees_beginner_cases() {
        let selector = AdaptiveSelector::default();
        let tracker = ProgressionTracker::new("u1", "User");
        let quiz = selector
            .build_quiz(&catalog(), Some(&tracker), &QuizConfig::new(3).with_seed(4))
            .unwrap();
        assert_eq!(quiz.pool_size, 3);
        assert!(quiz.questions.iter().all(|q| q.complexity == Complexity::Basic));

        let err = selector
            .build_quiz(&catalog(), Some(&tracker), &QuizConfig::new(4).with_seed(4))
            .unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_CONTENT");
    }

    #[test]
    fn test_adaptive_targets_weak_category_first() {
        let selector = AdaptiveSelector::default();
        let mut tracker = ProgressionTracker::new("u1", "User");
        for _ in 0..10 {
            tracker.record_outcome(&AnswerOutcome::new("Anxiety", Complexity::Basic, true));
            tracker.record_outcome(&AnswerOutcome::new("Depressive", Complexity::Basic, true));
        }
        let quiz = selector
            .build_quiz(
                &catalog(),
                Some(&tracker),
                &QuizConfig::new(2).with_seed(8).adaptive(),
            )
            .unwrap();
        assert_eq!(quiz.questions[0].category, "Psychotic");
        assert_ne!(quiz.questions[1].category, "Psychotic");
    }

    fn ladder(basic: usize, expert: usize) -> InMemoryCatalog {
        let mut cases = Vec::new();
        let mut diagnoses = Vec::new();
        for i in 0..basic + expert {
            let complexity = if i < basic {
                Complexity::Basic
            } else {
                Complexity::Expert
            };
            let name = format!("Disorder {i}");
            cases.push(case(&format!("c{i:02}"), "Mixed", complexity, &name));
            diagnoses.push(dx(&name, "Mixed"));
        }
        InMemoryCatalog::new(cases, diagnoses).unwrap()
    }

    #[test]
    fn test_streak_reset_draws_easy_cases_from_pool() {
        let selector = AdaptiveSelector::default();
        let catalog = ladder(2, 18);
        for seed in 0..50 {
            let quiz = selector
                .build_quiz(&catalog, None, &QuizConfig::new(3).with_seed(seed).sequenced())
                .unwrap();
            let complexities: Vec<_> = quiz.questions.iter().map(|q| q.complexity).collect();
            assert_eq!(
                complexities,
                vec![Complexity::Basic, Complexity::Basic, Complexity::Expert],
                "seed {seed}"
            );
        }
    }

    #[test]
    fn test_long_streak_draws_hard_cases_from_pool() {
        let rules = ProgressionRules::from_json(
            r#"{"tiers": [{"name": "open", "rank": 0,
                "complexities": ["basic", "intermediate", "advanced", "expert"]}]}"#,
        )
        .unwrap();
        let mut tracker = ProgressionTracker::with_rules("u1", "User", Arc::new(rules));
        for _ in 0..12 {
            tracker.record_outcome(&AnswerOutcome::new("Mixed", Complexity::Basic, true));
        }
        let selector = AdaptiveSelector::default();
        let catalog = ladder(18, 2);
        for seed in 0..20 {
            let quiz = selector
                .build_quiz(
                    &catalog,
                    Some(&tracker),
                    &QuizConfig::new(3).with_seed(seed).sequenced(),
                )
                .unwrap();
            let complexities: Vec<_> = quiz.questions.iter().map(|q| q.complexity).collect();
            // Two expert cases exist; the third slot degrades to basic.
            assert_eq!(
                complexities,
                vec![Complexity::Expert, Complexity::Expert, Complexity::Basic],
                "seed {seed}"
            );
        }
    }

    #[test]
    fn test_opportunities_only_for_tracked_users() {
        let selector = AdaptiveSelector::default();
        let config = QuizConfig::new(3).with_seed(6);
        let anonymous = selector.build_quiz(&catalog(), None, &config).unwrap();
        assert!(anonymous.opportunities.is_none());
        let json = serde_json::to_value(&anonymous).unwrap();
        assert!(json.get("opportunities").is_none());

        let tracker = ProgressionTracker::new("u1", "User");
        let tracked = selector.build_quiz(&catalog(), Some(&tracker), &config).unwrap();
        let found = tracked.opportunities.unwrap();
        assert_eq!(found.base_xp, 30);
        assert!(found.achievements.iter().any(|a| a.id == "first_case"));
        assert!(found.streak.is_none());
    }

    #[test]
    fn test_combination_quiz_contrasting() {
        let selector = AdaptiveSelector::default();
        let quiz = selector
            .build_combination_quiz(
                &catalog(),
                None,
                &QuizConfig::new(2).with_seed(5),
                CombinationMode::Contrasting,
                2,
            )
            .unwrap();
        assert_eq!(quiz.len(), 2);
        let ids = quiz.case_ids();
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 4);
        for q in &quiz.questions {
            assert!(q.is_combination());
            assert_eq!(q.case_ids.len(), q.correct_ids.len());
            assert_eq!(q.category, "mixed");
        }
    }

    #[test]
    fn test_combination_requires_two_cases() {
        let selector = AdaptiveSelector::default();
        let err = selector
            .build_combination_quiz(
                &catalog(),
                None,
                &QuizConfig::new(1).with_seed(5),
                CombinationMode::Similar,
                1,
            )
            .unwrap_err();
        assert_eq!(err.code(), "MALFORMED_INPUT");
    }

    #[test]
    fn test_combination_shortfall() {
        let selector = AdaptiveSelector::default();
        let err = selector
            .build_combination_quiz(
                &catalog(),
                None,
                &QuizConfig::new(2).with_seed(5),
                CombinationMode::Similar,
                3,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientContent { requested: 6, .. }
        ));
    }

    #[test]
    fn test_case_set_resolves_records() {
        let selector = AdaptiveSelector::default();
        let catalog = catalog();
        let quiz = selector
            .build_quiz(&catalog, None, &QuizConfig::new(3).with_seed(2))
            .unwrap();
        let cases = quiz.case_set(&catalog).unwrap();
        assert_eq!(cases.len(), 3);
        assert_eq!(cases[0].case_id, quiz.questions[0].case_ids[0]);
    }
}
