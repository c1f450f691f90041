//! Answer grading and session aggregation.
//!
//! A [`ScoringSession`] walks `NotStarted -> InProgress -> Completed`. When a
//! progression tracker is attached, finalizing the session feeds every
//! recorded result to it in answer order.

pub mod clinical;
mod combination;
mod export;
pub mod policy;
pub mod stats;
pub mod text;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{AgeGroup, CaseRecord, Complexity, DiagnosisRecord};
use crate::error::{EngineError, Result};
use crate::progression::{AnswerOutcome, AwardedAchievement, SharedTracker};
use crate::sanitize::{normalize_label, sanitize_seconds};

pub use combination::{evaluate_combination, CaseMatch, CombinationResult};
pub use export::{export_report, ExportFormat};
pub use policy::{evaluate, Evaluation, ScoringConfig, ScoringPolicy};
pub use stats::{compute_stats, Breakdown, DifficultyAnalysis, SessionStats, TimeAnalysis};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NotStarted,
    InProgress,
    Completed,
}

impl SessionState {
    pub const fn as_str(self) -> &'static str {
        match self {
            SessionState::NotStarted => "not_started",
            SessionState::InProgress => "in_progress",
            SessionState::Completed => "completed",
        }
    }

    pub fn can_transition_to(self, target: SessionState) -> bool {
        matches!(
            (self, target),
            (SessionState::NotStarted, SessionState::InProgress)
                | (SessionState::Completed, SessionState::InProgress)
                | (SessionState::InProgress, SessionState::Completed)
        )
    }
}

#[derive(Debug, Error)]
#[error("invalid session transition from {} to {}", from.as_str(), to.as_str())]
pub struct TransitionError {
    pub from: SessionState,
    pub to: SessionState,
}

impl From<TransitionError> for EngineError {
    fn from(err: TransitionError) -> Self {
        EngineError::InvalidState(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_index: usize,
    pub case_id: String,
    /// `None` when the question timed out or was skipped.
    pub answer: Option<String>,
    pub correct_diagnosis: String,
    pub is_correct: bool,
    pub score: f64,
    pub max_score: f64,
    pub time_spent: f64,
    pub category: String,
    pub age_group: AgeGroup,
    pub complexity: Complexity,
    pub feedback: String,
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionSummary {
    pub xp_per_question: Vec<u64>,
    pub total_xp_awarded: u64,
    pub experience: u64,
    pub level_before: u32,
    pub level_after: u32,
    pub streak: u32,
    pub multiplier: f64,
    pub new_achievements: Vec<AwardedAchievement>,
    pub newly_unlocked_tiers: Vec<String>,
    pub recommended_tier: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub session_id: Uuid,
    pub policy: ScoringPolicy,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub stats: SessionStats,
    pub results: Vec<QuestionResult>,
    pub progression: Option<ProgressionSummary>,
}

pub struct ScoringSession {
    id: Uuid,
    policy: ScoringPolicy,
    config: ScoringConfig,
    state: SessionState,
    cases: Vec<CaseRecord>,
    diagnoses: HashMap<String, DiagnosisRecord>,
    results: Vec<QuestionResult>,
    answered: HashSet<usize>,
    tracker: Option<SharedTracker>,
    started_at: DateTime<Utc>,
    report: Option<SessionReport>,
}

impl ScoringSession {
    pub fn new(policy: ScoringPolicy, config: ScoringConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            policy,
            config,
            state: SessionState::NotStarted,
            cases: Vec::new(),
            diagnoses: HashMap::new(),
            results: Vec::new(),
            answered: HashSet::new(),
            tracker: None,
            started_at: Utc::now(),
            report: None,
        }
    }

    pub fn with_tracker(mut self, tracker: SharedTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Diagnosis metadata used for partial credit on wrong answers, keyed by
    /// the same normalized form grading compares against.
    pub fn with_diagnoses<'a>(mut self, diagnoses: impl IntoIterator<Item = &'a DiagnosisRecord>) -> Self {
        self.diagnoses = diagnoses
            .into_iter()
            .map(|d| (text::normalize(&d.name), d.clone()))
            .collect();
        self
    }

    fn diagnosis_record(&self, name: &str) -> Option<&DiagnosisRecord> {
        self.diagnoses.get(&text::normalize(name))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn policy(&self) -> ScoringPolicy {
        self.policy
    }

    pub fn question_count(&self) -> usize {
        self.cases.len()
    }

    pub fn results(&self) -> &[QuestionResult] {
        &self.results
    }

    fn transition(&mut self, to: SessionState) -> std::result::Result<(), TransitionError> {
        if !self.state.can_transition_to(to) {
            return Err(TransitionError {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }

    pub fn start(&mut self, cases: Vec<CaseRecord>) -> Result<()> {
        if cases.is_empty() {
            return Err(EngineError::malformed("a session needs at least one case"));
        }
        self.transition(SessionState::InProgress)?;

        self.id = Uuid::new_v4();
        self.cases = cases;
        for case in &mut self.cases {
            case.category = normalize_label(&case.category);
        }
        self.results.clear();
        self.answered.clear();
        self.report = None;
        self.started_at = Utc::now();

        tracing::debug!(
            session_id = %self.id,
            policy = %self.policy,
            questions = self.cases.len(),
            "scoring session started"
        );
        Ok(())
    }

    pub fn record_answer(
        &mut self,
        index: usize,
        answer: Option<&str>,
        elapsed_seconds: f64,
    ) -> Result<&QuestionResult> {
        if self.state != SessionState::InProgress {
            return Err(EngineError::invalid_state(format!(
                "cannot record an answer while the session is {}",
                self.state.as_str()
            )));
        }
        let case = self.cases.get(index).ok_or(EngineError::InvalidIndex {
            index,
            len: self.cases.len(),
        })?;
        if self.answered.contains(&index) {
            return Err(EngineError::invalid_state(format!(
                "question {index} was already answered"
            )));
        }

        let time_spent = sanitize_seconds(elapsed_seconds);
        let answer = answer.map(str::trim).filter(|a| !a.is_empty());
        let evaluation = match answer {
            None => None,
            Some(text) if !case.specifiers.is_empty() => Some(
                clinical::evaluate_clinical(self.policy, &self.config, text, case, |core| {
                    self.diagnosis_record(core).cloned()
                })
                .evaluation,
            ),
            Some(text) => {
                let record = self.diagnosis_record(text);
                Some(policy::evaluate(self.policy, &self.config, text, case, record))
            }
        };

        let (score, is_correct, rationale) = match &evaluation {
            Some(eval) => (eval.score, eval.is_correct, eval.rationale.clone()),
            None => (0.0, false, None),
        };
        let feedback = self.feedback(case, answer, is_correct, score);

        let result = QuestionResult {
            question_index: index,
            case_id: case.case_id.clone(),
            answer: answer.map(str::to_string),
            correct_diagnosis: case.diagnosis.clone(),
            is_correct,
            score,
            max_score: self.config.max_score,
            time_spent,
            category: case.category.clone(),
            age_group: case.age_group,
            complexity: case.complexity,
            feedback,
            rationale,
        };

        self.answered.insert(index);
        self.results.push(result);
        let idx = self.results.len() - 1;
        Ok(&self.results[idx])
    }

    fn feedback(&self, case: &CaseRecord, answer: Option<&str>, is_correct: bool, score: f64) -> String {
        let Some(answer) = answer else {
            return format!("No answer recorded. The correct diagnosis is {}.", case.diagnosis);
        };
        if is_correct && score >= self.config.max_score {
            return format!("Correct! The diagnosis is {}.", case.diagnosis);
        }
        if is_correct {
            return format!(
                "Correct diagnosis. Add the relevant specifiers for full credit: {}.",
                case.diagnosis
            );
        }
        let same_category = self
            .diagnosis_record(answer)
            .is_some_and(|d| d.category.eq_ignore_ascii_case(&case.category));
        if same_category {
            return format!(
                "Close! {answer} is in the same category as the correct diagnosis. \
                 Consider the specific diagnostic criteria more carefully."
            );
        }
        if score > 0.0 {
            return format!(
                "Partially correct. The correct diagnosis is {}.",
                case.diagnosis
            );
        }
        format!(
            "The correct diagnosis is {}. Review the key distinguishing features for this condition.",
            case.diagnosis
        )
    }

    /// Aggregate of the results recorded so far, without side effects.
    pub fn calculate_scores(&self) -> Result<SessionStats> {
        if self.state == SessionState::NotStarted {
            return Err(EngineError::invalid_state("session has not been started"));
        }
        Ok(compute_stats(&self.results, self.cases.len(), self.config.max_score))
    }

    /// Completes the session. Later calls return the same report untouched.
    pub fn finalize(&mut self) -> Result<SessionReport> {
        if let (SessionState::Completed, Some(report)) = (self.state, &self.report) {
            return Ok(report.clone());
        }
        self.transition(SessionState::Completed)?;

        let stats = compute_stats(&self.results, self.cases.len(), self.config.max_score);
        let progression = self.tracker.as_ref().map(|tracker| {
            let mut tracker = tracker.lock();
            let level_before = tracker.level();
            let mut xp_per_question = Vec::with_capacity(self.results.len());
            let mut newly_unlocked_tiers = Vec::new();

            for result in &self.results {
                let outcome = AnswerOutcome {
                    category: result.category.clone(),
                    age_group: result.age_group,
                    complexity: result.complexity,
                    is_correct: result.is_correct,
                    score: if result.max_score > 0.0 {
                        result.score / result.max_score
                    } else {
                        0.0
                    },
                    time_taken_seconds: result.time_spent,
                };
                let receipt = tracker.record_outcome(&outcome);
                xp_per_question.push(receipt.xp_awarded);
                newly_unlocked_tiers.extend(receipt.newly_unlocked_tiers);
            }

            tracker.complete_session();
            let tiers_before: HashSet<String> = tracker.state().unlocked_tiers.clone().into_iter().collect();
            let new_achievements = tracker.evaluate_achievements(Some(&stats));
            newly_unlocked_tiers.extend(
                tracker
                    .state()
                    .unlocked_tiers
                    .iter()
                    .filter(|t| !tiers_before.contains(*t))
                    .cloned(),
            );

            ProgressionSummary {
                total_xp_awarded: xp_per_question.iter().sum(),
                xp_per_question,
                experience: tracker.experience(),
                level_before,
                level_after: tracker.level(),
                streak: tracker.streak().count,
                multiplier: tracker.streak().multiplier,
                new_achievements,
                newly_unlocked_tiers,
                recommended_tier: tracker.recommend_difficulty().tier,
            }
        });

        let report = SessionReport {
            session_id: self.id,
            policy: self.policy,
            started_at: self.started_at,
            completed_at: Utc::now(),
            stats,
            results: self.results.clone(),
            progression,
        };

        tracing::info!(
            session_id = %self.id,
            questions = self.cases.len(),
            answered = self.results.len(),
            percentage = report.stats.percentage_score,
            "scoring session finalized"
        );

        self.report = Some(report.clone());
        Ok(report)
    }

    pub fn export(&self, format: &str) -> Result<String> {
        let format = ExportFormat::parse(format)?;
        let report = self
            .report
            .as_ref()
            .ok_or_else(|| EngineError::invalid_state("session has not been finalized"))?;
        export_report(report, format)
    }
}
