//! Adaptive learning engine for a diagnostic-reasoning quiz.
//!
//! - `catalog`: read-only case and diagnosis records
//! - `scoring`: answer evaluation and session aggregation
//! - `progression`: per-user XP, streaks, specialties, achievements and tiers
//! - `selector`: adaptive case selection, sequencing and distractors

pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod progression;
pub mod sanitize;
pub mod scoring;
pub mod selector;

pub use catalog::{
    AgeGroup, CaseFilter, CaseProvider, CaseRecord, Complexity, DiagnosisRecord, InMemoryCatalog,
    Specifier,
};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use logging::{LogGuard, LogSettings};
pub use progression::{
    AnswerOutcome, OutcomeReceipt, ProgressionRecord, ProgressionRules, ProgressionTracker,
    TrackerRegistry,
};
pub use scoring::{
    evaluate_combination, ExportFormat, QuestionResult, ScoringConfig, ScoringPolicy,
    ScoringSession, SessionReport, SessionStats,
};
pub use selector::{
    AdaptiveSelector, AnswerOption, CombinationMode, Question, QuestionKind, Quiz, QuizConfig,
    QuizOpportunities, SelectorConfig,
};
