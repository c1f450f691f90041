use std::fmt;

use serde::{Deserialize, Serialize};

use super::text;
use crate::catalog::{CaseRecord, DiagnosisRecord};

/// How free-text answers are graded. Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    #[default]
    Strict,
    Lenient,
    Partial,
}

impl ScoringPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            ScoringPolicy::Strict => "strict",
            ScoringPolicy::Lenient => "lenient",
            ScoringPolicy::Partial => "partial",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Self::Lenient,
            "partial" | "partial_credit" => Self::Partial,
            _ => Self::Strict,
        }
    }
}

impl fmt::Display for ScoringPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringConfig {
    pub max_score: f64,
    /// Token overlap at which lenient grading gives full credit.
    pub lenient_threshold: f64,
    /// Similarity below this earns nothing for the diagnosis itself.
    pub similarity_threshold: f64,
    pub diagnosis_share: f64,
    pub category_bonus: f64,
    pub age_group_bonus: f64,
    pub complexity_bonus: f64,
    pub specifier_share: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_score: 1.0,
            lenient_threshold: 0.8,
            similarity_threshold: 0.7,
            diagnosis_share: 0.7,
            category_bonus: 0.25,
            age_group_bonus: 0.15,
            complexity_bonus: 0.10,
            specifier_share: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub score: f64,
    pub max_score: f64,
    pub is_correct: bool,
    pub rationale: Option<String>,
}

impl Evaluation {
    fn full(max_score: f64) -> Self {
        Self {
            score: max_score,
            max_score,
            is_correct: true,
            rationale: None,
        }
    }

    fn zero(max_score: f64) -> Self {
        Self {
            score: 0.0,
            max_score,
            is_correct: false,
            rationale: None,
        }
    }

    pub fn fraction(&self) -> f64 {
        if self.max_score > 0.0 {
            (self.score / self.max_score).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Grades `answer` against `case.diagnosis`. `answer_record` is the catalog
/// entry the answer names, if any; partial credit reads its metadata.
pub fn evaluate(
    policy: ScoringPolicy,
    config: &ScoringConfig,
    answer: &str,
    case: &CaseRecord,
    answer_record: Option<&DiagnosisRecord>,
) -> Evaluation {
    let max = config.max_score;
    if text::normalize(answer).is_empty() {
        return Evaluation::zero(max);
    }
    match policy {
        ScoringPolicy::Strict => strict(max, answer, &case.diagnosis),
        ScoringPolicy::Lenient => lenient(config, answer, &case.diagnosis),
        ScoringPolicy::Partial => partial(config, answer, case, answer_record),
    }
}

fn strict(max: f64, answer: &str, canonical: &str) -> Evaluation {
    if text::normalize(answer) == text::normalize(canonical) {
        Evaluation::full(max)
    } else {
        Evaluation::zero(max)
    }
}

fn lenient(config: &ScoringConfig, answer: &str, canonical: &str) -> Evaluation {
    let exact = text::normalize(answer) == text::normalize(canonical);
    if exact || text::token_overlap(answer, canonical) >= config.lenient_threshold {
        Evaluation::full(config.max_score)
    } else {
        Evaluation::zero(config.max_score)
    }
}

fn partial(
    config: &ScoringConfig,
    answer: &str,
    case: &CaseRecord,
    answer_record: Option<&DiagnosisRecord>,
) -> Evaluation {
    let max = config.max_score;
    let answer_tokens = text::tokens(answer);
    let canonical_tokens = text::tokens(&case.diagnosis);

    if text::normalize(answer) == text::normalize(&case.diagnosis)
        || (!answer_tokens.is_empty() && answer_tokens == canonical_tokens)
    {
        return Evaluation {
            rationale: Some("exact match".to_string()),
            ..Evaluation::full(max)
        };
    }

    let mut parts = Vec::new();
    let mut total = 0.0;

    let overlap = text::jaccard(&answer_tokens, &canonical_tokens);
    let sim = overlap.max(text::edit_similarity(answer, &case.diagnosis));
    if sim >= config.similarity_threshold {
        let credit = sim * config.diagnosis_share * max;
        total += credit;
        parts.push(format!("similarity {sim:.2}: +{credit:.2}"));
    } else {
        parts.push(format!(
            "similarity {sim:.2} below {:.2}: +0.00",
            config.similarity_threshold
        ));
    }

    let category_match = match answer_record {
        Some(record) => record.category.eq_ignore_ascii_case(case.category.trim()),
        None => text::tokens(&case.category)
            .iter()
            .any(|token| token != "disorder" && answer_tokens.contains(token)),
    };
    if category_match {
        let credit = config.category_bonus * max;
        total += credit;
        parts.push(format!("category match: +{credit:.2}"));
    }

    if let Some(record) = answer_record {
        if record.age_groups.contains(&case.age_group) {
            let credit = config.age_group_bonus * max;
            total += credit;
            parts.push(format!("age group match: +{credit:.2}"));
        }
        if record.typical_complexity == Some(case.complexity) {
            let credit = config.complexity_bonus * max;
            total += credit;
            parts.push(format!("complexity match: +{credit:.2}"));
        }
    }

    let score = total.clamp(0.0, max);
    if score < total {
        parts.push(format!("capped at {max:.2}"));
    }

    Evaluation {
        score,
        max_score: max,
        is_correct: overlap >= config.lenient_threshold,
        rationale: Some(parts.join("; ")),
    }
}
