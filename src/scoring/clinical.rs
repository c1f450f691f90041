//! Diagnosis-plus-specifier grading: the core diagnosis carries
//! `diagnosis_share` of the score and the specifiers `specifier_share`.

use super::policy::{evaluate, Evaluation, ScoringConfig, ScoringPolicy};
use super::text;
use crate::catalog::{CaseRecord, DiagnosisRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct ClinicalEvaluation {
    pub evaluation: Evaluation,
    pub core_answer: String,
    pub matched_specifiers: Vec<String>,
    pub specifier_score: f64,
}

/// Splits recognized specifier phrases out of `answer`; returns the remaining
/// core text and the phrases found.
pub fn split_specifiers(answer: &str, case: &CaseRecord) -> (String, Vec<String>) {
    let mut remaining = text::words(answer);
    let mut matched = Vec::new();

    for specifier in &case.specifiers {
        let phrase = text::words(&specifier.phrase);
        if let Some(start) = text::find_phrase(&remaining, &phrase) {
            remaining.drain(start..start + phrase.len());
            matched.push(specifier.phrase.clone());
        }
    }
    (remaining.join(" "), matched)
}

pub fn evaluate_clinical(
    policy: ScoringPolicy,
    config: &ScoringConfig,
    answer: &str,
    case: &CaseRecord,
    resolve: impl Fn(&str) -> Option<DiagnosisRecord>,
) -> ClinicalEvaluation {
    let (core_answer, matched) = split_specifiers(answer, case);
    let core_record = resolve(&core_answer);
    let core = evaluate(policy, config, &core_answer, case, core_record.as_ref());

    let weight_sum: f64 = case
        .specifiers
        .iter()
        .filter(|s| matched.contains(&s.phrase))
        .map(|s| if s.weight.is_finite() { s.weight.max(0.0) } else { 0.0 })
        .sum();
    let specifier_score = weight_sum.min(1.0);

    let max = config.max_score;
    let core_part = core.fraction() * config.diagnosis_share;
    let specifier_part = specifier_score * config.specifier_share;
    let score = ((core_part + specifier_part) * max).clamp(0.0, max);

    let mut rationale = format!(
        "diagnosis {:.0}% x {:.0}%; specifiers {:.0}% x {:.0}%",
        core.fraction() * 100.0,
        config.diagnosis_share * 100.0,
        specifier_score * 100.0,
        config.specifier_share * 100.0
    );
    if !matched.is_empty() {
        rationale.push_str(&format!(" ({})", matched.join(", ")));
    }
    if let Some(core_rationale) = core.rationale.as_deref() {
        rationale.push_str(&format!("; {core_rationale}"));
    }

    ClinicalEvaluation {
        evaluation: Evaluation {
            score,
            max_score: max,
            is_correct: core.is_correct,
            rationale: Some(rationale),
        },
        core_answer,
        matched_specifiers: matched,
        specifier_score,
    }
}
