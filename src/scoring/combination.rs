use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::selector::Question;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseMatch {
    pub case_id: String,
    pub selected: Option<String>,
    pub expected: String,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationResult {
    /// All-or-nothing: every sub-case must map to its option.
    pub is_correct: bool,
    pub per_case: Vec<CaseMatch>,
    pub correct_count: usize,
    /// Share of sub-cases matched, for analytics only.
    pub per_case_credit: f64,
}

/// Grades a multi-case question. `mapping` goes from case id to the chosen
/// option id; missing entries count as wrong.
pub fn evaluate_combination(question: &Question, mapping: &HashMap<String, String>) -> CombinationResult {
    let per_case: Vec<CaseMatch> = question
        .case_ids
        .iter()
        .zip(&question.correct_ids)
        .map(|(case_id, expected)| {
            let selected = mapping.get(case_id).map(|s| s.trim().to_string());
            let correct = selected
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(expected));
            CaseMatch {
                case_id: case_id.clone(),
                selected,
                expected: expected.clone(),
                correct,
            }
        })
        .collect();

    let correct_count = per_case.iter().filter(|m| m.correct).count();
    let per_case_credit = if per_case.is_empty() {
        0.0
    } else {
        correct_count as f64 / per_case.len() as f64
    };

    CombinationResult {
        is_correct: !per_case.is_empty() && correct_count == per_case.len(),
        per_case,
        correct_count,
        per_case_credit,
    }
}
