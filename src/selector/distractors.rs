//! Wrong-answer generation. Candidates are tried in three bands: same
//! category, cross-category ranked by keyword overlap, then everything left.

use std::collections::{BTreeSet, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{CaseRecord, DiagnosisRecord};

/// Ordering for cross-category candidates. Ties always break by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistractorRanking {
    #[default]
    SharedKeywords,
    Jaccard,
}

impl DistractorRanking {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "jaccard" => Self::Jaccard,
            _ => Self::SharedKeywords,
        }
    }

    fn score(self, reference: &BTreeSet<String>, candidate: &BTreeSet<String>) -> f64 {
        let shared = reference.intersection(candidate).count();
        match self {
            Self::SharedKeywords => shared as f64,
            Self::Jaccard => {
                let union = reference.union(candidate).count();
                if union == 0 {
                    0.0
                } else {
                    shared as f64 / union as f64
                }
            }
        }
    }
}

fn keyword_set(keywords: &[String]) -> BTreeSet<String> {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Up to `count` distractor names for `case`; fewer when the catalog runs out.
pub fn generate_distractors<R: Rng>(
    case: &CaseRecord,
    diagnoses: &[DiagnosisRecord],
    count: usize,
    ranking: DistractorRanking,
    rng: &mut R,
) -> Vec<String> {
    if count == 0 {
        return Vec::new();
    }
    let correct = case.diagnosis.trim().to_lowercase();

    let mut seen = HashSet::new();
    let mut candidates: Vec<&DiagnosisRecord> = diagnoses
        .iter()
        .filter(|d| {
            let key = d.name.trim().to_lowercase();
            key != correct && !key.is_empty() && seen.insert(key)
        })
        .collect();
    candidates.sort_by(|a, b| a.name.cmp(&b.name));

    let mut picked: Vec<String> = Vec::with_capacity(count);

    let (mut same, rest): (Vec<&DiagnosisRecord>, Vec<&DiagnosisRecord>) = candidates
        .into_iter()
        .partition(|d| d.category.eq_ignore_ascii_case(case.category.trim()));
    same.shuffle(rng);
    picked.extend(same.iter().take(count).map(|d| d.name.clone()));

    let mut reference = keyword_set(&case.keywords);
    if let Some(record) = diagnoses
        .iter()
        .find(|d| d.name.trim().eq_ignore_ascii_case(case.diagnosis.trim()))
    {
        reference.extend(keyword_set(&record.keywords));
    }

    let mut ranked: Vec<(f64, &DiagnosisRecord)> = rest
        .iter()
        .map(|d| (ranking.score(&reference, &keyword_set(&d.keywords)), *d))
        .filter(|(score, _)| *score > 0.0)
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.name.cmp(&b.1.name)));
    let ranked_names: HashSet<&str> = ranked.iter().map(|(_, d)| d.name.as_str()).collect();
    for (_, d) in &ranked {
        if picked.len() >= count {
            break;
        }
        picked.push(d.name.clone());
    }

    if picked.len() < count {
        let mut remaining: Vec<&DiagnosisRecord> = rest
            .into_iter()
            .filter(|d| !ranked_names.contains(d.name.as_str()))
            .collect();
        remaining.shuffle(rng);
        picked.extend(
            remaining
                .iter()
                .take(count - picked.len())
                .map(|d| d.name.clone()),
        );
    }

    if picked.len() < count {
        tracing::warn!(
            case_id = %case.case_id,
            wanted = count,
            found = picked.len(),
            "not enough diagnoses for distractors"
        );
    }
    picked
}
