//! Read-only case and diagnosis records.
//!
//! The engine never writes to the catalog; hosts plug in storage by
//! implementing [`CaseProvider`]. [`InMemoryCatalog`] covers JSON fixtures and
//! small deployments.

mod filter;
mod labels;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::sanitize::normalize_label;

pub use filter::CaseFilter;
pub use labels::{AgeGroup, Complexity};

fn default_weight() -> f64 {
    1.0
}

/// Qualifying phrase attached to a diagnosis (severity, course, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specifier {
    pub phrase: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    #[serde(alias = "case_id")]
    pub case_id: String,
    pub category: String,
    #[serde(alias = "age_group", default = "unknown_age")]
    pub age_group: AgeGroup,
    #[serde(default = "unknown_complexity")]
    pub complexity: Complexity,
    #[serde(alias = "prevalence_weight", default = "default_weight")]
    pub prevalence_weight: f64,
    pub diagnosis: String,
    #[serde(default)]
    pub specifiers: Vec<Specifier>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRecord {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(alias = "age_groups", default)]
    pub age_groups: Vec<AgeGroup>,
    #[serde(alias = "typical_complexity", default)]
    pub typical_complexity: Option<Complexity>,
    #[serde(alias = "prevalence_rate", default)]
    pub prevalence_rate: f64,
}

fn unknown_age() -> AgeGroup {
    AgeGroup::Unknown
}

fn unknown_complexity() -> Complexity {
    Complexity::Unknown
}

/// Source of cases and diagnoses consumed by the selector and scorer.
pub trait CaseProvider {
    fn cases(&self) -> &[CaseRecord];

    fn diagnoses(&self) -> &[DiagnosisRecord];

    fn case(&self, case_id: &str) -> Option<&CaseRecord> {
        self.cases().iter().find(|c| c.case_id == case_id)
    }

    fn diagnosis(&self, name: &str) -> Option<&DiagnosisRecord> {
        let needle = name.trim();
        self.diagnoses()
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(needle))
    }

    fn filter_cases(&self, filter: &CaseFilter) -> Vec<&CaseRecord> {
        self.cases().iter().filter(|c| filter.matches(c)).collect()
    }

    fn categories(&self) -> Vec<String> {
        self.cases()
            .iter()
            .map(|c| c.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    cases: Vec<CaseRecord>,
    #[serde(default)]
    diagnoses: Vec<DiagnosisRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary {
    pub total_cases: usize,
    pub total_diagnoses: usize,
    pub cases_by_category: HashMap<String, usize>,
    pub cases_by_age_group: HashMap<String, usize>,
    pub cases_by_complexity: HashMap<String, usize>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    cases: Vec<CaseRecord>,
    diagnoses: Vec<DiagnosisRecord>,
    case_index: HashMap<String, usize>,
    diagnosis_index: HashMap<String, usize>,
}

impl InMemoryCatalog {
    pub fn new(cases: Vec<CaseRecord>, diagnoses: Vec<DiagnosisRecord>) -> Result<Self> {
        let mut case_index = HashMap::with_capacity(cases.len());
        let mut cases = cases;
        for (idx, case) in cases.iter_mut().enumerate() {
            if case.case_id.trim().is_empty() {
                return Err(EngineError::malformed(format!(
                    "case at position {idx} has an empty case id"
                )));
            }
            if case.diagnosis.trim().is_empty() {
                return Err(EngineError::malformed(format!(
                    "case {} has no diagnosis",
                    case.case_id
                )));
            }
            case.category = normalize_label(&case.category);
            if case_index.insert(case.case_id.clone(), idx).is_some() {
                return Err(EngineError::malformed(format!(
                    "duplicate case id {}",
                    case.case_id
                )));
            }
        }

        let mut diagnoses = diagnoses;
        let mut diagnosis_index = HashMap::with_capacity(diagnoses.len());
        let mut seen = HashSet::new();
        diagnoses.retain(|d| seen.insert(d.name.trim().to_lowercase()));
        for (idx, diagnosis) in diagnoses.iter_mut().enumerate() {
            diagnosis.category = normalize_label(&diagnosis.category);
            diagnosis_index.insert(diagnosis.name.trim().to_lowercase(), idx);
        }

        tracing::debug!(
            cases = cases.len(),
            diagnoses = diagnoses.len(),
            "catalog built"
        );

        Ok(Self {
            cases,
            diagnoses,
            case_index,
            diagnosis_index,
        })
    }

    /// Parses `{"cases": [...], "diagnoses": [...]}`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        Self::new(file.cases, file.diagnoses)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&raw)?;
        tracing::info!(
            path = %path.display(),
            cases = catalog.cases.len(),
            diagnoses = catalog.diagnoses.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn summary(&self) -> CatalogSummary {
        let mut summary = CatalogSummary {
            total_cases: self.cases.len(),
            total_diagnoses: self.diagnoses.len(),
            cases_by_category: HashMap::new(),
            cases_by_age_group: HashMap::new(),
            cases_by_complexity: HashMap::new(),
        };
        for case in &self.cases {
            *summary
                .cases_by_category
                .entry(case.category.clone())
                .or_default() += 1;
            *summary
                .cases_by_age_group
                .entry(case.age_group.as_str().to_string())
                .or_default() += 1;
            *summary
                .cases_by_complexity
                .entry(case.complexity.as_str().to_string())
                .or_default() += 1;
        }
        summary
    }
}

impl CaseProvider for InMemoryCatalog {
    fn cases(&self) -> &[CaseRecord] {
        &self.cases
    }

    fn diagnoses(&self) -> &[DiagnosisRecord] {
        &self.diagnoses
    }

    fn case(&self, case_id: &str) -> Option<&CaseRecord> {
        self.case_index.get(case_id).map(|&idx| &self.cases[idx])
    }

    fn diagnosis(&self, name: &str) -> Option<&DiagnosisRecord> {
        self.diagnosis_index
            .get(&name.trim().to_lowercase())
            .map(|&idx| &self.diagnoses[idx])
    }
}
