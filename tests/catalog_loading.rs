//! File-backed catalog and rules loading.

mod common;

use std::io::Write;

use dxquiz_engine::{
    AdaptiveSelector, CaseProvider, EngineConfig, InMemoryCatalog, ProgressionRules,
    ProgressionTracker, QuizConfig,
};
use std::sync::Arc;
use tempfile::{tempdir, NamedTempFile};

fn write_catalog() -> NamedTempFile {
    let body = serde_json::json!({
        "cases": common::cases(),
        "diagnoses": common::diagnoses(),
    });
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{body}").unwrap();
    file
}

#[test]
fn test_catalog_file_matches_in_memory_fixture() {
    let file = write_catalog();
    let loaded = InMemoryCatalog::load(file.path()).unwrap();
    let fixture = common::catalog();

    assert_eq!(loaded.cases(), fixture.cases());
    assert_eq!(loaded.diagnoses().len(), fixture.diagnoses().len());
    assert_eq!(loaded.summary().total_cases, 16);
    assert!(loaded.case("dep-004").unwrap().specifiers.len() == 1);
}

#[test]
fn test_snake_case_catalog_fields_accepted() {
    let raw = r#"{
        "cases": [
            {"case_id": "x1", "category": "Sleep-Wake Disorders", "age_group": "elderly",
             "complexity": "moderate", "prevalence_weight": 2.0, "diagnosis": "Insomnia Disorder"}
        ],
        "diagnoses": [{"name": "Insomnia Disorder", "category": "Sleep-Wake Disorders"}]
    }"#;
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, raw).unwrap();

    let catalog = InMemoryCatalog::load(&path).unwrap();
    let case = catalog.case("x1").unwrap();
    assert_eq!(case.age_group.as_str(), "older_adult");
    assert_eq!(case.complexity.as_str(), "intermediate");
    assert_eq!(case.prevalence_weight, 2.0);
}

#[test]
fn test_malformed_catalog_reports_serialization_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{\"cases\": [").unwrap();
    let err = InMemoryCatalog::load(file.path()).unwrap_err();
    assert_eq!(err.code(), "SERIALIZATION");
}

#[test]
fn test_duplicate_case_ids_rejected() {
    let mut cases = common::cases();
    cases.push(cases[0].clone());
    let err = InMemoryCatalog::new(cases, common::diagnoses()).unwrap_err();
    assert_eq!(err.code(), "MALFORMED_INPUT");
}

#[test]
fn test_custom_rules_gate_selection() {
    let rules_json = r#"{
        "tiers": [
            {"name": "open", "rank": 0, "complexities": ["basic", "intermediate", "advanced", "expert", "unknown"]}
        ],
        "achievements": []
    }"#;
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{rules_json}").unwrap();

    let config = EngineConfig {
        rules_path: Some(file.path().to_path_buf()),
        ..EngineConfig::default()
    };
    let rules: Arc<ProgressionRules> = Arc::new(config.load_rules().unwrap());
    let tracker = ProgressionTracker::with_rules("u-open", "Open", rules);

    let quiz = AdaptiveSelector::new(config.selector.clone())
        .build_quiz(&common::catalog(), Some(&tracker), &QuizConfig::new(16).with_seed(7))
        .unwrap();
    assert_eq!(quiz.pool_size, 16);
    assert_eq!(quiz.len(), 16);
}
