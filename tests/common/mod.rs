//! Shared fixtures for integration tests.

#![allow(dead_code)]

use dxquiz_engine::{AgeGroup, CaseRecord, Complexity, DiagnosisRecord, InMemoryCatalog, Specifier};

pub const DEPRESSIVE: &str = "Depressive Disorders";
pub const ANXIETY: &str = "Anxiety Disorders";
pub const PSYCHOTIC: &str = "Schizophrenia Spectrum and Other Psychotic Disorders";
pub const TRAUMA: &str = "Trauma and Stressor Related Disorders";

pub fn case(
    id: &str,
    category: &str,
    complexity: Complexity,
    age_group: AgeGroup,
    diagnosis: &str,
) -> CaseRecord {
    CaseRecord {
        case_id: id.to_string(),
        category: category.to_string(),
        age_group,
        complexity,
        prevalence_weight: 1.0,
        diagnosis: diagnosis.to_string(),
        specifiers: Vec::new(),
        keywords: Vec::new(),
        narrative: None,
    }
}

pub fn diagnosis(name: &str, category: &str, keywords: &[&str]) -> DiagnosisRecord {
    DiagnosisRecord {
        name: name.to_string(),
        category: category.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        age_groups: Vec::new(),
        typical_complexity: None,
        prevalence_rate: 0.0,
    }
}

pub fn diagnoses() -> Vec<DiagnosisRecord> {
    vec![
        diagnosis("Major Depressive Disorder", DEPRESSIVE, &["low mood", "anhedonia", "insomnia"]),
        diagnosis("Persistent Depressive Disorder", DEPRESSIVE, &["low mood", "chronic"]),
        diagnosis("Premenstrual Dysphoric Disorder", DEPRESSIVE, &["irritability", "cyclical"]),
        diagnosis("Generalized Anxiety Disorder", ANXIETY, &["worry", "insomnia", "tension"]),
        diagnosis("Panic Disorder", ANXIETY, &["palpitations", "fear"]),
        diagnosis("Social Anxiety Disorder", ANXIETY, &["fear", "scrutiny"]),
        diagnosis("Specific Phobia", ANXIETY, &["fear", "avoidance"]),
        diagnosis("Schizophrenia", PSYCHOTIC, &["hallucinations", "delusions"]),
        diagnosis("Brief Psychotic Disorder", PSYCHOTIC, &["delusions", "sudden"]),
        diagnosis("Schizoaffective Disorder", PSYCHOTIC, &["hallucinations", "low mood"]),
        diagnosis("Posttraumatic Stress Disorder", TRAUMA, &["flashbacks", "insomnia", "avoidance"]),
        diagnosis("Adjustment Disorder", TRAUMA, &["stressor", "low mood"]),
    ]
}

pub fn cases() -> Vec<CaseRecord> {
    use AgeGroup::*;
    use Complexity::*;

    let mut cases = vec![
        case("dep-001", DEPRESSIVE, Basic, Adult, "Major Depressive Disorder"),
        case("dep-002", DEPRESSIVE, Basic, OlderAdult, "Persistent Depressive Disorder"),
        case("dep-003", DEPRESSIVE, Basic, Adult, "Premenstrual Dysphoric Disorder"),
        case("dep-004", DEPRESSIVE, Intermediate, Adolescent, "Major Depressive Disorder"),
        case("dep-005", DEPRESSIVE, Advanced, Adult, "Persistent Depressive Disorder"),
        case("anx-001", ANXIETY, Basic, Adult, "Generalized Anxiety Disorder"),
        case("anx-002", ANXIETY, Basic, Adult, "Panic Disorder"),
        case("anx-003", ANXIETY, Basic, Child, "Specific Phobia"),
        case("anx-004", ANXIETY, Intermediate, Adolescent, "Social Anxiety Disorder"),
        case("anx-005", ANXIETY, Expert, Adult, "Panic Disorder"),
        case("psy-001", PSYCHOTIC, Basic, Adult, "Schizophrenia"),
        case("psy-002", PSYCHOTIC, Basic, Adult, "Brief Psychotic Disorder"),
        case("psy-003", PSYCHOTIC, Advanced, Adult, "Schizoaffective Disorder"),
        case("tra-001", TRAUMA, Basic, Adult, "Posttraumatic Stress Disorder"),
        case("tra-002", TRAUMA, Basic, Adolescent, "Adjustment Disorder"),
        case("tra-003", TRAUMA, Intermediate, Adult, "Posttraumatic Stress Disorder"),
    ];

    if let Some(dep) = cases.iter_mut().find(|c| c.case_id == "dep-004") {
        dep.specifiers = vec![Specifier {
            phrase: "with anxious distress".to_string(),
            weight: 1.0,
        }];
        dep.keywords = vec!["anhedonia".to_string(), "worry".to_string()];
    }
    cases
}

pub fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(cases(), diagnoses()).expect("fixture catalog is valid")
}

pub fn basic_case_count() -> usize {
    cases()
        .iter()
        .filter(|c| c.complexity == Complexity::Basic)
        .count()
}
