use serde::{Deserialize, Serialize};

use super::{AgeGroup, CaseRecord, Complexity};

/// Inclusion/exclusion criteria over case metadata. Empty include lists match
/// everything; category and diagnosis comparisons ignore case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseFilter {
    pub categories: Vec<String>,
    pub exclude_categories: Vec<String>,
    pub age_groups: Vec<AgeGroup>,
    pub exclude_age_groups: Vec<AgeGroup>,
    pub complexities: Vec<Complexity>,
    pub exclude_complexities: Vec<Complexity>,
    pub diagnoses: Vec<String>,
    pub exclude_diagnoses: Vec<String>,
    pub case_ids: Vec<String>,
    pub exclude_case_ids: Vec<String>,
}

impl CaseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.extend(categories.into_iter().map(Into::into));
        self
    }

    pub fn excluding_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_categories
            .extend(categories.into_iter().map(Into::into));
        self
    }

    pub fn with_age_groups(mut self, groups: impl IntoIterator<Item = AgeGroup>) -> Self {
        self.age_groups.extend(groups);
        self
    }

    pub fn with_complexities(mut self, levels: impl IntoIterator<Item = Complexity>) -> Self {
        self.complexities.extend(levels);
        self
    }

    pub fn excluding_case_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_case_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, case: &CaseRecord) -> bool {
        included_str(&self.categories, &case.category)
            && !listed_str(&self.exclude_categories, &case.category)
            && included(&self.age_groups, &case.age_group)
            && !self.exclude_age_groups.contains(&case.age_group)
            && included(&self.complexities, &case.complexity)
            && !self.exclude_complexities.contains(&case.complexity)
            && included_str(&self.diagnoses, &case.diagnosis)
            && !listed_str(&self.exclude_diagnoses, &case.diagnosis)
            && (self.case_ids.is_empty() || self.case_ids.iter().any(|id| id == &case.case_id))
            && !self.exclude_case_ids.iter().any(|id| id == &case.case_id)
    }
}

fn included<T: PartialEq>(list: &[T], value: &T) -> bool {
    list.is_empty() || list.contains(value)
}

fn included_str(list: &[String], value: &str) -> bool {
    list.is_empty() || listed_str(list, value)
}

fn listed_str(list: &[String], value: &str) -> bool {
    list.iter().any(|item| item.eq_ignore_ascii_case(value.trim()))
}
