use std::collections::BTreeMap;
use std::fmt;

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::sampling;
use crate::catalog::CaseRecord;

/// How sub-cases of a multi-case question relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationMode {
    /// All from one category.
    Similar,
    /// Each from a different category.
    Contrasting,
    /// Presented in ascending complexity.
    Progression,
}

impl CombinationMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            CombinationMode::Similar => "similar",
            CombinationMode::Contrasting => "contrasting",
            CombinationMode::Progression => "progression",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "similar" => Some(Self::Similar),
            "contrasting" => Some(Self::Contrasting),
            "progression" => Some(Self::Progression),
            _ => None,
        }
    }
}

impl fmt::Display for CombinationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn by_category<'a>(pool: &[&'a CaseRecord]) -> BTreeMap<String, Vec<&'a CaseRecord>> {
    let mut groups: BTreeMap<String, Vec<&'a CaseRecord>> = BTreeMap::new();
    for case in pool {
        groups
            .entry(case.category.to_lowercase())
            .or_default()
            .push(case);
    }
    groups
}

/// Picks one group of `size` cases from `pool` and removes them. `None` when
/// the pool cannot satisfy the mode.
pub fn pick_group<'a, R: Rng>(
    pool: &mut Vec<&'a CaseRecord>,
    mode: CombinationMode,
    size: usize,
    weighted: bool,
    rng: &mut R,
) -> Option<Vec<&'a CaseRecord>> {
    if size == 0 || pool.len() < size {
        return None;
    }

    let group = match mode {
        CombinationMode::Similar => {
            let eligible: Vec<Vec<&'a CaseRecord>> = by_category(pool)
                .into_values()
                .filter(|cases| cases.len() >= size)
                .collect();
            let chosen = eligible.choose(rng)?.clone();
            sampling::sample(chosen, size, weighted, rng)
        }
        CombinationMode::Contrasting => {
            let mut groups: Vec<Vec<&'a CaseRecord>> = by_category(pool).into_values().collect();
            if groups.len() < size {
                return None;
            }
            groups.shuffle(rng);
            groups
                .into_iter()
                .take(size)
                .filter_map(|cases| sampling::sample(cases, 1, weighted, rng).pop())
                .collect()
        }
        CombinationMode::Progression => {
            let mut picked = sampling::sample(pool.clone(), size, weighted, rng);
            picked.sort_by_key(|c| c.complexity.rank());
            picked
        }
    };

    if group.len() < size {
        return None;
    }
    pool.retain(|c| !group.iter().any(|g| g.case_id == c.case_id));
    Some(group)
}
