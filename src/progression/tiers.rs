use serde::{Deserialize, Serialize};

use crate::catalog::Complexity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpRange {
    pub min: u64,
    #[serde(default)]
    pub max: Option<u64>,
}

/// Difficulty band gating which case complexities a user is offered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyTier {
    pub name: String,
    pub rank: u8,
    #[serde(default = "first_level")]
    pub min_level: u32,
    #[serde(default)]
    pub xp_range: Option<XpRange>,
    #[serde(default)]
    pub required_achievement: Option<String>,
    #[serde(default)]
    pub complexities: Vec<Complexity>,
    #[serde(default)]
    pub description: String,
}

fn first_level() -> u32 {
    1
}

impl DifficultyTier {
    pub fn is_satisfied<F>(&self, level: u32, has_achievement: F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        level >= self.min_level
            && self
                .required_achievement
                .as_deref()
                .map_or(true, has_achievement)
    }

    pub fn admits(&self, complexity: Complexity) -> bool {
        self.complexities.contains(&complexity)
    }
}

pub fn default_tiers() -> Vec<DifficultyTier> {
    vec![
        DifficultyTier {
            name: "beginner".to_string(),
            rank: 0,
            min_level: 1,
            xp_range: Some(XpRange { min: 0, max: Some(249) }),
            required_achievement: None,
            complexities: vec![Complexity::Basic, Complexity::Unknown],
            description: "Foundational presentations with classic symptoms".to_string(),
        },
        DifficultyTier {
            name: "intermediate".to_string(),
            rank: 1,
            min_level: 3,
            xp_range: Some(XpRange { min: 250, max: Some(1317) }),
            required_achievement: None,
            complexities: vec![Complexity::Intermediate],
            description: "Overlapping symptoms and common comorbidities".to_string(),
        },
        DifficultyTier {
            name: "advanced".to_string(),
            rank: 2,
            min_level: 6,
            xp_range: Some(XpRange { min: 1318, max: Some(4923) }),
            required_achievement: None,
            complexities: vec![Complexity::Advanced],
            description: "Atypical presentations requiring differential reasoning".to_string(),
        },
        DifficultyTier {
            name: "expert".to_string(),
            rank: 3,
            min_level: 9,
            xp_range: Some(XpRange { min: 4924, max: None }),
            required_achievement: Some("perfectionist".to_string()),
            complexities: vec![Complexity::Expert],
            description: "Rare conditions and subtle diagnostic distinctions".to_string(),
        },
    ]
}
