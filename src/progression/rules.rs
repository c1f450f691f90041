use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::achievements::{default_achievements, AchievementDefinition};
use super::tiers::{default_tiers, DifficultyTier};
use crate::error::{EngineError, Result};

/// Static tier and achievement configuration shared by every tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionRules {
    #[serde(default = "default_tiers")]
    pub tiers: Vec<DifficultyTier>,
    #[serde(default = "default_achievements")]
    pub achievements: Vec<AchievementDefinition>,
}

impl Default for ProgressionRules {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
            achievements: default_achievements(),
        }
    }
}

impl ProgressionRules {
    pub fn new(tiers: Vec<DifficultyTier>, achievements: Vec<AchievementDefinition>) -> Result<Self> {
        let mut rules = Self { tiers, achievements };
        rules.validate()?;
        Ok(rules)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let mut rules: Self = serde_json::from_str(raw)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let rules = Self::from_json(&raw)?;
        tracing::info!(
            path = %path.display(),
            tiers = rules.tiers.len(),
            achievements = rules.achievements.len(),
            "progression rules loaded"
        );
        Ok(rules)
    }

    /// Sorts tiers by rank and rejects empty or ambiguous configurations.
    fn validate(&mut self) -> Result<()> {
        if self.tiers.is_empty() {
            return Err(EngineError::malformed("at least one difficulty tier is required"));
        }
        self.tiers.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.name.cmp(&b.name)));

        let mut names = HashSet::new();
        for tier in &self.tiers {
            if !names.insert(tier.name.as_str()) {
                return Err(EngineError::malformed(format!(
                    "duplicate tier name {}",
                    tier.name
                )));
            }
        }

        let mut ids = HashSet::new();
        for achievement in &self.achievements {
            if !ids.insert(achievement.id.as_str()) {
                return Err(EngineError::malformed(format!(
                    "duplicate achievement id {}",
                    achievement.id
                )));
            }
        }

        for tier in &self.tiers {
            if let Some(required) = tier.required_achievement.as_deref() {
                if !ids.contains(required) {
                    tracing::warn!(
                        tier = %tier.name,
                        achievement = %required,
                        "tier requires an undefined achievement and can never unlock"
                    );
                }
            }
        }
        Ok(())
    }

    /// Lowest-ranked tier; always unlocked.
    pub fn lowest_tier(&self) -> &DifficultyTier {
        &self.tiers[0]
    }

    pub fn tier(&self, name: &str) -> Option<&DifficultyTier> {
        self.tiers.iter().find(|t| t.name == name)
    }

    pub fn achievement(&self, id: &str) -> Option<&AchievementDefinition> {
        self.achievements.iter().find(|a| a.id == id)
    }
}
