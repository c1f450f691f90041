use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Result;
use crate::logging::{self, LogGuard, LogSettings};
use crate::progression::ProgressionRules;
use crate::scoring::ScoringConfig;
use crate::selector::SelectorConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub logging: LogSettings,
    pub scoring: ScoringConfig,
    pub selector: SelectorConfig,
    /// JSON tiers and achievements; built-in defaults when unset.
    pub rules_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            logging: LogSettings::default(),
            scoring: ScoringConfig::default(),
            selector: SelectorConfig::default(),
            rules_path: None,
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
}

fn env_fraction(key: &str) -> Option<f64> {
    env_parse::<f64>(key).filter(|v| v.is_finite() && (0.0..=1.0).contains(v))
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let scoring = ScoringConfig {
            similarity_threshold: env_fraction("DXQ_SIMILARITY_THRESHOLD")
                .unwrap_or(defaults.scoring.similarity_threshold),
            category_bonus: env_fraction("DXQ_CATEGORY_BONUS")
                .unwrap_or(defaults.scoring.category_bonus),
            age_group_bonus: env_fraction("DXQ_AGE_GROUP_BONUS")
                .unwrap_or(defaults.scoring.age_group_bonus),
            complexity_bonus: env_fraction("DXQ_COMPLEXITY_BONUS")
                .unwrap_or(defaults.scoring.complexity_bonus),
            ..defaults.scoring
        };

        let selector = SelectorConfig {
            option_count: env_parse::<usize>("DXQ_OPTION_COUNT")
                .filter(|n| *n >= 1)
                .unwrap_or(defaults.selector.option_count),
            weakness_level: env_parse::<u8>("DXQ_WEAKNESS_LEVEL")
                .unwrap_or(defaults.selector.weakness_level),
            mastery_level: env_parse::<u8>("DXQ_MASTERY_LEVEL")
                .unwrap_or(defaults.selector.mastery_level),
        };

        let rules_path = std::env::var("DXQ_RULES_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Self {
            logging: LogSettings::from_env(),
            scoring,
            selector,
            rules_path,
        }
    }

    /// Installs the global subscriber described by `self.logging`. Keep the
    /// guard alive for as long as file output should keep flushing.
    pub fn init_logging(&self) -> Result<LogGuard> {
        logging::init(&self.logging)
    }

    pub fn load_rules(&self) -> Result<ProgressionRules> {
        match &self.rules_path {
            Some(path) => ProgressionRules::load(path),
            None => Ok(ProgressionRules::default()),
        }
    }
}
