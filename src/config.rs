use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{MatchEngineError, Result};
use crate::ranking::ScoringWeights;

pub const ENV_DB_PATH: &str = "PAIRGLIDE_DB_PATH";
pub const ENV_SKILL_WEIGHT: &str = "PAIRGLIDE_SKILL_WEIGHT";
pub const ENV_DISTANCE_WEIGHT: &str = "PAIRGLIDE_DISTANCE_WEIGHT";

fn default_database_path() -> String {
    "pairglide.db".to_string()
}

fn default_event_buffer() -> usize {
    64
}

fn default_message_buffer() -> usize {
    128
}

/// Engine configuration (YAML file, then environment overrides)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// SQLite path for profiles and chat; `:memory:` works for tests
    #[serde(default = "default_database_path")]
    pub database_path: String,

    #[serde(default)]
    pub scoring: ScoringWeights,

    /// Deck events buffered per session before slow listeners lag
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Chat messages buffered per room subscription
    #[serde(default = "default_message_buffer")]
    pub message_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            scoring: ScoringWeights::default(),
            event_buffer: default_event_buffer(),
            message_buffer: default_message_buffer(),
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub async fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_yaml_str(&content)
    }

    /// Override fields from `PAIRGLIDE_*` environment variables
    pub fn apply_env(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(path) = lookup(ENV_DB_PATH) {
            self.database_path = path;
        }
        if let Some(raw) = lookup(ENV_SKILL_WEIGHT) {
            self.scoring.skill_weight = parse_weight(ENV_SKILL_WEIGHT, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DISTANCE_WEIGHT) {
            self.scoring.distance_weight = parse_weight(ENV_DISTANCE_WEIGHT, &raw)?;
        }
        Ok(self)
    }
}

fn parse_weight(key: &str, raw: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .map_err(|_| MatchEngineError::Config(format!("{key} must be an integer, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.database_path, "pairglide.db");
        assert_eq!(config.scoring.skill_weight, -1000);
        assert_eq!(config.scoring.distance_weight, 1);
    }

    #[test]
    fn test_partial_yaml() {
        let config = EngineConfig::from_yaml_str(
            "database_path: ':memory:'\nscoring:\n  distance_weight: 3\n",
        )
        .unwrap();

        assert_eq!(config.database_path, ":memory:");
        assert_eq!(config.scoring.skill_weight, -1000);
        assert_eq!(config.scoring.distance_weight, 3);
        assert_eq!(config.event_buffer, 64);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_DB_PATH, "/tmp/pg.db"),
            (ENV_SKILL_WEIGHT, " -500 "),
        ]
        .into_iter()
        .collect();

        let config = EngineConfig::default()
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.database_path, "/tmp/pg.db");
        assert_eq!(config.scoring.skill_weight, -500);
        assert_eq!(config.scoring.distance_weight, 1);
    }

    #[test]
    fn test_bad_override() {
        let result = EngineConfig::default()
            .apply_overrides(|k| (k == ENV_DISTANCE_WEIGHT).then(|| "far".to_string()));

        assert!(matches!(result, Err(MatchEngineError::Config(_))));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = EngineConfig::from_yaml_file("/definitely/not/here.yaml").await;
        assert!(matches!(result, Err(MatchEngineError::Io(_))));
    }

    #[test]
    fn test_huge_distance_weight_ranks_without_overflow() {
        use crate::core::{Location, Profile};
        use crate::ranking::{CompositeRanker, Ranker};

        let config = EngineConfig::default()
            .apply_overrides(|k| (k == ENV_DISTANCE_WEIGHT).then(|| i64::MAX.to_string()))
            .unwrap();
        assert_eq!(config.scoring.distance_weight, i64::MAX);

        let me = Profile::new("me", ["Go Developer"], Location::new(0.0, 0.5));
        let candidates = vec![
            Profile::new("far", ["Go Developer"], Location::new(0.0, 3.0)),
            Profile::new("near", ["Go Developer"], Location::new(0.0, 1.0)),
        ];
        let ranked = CompositeRanker::new(config.scoring).rank(&me, &candidates).unwrap();

        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|c| c.composite_score > 0));
    }
}
