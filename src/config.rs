//! Engine configuration

use crate::error::InsightError;
use serde::{Deserialize, Serialize};

/// Default sampling interval of the periodic engagement tick (one second)
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Default visible fraction for a block to count as observed
pub const DEFAULT_OBSERVATION_THRESHOLD: f64 = 0.5;

/// How dwell counters advance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DwellSampling {
    /// One increment each time a block crosses the observation threshold
    #[default]
    OnCrossing,
    /// One increment per tick for every block above the observation threshold
    PerTick,
}

/// Tunables for tracking and insight generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Visible fraction at which a block is observed for dwell purposes
    pub observation_threshold: f64,
    /// Visible fraction at which a block fades in; zero means any intersection
    pub reveal_threshold: f64,
    /// Periodic refresh interval
    pub tick_interval_ms: u64,
    pub dwell_sampling: DwellSampling,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            observation_threshold: DEFAULT_OBSERVATION_THRESHOLD,
            reveal_threshold: 0.0,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            dwell_sampling: DwellSampling::default(),
        }
    }
}

impl InsightConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), InsightError> {
        if !(0.0..=1.0).contains(&self.observation_threshold) {
            return Err(InsightError::ConfigError(format!(
                "observation_threshold must be within [0, 1], got {}",
                self.observation_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.reveal_threshold) {
            return Err(InsightError::ConfigError(format!(
                "reveal_threshold must be within [0, 1], got {}",
                self.reveal_threshold
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(InsightError::ConfigError(
                "tick_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Load and validate configuration from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, InsightError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InsightConfig::default();
        assert_eq!(config.observation_threshold, 0.5);
        assert_eq!(config.reveal_threshold, 0.0);
        assert_eq!(config.tick_interval_ms, 1000);
        assert_eq!(config.dwell_sampling, DwellSampling::OnCrossing);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = InsightConfig::from_json(r#"{ "dwell_sampling": "per_tick" }"#).unwrap();
        assert_eq!(config.dwell_sampling, DwellSampling::PerTick);
        assert_eq!(config.observation_threshold, 0.5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(InsightConfig::from_json(r#"{ "observation_threshold": 1.5 }"#).is_err());
        assert!(InsightConfig::from_json(r#"{ "reveal_threshold": -0.1 }"#).is_err());
        assert!(InsightConfig::from_json(r#"{ "tick_interval_ms": 0 }"#).is_err());
        assert!(InsightConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_json_roundtrip_keeps_sampling_name() {
        let json = InsightConfig::default().to_json().unwrap();
        assert!(json.contains("\"on_crossing\""));
    }
}
