//! Timeline configuration

use crate::core::time::Tick;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse timeline config: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Timeline configuration
///
/// Every field has a default, so `{}` is a valid configuration.
///
/// # Example
/// ```
/// use timeline_core::TimelineConfig;
///
/// let config = TimelineConfig::from_json(r#"{ "start_tick": 100 }"#).unwrap();
/// assert_eq!(config.start_tick, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Tick the timeline starts at; the first advance moves to `start_tick + 1`
    pub start_tick: Tick,
}

impl TimelineConfig {
    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self { start_tick: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = TimelineConfig::from_json("{}").unwrap();
        assert_eq!(config, TimelineConfig::default());
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let err = TimelineConfig::from_json(r#"{ "start_tick": "soon" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(err.to_string().starts_with("Failed to parse timeline config"));
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = TimelineConfig { start_tick: -10 };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(TimelineConfig::from_json(&json).unwrap(), config);
    }
}
