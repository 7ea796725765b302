//! Demonstration scenarios
//!
//! A scenario lists the printing subscribers to register, the events to
//! queue, and when each subscriber is dropped. Scenarios are loaded from
//! JSON:
//!
//! ```json
//! {
//!   "steps": 10,
//!   "config": { "start_tick": 0 },
//!   "subscribers": [ { "name": "foo", "kind": 1 } ],
//!   "events": [ { "tick": 1, "kind": 1, "text": "test" } ],
//!   "unsubscribe": [ { "subscriber": "foo", "at_tick": 5 } ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use timeline_core::{Tick, TimelineConfig};

/// Errors raised while loading or running a scenario
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate subscriber name: {0}")]
    DuplicateSubscriber(String),

    #[error("Unsubscribe refers to unknown subscriber: {0}")]
    UnknownSubscriber(String),
}

/// Subscriber that prints events of a single kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriberSpec {
    pub name: String,
    pub kind: u32,
}

/// Event queued before the first step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSpec {
    pub tick: Tick,
    pub kind: u32,
    pub text: String,
}

/// Drop a subscriber's token once the timeline reaches `at_tick`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsubscribeSpec {
    pub subscriber: String,
    pub at_tick: Tick,
}

/// Complete scenario description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Number of advances to run
    #[serde(default = "default_steps")]
    pub steps: u32,

    #[serde(default)]
    pub config: TimelineConfig,

    pub subscribers: Vec<SubscriberSpec>,

    #[serde(default)]
    pub events: Vec<EventSpec>,

    #[serde(default)]
    pub unsubscribe: Vec<UnsubscribeSpec>,
}

fn default_steps() -> u32 {
    10
}

impl Scenario {
    /// The built-in foo/bar demonstration
    pub fn reference() -> Self {
        let event = |tick, kind, text: &str| EventSpec {
            tick,
            kind,
            text: text.to_string(),
        };

        Self {
            steps: 10,
            config: TimelineConfig::default(),
            subscribers: vec![
                SubscriberSpec {
                    name: "foo".to_string(),
                    kind: 1,
                },
                SubscriberSpec {
                    name: "bar".to_string(),
                    kind: 2,
                },
            ],
            events: vec![
                event(1, 1, "test"),
                event(3, 1, "skip 2"),
                event(4, 1, "two events"),
                event(4, 1, "at the same time"),
                event(8, 2, "this is a different type"),
                event(9, 1, "we won't see this one"),
                event(9, 2, "we will see this one"),
            ],
            unsubscribe: vec![UnsubscribeSpec {
                subscriber: "foo".to_string(),
                at_tick: 5,
            }],
        }
    }

    /// Parse and validate a scenario from JSON
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Read, parse and validate a scenario file
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check that subscriber names are unique and unsubscribes refer to
    /// known subscribers
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let mut names = HashSet::new();
        for subscriber in &self.subscribers {
            if !names.insert(subscriber.name.as_str()) {
                return Err(ScenarioError::DuplicateSubscriber(
                    subscriber.name.clone(),
                ));
            }
        }

        for unsubscribe in &self.unsubscribe {
            if !names.contains(unsubscribe.subscriber.as_str()) {
                return Err(ScenarioError::UnknownSubscriber(
                    unsubscribe.subscriber.clone(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_scenario_is_valid() {
        assert!(Scenario::reference().validate().is_ok());
    }

    #[test]
    fn test_from_json_applies_defaults() {
        let scenario = Scenario::from_json(
            r#"{
                "subscribers": [ { "name": "only", "kind": 3 } ],
                "events": [ { "tick": 2, "kind": 3, "text": "hi" } ]
            }"#,
        )
        .unwrap();

        assert_eq!(scenario.steps, 10);
        assert_eq!(scenario.config.start_tick, 0);
        assert!(scenario.unsubscribe.is_empty());
        assert_eq!(scenario.events[0].text, "hi");
    }

    #[test]
    fn test_duplicate_subscriber_rejected() {
        let err = Scenario::from_json(
            r#"{ "subscribers": [ { "name": "a", "kind": 1 }, { "name": "a", "kind": 2 } ] }"#,
        )
        .unwrap_err();

        assert!(matches!(err, ScenarioError::DuplicateSubscriber(name) if name == "a"));
    }

    #[test]
    fn test_unknown_unsubscribe_rejected() {
        let err = Scenario::from_json(
            r#"{
                "subscribers": [ { "name": "a", "kind": 1 } ],
                "unsubscribe": [ { "subscriber": "b", "at_tick": 1 } ]
            }"#,
        )
        .unwrap_err();

        assert!(matches!(err, ScenarioError::UnknownSubscriber(name) if name == "b"));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = Scenario::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ScenarioError::Parse(_)));
    }

    #[test]
    fn test_bundled_scenario_parses() {
        let scenario = Scenario::from_json(include_str!("../scenarios/staggered.json")).unwrap();

        assert_eq!(scenario.steps, 6);
        assert_eq!(scenario.subscribers.len(), 2);
        assert_eq!(scenario.events.len(), 5);
        assert_eq!(scenario.unsubscribe[0].at_tick, 3);
    }

    #[test]
    fn test_missing_file_reported() {
        let err = Scenario::load(Path::new("/nonexistent/scenario.json")).unwrap_err();
        assert!(matches!(err, ScenarioError::Io(_)));
    }
}
