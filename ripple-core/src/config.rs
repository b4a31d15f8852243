//! Renderer configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::render::LedgerPolicy;

/// Settings for a [`Renderer`](crate::render::Renderer).
///
/// ```rust
/// use ripple_core::config::RenderConfig;
/// use ripple_core::render::LedgerPolicy;
///
/// let config = RenderConfig::from_json(
///     r#"{"ledger": {"policy": "bounded", "capacity": 256}}"#,
/// )?;
/// assert_eq!(config.event_prefix, "on");
/// assert_eq!(config.ledger, LedgerPolicy::Bounded { capacity: 256 });
/// # Ok::<(), ripple_core::error::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Marker stripped from listener prop keys to get the event type.
    pub event_prefix: String,
    /// Growth policy of the listener ledger.
    pub ledger: LedgerPolicy,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            event_prefix: default_event_prefix(),
            ledger: LedgerPolicy::Unbounded,
        }
    }
}

fn default_event_prefix() -> String {
    "on".to_string()
}

impl RenderConfig {
    /// Parse and validate a config from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that the type system does not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_prefix.is_empty() {
            return Err(ConfigError::EmptyEventPrefix);
        }
        if let LedgerPolicy::Bounded { capacity: 0 } = self.ledger {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }

    pub fn with_ledger(mut self, ledger: LedgerPolicy) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn with_event_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.event_prefix = prefix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config = RenderConfig::from_json("{}").unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "event_prefix": "@",
            "ledger": {"policy": "bounded", "capacity": 4}
        }"#;

        let config = RenderConfig::from_json(json).unwrap();
        assert_eq!(config.event_prefix, "@");
        assert_eq!(config.ledger, LedgerPolicy::Bounded { capacity: 4 });
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            RenderConfig::from_json(r#"{"event_prefix": ""}"#),
            Err(ConfigError::EmptyEventPrefix)
        ));
        assert!(matches!(
            RenderConfig::from_json(r#"{"ledger": {"policy": "bounded", "capacity": 0}}"#),
            Err(ConfigError::ZeroCapacity)
        ));
        assert!(matches!(
            RenderConfig::from_json(r#"{"unknown": 1}"#),
            Err(ConfigError::Parse(_))
        ));
    }
}
