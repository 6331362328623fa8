//! Engine configuration.
//!
//! Loaded by the host process and threaded through constructors; the
//! engine reads no environment of its own.

use parlance_core::Locale;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime settings of the conversation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Locale used for users without saved preferences.
    #[serde(default = "default_locale")]
    pub default_locale: Locale,

    /// Budget for one connector `send` call, in milliseconds.
    /// A slower transport is reported and skipped.
    #[serde(default = "default_connector_send_timeout_ms")]
    pub connector_send_timeout_ms: u64,

    /// Label id of the technical error answer.
    #[serde(default = "default_error_label")]
    pub error_label: String,

    /// Text of the technical error answer when the label has none.
    #[serde(default = "default_error_default_text")]
    pub error_default_text: String,

    /// Upper bound of the accumulated delay within one turn, in
    /// milliseconds.
    #[serde(default = "default_max_turn_delay_ms")]
    pub max_turn_delay_ms: u64,
}

fn default_locale() -> Locale {
    Locale::new("en")
}

fn default_connector_send_timeout_ms() -> u64 {
    5000
}

fn default_error_label() -> String {
    "technical_error".to_string()
}

fn default_error_default_text() -> String {
    "Sorry, something went wrong. Please try again.".to_string()
}

fn default_max_turn_delay_ms() -> u64 {
    60_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            connector_send_timeout_ms: default_connector_send_timeout_ms(),
            error_label: default_error_label(),
            error_default_text: default_error_default_text(),
            max_turn_delay_ms: default_max_turn_delay_ms(),
        }
    }
}

impl EngineConfig {
    /// Returns the connector send budget.
    #[must_use]
    pub fn connector_send_timeout(&self) -> Duration {
        Duration::from_millis(self.connector_send_timeout_ms)
    }

    /// Returns the turn delay clamp.
    #[must_use]
    pub fn max_turn_delay(&self) -> Duration {
        Duration::from_millis(self.max_turn_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_config_has_correct_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_locale, Locale::new("en"));
        assert_eq!(config.connector_send_timeout(), Duration::from_secs(5));
        assert_eq!(config.error_label, "technical_error");
        assert_eq!(config.max_turn_delay(), Duration::from_secs(60));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"connector_send_timeout_ms": 250}"#).expect("deserialize");
        assert_eq!(config.connector_send_timeout_ms, 250);
        assert_eq!(config.max_turn_delay_ms, 60_000);
    }
}
