//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables. Nested
//! settings use `__` as separator, e.g. `ENGINE__CONNECTOR_SEND_TIMEOUT_MS`.

use parlance_engine::EngineConfig;
use serde::Deserialize;

/// Server configuration composed from library configs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Conversation engine settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Web connector settings.
    #[serde(default)]
    pub web: WebConnectorConfig,
}

/// Settings of the JSON over HTTP connector.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebConnectorConfig {
    /// Route receiving user events.
    #[serde(default = "default_web_path")]
    pub path: String,

    #[serde(default = "default_web_connector_id")]
    pub connector_id: String,

    #[serde(default = "default_application_id")]
    pub application_id: String,

    /// Id of the bot answering on this connector.
    #[serde(default = "default_bot_id")]
    pub bot_id: String,

    /// How long a request waits for the bot's last answer, in milliseconds.
    /// Whatever arrived by then is returned.
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_web_path() -> String {
    "/io/web".to_string()
}

fn default_web_connector_id() -> String {
    "web".to_string()
}

fn default_application_id() -> String {
    "sample".to_string()
}

fn default_bot_id() -> String {
    "parlance".to_string()
}

fn default_response_timeout_ms() -> u64 {
    10_000
}

impl Default for WebConnectorConfig {
    fn default() -> Self {
        Self {
            path: default_web_path(),
            connector_id: default_web_connector_id(),
            application_id: default_application_id(),
            bot_id: default_bot_id(),
            response_timeout_ms: default_response_timeout_ms(),
        }
    }
}

impl WebConnectorConfig {
    /// Returns the response budget as a duration.
    #[must_use]
    pub fn response_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.response_timeout_ms)
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed into its setting.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn web_config_has_correct_defaults() {
        let config = WebConnectorConfig::default();
        assert_eq!(config.path, "/io/web");
        assert_eq!(config.connector_id, "web");
        assert_eq!(config.response_timeout_ms, 10_000);
    }

    #[test]
    fn nested_settings_override_defaults() {
        let config: ServerConfig = config::Config::builder()
            .set_override("listen_addr", "0.0.0.0:8080")
            .and_then(|builder| builder.set_override("engine.connector_send_timeout_ms", 2000))
            .and_then(|builder| builder.set_override("web.bot_id", "concierge"))
            .expect("overrides")
            .build()
            .expect("build")
            .try_deserialize()
            .expect("deserialize");

        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.engine.connector_send_timeout_ms, 2000);
        assert_eq!(config.engine.error_label, "technical_error");
        assert_eq!(config.web.bot_id, "concierge");
        assert_eq!(config.web.path, "/io/web");
    }
}
