//! The explicit connector registry.
//!
//! Connectors are registered at startup by whoever owns the process and
//! handed around by reference. Nothing here is global; `clear` is the
//! teardown.

use crate::connector::{Connector, ConnectorHealth};
use crate::error::ConnectorError;
use futures::future::join_all;
use parlance_core::{ApplicationId, ConnectorType, PlayerId};
use rootcause::Report;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Where a connector is mounted and which bot it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorConfiguration {
    /// Unique id of this registration.
    pub connector_id: String,
    /// Route the transport receives events on.
    pub path: String,
    pub connector_type: ConnectorType,
    pub application_id: ApplicationId,
    /// The bot answering through this connector.
    pub bot_id: PlayerId,
}

/// A connector with its configuration.
#[derive(Clone)]
pub struct RegisteredConnector {
    pub configuration: ConnectorConfiguration,
    pub connector: Arc<dyn Connector>,
}

impl std::fmt::Debug for RegisteredConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredConnector")
            .field("configuration", &self.configuration)
            .finish_non_exhaustive()
    }
}

/// Table of running connectors keyed by connector id.
#[derive(Debug, Default)]
pub struct ConnectorRegistry {
    connectors: RwLock<HashMap<String, RegisteredConnector>>,
}

impl ConnectorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connector.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::AlreadyRegistered`] if the id is taken.
    pub async fn register(
        &self,
        configuration: ConnectorConfiguration,
        connector: Arc<dyn Connector>,
    ) -> Result<(), Report<ConnectorError>> {
        let mut connectors = self.connectors.write().await;
        let connector_id = configuration.connector_id.clone();

        if connectors.contains_key(&connector_id) {
            return Err(ConnectorError::AlreadyRegistered { connector_id }.into());
        }

        info!(
            connector_id = %connector_id,
            connector_type = %configuration.connector_type,
            path = %configuration.path,
            "connector registered"
        );
        connectors.insert(
            connector_id,
            RegisteredConnector {
                configuration,
                connector,
            },
        );
        Ok(())
    }

    /// Returns a registered connector.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::UnknownConnector`] if nothing is
    /// registered under `connector_id`.
    pub async fn get(&self, connector_id: &str) -> Result<RegisteredConnector, Report<ConnectorError>> {
        self.connectors
            .read()
            .await
            .get(connector_id)
            .cloned()
            .ok_or_else(|| {
                ConnectorError::UnknownConnector {
                    connector_id: connector_id.to_string(),
                }
                .into()
            })
    }

    /// Removes a connector, returning it if it was registered.
    pub async fn unregister(&self, connector_id: &str) -> Option<RegisteredConnector> {
        let removed = self.connectors.write().await.remove(connector_id);
        if removed.is_some() {
            info!(connector_id = %connector_id, "connector unregistered");
        }
        removed
    }

    /// Removes every connector.
    pub async fn clear(&self) {
        self.connectors.write().await.clear();
    }

    /// Returns every registered configuration, ordered by connector id.
    pub async fn configurations(&self) -> Vec<ConnectorConfiguration> {
        let mut configurations: Vec<_> = self
            .connectors
            .read()
            .await
            .values()
            .map(|registered| registered.configuration.clone())
            .collect();
        configurations.sort_by(|a, b| a.connector_id.cmp(&b.connector_id));
        configurations
    }

    /// Checks every connector, ordered by connector id.
    ///
    /// A failing check is reported as unhealthy.
    pub async fn health(&self) -> Vec<(String, ConnectorHealth)> {
        let registered: Vec<RegisteredConnector> =
            self.connectors.read().await.values().cloned().collect();

        let checks = registered.into_iter().map(|registered| async move {
            let connector_id = registered.configuration.connector_id;
            let health = match registered.connector.health_check().await {
                Ok(health) => health,
                Err(report) => {
                    warn!(connector_id = %connector_id, error = %report, "health check failed");
                    ConnectorHealth::Unhealthy {
                        reason: report.to_string(),
                    }
                }
            };
            (connector_id, health)
        });

        let mut results = join_all(checks).await;
        results.sort_by(|a, b| a.0.cmp(&b.0));
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::ConnectorCallback;
    use async_trait::async_trait;
    use parlance_core::UserInterfaceType;
    use parlance_dialog::Action;
    use std::time::Duration;

    struct StubConnector {
        reachable: bool,
    }

    #[async_trait]
    impl Connector for StubConnector {
        fn connector_type(&self) -> ConnectorType {
            ConnectorType::new("web", UserInterfaceType::TextChat)
        }

        async fn send(
            &self,
            _action: Action,
            _callback: &ConnectorCallback,
            _delay: Duration,
        ) -> Result<(), Report<ConnectorError>> {
            Ok(())
        }

        async fn health_check(&self) -> Result<ConnectorHealth, Report<ConnectorError>> {
            if self.reachable {
                Ok(ConnectorHealth::Healthy)
            } else {
                Err(ConnectorError::Unavailable {
                    connector_id: "down".to_string(),
                    reason: "connection refused".to_string(),
                }
                .into())
            }
        }
    }

    fn configuration(connector_id: &str) -> ConnectorConfiguration {
        ConnectorConfiguration {
            connector_id: connector_id.to_string(),
            path: format!("/io/{connector_id}"),
            connector_type: ConnectorType::new("web", UserInterfaceType::TextChat),
            application_id: ApplicationId::new("travel"),
            bot_id: PlayerId::bot("helper"),
        }
    }

    #[tokio::test]
    async fn register_then_get() {
        let registry = ConnectorRegistry::new();
        registry
            .register(configuration("web"), Arc::new(StubConnector { reachable: true }))
            .await
            .expect("register");

        let registered = registry.get("web").await.expect("registered");
        assert_eq!(registered.configuration.path, "/io/web");
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let registry = ConnectorRegistry::new();
        registry
            .register(configuration("web"), Arc::new(StubConnector { reachable: true }))
            .await
            .expect("register");

        let result = registry
            .register(configuration("web"), Arc::new(StubConnector { reachable: true }))
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn unregister_and_clear() {
        let registry = ConnectorRegistry::new();
        for id in ["a", "b", "c"] {
            registry
                .register(configuration(id), Arc::new(StubConnector { reachable: true }))
                .await
                .expect("register");
        }

        assert!(registry.unregister("a").await.is_some());
        assert!(registry.unregister("a").await.is_none());
        assert!(registry.get("a").await.is_err());

        registry.clear().await;
        assert!(registry.configurations().await.is_empty());
    }

    #[tokio::test]
    async fn failing_health_check_is_unhealthy() {
        let registry = ConnectorRegistry::new();
        registry
            .register(configuration("up"), Arc::new(StubConnector { reachable: true }))
            .await
            .expect("register");
        registry
            .register(configuration("down"), Arc::new(StubConnector { reachable: false }))
            .await
            .expect("register");

        let health = registry.health().await;

        assert_eq!(health.len(), 2);
        assert_eq!(health[0].0, "down");
        assert!(!health[0].1.is_healthy());
        assert_eq!(health[1], ("up".to_string(), ConnectorHealth::Healthy));
    }
}
