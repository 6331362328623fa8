//! The transport capability.
//!
//! The engine talks to every transport through [`Connector`] and never
//! depends on a transport's payload formats. Transport specific renderings
//! travel as [`parlance_dialog::ConnectorMessage`] variants attached to the
//! action; a connector picks the ones it understands.

use crate::callback::ConnectorCallback;
use crate::error::ConnectorError;
use async_trait::async_trait;
use parlance_core::ConnectorType;
use parlance_dialog::{Action, ConnectorMessage};
use rootcause::Report;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Health reported by a connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConnectorHealth {
    Healthy,
    Unhealthy { reason: String },
}

impl ConnectorHealth {
    /// Returns true if the connector is healthy.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Trait for transport connectors.
///
/// All transports implement this trait to receive outbound actions from
/// the engine.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Returns the transport type tag and interface category.
    fn connector_type(&self) -> ConnectorType;

    /// Delivers an action.
    ///
    /// `delay` is the action's offset from the start of its turn; the
    /// dispatcher has already waited for it, so transports that schedule
    /// on their side may use it as a hint only.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport failed to deliver.
    async fn send(
        &self,
        action: Action,
        callback: &ConnectorCallback,
        delay: Duration,
    ) -> Result<(), Report<ConnectorError>>;

    /// Checks whether the transport is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the check itself could not run.
    async fn health_check(&self) -> Result<ConnectorHealth, Report<ConnectorError>> {
        Ok(ConnectorHealth::Healthy)
    }

    /// Returns the attached messages this transport can render.
    fn messages_for<'a>(&self, action: &'a Action) -> Vec<&'a ConnectorMessage> {
        let interface = self.connector_type().user_interface_type;
        action
            .messages
            .iter()
            .filter(|message| message.renders_on(interface))
            .collect()
    }
}
