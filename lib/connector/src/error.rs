//! Error types for the connector crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `ConnectorError`: delivery and registry failures

use std::fmt;

/// Errors from connector operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    /// The transport rejected or failed the delivery.
    SendFailed { connector_id: String, reason: String },
    /// The transport did not answer in time.
    Timeout { connector_id: String, timeout_ms: u64 },
    /// The transport is not reachable.
    Unavailable { connector_id: String, reason: String },
    /// No connector is registered under this id.
    UnknownConnector { connector_id: String },
    /// A connector is already registered under this id.
    AlreadyRegistered { connector_id: String },
    /// The party waiting for answers went away.
    ReplyChannelClosed { connector_id: String },
}

impl fmt::Display for ConnectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SendFailed {
                connector_id,
                reason,
            } => {
                write!(f, "connector '{connector_id}' failed to send: {reason}")
            }
            Self::Timeout {
                connector_id,
                timeout_ms,
            } => {
                write!(
                    f,
                    "connector '{connector_id}' did not answer within {timeout_ms}ms"
                )
            }
            Self::Unavailable {
                connector_id,
                reason,
            } => {
                write!(f, "connector '{connector_id}' unavailable: {reason}")
            }
            Self::UnknownConnector { connector_id } => {
                write!(f, "unknown connector: {connector_id}")
            }
            Self::AlreadyRegistered { connector_id } => {
                write!(f, "connector already registered: {connector_id}")
            }
            Self::ReplyChannelClosed { connector_id } => {
                write!(f, "reply channel of connector '{connector_id}' is closed")
            }
        }
    }
}

impl std::error::Error for ConnectorError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_display_names_connector_and_budget() {
        let err = ConnectorError::Timeout {
            connector_id: "web".to_string(),
            timeout_ms: 5000,
        };
        assert_eq!(
            err.to_string(),
            "connector 'web' did not answer within 5000ms"
        );
    }

    #[test]
    fn unknown_connector_display() {
        let err = ConnectorError::UnknownConnector {
            connector_id: "sms".to_string(),
        };
        assert!(err.to_string().contains("sms"));
    }
}
