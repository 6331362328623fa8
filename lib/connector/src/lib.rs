//! Transport abstraction for the parlance engine.
//!
//! This crate provides:
//!
//! - **Connector**: the capability every transport implements to deliver
//!   outbound actions and report its health
//! - **Callback**: the per-event handle identifying where answers go
//! - **Registry**: the explicit, process-wide table of running connectors

pub mod callback;
pub mod connector;
pub mod error;
pub mod registry;

pub use callback::ConnectorCallback;
pub use connector::{Connector, ConnectorHealth};
pub use error::ConnectorError;
pub use registry::{ConnectorConfiguration, ConnectorRegistry, RegisteredConnector};
