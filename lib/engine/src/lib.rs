//! Conversation engine for parlance.
//!
//! This crate provides:
//!
//! - **Definitions**: bots, stories and story handlers
//! - **Action Bus**: the handler side of a turn, with delay accumulation
//!   and last answer termination
//! - **Dispatcher**: ordered, asynchronous delivery through connectors
//! - **Controller**: the turn state machine from inbound event to commit

pub mod bus;
pub mod config;
pub mod context;
pub mod controller;
pub mod definition;
pub mod dispatcher;
pub mod error;

pub use bus::{BotBus, DispatchedAction};
pub use config::EngineConfig;
pub use context::TurnContext;
pub use controller::{ConversationController, TurnOutcome};
pub use definition::{BotDefinition, ErrorActionProvider, StoryDefinition, StoryHandler};
pub use dispatcher::{DeliveryHandle, DeliveryReport, Dispatcher};
pub use error::{BusError, ControllerError, HandlerError};
