//! Dialog state for the parlance engine.
//!
//! This crate provides:
//!
//! - **Actions**: inbound and outbound conversation content units
//! - **Dialogs**: per user, per application conversation state split into
//!   stories
//! - **Dialog Store**: load-or-create and commit of dialogs
//! - **Turn Locks**: strict per-conversation serialization of turns

pub mod action;
pub mod dialog;
pub mod entity;
pub mod error;
pub mod event;
pub mod lock;
pub mod message;
pub mod preferences;
pub mod store;

pub use action::{Action, ActionMetadata, ActionPayload, ActionSignificance, ActionState, DeliveryState};
pub use dialog::{Dialog, DialogKey, DialogState, NextUserActionState, Story};
pub use entity::EntityStateValue;
pub use error::DialogError;
pub use event::Event;
pub use lock::{TurnGuard, TurnLocks};
pub use message::{Button, CardMessage, ConnectorMessage, VoiceMessage, WebMessage};
pub use preferences::UserPreferences;
pub use store::{DialogStore, InMemoryDialogStore};
