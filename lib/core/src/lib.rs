//! Core domain types and utilities for the parlance conversation engine.
//!
//! This crate provides the identifiers, participant types, and error
//! handling foundation shared by every other parlance crate.

pub mod channel;
pub mod error;
pub mod id;
pub mod locale;
pub mod player;

pub use channel::{ConnectorType, UserInterfaceType};
pub use error::Result;
pub use id::{ActionId, DialogId, EventId, ParseIdError, StoryId};
pub use locale::Locale;
pub use player::{ApplicationId, PlayerId, PlayerType};
