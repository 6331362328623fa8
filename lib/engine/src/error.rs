//! Error types for the engine crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `BusError`: misuse of the action bus within a turn
//! - `HandlerError`: story handler failures, recovered by the controller
//! - `ControllerError`: turn level failures (wraps lower errors via context)

use parlance_core::DialogId;
use parlance_dialog::DialogKey;
use std::fmt;

/// Errors from the action bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// `send` or `end` was called after the turn's final answer.
    TurnEnded,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TurnEnded => write!(f, "the turn already sent its last answer"),
        }
    }
}

impl std::error::Error for BusError {}

/// Errors from story handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler returned an error.
    StoryFailed { story_id: String, reason: String },
    /// The handler panicked.
    StoryPanicked { story_id: String, message: String },
    /// The handler misused the bus.
    Bus(BusError),
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StoryFailed { story_id, reason } => {
                write!(f, "story '{story_id}' failed: {reason}")
            }
            Self::StoryPanicked { story_id, message } => {
                write!(f, "story '{story_id}' panicked: {message}")
            }
            Self::Bus(e) => write!(f, "bus error: {e}"),
        }
    }
}

impl std::error::Error for HandlerError {}

impl From<BusError> for HandlerError {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

/// Errors from a conversation turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// The dialog could not be loaded or created.
    DialogUnavailable { key: DialogKey },
    /// The turn's dialog mutations could not be persisted.
    CommitFailed { dialog_id: DialogId },
    /// The user's preferences could not be read.
    PreferencesUnavailable { key: DialogKey },
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DialogUnavailable { key } => write!(f, "dialog unavailable for {key}"),
            Self::CommitFailed { dialog_id } => {
                write!(f, "failed to commit dialog {dialog_id}")
            }
            Self::PreferencesUnavailable { key } => {
                write!(f, "user preferences unavailable for {key}")
            }
        }
    }
}

impl std::error::Error for ControllerError {}
