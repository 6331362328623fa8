//! Error types for the dialog crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `DialogError`: dialog store operations

use parlance_core::DialogId;
use std::fmt;

/// Errors from dialog store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogError {
    /// Dialog not found.
    NotFound { id: DialogId },
    /// The dialog was committed by another turn since it was loaded.
    Conflict {
        id: DialogId,
        expected_version: u64,
        found_version: u64,
    },
    /// Storage operation failed.
    StorageFailed { reason: String },
}

impl fmt::Display for DialogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { id } => write!(f, "dialog not found: {id}"),
            Self::Conflict {
                id,
                expected_version,
                found_version,
            } => {
                write!(
                    f,
                    "dialog {id} was modified concurrently (loaded version {expected_version}, stored version {found_version})"
                )
            }
            Self::StorageFailed { reason } => {
                write!(f, "dialog storage failed: {reason}")
            }
        }
    }
}

impl std::error::Error for DialogError {}
