//! Error types for the translator crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `TranslatorError`: label store failures. Translation itself never
//!   fails; these only surface from the store.

use std::fmt;

/// Errors from label store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslatorError {
    /// Storage operation failed.
    StorageFailed { reason: String },
    /// The label is not in the namespace it claims.
    NamespaceMismatch { label_id: String, namespace: String },
}

impl fmt::Display for TranslatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StorageFailed { reason } => write!(f, "label storage failed: {reason}"),
            Self::NamespaceMismatch {
                label_id,
                namespace,
            } => {
                write!(f, "label '{label_id}' is not in namespace '{namespace}'")
            }
        }
    }
}

impl std::error::Error for TranslatorError {}
