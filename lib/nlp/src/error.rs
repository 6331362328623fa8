//! Error types for the NLP crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `NormalizationError`: a single raw span could not be decoded
//! - `EvaluationError`: an entity evaluator failed
//! - `NlpError`: the classification service failed

use std::fmt;

/// Errors decoding one raw extraction span.
///
/// These never abort a normalization pass; the span is logged and skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    /// The dimension has no known constructor.
    UnknownDimension { dimension: String },
    /// A required field is absent from the payload.
    MissingField { dimension: String, field: String },
    /// A field is present but has the wrong shape.
    InvalidField { dimension: String, field: String },
    /// A temporal value could not be parsed.
    InvalidDate { value: String, reason: String },
    /// A temporal grain is not recognized.
    UnknownGrain { grain: String },
}

impl fmt::Display for NormalizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDimension { dimension } => {
                write!(f, "unknown dimension: {dimension}")
            }
            Self::MissingField { dimension, field } => {
                write!(f, "missing field '{field}' in {dimension} span")
            }
            Self::InvalidField { dimension, field } => {
                write!(f, "invalid field '{field}' in {dimension} span")
            }
            Self::InvalidDate { value, reason } => {
                write!(f, "invalid date '{value}': {reason}")
            }
            Self::UnknownGrain { grain } => write!(f, "unknown grain: {grain}"),
        }
    }
}

impl std::error::Error for NormalizationError {}

/// Errors from entity evaluators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// The evaluator does not handle this entity type.
    UnsupportedEntityType { entity_type: String },
    /// The extraction source failed.
    SourceFailed { entity_type: String, reason: String },
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedEntityType { entity_type } => {
                write!(f, "unsupported entity type: {entity_type}")
            }
            Self::SourceFailed {
                entity_type,
                reason,
            } => {
                write!(f, "extraction failed for {entity_type}: {reason}")
            }
        }
    }
}

impl std::error::Error for EvaluationError {}

/// Errors from the classification service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NlpError {
    /// The service is unavailable.
    Unavailable { reason: String },
    /// The request failed.
    RequestFailed { reason: String },
    /// The response could not be interpreted.
    InvalidResponse { reason: String },
}

impl fmt::Display for NlpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => write!(f, "nlp service unavailable: {reason}"),
            Self::RequestFailed { reason } => write!(f, "nlp request failed: {reason}"),
            Self::InvalidResponse { reason } => {
                write!(f, "invalid nlp response: {reason}")
            }
        }
    }
}

impl std::error::Error for NlpError {}
