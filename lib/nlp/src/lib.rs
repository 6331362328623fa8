//! Natural language side of the parlance engine.
//!
//! This crate provides:
//!
//! - **Values**: the closed set of typed entity results
//! - **Normalizer**: turns raw, possibly overlapping extraction spans into
//!   merged typed values
//! - **Evaluators**: the entity evaluator interface and a span-source
//!   backed implementation
//! - **Client**: the intent/entity classification black box

pub mod client;
pub mod entity_type;
pub mod error;
pub mod evaluator;
pub mod normalizer;
pub mod value;

pub use client::{IntentQualifier, NlpClient, NlpEntityValue, NlpQuery, NlpResult};
pub use entity_type::EntityType;
pub use error::{EvaluationError, NlpError, NormalizationError};
pub use evaluator::{EntityCallContext, EntityEvaluator, EntityEvaluators, SpanEvaluator, SpanSource};
pub use normalizer::{RawSpan, ValueWithRange, normalize};
pub use value::{DateEntityValue, DateGrain, TemperatureUnit, Value};
