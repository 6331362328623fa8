//! The intent and entity classification service.
//!
//! The classifier is a black box: it receives a sentence and returns the
//! most probable intent plus the entity spans it recognized, some of them
//! already valued.

use crate::entity_type::EntityType;
use crate::error::NlpError;
use crate::value::Value;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parlance_core::{ApplicationId, Locale};
use rootcause::Report;
use serde::{Deserialize, Serialize};

/// Biases the classifier toward an intent the dialog expects next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentQualifier {
    /// The expected intent name.
    pub intent: String,
    /// Probability modifier applied to that intent.
    pub modifier: f64,
}

impl IntentQualifier {
    /// Creates a qualifier.
    #[must_use]
    pub fn new(intent: impl Into<String>, modifier: f64) -> Self {
        Self {
            intent: intent.into(),
            modifier,
        }
    }
}

/// A classification request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NlpQuery {
    pub application_id: ApplicationId,
    pub text: String,
    pub locale: Locale,
    pub reference_date: DateTime<Utc>,
    #[serde(default)]
    pub intent_qualifiers: Vec<IntentQualifier>,
}

/// One recognized entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NlpEntityValue {
    /// Start character offset, inclusive.
    pub start: usize,
    /// End character offset, exclusive.
    pub end: usize,
    pub entity_type: EntityType,
    /// The role the entity plays in the intent (`origin`, `destination`).
    pub role: String,
    /// The typed value, when the classifier or an evaluator produced one.
    pub value: Option<Value>,
}

impl NlpEntityValue {
    /// Creates an entity without a value.
    #[must_use]
    pub fn new(start: usize, end: usize, entity_type: EntityType, role: impl Into<String>) -> Self {
        Self {
            start,
            end,
            entity_type,
            role: role.into(),
            value: None,
        }
    }

    /// Attaches a value.
    #[must_use]
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Returns the characters of `text` this entity covers.
    #[must_use]
    pub fn covered_text(&self, text: &str) -> String {
        text.chars()
            .skip(self.start)
            .take(self.end.saturating_sub(self.start))
            .collect()
    }
}

/// Classification result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NlpResult {
    pub intent: String,
    pub intent_probability: f64,
    #[serde(default)]
    pub entities: Vec<NlpEntityValue>,
}

/// The classification service.
#[async_trait]
pub trait NlpClient: Send + Sync {
    /// Classifies a sentence.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or answers garbage.
    async fn parse(&self, query: &NlpQuery) -> Result<NlpResult, Report<NlpError>>;
}
