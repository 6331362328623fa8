//! Entity evaluators.
//!
//! An evaluator turns the text covered by an entity into a typed
//! [`Value`]. Failures are returned as values, never raised: callers
//! log the error and keep the entity without a value.

use crate::client::NlpEntityValue;
use crate::entity_type::EntityType;
use crate::error::EvaluationError;
use crate::normalizer::{RawSpan, normalize};
use crate::value::Value;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use parlance_core::{ApplicationId, Locale};
use rootcause::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

/// Dimensions served by a [`SpanEvaluator`].
pub const SUPPORTED_DIMENSIONS: &[&str] = &[
    "datetime",
    "temperature",
    "number",
    "ordinal",
    "distance",
    "volume",
    "amount-of-money",
    "email",
    "url",
    "phone-number",
];

/// Call context handed to an evaluator.
#[derive(Debug, Clone)]
pub struct EntityCallContext {
    /// The application the sentence was sent to.
    pub application_id: ApplicationId,
    /// The entity type being evaluated.
    pub entity_type: EntityType,
    /// The user's locale.
    pub locale: Locale,
    /// The instant relative expressions ("tomorrow") are resolved against.
    pub reference_date: DateTime<FixedOffset>,
}

/// Evaluates the text of one entity into a typed value.
#[async_trait]
pub trait EntityEvaluator: Send + Sync {
    /// Entity types this evaluator can handle.
    fn supported_entity_types(&self) -> Vec<EntityType>;

    /// Evaluates `text`.
    ///
    /// Returns `Ok(None)` when the text holds no value of the requested type.
    ///
    /// # Errors
    ///
    /// Returns an error when the evaluation itself fails.
    async fn evaluate(
        &self,
        context: &EntityCallContext,
        text: &str,
    ) -> Result<Option<Value>, Report<EvaluationError>>;
}

/// Source of raw extraction spans (typically a remote extraction service).
#[async_trait]
pub trait SpanSource: Send + Sync {
    /// Extracts every span of `dimension` found in `text`.
    async fn parse(
        &self,
        language: &str,
        dimension: &str,
        reference_date: DateTime<FixedOffset>,
        text: &str,
    ) -> Result<Vec<RawSpan>, Report<EvaluationError>>;
}

/// An evaluator that normalizes the raw spans of a [`SpanSource`].
pub struct SpanEvaluator<S: SpanSource> {
    source: S,
}

impl<S: SpanSource> SpanEvaluator<S> {
    /// Creates an evaluator over a span source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    fn source_dimension(entity_type: &EntityType) -> &str {
        match entity_type.name() {
            "datetime" => "time",
            other => other,
        }
    }
}

#[async_trait]
impl<S: SpanSource> EntityEvaluator for SpanEvaluator<S> {
    fn supported_entity_types(&self) -> Vec<EntityType> {
        SUPPORTED_DIMENSIONS
            .iter()
            .map(|dimension| EntityType::builtin(dimension))
            .collect()
    }

    async fn evaluate(
        &self,
        context: &EntityCallContext,
        text: &str,
    ) -> Result<Option<Value>, Report<EvaluationError>> {
        if !SUPPORTED_DIMENSIONS.contains(&context.entity_type.name()) {
            return Err(EvaluationError::UnsupportedEntityType {
                entity_type: context.entity_type.to_string(),
            }
            .into());
        }

        let dimension = Self::source_dimension(&context.entity_type);
        let spans: Vec<RawSpan> = self
            .source
            .parse(
                context.locale.language(),
                dimension,
                context.reference_date,
                text,
            )
            .await?
            .into_iter()
            .filter(|span| span.dimension == dimension)
            .collect();

        debug!(
            entity_type = %context.entity_type,
            spans = spans.len(),
            "normalizing extracted spans"
        );

        Ok(normalize(&spans).into_iter().next())
    }
}

/// Registry of evaluators keyed by the entity types they support.
#[derive(Default, Clone)]
pub struct EntityEvaluators {
    by_type: HashMap<EntityType, Arc<dyn EntityEvaluator>>,
}

impl EntityEvaluators {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an evaluator for every type it supports.
    ///
    /// A later registration replaces an earlier one for the same type.
    pub fn register(&mut self, evaluator: Arc<dyn EntityEvaluator>) {
        for entity_type in evaluator.supported_entity_types() {
            self.by_type.insert(entity_type, Arc::clone(&evaluator));
        }
    }

    /// Returns the evaluator for an entity type.
    #[must_use]
    pub fn evaluator_for(&self, entity_type: &EntityType) -> Option<&Arc<dyn EntityEvaluator>> {
        self.by_type.get(entity_type)
    }

    /// Fills in missing values of classified entities.
    ///
    /// Each entity without a value is evaluated over the text it covers.
    /// Evaluation errors are logged and leave the entity unvalued.
    pub async fn resolve(
        &self,
        application_id: &ApplicationId,
        locale: &Locale,
        reference_date: DateTime<FixedOffset>,
        text: &str,
        entities: Vec<NlpEntityValue>,
    ) -> Vec<NlpEntityValue> {
        let mut resolved = Vec::with_capacity(entities.len());

        for mut entity in entities {
            if entity.value.is_none() {
                if let Some(evaluator) = self.by_type.get(&entity.entity_type) {
                    let context = EntityCallContext {
                        application_id: application_id.clone(),
                        entity_type: entity.entity_type.clone(),
                        locale: locale.clone(),
                        reference_date,
                    };
                    let covered = entity.covered_text(text);
                    match evaluator.evaluate(&context, &covered).await {
                        Ok(value) => entity.value = value,
                        Err(report) => {
                            error!(
                                entity_type = %entity.entity_type,
                                role = %entity.role,
                                error = %report,
                                "entity evaluation failed"
                            );
                        }
                    }
                }
            }
            resolved.push(entity);
        }

        resolved
    }
}
