//! Entity state held by a dialog.

use chrono::{DateTime, Utc};
use parlance_core::ActionId;
use parlance_nlp::{EntityType, NlpEntityValue, Value};
use serde::{Deserialize, Serialize};

/// The value currently held for one entity role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityStateValue {
    pub role: String,
    pub entity_type: EntityType,
    /// The typed value. `None` when extraction recognized the entity but
    /// no evaluator could value it.
    pub value: Option<Value>,
    /// The text the entity covered.
    pub content: Option<String>,
    /// The action of the turn that set this value.
    pub set_by: ActionId,
    pub updated_at: DateTime<Utc>,
}

impl EntityStateValue {
    /// Creates a state value from a recognized entity.
    #[must_use]
    pub fn from_entity(entity: &NlpEntityValue, text: &str, set_by: ActionId) -> Self {
        Self {
            role: entity.role.clone(),
            entity_type: entity.entity_type.clone(),
            value: entity.value.clone(),
            content: Some(entity.covered_text(text)),
            set_by,
            updated_at: Utc::now(),
        }
    }

    /// Creates a state value set directly by a handler.
    #[must_use]
    pub fn with_value(
        role: impl Into<String>,
        entity_type: EntityType,
        value: Value,
        set_by: ActionId,
    ) -> Self {
        Self {
            role: role.into(),
            entity_type,
            value: Some(value),
            content: None,
            set_by,
            updated_at: Utc::now(),
        }
    }
}
