//! Label persistence.

use crate::error::TranslatorError;
use crate::label::I18nLabel;
use async_trait::async_trait;
use rootcause::Report;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Storage of labels.
#[async_trait]
pub trait I18nLabelStore: Send + Sync {
    /// Returns every label of a namespace, ordered by category then id.
    async fn labels(&self, namespace: &str) -> Result<Vec<I18nLabel>, Report<TranslatorError>>;

    /// Returns a label by id.
    async fn label(&self, id: &str) -> Result<Option<I18nLabel>, Report<TranslatorError>>;

    /// Inserts or replaces a label.
    async fn save(&self, label: I18nLabel) -> Result<(), Report<TranslatorError>>;

    /// Inserts the labels whose id is not stored yet.
    async fn save_if_not_exist(&self, labels: Vec<I18nLabel>) -> Result<(), Report<TranslatorError>>;

    /// Deletes a label of a namespace.
    ///
    /// # Errors
    ///
    /// Returns [`TranslatorError::NamespaceMismatch`] if the label exists
    /// in another namespace.
    async fn delete(&self, namespace: &str, id: &str) -> Result<(), Report<TranslatorError>>;
}

/// Process-local label store.
#[derive(Debug, Default)]
pub struct InMemoryI18nStore {
    labels: RwLock<HashMap<String, I18nLabel>>,
}

impl InMemoryI18nStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `labels`.
    #[must_use]
    pub fn with_labels(labels: impl IntoIterator<Item = I18nLabel>) -> Self {
        Self {
            labels: RwLock::new(
                labels
                    .into_iter()
                    .map(|label| (label.id.clone(), label))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl I18nLabelStore for InMemoryI18nStore {
    async fn labels(&self, namespace: &str) -> Result<Vec<I18nLabel>, Report<TranslatorError>> {
        let mut labels: Vec<I18nLabel> = self
            .labels
            .read()
            .await
            .values()
            .filter(|label| label.namespace == namespace)
            .cloned()
            .collect();
        labels.sort_by(|a, b| (&a.category, &a.id).cmp(&(&b.category, &b.id)));
        Ok(labels)
    }

    async fn label(&self, id: &str) -> Result<Option<I18nLabel>, Report<TranslatorError>> {
        Ok(self.labels.read().await.get(id).cloned())
    }

    async fn save(&self, label: I18nLabel) -> Result<(), Report<TranslatorError>> {
        self.labels.write().await.insert(label.id.clone(), label);
        Ok(())
    }

    async fn save_if_not_exist(&self, labels: Vec<I18nLabel>) -> Result<(), Report<TranslatorError>> {
        let mut stored = self.labels.write().await;
        for label in labels {
            stored.entry(label.id.clone()).or_insert(label);
        }
        Ok(())
    }

    async fn delete(&self, namespace: &str, id: &str) -> Result<(), Report<TranslatorError>> {
        let mut stored = self.labels.write().await;
        match stored.get(id) {
            Some(label) if label.namespace != namespace => Err(TranslatorError::NamespaceMismatch {
                label_id: id.to_string(),
                namespace: namespace.to_string(),
            }
            .into()),
            Some(_) => {
                stored.remove(id);
                Ok(())
            }
            None => Ok(()),
        }
    }
}
