//! Label resolution.
//!
//! Resolution never fails. When the store has no text for the user, the
//! key's default text is used, then the key id itself. A key seen for
//! the first time is saved so that it shows up for translators.

use crate::key::I18nLabelKey;
use crate::label::I18nLabel;
use crate::store::I18nLabelStore;
use async_trait::async_trait;
use parlance_core::{Locale, UserInterfaceType};
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves label keys into user facing text.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Returns the text of `key` for a locale and interface, with the
    /// key's arguments substituted.
    async fn translate(
        &self,
        key: &I18nLabelKey,
        locale: &Locale,
        interface_type: UserInterfaceType,
    ) -> String;
}

/// A [`Translator`] backed by an [`I18nLabelStore`].
#[derive(Clone)]
pub struct LabelTranslator {
    store: Arc<dyn I18nLabelStore>,
}

impl LabelTranslator {
    /// Creates a translator over a label store.
    #[must_use]
    pub fn new(store: Arc<dyn I18nLabelStore>) -> Self {
        Self { store }
    }

    async fn stored_label(&self, key: &I18nLabelKey) -> Option<I18nLabel> {
        match self.store.label(&key.id).await {
            Ok(Some(label)) => Some(label),
            Ok(None) => {
                debug!(label_id = %key.id, "label not found, registering default");
                let mut label = I18nLabel::new(&key.id, &key.namespace, &key.category);
                label.default_label = Some(key.default_label.clone());
                if let Err(report) = self.store.save_if_not_exist(vec![label]).await {
                    warn!(label_id = %key.id, error = %report, "failed to register label");
                }
                None
            }
            Err(report) => {
                warn!(label_id = %key.id, error = %report, "label lookup failed");
                None
            }
        }
    }
}

#[async_trait]
impl Translator for LabelTranslator {
    async fn translate(
        &self,
        key: &I18nLabelKey,
        locale: &Locale,
        interface_type: UserInterfaceType,
    ) -> String {
        let stored = self.stored_label(key).await;
        let template = stored
            .as_ref()
            .and_then(|label| label.find_label(locale, interface_type))
            .map(|localized| localized.label.as_str())
            .or_else(|| Some(key.default_label.as_str()).filter(|text| !text.is_empty()))
            .unwrap_or(key.id.as_str());

        format_label(template, &key.args)
    }
}

/// Substitutes positional `{0}`, `{1}`, ... placeholders.
///
/// Placeholders without a matching argument are left untouched.
#[must_use]
pub fn format_label(template: &str, args: &[String]) -> String {
    if args.is_empty() {
        return template.to_string();
    }

    let mut formatted = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        formatted.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substituted = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            let arg = args.get(index)?;
            Some((arg, close))
        });
        match substituted {
            Some((arg, close)) => {
                formatted.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                formatted.push('{');
                rest = after;
            }
        }
    }
    formatted.push_str(rest);
    formatted
}
