//! Label keys.

use serde::{Deserialize, Serialize};

/// Maximum length of the text-derived part of a generated key id.
const MAX_SLUG_LEN: usize = 40;

/// Identifies a label plus the text used when no translation exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct I18nLabelKey {
    /// Unique label id.
    pub id: String,
    /// Namespace owning the label (usually the bot's organisation).
    pub namespace: String,
    /// Grouping used by label editors (usually the story id).
    pub category: String,
    /// Text used when the store has no localized text.
    pub default_label: String,
    /// Positional arguments substituted into `{0}`, `{1}`, ...
    #[serde(default)]
    pub args: Vec<String>,
}

impl I18nLabelKey {
    /// Creates a key whose id is derived from namespace, category and text.
    #[must_use]
    pub fn new(
        namespace: impl Into<String>,
        category: impl Into<String>,
        default_label: impl Into<String>,
    ) -> Self {
        let namespace = namespace.into();
        let category = category.into();
        let default_label = default_label.into();
        let id = format!("{namespace}_{category}_{}", slug(&default_label));
        Self::with_id(id, namespace, category, default_label)
    }

    /// Creates a key with an explicit id.
    #[must_use]
    pub fn with_id(
        id: impl Into<String>,
        namespace: impl Into<String>,
        category: impl Into<String>,
        default_label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            namespace: namespace.into(),
            category: category.into(),
            default_label: default_label.into(),
            args: Vec::new(),
        }
    }

    /// Sets the positional arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// Lowercase alphanumeric words joined by `_`.
fn slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len().min(MAX_SLUG_LEN));
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
    {
        if !slug.is_empty() {
            slug.push('_');
        }
        slug.extend(word.chars().flat_map(char::to_lowercase));
        if slug.chars().count() >= MAX_SLUG_LEN {
            break;
        }
    }
    slug.chars().take(MAX_SLUG_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_is_a_slug_of_the_text() {
        let key = I18nLabelKey::new("acme", "booking", "Where do you want to go?");
        assert_eq!(key.id, "acme_booking_where_do_you_want_to_go");
    }

    #[test]
    fn generated_id_is_bounded() {
        let key = I18nLabelKey::new("acme", "faq", "word ".repeat(50));
        assert!(key.id.len() <= "acme_faq_".len() + MAX_SLUG_LEN);
    }

    #[test]
    fn args_are_kept_in_order() {
        let key = I18nLabelKey::new("acme", "booking", "{0} seats to {1}").with_args(["2", "Paris"]);
        assert_eq!(key.args, vec!["2".to_string(), "Paris".to_string()]);
    }
}
