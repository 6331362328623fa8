//! Stored labels and their localized texts.

use parlance_core::{Locale, UserInterfaceType};
use serde::{Deserialize, Serialize};

/// One localized text of a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct I18nLocalizedLabel {
    pub locale: Locale,
    pub interface_type: UserInterfaceType,
    pub label: String,
    /// Reviewed by a human.
    #[serde(default)]
    pub validated: bool,
    /// Restricts the text to one connector.
    #[serde(default)]
    pub connector_id: Option<String>,
}

impl I18nLocalizedLabel {
    /// Creates an unvalidated text usable on every connector.
    #[must_use]
    pub fn new(
        locale: impl Into<Locale>,
        interface_type: UserInterfaceType,
        label: impl Into<String>,
    ) -> Self {
        Self {
            locale: locale.into(),
            interface_type,
            label: label.into(),
            validated: false,
            connector_id: None,
        }
    }
}

/// A label with all its localized texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct I18nLabel {
    pub id: String,
    pub namespace: String,
    pub category: String,
    #[serde(default)]
    pub i18n: Vec<I18nLocalizedLabel>,
    /// Text of the key the label was created from.
    pub default_label: Option<String>,
}

impl I18nLabel {
    /// Creates a label without localized texts.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        namespace: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            namespace: namespace.into(),
            category: category.into(),
            i18n: Vec::new(),
            default_label: None,
        }
    }

    /// Adds a localized text.
    #[must_use]
    pub fn with_localized(mut self, localized: I18nLocalizedLabel) -> Self {
        self.i18n.push(localized);
        self
    }

    /// Finds the best text for a locale and interface.
    ///
    /// Tried in order: exact locale and interface, language and interface,
    /// exact locale on any interface, language on any interface.
    #[must_use]
    pub fn find_label(
        &self,
        locale: &Locale,
        interface_type: UserInterfaceType,
    ) -> Option<&I18nLocalizedLabel> {
        let language = locale.language();
        let exact = |l: &&I18nLocalizedLabel| l.locale == *locale;
        let same_language = |l: &&I18nLocalizedLabel| l.locale.language() == language;
        let same_interface = |l: &&I18nLocalizedLabel| l.interface_type == interface_type;

        self.i18n
            .iter()
            .find(|l| exact(l) && same_interface(l))
            .or_else(|| self.i18n.iter().find(|l| same_language(l) && same_interface(l)))
            .or_else(|| self.i18n.iter().find(|l| exact(l)))
            .or_else(|| self.i18n.iter().find(|l| same_language(l)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label() -> I18nLabel {
        I18nLabel::new("acme_booking_hello", "acme", "booking")
            .with_localized(I18nLocalizedLabel::new(
                "fr-FR",
                UserInterfaceType::TextChat,
                "Bonjour",
            ))
            .with_localized(I18nLocalizedLabel::new(
                "fr-CA",
                UserInterfaceType::VoiceAssistant,
                "Allô",
            ))
            .with_localized(I18nLocalizedLabel::new(
                "en",
                UserInterfaceType::TextChat,
                "Hello",
            ))
    }

    #[test]
    fn exact_locale_and_interface_wins() {
        let found = label()
            .find_label(&Locale::new("fr-FR"), UserInterfaceType::TextChat)
            .map(|l| l.label.clone());
        assert_eq!(found.as_deref(), Some("Bonjour"));
    }

    #[test]
    fn language_and_interface_beats_exact_locale_on_other_interface() {
        let found = label()
            .find_label(&Locale::new("fr-FR"), UserInterfaceType::VoiceAssistant)
            .map(|l| l.label.clone());
        assert_eq!(found.as_deref(), Some("Allô"));
    }

    #[test]
    fn exact_locale_on_any_interface() {
        let found = label()
            .find_label(&Locale::new("en"), UserInterfaceType::RichCard)
            .map(|l| l.label.clone());
        assert_eq!(found.as_deref(), Some("Hello"));
    }

    #[test]
    fn language_on_any_interface() {
        let found = label()
            .find_label(&Locale::new("fr-BE"), UserInterfaceType::RichCard)
            .map(|l| l.label.clone());
        assert_eq!(found.as_deref(), Some("Bonjour"));
    }

    #[test]
    fn unknown_language_finds_nothing() {
        assert!(label()
            .find_label(&Locale::new("de-DE"), UserInterfaceType::TextChat)
            .is_none());
    }
}
