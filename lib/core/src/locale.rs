//! User locales.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A BCP 47 style language tag such as `fr` or `en-US`.
///
/// Underscores are normalized to hyphens, so `en_US` and `en-US` compare
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// Creates a locale from a language tag.
    #[must_use]
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(tag.as_ref().trim().replace('_', "-"))
    }

    /// Returns the full tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the primary language subtag (`en` for `en-US`).
    #[must_use]
    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new("en")
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Locale {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Locale {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_strips_region() {
        assert_eq!(Locale::new("fr-FR").language(), "fr");
        assert_eq!(Locale::new("de").language(), "de");
    }

    #[test]
    fn underscore_tags_are_normalized() {
        assert_eq!(Locale::new("en_US"), Locale::new("en-US"));
    }
}
