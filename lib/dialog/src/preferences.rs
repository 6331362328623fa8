//! Per-user preferences.

use parlance_core::Locale;
use serde::{Deserialize, Serialize};

/// Preferences of one user, shared by all of the user's dialogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub locale: Locale,
    /// IANA timezone name.
    pub timezone: String,
    /// Marks every action of the user's conversations as a test event.
    #[serde(default)]
    pub test: bool,
}

impl UserPreferences {
    /// Creates preferences for a locale, in UTC.
    #[must_use]
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            timezone: "UTC".to_string(),
            test: false,
        }
    }

    /// Marks the user as a test user.
    #[must_use]
    pub fn test_user(mut self) -> Self {
        self.test = true;
        self
    }
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}
