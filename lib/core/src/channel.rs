//! Transport type tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of interface the end user interacts through.
///
/// Drives which alternative message variants are attached to an action
/// and which localized label variant is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserInterfaceType {
    /// Plain text chat.
    #[default]
    TextChat,
    /// Text chat that renders cards, buttons and carousels.
    RichCard,
    /// A voice assistant with a screen.
    TextAndVoiceAssistant,
    /// A voice-only assistant.
    VoiceAssistant,
}

impl UserInterfaceType {
    /// Returns true if the interface can speak.
    #[must_use]
    pub fn has_voice(self) -> bool {
        matches!(self, Self::TextAndVoiceAssistant | Self::VoiceAssistant)
    }
}

/// Identifies a transport: its id plus the interface it offers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectorType {
    /// Stable transport id (`web`, `messenger`, `ga`).
    pub id: String,
    /// The interface category of the transport.
    pub user_interface_type: UserInterfaceType,
}

impl ConnectorType {
    /// Creates a connector type.
    #[must_use]
    pub fn new(id: impl Into<String>, user_interface_type: UserInterfaceType) -> Self {
        Self {
            id: id.into(),
            user_interface_type,
        }
    }
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_interfaces() {
        assert!(UserInterfaceType::VoiceAssistant.has_voice());
        assert!(UserInterfaceType::TextAndVoiceAssistant.has_voice());
        assert!(!UserInterfaceType::RichCard.has_voice());
    }

    #[test]
    fn connector_type_identity_includes_interface() {
        let text = ConnectorType::new("web", UserInterfaceType::TextChat);
        let voice = ConnectorType::new("web", UserInterfaceType::VoiceAssistant);
        assert_ne!(text, voice);
        assert_eq!(text.to_string(), "web");
    }
}
