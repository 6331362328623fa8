//! Transport specific message variants.
//!
//! A handler may attach alternative renderings of an action for the
//! transports it knows about. Each transport matches the variants it can
//! render and falls back to the action's plain payload otherwise.

use parlance_core::UserInterfaceType;
use serde::{Deserialize, Serialize};

/// A button offered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Button {
    /// Sends a choice for `intent` back to the bot when pressed.
    Postback { title: String, intent: String },
    /// Opens a URL.
    Url { title: String, url: String },
}

impl Button {
    /// Creates a postback button.
    #[must_use]
    pub fn postback(title: impl Into<String>, intent: impl Into<String>) -> Self {
        Self::Postback {
            title: title.into(),
            intent: intent.into(),
        }
    }

    /// Creates a link button.
    #[must_use]
    pub fn url(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Url {
            title: title.into(),
            url: url.into(),
        }
    }

    /// Returns the button label.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Postback { title, .. } | Self::Url { title, .. } => title,
        }
    }
}

/// Text with quick replies, for web chat widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebMessage {
    pub text: String,
    #[serde(default)]
    pub quick_replies: Vec<Button>,
}

/// A card with an optional image and buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardMessage {
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub buttons: Vec<Button>,
}

/// A spoken answer for voice assistants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceMessage {
    /// Text or SSML to speak.
    pub speech: String,
    /// Text shown on assistants with a screen.
    pub display_text: Option<String>,
    /// Whether the assistant keeps the microphone open.
    pub expect_user_response: bool,
}

/// The closed set of transport specific message kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConnectorMessage {
    Web(WebMessage),
    Card(CardMessage),
    Voice(VoiceMessage),
}

impl ConnectorMessage {
    /// Creates a web message with quick replies.
    #[must_use]
    pub fn web(text: impl Into<String>, quick_replies: Vec<Button>) -> Self {
        Self::Web(WebMessage {
            text: text.into(),
            quick_replies,
        })
    }

    /// Creates a card.
    #[must_use]
    pub fn card(title: impl Into<String>, buttons: Vec<Button>) -> Self {
        Self::Card(CardMessage {
            title: title.into(),
            subtitle: None,
            image_url: None,
            buttons,
        })
    }

    /// Creates a voice answer that keeps the conversation open.
    #[must_use]
    pub fn voice(speech: impl Into<String>) -> Self {
        Self::Voice(VoiceMessage {
            speech: speech.into(),
            display_text: None,
            expect_user_response: true,
        })
    }

    /// Returns the variant name.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Web(_) => "web",
            Self::Card(_) => "card",
            Self::Voice(_) => "voice",
        }
    }

    /// Returns true if an interface of this type can render the message.
    #[must_use]
    pub fn renders_on(&self, interface: UserInterfaceType) -> bool {
        match self {
            Self::Web(_) => matches!(
                interface,
                UserInterfaceType::TextChat | UserInterfaceType::RichCard
            ),
            Self::Card(_) => matches!(
                interface,
                UserInterfaceType::RichCard | UserInterfaceType::TextAndVoiceAssistant
            ),
            Self::Voice(_) => interface.has_voice(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_tagged_by_kind() {
        let json = serde_json::to_value(ConnectorMessage::web(
            "Where to?",
            vec![Button::postback("Paris", "destination_paris")],
        ))
        .expect("serialize");

        assert_eq!(json["kind"], "web");
        assert_eq!(json["quick_replies"][0]["type"], "postback");
        assert_eq!(json["quick_replies"][0]["intent"], "destination_paris");
    }

    #[test]
    fn voice_renders_only_on_voice_interfaces() {
        let voice = ConnectorMessage::voice("Hello");
        assert!(voice.renders_on(UserInterfaceType::VoiceAssistant));
        assert!(voice.renders_on(UserInterfaceType::TextAndVoiceAssistant));
        assert!(!voice.renders_on(UserInterfaceType::TextChat));
    }

    #[test]
    fn button_title() {
        assert_eq!(Button::url("Docs", "https://example.com").title(), "Docs");
    }

    #[test]
    fn voice_keeps_microphone_open() {
        let ConnectorMessage::Voice(voice) = ConnectorMessage::voice("Hello") else {
            panic!("expected voice message");
        };
        assert!(voice.expect_user_response);
    }
}
