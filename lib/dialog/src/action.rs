//! Actions: the units of conversation content.
//!
//! Inbound events are realized as actions when they enter a story, and
//! every bot answer is an action too. An action is immutable once it has
//! been handed to a transport.

use crate::message::ConnectorMessage;
use chrono::{DateTime, Utc};
use parlance_core::{ActionId, ApplicationId, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What an action carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionPayload {
    /// Free text. `None` for actions carried only by connector messages.
    Sentence { text: Option<String> },
    /// A button press or menu selection naming an intent directly.
    Choice {
        intent: String,
        #[serde(default)]
        parameters: HashMap<String, String>,
    },
    /// A file, image or audio attachment.
    Attachment { url: String, mime_type: String },
    /// A shared position.
    Location { latitude: f64, longitude: f64 },
}

/// Handler assigned priority of an outbound action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSignificance {
    #[default]
    Normal,
    Important,
    Urgent,
}

/// Delivery progress of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    /// Received from a transport.
    Inbound,
    /// Created, not yet handed to the bus.
    #[default]
    Pending,
    /// Handed to the dispatcher with its computed delay.
    Dispatched,
}

/// Action metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionMetadata {
    /// True only for the final answer of a turn.
    pub last_answer: bool,
    pub significance: ActionSignificance,
    pub delivery: DeliveryState,
}

/// Per-action flags copied from the user's preferences.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionState {
    /// The action belongs to a test conversation.
    pub test_event: bool,
}

/// A unit of conversation content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    /// The sender.
    pub player_id: PlayerId,
    pub recipient_id: PlayerId,
    pub application_id: ApplicationId,
    /// Creation time for inbound actions, scheduled send time for outbound.
    pub date: DateTime<Utc>,
    pub payload: ActionPayload,
    pub metadata: ActionMetadata,
    pub state: ActionState,
    /// Alternative transport specific renderings.
    #[serde(default)]
    pub messages: Vec<ConnectorMessage>,
}

impl Action {
    /// Creates an action.
    #[must_use]
    pub fn new(
        player_id: PlayerId,
        application_id: ApplicationId,
        recipient_id: PlayerId,
        payload: ActionPayload,
    ) -> Self {
        Self {
            id: ActionId::new(),
            player_id,
            recipient_id,
            application_id,
            date: Utc::now(),
            payload,
            metadata: ActionMetadata::default(),
            state: ActionState::default(),
            messages: Vec::new(),
        }
    }

    /// Creates a text action.
    #[must_use]
    pub fn text(
        player_id: PlayerId,
        application_id: ApplicationId,
        recipient_id: PlayerId,
        text: impl Into<String>,
    ) -> Self {
        Self::new(
            player_id,
            application_id,
            recipient_id,
            ActionPayload::Sentence {
                text: Some(text.into()),
            },
        )
    }

    /// Creates a choice action.
    #[must_use]
    pub fn choice(
        player_id: PlayerId,
        application_id: ApplicationId,
        recipient_id: PlayerId,
        intent: impl Into<String>,
    ) -> Self {
        Self::new(
            player_id,
            application_id,
            recipient_id,
            ActionPayload::Choice {
                intent: intent.into(),
                parameters: HashMap::new(),
            },
        )
    }

    /// Adds an alternative transport rendering.
    #[must_use]
    pub fn with_message(mut self, message: ConnectorMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Returns the text of a sentence action.
    #[must_use]
    pub fn text_content(&self) -> Option<&str> {
        match &self.payload {
            ActionPayload::Sentence { text } => text.as_deref(),
            _ => None,
        }
    }

    /// Returns the intent named by a choice action.
    #[must_use]
    pub fn choice_intent(&self) -> Option<&str> {
        match &self.payload {
            ActionPayload::Choice { intent, .. } => Some(intent),
            _ => None,
        }
    }

    /// Returns true if this is the final answer of its turn.
    #[must_use]
    pub fn is_last_answer(&self) -> bool {
        self.metadata.last_answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bot() -> PlayerId {
        PlayerId::bot("helper")
    }

    fn user() -> PlayerId {
        PlayerId::user("alice")
    }

    #[test]
    fn text_action_exposes_content() {
        let action = Action::text(bot(), "travel".into(), user(), "Hello!");
        assert_eq!(action.text_content(), Some("Hello!"));
        assert_eq!(action.choice_intent(), None);
        assert!(!action.is_last_answer());
    }

    #[test]
    fn choice_action_exposes_intent() {
        let action = Action::choice(user(), "travel".into(), bot(), "book");
        assert_eq!(action.choice_intent(), Some("book"));
        assert_eq!(action.text_content(), None);
    }

    #[test]
    fn new_actions_are_pending_normal() {
        let action = Action::text(bot(), "travel".into(), user(), "Hi");
        assert_eq!(action.metadata.delivery, DeliveryState::Pending);
        assert_eq!(action.metadata.significance, ActionSignificance::Normal);
    }

    #[test]
    fn action_serde_roundtrip_keeps_messages() {
        let action = Action::text(bot(), "travel".into(), user(), "Pick one")
            .with_message(ConnectorMessage::card("Destinations", vec![]));

        let json = serde_json::to_string(&action).expect("serialize");
        let parsed: Action = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(parsed.id, action.id);
        assert_eq!(parsed.messages, action.messages);
    }
}
