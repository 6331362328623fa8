//! Inbound events.

use crate::action::{Action, ActionMetadata, ActionPayload, DeliveryState};
use crate::dialog::DialogKey;
use chrono::{DateTime, Utc};
use parlance_core::{ActionId, ApplicationId, EventId, PlayerId};
use serde::{Deserialize, Serialize};

/// Something a user did on a transport. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    /// The user who acted.
    pub player_id: PlayerId,
    /// The bot the user addressed.
    pub recipient_id: PlayerId,
    pub application_id: ApplicationId,
    pub date: DateTime<Utc>,
    pub payload: ActionPayload,
}

impl Event {
    /// Creates an event timestamped now.
    #[must_use]
    pub fn new(
        player_id: PlayerId,
        recipient_id: PlayerId,
        application_id: ApplicationId,
        payload: ActionPayload,
    ) -> Self {
        Self {
            id: EventId::new(),
            player_id,
            recipient_id,
            application_id,
            date: Utc::now(),
            payload,
        }
    }

    /// Creates a text event.
    #[must_use]
    pub fn sentence(
        player_id: PlayerId,
        recipient_id: PlayerId,
        application_id: ApplicationId,
        text: impl Into<String>,
    ) -> Self {
        Self::new(
            player_id,
            recipient_id,
            application_id,
            ActionPayload::Sentence {
                text: Some(text.into()),
            },
        )
    }

    /// Returns the key of the dialog this event belongs to.
    #[must_use]
    pub fn dialog_key(&self) -> DialogKey {
        DialogKey::new(
            self.player_id.clone(),
            self.recipient_id.clone(),
            self.application_id.clone(),
        )
    }

    /// Realizes the event as an inbound action.
    #[must_use]
    pub fn into_action(self) -> Action {
        Action {
            id: ActionId::from_ulid(self.id.as_ulid()),
            player_id: self.player_id,
            recipient_id: self.recipient_id,
            application_id: self.application_id,
            date: self.date,
            payload: self.payload,
            metadata: ActionMetadata {
                delivery: DeliveryState::Inbound,
                ..ActionMetadata::default()
            },
            state: Default::default(),
            messages: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_action_keeps_identity_and_marks_inbound() {
        let event = Event::sentence(
            PlayerId::user("alice"),
            PlayerId::bot("helper"),
            "travel".into(),
            "hello",
        );
        let event_id = event.id;

        let action = event.into_action();

        assert_eq!(action.id.as_ulid(), event_id.as_ulid());
        assert_eq!(action.text_content(), Some("hello"));
        assert_eq!(action.metadata.delivery, DeliveryState::Inbound);
    }

    #[test]
    fn dialog_key_is_ordered_user_then_bot() {
        let event = Event::sentence(
            PlayerId::user("alice"),
            PlayerId::bot("helper"),
            "travel".into(),
            "hello",
        );
        let key = event.dialog_key();
        assert_eq!(key.user_id, PlayerId::user("alice"));
        assert_eq!(key.bot_id, PlayerId::bot("helper"));
    }
}
