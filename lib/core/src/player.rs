//! Conversation participants and application scoping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The role a participant plays in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerType {
    /// An end user talking to the bot.
    User,
    /// The bot itself.
    Bot,
}

/// Opaque identifier of a conversation participant.
///
/// The id is chosen by the transport (a chat user id, a phone number, the
/// bot's page id) and stays stable for the lifetime of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId {
    id: String,
    #[serde(rename = "type")]
    player_type: PlayerType,
}

impl PlayerId {
    /// Creates a player id with an explicit role.
    #[must_use]
    pub fn new(id: impl Into<String>, player_type: PlayerType) -> Self {
        Self {
            id: id.into(),
            player_type,
        }
    }

    /// Creates an end-user id.
    #[must_use]
    pub fn user(id: impl Into<String>) -> Self {
        Self::new(id, PlayerType::User)
    }

    /// Creates a bot id.
    #[must_use]
    pub fn bot(id: impl Into<String>) -> Self {
        Self::new(id, PlayerType::Bot)
    }

    /// Returns the raw transport id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the participant role.
    #[must_use]
    pub fn player_type(&self) -> PlayerType {
        self.player_type
    }

    /// Returns true if this participant is a bot.
    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.player_type == PlayerType::Bot
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match self.player_type {
            PlayerType::User => "user",
            PlayerType::Bot => "bot",
        };
        write!(f, "{role}:{}", self.id)
    }
}

/// Identifies a deployed bot configuration.
///
/// Scopes dialogs, i18n labels and entity types.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Creates an application id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ApplicationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ApplicationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_is_part_of_identity() {
        assert_ne!(PlayerId::user("42"), PlayerId::bot("42"));
        assert!(PlayerId::bot("42").is_bot());
    }

    #[test]
    fn display_includes_role() {
        assert_eq!(PlayerId::user("alice").to_string(), "user:alice");
        assert_eq!(PlayerId::bot("helper").to_string(), "bot:helper");
    }

    #[test]
    fn player_serializes_with_type_tag() {
        let json = serde_json::to_value(PlayerId::user("alice")).expect("serialize");
        assert_eq!(json, serde_json::json!({"id": "alice", "type": "user"}));
    }
}
