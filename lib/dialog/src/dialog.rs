//! Dialogs and stories.
//!
//! A [`Dialog`] is the whole conversation between one user and one bot
//! of an application. It is split into [`Story`] segments, one per topic;
//! the last segment is the current story and receives new actions.

use crate::action::Action;
use crate::entity::EntityStateValue;
use chrono::{DateTime, Utc};
use parlance_core::{ApplicationId, DialogId, PlayerId, StoryId};
use parlance_nlp::IntentQualifier;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifies a conversation: the ordered player pair plus the application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DialogKey {
    pub user_id: PlayerId,
    pub bot_id: PlayerId,
    pub application_id: ApplicationId,
}

impl DialogKey {
    /// Creates a key.
    #[must_use]
    pub fn new(user_id: PlayerId, bot_id: PlayerId, application_id: ApplicationId) -> Self {
        Self {
            user_id,
            bot_id,
            application_id,
        }
    }
}

impl fmt::Display for DialogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.application_id, self.user_id, self.bot_id)
    }
}

/// One topic segment of a dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    /// The story definition handling this segment, once one was selected.
    pub definition_id: Option<String>,
    /// The intent that started the segment.
    pub starter_intent: Option<String>,
    /// Inbound and outbound actions, in send order.
    pub actions: Vec<Action>,
}

impl Story {
    /// Creates an empty story not yet bound to a definition.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            id: StoryId::new(),
            definition_id: None,
            starter_intent: None,
            actions: Vec::new(),
        }
    }

    /// Creates a story handled by a definition.
    #[must_use]
    pub fn new(definition_id: impl Into<String>, starter_intent: impl Into<String>) -> Self {
        Self {
            id: StoryId::new(),
            definition_id: Some(definition_id.into()),
            starter_intent: Some(starter_intent.into()),
            actions: Vec::new(),
        }
    }

    /// Appends an action.
    pub fn add_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Drops every action after the first `len`.
    pub fn truncate_actions(&mut self, len: usize) {
        self.actions.truncate(len);
    }

    /// Returns the last action, if any.
    #[must_use]
    pub fn last_action(&self) -> Option<&Action> {
        self.actions.last()
    }

    /// Returns true if no action was recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// An expectation a turn leaves for the next user action.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NextUserActionState {
    /// Intents the next sentence is biased toward.
    pub intent_qualifiers: Vec<IntentQualifier>,
}

impl NextUserActionState {
    /// Creates a state expecting the given intents.
    #[must_use]
    pub fn new(intent_qualifiers: Vec<IntentQualifier>) -> Self {
        Self { intent_qualifiers }
    }
}

/// The mutable state of a dialog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DialogState {
    pub current_intent: Option<String>,
    /// Entity values keyed by role.
    pub entity_values: HashMap<String, EntityStateValue>,
    /// Set by a handler, consumed by the next turn.
    pub next_action_state: Option<NextUserActionState>,
}

impl DialogState {
    /// Stores a value for its role, replacing any earlier one.
    pub fn set_entity_value(&mut self, value: EntityStateValue) {
        self.entity_values.insert(value.role.clone(), value);
    }

    /// Returns the value held for a role.
    #[must_use]
    pub fn entity_value(&self, role: &str) -> Option<&EntityStateValue> {
        self.entity_values.get(role)
    }

    /// Removes the value held for a role.
    pub fn remove_entity_value(&mut self, role: &str) -> Option<EntityStateValue> {
        self.entity_values.remove(role)
    }

    /// Takes the pending expectation, leaving none.
    pub fn take_next_action_state(&mut self) -> Option<NextUserActionState> {
        self.next_action_state.take()
    }
}

/// A conversation between one user and one bot of an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dialog {
    pub id: DialogId,
    pub key: DialogKey,
    /// Finished stories, oldest first.
    pub history: Vec<Story>,
    pub current_story: Story,
    pub state: DialogState,
    /// Incremented on every commit.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
}

impl Dialog {
    /// Creates an empty dialog with a fresh initial story.
    #[must_use]
    pub fn new(key: DialogKey) -> Self {
        let now = Utc::now();
        Self {
            id: DialogId::new(),
            key,
            history: Vec::new(),
            current_story: Story::initial(),
            state: DialogState::default(),
            version: 0,
            created_at: now,
            last_update: now,
        }
    }

    /// Makes `story` the current story.
    ///
    /// A current story that never received an action is replaced rather
    /// than archived.
    pub fn start_story(&mut self, story: Story) {
        let previous = std::mem::replace(&mut self.current_story, story);
        if !previous.is_empty() {
            self.history.push(previous);
        }
    }

    /// Returns every story, oldest first, the current story last.
    pub fn stories(&self) -> impl Iterator<Item = &Story> {
        self.history.iter().chain(std::iter::once(&self.current_story))
    }

    /// Returns every action of the dialog, in order.
    pub fn all_actions(&self) -> impl Iterator<Item = &Action> {
        self.stories().flat_map(|story| story.actions.iter())
    }

    /// Returns the last action of the dialog, if any.
    #[must_use]
    pub fn last_action(&self) -> Option<&Action> {
        self.current_story
            .last_action()
            .or_else(|| self.history.iter().rev().find_map(Story::last_action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlance_nlp::{EntityType, Value};

    fn key() -> DialogKey {
        DialogKey::new(
            PlayerId::user("alice"),
            PlayerId::bot("helper"),
            ApplicationId::new("travel"),
        )
    }

    fn text(content: &str) -> Action {
        Action::text(
            PlayerId::bot("helper"),
            ApplicationId::new("travel"),
            PlayerId::user("alice"),
            content,
        )
    }

    #[test]
    fn new_dialog_has_one_empty_story() {
        let dialog = Dialog::new(key());
        assert_eq!(dialog.stories().count(), 1);
        assert!(dialog.current_story.is_empty());
        assert_eq!(dialog.version, 0);
    }

    #[test]
    fn start_story_archives_non_empty_story() {
        let mut dialog = Dialog::new(key());
        dialog.current_story.add_action(text("hello"));

        dialog.start_story(Story::new("booking", "book"));
        dialog.current_story.add_action(text("where to?"));

        assert_eq!(dialog.history.len(), 1);
        assert_eq!(dialog.all_actions().count(), 2);
        assert_eq!(
            dialog.last_action().and_then(Action::text_content),
            Some("where to?")
        );
    }

    #[test]
    fn start_story_replaces_empty_story() {
        let mut dialog = Dialog::new(key());
        dialog.start_story(Story::new("booking", "book"));

        assert!(dialog.history.is_empty());
        assert_eq!(
            dialog.current_story.definition_id.as_deref(),
            Some("booking")
        );
    }

    #[test]
    fn entity_values_are_overwritten_per_role() {
        let mut state = DialogState::default();
        let number = EntityType::builtin("number");
        state.set_entity_value(EntityStateValue::with_value(
            "passengers",
            number.clone(),
            Value::Number { value: 2.0 },
            parlance_core::ActionId::new(),
        ));
        state.set_entity_value(EntityStateValue::with_value(
            "passengers",
            number,
            Value::Number { value: 4.0 },
            parlance_core::ActionId::new(),
        ));

        assert_eq!(state.entity_values.len(), 1);
        assert_eq!(
            state.entity_value("passengers").and_then(|v| v.value.clone()),
            Some(Value::Number { value: 4.0 })
        );
    }

    #[test]
    fn next_action_state_is_consumed_once() {
        let mut state = DialogState {
            next_action_state: Some(NextUserActionState::new(vec![IntentQualifier::new(
                "confirm", 0.3,
            )])),
            ..DialogState::default()
        };

        assert!(state.take_next_action_state().is_some());
        assert!(state.take_next_action_state().is_none());
    }

    #[test]
    fn key_display_names_application_and_players() {
        assert_eq!(key().to_string(), "travel/user:alice/bot:helper");
    }
}
