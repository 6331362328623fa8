//! Bot and story definitions.
//!
//! A bot is a set of stories. Each story starts on one intent, may
//! continue on a few others, and is driven by a [`StoryHandler`] that
//! answers through the [`BotBus`].

use crate::bus::BotBus;
use crate::error::HandlerError;
use async_trait::async_trait;
use parlance_core::{ApplicationId, PlayerId};
use parlance_dialog::{Action, ActionPayload};
use std::fmt;
use std::sync::Arc;

/// Business logic of a story.
#[async_trait]
pub trait StoryHandler: Send + Sync {
    /// Handles one user action of the story.
    ///
    /// # Errors
    ///
    /// Returns an error if the story cannot answer. The controller then
    /// discards the answers sent so far and sends the technical error
    /// answer instead.
    async fn handle(&self, bus: &mut BotBus<'_>) -> Result<(), HandlerError>;
}

/// Builds the answer sent when a turn fails.
pub trait ErrorActionProvider: Send + Sync {
    /// Returns the technical error answer from `sender` to `recipient`.
    fn error_action(
        &self,
        sender: &PlayerId,
        application_id: &ApplicationId,
        recipient: &PlayerId,
    ) -> Action;
}

/// A story of a bot.
#[derive(Clone)]
pub struct StoryDefinition {
    /// Unique id within the bot.
    pub id: String,
    /// The intent that starts the story.
    pub starter_intent: String,
    /// Other intents that continue the story once started.
    pub other_intents: Vec<String>,
    pub handler: Arc<dyn StoryHandler>,
}

impl StoryDefinition {
    /// Creates a story started by `starter_intent`.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        starter_intent: impl Into<String>,
        handler: Arc<dyn StoryHandler>,
    ) -> Self {
        Self {
            id: id.into(),
            starter_intent: starter_intent.into(),
            other_intents: Vec::new(),
            handler,
        }
    }

    /// Adds an intent that continues the story.
    #[must_use]
    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.other_intents.push(intent.into());
        self
    }

    /// Returns true if `intent` starts or continues the story.
    #[must_use]
    pub fn supports_intent(&self, intent: &str) -> bool {
        self.starter_intent == intent || self.other_intents.iter().any(|i| i == intent)
    }
}

impl fmt::Debug for StoryDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoryDefinition")
            .field("id", &self.id)
            .field("starter_intent", &self.starter_intent)
            .field("other_intents", &self.other_intents)
            .finish_non_exhaustive()
    }
}

/// The configuration of a bot.
#[derive(Debug, Clone)]
pub struct BotDefinition {
    bot_id: String,
    namespace: String,
    stories: Vec<StoryDefinition>,
    unknown_story: StoryDefinition,
    error_text: Option<String>,
}

impl BotDefinition {
    /// Creates a bot answering unrecognized sentences with `unknown_story`.
    #[must_use]
    pub fn new(
        bot_id: impl Into<String>,
        namespace: impl Into<String>,
        unknown_story: StoryDefinition,
    ) -> Self {
        Self {
            bot_id: bot_id.into(),
            namespace: namespace.into(),
            stories: Vec::new(),
            unknown_story,
            error_text: None,
        }
    }

    /// Adds a story.
    #[must_use]
    pub fn with_story(mut self, story: StoryDefinition) -> Self {
        self.stories.push(story);
        self
    }

    /// Sets the default text of the technical error answer.
    #[must_use]
    pub fn with_error_text(mut self, text: impl Into<String>) -> Self {
        self.error_text = Some(text.into());
        self
    }

    /// Returns the bot id.
    #[must_use]
    pub fn bot_id(&self) -> &str {
        &self.bot_id
    }

    /// Returns the namespace owning the bot's labels.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the stories, without the unknown story.
    #[must_use]
    pub fn stories(&self) -> &[StoryDefinition] {
        &self.stories
    }

    /// Returns the story answering unrecognized sentences.
    #[must_use]
    pub fn unknown_story(&self) -> &StoryDefinition {
        &self.unknown_story
    }

    /// Returns a story by id.
    #[must_use]
    pub fn story(&self, id: &str) -> Option<&StoryDefinition> {
        if self.unknown_story.id == id {
            return Some(&self.unknown_story);
        }
        self.stories.iter().find(|story| story.id == id)
    }

    /// Returns the story to start for an intent.
    ///
    /// A story started by the intent wins over one only continued by it;
    /// the unknown story answers everything else.
    #[must_use]
    pub fn find_story(&self, intent: &str) -> &StoryDefinition {
        self.stories
            .iter()
            .find(|story| story.starter_intent == intent)
            .or_else(|| self.stories.iter().find(|story| story.supports_intent(intent)))
            .unwrap_or(&self.unknown_story)
    }
}

impl ErrorActionProvider for BotDefinition {
    fn error_action(
        &self,
        sender: &PlayerId,
        application_id: &ApplicationId,
        recipient: &PlayerId,
    ) -> Action {
        let mut action = Action::new(
            sender.clone(),
            application_id.clone(),
            recipient.clone(),
            ActionPayload::Sentence {
                text: self.error_text.clone(),
            },
        );
        action.metadata.last_answer = true;
        action
    }
}
