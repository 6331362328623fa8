//! The sample bot served by this binary.
//!
//! Three stories: a greeting, a help menu with quick replies, and an
//! unknown story that echoes what it did not understand. Sentences are
//! classified by keyword.

use async_trait::async_trait;
use parlance_core::UserInterfaceType;
use parlance_dialog::{Button, ConnectorMessage, NextUserActionState};
use parlance_engine::{BotBus, BotDefinition, HandlerError, StoryDefinition, StoryHandler};
use parlance_nlp::{IntentQualifier, NlpClient, NlpError, NlpQuery, NlpResult};
use rootcause::Report;
use std::sync::Arc;
use std::time::Duration;

use crate::web::WEB_CONNECTOR_TYPE;

pub const GREETINGS: &str = "greetings";
pub const HELP: &str = "help";
pub const UNKNOWN: &str = "unknown";

/// Builds the sample bot.
#[must_use]
pub fn sample_bot(bot_id: &str) -> BotDefinition {
    BotDefinition::new(
        bot_id,
        "sample",
        StoryDefinition::new(UNKNOWN, UNKNOWN, Arc::new(UnknownStory)),
    )
    .with_story(StoryDefinition::new(GREETINGS, GREETINGS, Arc::new(GreetingStory)))
    .with_story(StoryDefinition::new(HELP, HELP, Arc::new(HelpStory)))
}

struct GreetingStory;

#[async_trait]
impl StoryHandler for GreetingStory {
    async fn handle(&self, bus: &mut BotBus<'_>) -> Result<(), HandlerError> {
        let hello = bus
            .i18n("Hello, I am {0}.")
            .with_args([bus.bot_id().id()]);
        let hello = bus.translate(&hello).await;
        bus.send_text(hello, Duration::ZERO)?;

        let hint = bus.translate(&bus.i18n("Type help to see what I can do.")).await;
        bus.with_message_for(
            UserInterfaceType::has_voice,
            ConnectorMessage::voice("Say help to see what I can do."),
        );
        bus.end_text(hint, Duration::from_millis(300))?;
        Ok(())
    }
}

struct HelpStory;

#[async_trait]
impl StoryHandler for HelpStory {
    async fn handle(&self, bus: &mut BotBus<'_>) -> Result<(), HandlerError> {
        let text = bus.translate(&bus.i18n("I can say hello.")).await;
        bus.with_message(
            WEB_CONNECTOR_TYPE,
            ConnectorMessage::web(text.clone(), vec![Button::postback("Hello", GREETINGS)]),
        );
        bus.next_user_action_state(NextUserActionState::new(vec![IntentQualifier::new(
            GREETINGS, 0.5,
        )]));
        bus.end_text(text, Duration::ZERO)?;
        Ok(())
    }
}

struct UnknownStory;

#[async_trait]
impl StoryHandler for UnknownStory {
    async fn handle(&self, bus: &mut BotBus<'_>) -> Result<(), HandlerError> {
        let said = bus.user_text().unwrap_or_default().to_string();
        let key = bus
            .i18n("Sorry, I did not understand \"{0}\".")
            .with_args([said]);
        let text = bus.translate(&key).await;
        bus.end_text(text, Duration::ZERO)?;
        Ok(())
    }
}

/// Classifies a sentence by the first keyword it contains.
///
/// When nothing matches, the strongest expected intent of the query wins,
/// then `unknown`.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    keywords: Vec<(String, String)>,
}

impl KeywordClassifier {
    /// Creates a classifier from `(keyword, intent)` pairs.
    #[must_use]
    pub fn new<I, K, V>(keywords: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|(keyword, intent)| (keyword.into().to_lowercase(), intent.into()))
                .collect(),
        }
    }

    /// The keywords of the sample bot.
    #[must_use]
    pub fn sample() -> Self {
        Self::new([
            ("hello", GREETINGS),
            ("hi", GREETINGS),
            ("bonjour", GREETINGS),
            ("help", HELP),
            ("aide", HELP),
        ])
    }

    fn matches(&self, text: &str) -> Option<&str> {
        let text = text.to_lowercase();
        text.split(|c: char| !c.is_alphanumeric())
            .find_map(|word| {
                self.keywords
                    .iter()
                    .find(|(keyword, _)| keyword == word)
                    .map(|(_, intent)| intent.as_str())
            })
    }
}

#[async_trait]
impl NlpClient for KeywordClassifier {
    async fn parse(&self, query: &NlpQuery) -> Result<NlpResult, Report<NlpError>> {
        let (intent, intent_probability) = match self.matches(&query.text) {
            Some(intent) => (intent.to_string(), 1.0),
            None => query
                .intent_qualifiers
                .iter()
                .max_by(|a, b| a.modifier.total_cmp(&b.modifier))
                .map_or((UNKNOWN.to_string(), 0.0), |expected| {
                    (expected.intent.clone(), expected.modifier)
                }),
        };

        Ok(NlpResult {
            intent,
            intent_probability,
            entities: Vec::new(),
        })
    }
}
