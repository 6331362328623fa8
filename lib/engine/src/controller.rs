//! The conversation controller.
//!
//! Entry point of every inbound event. A turn runs under the
//! conversation's lock:
//!
//! 1. Load or create the dialog and the user's preferences
//! 2. Resolve the intent and entities of the user action
//! 3. Select the story and invoke its handler through a [`BotBus`]
//! 4. Replace the answers with the technical error answer if the handler
//!    failed, panicked or sent nothing; a failed handler's state changes
//!    are rolled back
//! 5. Commit the dialog
//!
//! The answers are then handed to the [`Dispatcher`] and the lock is
//! released without waiting for delivery.

use crate::bus::{BotBus, DispatchedAction, TurnScope};
use crate::config::EngineConfig;
use crate::definition::{BotDefinition, ErrorActionProvider, StoryDefinition};
use crate::dispatcher::{DeliveryHandle, Dispatcher};
use crate::error::{ControllerError, HandlerError};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use parlance_connector::{Connector, ConnectorCallback};
use parlance_core::DialogId;
use parlance_dialog::{
    Action, ActionPayload, DeliveryState, Dialog, DialogKey, DialogStore, EntityStateValue,
    Event, Story, TurnLocks, UserPreferences,
};
use parlance_nlp::{EntityEvaluators, NlpClient, NlpEntityValue, NlpQuery};
use parlance_translator::{I18nLabelKey, Translator};
use rootcause::prelude::*;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Label category of the technical error answer.
const ERROR_CATEGORY: &str = "error";

/// What a turn produced.
#[derive(Debug)]
pub struct TurnOutcome {
    /// The dialog of the turn, unless it could not be loaded.
    pub dialog_id: Option<DialogId>,
    /// The answers handed to the dispatcher, with their delays.
    pub dispatched: Vec<DispatchedAction>,
    /// True if the technical error answer replaced the handler's answers.
    pub fallback: bool,
    /// The delivery task of the answers.
    pub delivery: DeliveryHandle,
}

/// Result of the locked part of a turn.
struct TurnResult {
    dialog_id: DialogId,
    batch: Vec<DispatchedAction>,
    fallback: bool,
}

/// Orchestrates turns for one bot.
pub struct ConversationController {
    bot: Arc<BotDefinition>,
    store: Arc<dyn DialogStore>,
    translator: Arc<dyn Translator>,
    nlp: Option<Arc<dyn NlpClient>>,
    evaluators: EntityEvaluators,
    locks: TurnLocks,
    dispatcher: Dispatcher,
    config: EngineConfig,
}

impl ConversationController {
    /// Creates a controller without classifier.
    ///
    /// Without classifier only choices select stories; sentences go to the
    /// current story, or the unknown story.
    #[must_use]
    pub fn new(
        bot: Arc<BotDefinition>,
        store: Arc<dyn DialogStore>,
        translator: Arc<dyn Translator>,
        config: EngineConfig,
    ) -> Self {
        Self {
            bot,
            store,
            translator,
            nlp: None,
            evaluators: EntityEvaluators::new(),
            locks: TurnLocks::new(),
            dispatcher: Dispatcher::new(config.connector_send_timeout()),
            config,
        }
    }

    /// Sets the intent and entity classifier.
    #[must_use]
    pub fn with_nlp(mut self, nlp: Arc<dyn NlpClient>) -> Self {
        self.nlp = Some(nlp);
        self
    }

    /// Sets the evaluators valuing classified entities.
    #[must_use]
    pub fn with_evaluators(mut self, evaluators: EntityEvaluators) -> Self {
        self.evaluators = evaluators;
        self
    }

    /// Returns the bot served by the controller.
    #[must_use]
    pub fn bot(&self) -> &BotDefinition {
        &self.bot
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Handles an inbound event.
    ///
    /// Never fails: every error is logged and answered with the technical
    /// error answer.
    #[instrument(
        skip_all,
        fields(
            event_id = %event.id,
            application_id = %event.application_id,
            user_id = %event.player_id,
            connector_id = %callback.connector_id
        )
    )]
    pub async fn handle(
        &self,
        event: Event,
        connector: Arc<dyn Connector>,
        callback: ConnectorCallback,
    ) -> TurnOutcome {
        let key = event.dialog_key();
        let guard = self.locks.acquire(&key).await;
        let turn_start = Utc::now();
        let turn_clock = tokio::time::Instant::now();

        let (dialog_id, batch, fallback) = match self.run_turn(event, &callback, turn_start).await {
            Ok(turn) => (Some(turn.dialog_id), turn.batch, turn.fallback),
            Err(report) => {
                error!(error = %report, "turn failed before the story could run");
                let preferences = UserPreferences::new(self.config.default_locale.clone());
                let action = self
                    .error_answer(&key, &preferences, &callback, turn_start)
                    .await;
                (None, vec![action], true)
            }
        };

        let delivery = self
            .dispatcher
            .dispatch(batch.clone(), connector, callback, turn_clock);
        drop(guard);

        info!(answers = batch.len(), fallback, "turn handled");
        TurnOutcome {
            dialog_id,
            dispatched: batch,
            fallback,
            delivery,
        }
    }

    async fn run_turn(
        &self,
        event: Event,
        callback: &ConnectorCallback,
        turn_start: DateTime<Utc>,
    ) -> Result<TurnResult, Report<ControllerError>> {
        let key = event.dialog_key();
        let preferences = self
            .store
            .preferences(&event.player_id)
            .await
            .context(ControllerError::PreferencesUnavailable { key: key.clone() })?;
        let mut dialog = self
            .store
            .load_or_create(&key)
            .await
            .context(ControllerError::DialogUnavailable { key: key.clone() })?;

        let mut user_action = event.into_action();
        user_action.state.test_event = preferences.test;

        let entities = self
            .resolve_intent(&mut dialog, &user_action, &preferences, turn_start)
            .await;
        if let Some(text) = user_action.text_content() {
            for entity in &entities {
                dialog
                    .state
                    .set_entity_value(EntityStateValue::from_entity(entity, text, user_action.id));
            }
        }

        let story = self.select_story(&mut dialog);
        dialog.current_story.add_action(user_action.clone());
        let answered_from = dialog.current_story.actions.len();
        let state_before = dialog.state.clone();

        debug!(dialog_id = %dialog.id, story_id = %story.id, "invoking story");
        let (outcome, batch) = {
            let mut bus = BotBus::new(TurnScope {
                dialog: &mut dialog,
                bot: &self.bot,
                story,
                user_action: &user_action,
                connector_type: callback.connector_type.clone(),
                preferences: &preferences,
                translator: self.translator.as_ref(),
                config: &self.config,
                turn_start,
            });
            let outcome = invoke(story, &mut bus).await;
            (outcome, bus.into_dispatch_log())
        };

        let (batch, fallback) = match outcome {
            Ok(()) if !batch.is_empty() => (batch, false),
            Ok(()) => {
                warn!(story_id = %story.id, "story sent no answer, sending technical error");
                let answer = self
                    .error_answer(&key, &preferences, callback, turn_start)
                    .await;
                dialog.current_story.add_action(answer.action.clone());
                (vec![answer], true)
            }
            Err(e) => {
                error!(story_id = %story.id, error = %e, "story failed, sending technical error");
                dialog.current_story.truncate_actions(answered_from);
                dialog.state = state_before;
                let answer = self
                    .error_answer(&key, &preferences, callback, turn_start)
                    .await;
                dialog.current_story.add_action(answer.action.clone());
                (vec![answer], true)
            }
        };

        if let Err(report) = self
            .store
            .commit(&mut dialog)
            .await
            .context(ControllerError::CommitFailed {
                dialog_id: dialog.id,
            })
        {
            error!(error = %report, "dialog not committed, answers are still delivered");
        }

        Ok(TurnResult {
            dialog_id: dialog.id,
            batch,
            fallback,
        })
    }

    /// Sets the dialog's intent from the user action and returns the
    /// entities recognized in it.
    ///
    /// A pending next action state is consumed whatever the action is.
    async fn resolve_intent(
        &self,
        dialog: &mut Dialog,
        action: &Action,
        preferences: &UserPreferences,
        turn_start: DateTime<Utc>,
    ) -> Vec<NlpEntityValue> {
        let expectation = dialog.state.take_next_action_state();

        let (intent, entities) = match &action.payload {
            ActionPayload::Choice { intent, .. } => (Some(intent.clone()), Vec::new()),
            ActionPayload::Sentence { text: Some(text) } if !text.trim().is_empty() => {
                match &self.nlp {
                    Some(nlp) => {
                        let query = NlpQuery {
                            application_id: dialog.key.application_id.clone(),
                            text: text.clone(),
                            locale: preferences.locale.clone(),
                            reference_date: turn_start,
                            intent_qualifiers: expectation
                                .map(|state| state.intent_qualifiers)
                                .unwrap_or_default(),
                        };
                        match nlp.parse(&query).await {
                            Ok(result) => {
                                let entities = self
                                    .evaluators
                                    .resolve(
                                        &query.application_id,
                                        &query.locale,
                                        turn_start.fixed_offset(),
                                        text,
                                        result.entities,
                                    )
                                    .await;
                                (Some(result.intent), entities)
                            }
                            Err(report) => {
                                warn!(error = %report, "sentence classification failed");
                                (None, Vec::new())
                            }
                        }
                    }
                    None => (None, Vec::new()),
                }
            }
            _ => (None, Vec::new()),
        };

        dialog.state.current_intent = intent;
        entities
    }

    /// Selects the story for the dialog's intent, starting a new story
    /// segment when the current one does not support it.
    fn select_story(&self, dialog: &mut Dialog) -> &StoryDefinition {
        let current = dialog
            .current_story
            .definition_id
            .as_deref()
            .and_then(|id| self.bot.story(id));
        let intent = dialog.state.current_intent.clone();

        match (intent, current) {
            (Some(intent), Some(current)) if current.supports_intent(&intent) => current,
            (Some(intent), _) => {
                let definition = self.bot.find_story(&intent);
                dialog.start_story(Story::new(&definition.id, intent));
                definition
            }
            (None, Some(current)) => current,
            (None, None) => {
                let definition = self.bot.unknown_story();
                dialog.start_story(Story::new(&definition.id, &definition.starter_intent));
                definition
            }
        }
    }

    /// Builds the localized technical error answer.
    async fn error_answer(
        &self,
        key: &DialogKey,
        preferences: &UserPreferences,
        callback: &ConnectorCallback,
        turn_start: DateTime<Utc>,
    ) -> DispatchedAction {
        let mut action = self
            .bot
            .error_action(&key.bot_id, &key.application_id, &key.user_id);

        let default_text = action
            .text_content()
            .unwrap_or(&self.config.error_default_text)
            .to_string();
        let label = I18nLabelKey::with_id(
            &self.config.error_label,
            self.bot.namespace(),
            ERROR_CATEGORY,
            default_text,
        );
        let text = self
            .translator
            .translate(&label, &preferences.locale, callback.user_interface_type())
            .await;

        action.payload = ActionPayload::Sentence { text: Some(text) };
        action.metadata.last_answer = true;
        action.metadata.delivery = DeliveryState::Dispatched;
        action.state.test_event = preferences.test;
        action.date = turn_start;

        DispatchedAction {
            action,
            delay: Duration::ZERO,
        }
    }
}

/// Runs a story handler, turning a panic into a [`HandlerError`].
async fn invoke(story: &StoryDefinition, bus: &mut BotBus<'_>) -> Result<(), HandlerError> {
    match AssertUnwindSafe(story.handler.handle(bus)).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(HandlerError::StoryPanicked {
            story_id: story.id.clone(),
            message: panic_message(panic.as_ref()),
        }),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
