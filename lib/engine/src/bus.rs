//! The action bus.
//!
//! A story handler answers through a [`BotBus`] scoped to one turn. The bus
//! keeps a running delay: every answer is scheduled at the sum of the
//! delays requested so far, so answers leave in the order they were
//! issued. The last answer of a turn is sent with [`BotBus::end`]; nothing
//! can be sent after it.

use crate::config::EngineConfig;
use crate::context::TurnContext;
use crate::definition::{BotDefinition, StoryDefinition};
use crate::error::BusError;
use chrono::{DateTime, Utc};
use parlance_core::{ApplicationId, ConnectorType, Locale, PlayerId, UserInterfaceType};
use parlance_dialog::{
    Action, ActionSignificance, ConnectorMessage, DeliveryState, Dialog, EntityStateValue,
    NextUserActionState, UserPreferences,
};
use parlance_nlp::Value;
use parlance_translator::{I18nLabelKey, Translator};
use std::time::Duration;
use tracing::debug;

/// An answer handed to the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchedAction {
    pub action: Action,
    /// Offset from the start of the turn.
    pub delay: Duration,
}

/// Everything a bus needs from the turn that owns it.
pub(crate) struct TurnScope<'a> {
    pub dialog: &'a mut Dialog,
    pub bot: &'a BotDefinition,
    pub story: &'a StoryDefinition,
    pub user_action: &'a Action,
    pub connector_type: ConnectorType,
    pub preferences: &'a UserPreferences,
    pub translator: &'a dyn Translator,
    pub config: &'a EngineConfig,
    pub turn_start: DateTime<Utc>,
}

/// The handler side of one turn.
pub struct BotBus<'a> {
    scope: TurnScope<'a>,
    current_delay: Duration,
    significance: ActionSignificance,
    pending_messages: Vec<ConnectorMessage>,
    context: TurnContext,
    dispatch_log: Vec<DispatchedAction>,
    ended: bool,
}

impl<'a> BotBus<'a> {
    pub(crate) fn new(scope: TurnScope<'a>) -> Self {
        Self {
            scope,
            current_delay: Duration::ZERO,
            significance: ActionSignificance::default(),
            pending_messages: Vec::new(),
            context: TurnContext::new(),
            dispatch_log: Vec::new(),
            ended: false,
        }
    }

    /// Returns the user of the conversation.
    #[must_use]
    pub fn user_id(&self) -> &PlayerId {
        &self.scope.dialog.key.user_id
    }

    /// Returns the bot of the conversation.
    #[must_use]
    pub fn bot_id(&self) -> &PlayerId {
        &self.scope.dialog.key.bot_id
    }

    /// Returns the application the conversation belongs to.
    #[must_use]
    pub fn application_id(&self) -> &ApplicationId {
        &self.scope.dialog.key.application_id
    }

    /// Returns the user's locale.
    #[must_use]
    pub fn locale(&self) -> &Locale {
        &self.scope.preferences.locale
    }

    /// Returns the transport the user talks through.
    #[must_use]
    pub fn connector_type(&self) -> &ConnectorType {
        &self.scope.connector_type
    }

    /// Returns the interface type of the user's transport.
    #[must_use]
    pub fn user_interface_type(&self) -> UserInterfaceType {
        self.scope.connector_type.user_interface_type
    }

    /// Returns the action the user sent this turn.
    #[must_use]
    pub fn user_action(&self) -> &Action {
        self.scope.user_action
    }

    /// Returns the text the user sent this turn, if any.
    #[must_use]
    pub fn user_text(&self) -> Option<&str> {
        self.scope.user_action.text_content()
    }

    /// Returns the current intent of the dialog.
    #[must_use]
    pub fn intent(&self) -> Option<&str> {
        self.scope.dialog.state.current_intent.as_deref()
    }

    /// Returns the story definition handling the turn.
    #[must_use]
    pub fn story(&self) -> &StoryDefinition {
        self.scope.story
    }

    /// Returns the value held for an entity role.
    #[must_use]
    pub fn entity_value(&self, role: &str) -> Option<&Value> {
        self.scope
            .dialog
            .state
            .entity_value(role)
            .and_then(|state| state.value.as_ref())
    }

    /// Sets the value of an entity role, replacing any earlier one.
    pub fn change_entity_value(&mut self, role: &str, value: Value) {
        let entity_type = self
            .scope
            .dialog
            .state
            .entity_value(role)
            .map(|state| state.entity_type.clone())
            .unwrap_or_else(|| value_entity_type(&value));
        self.scope.dialog.state.set_entity_value(EntityStateValue::with_value(
            role,
            entity_type,
            value,
            self.scope.user_action.id,
        ));
    }

    /// Forgets the value of an entity role.
    pub fn remove_entity_value(&mut self, role: &str) {
        self.scope.dialog.state.remove_entity_value(role);
    }

    /// Leaves an expectation for the next user action.
    pub fn next_user_action_state(&mut self, state: NextUserActionState) {
        self.scope.dialog.state.next_action_state = Some(state);
    }

    /// Returns the per-turn context.
    #[must_use]
    pub fn context(&self) -> &TurnContext {
        &self.context
    }

    /// Returns the per-turn context for modification.
    pub fn context_mut(&mut self) -> &mut TurnContext {
        &mut self.context
    }

    /// Sets the significance of the following answers.
    pub fn with_significance(&mut self, significance: ActionSignificance) -> &mut Self {
        self.significance = significance;
        self
    }

    /// Attaches `message` to the next answer when the user talks through
    /// the connector `connector_id`.
    pub fn with_message(&mut self, connector_id: &str, message: ConnectorMessage) -> &mut Self {
        if self.scope.connector_type.id == connector_id {
            self.pending_messages.push(message);
        }
        self
    }

    /// Attaches `message` to the next answer when the user's interface
    /// satisfies `accepts`.
    pub fn with_message_for(
        &mut self,
        accepts: impl Fn(UserInterfaceType) -> bool,
        message: ConnectorMessage,
    ) -> &mut Self {
        if accepts(self.user_interface_type()) {
            self.pending_messages.push(message);
        }
        self
    }

    /// Sends an answer `delay` after the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::TurnEnded`] after [`BotBus::end`].
    pub fn send(&mut self, action: Action, delay: Duration) -> Result<(), BusError> {
        self.answer(action, delay, false)
    }

    /// Sends the last answer of the turn `delay` after the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::TurnEnded`] if the turn already ended.
    pub fn end(&mut self, action: Action, delay: Duration) -> Result<(), BusError> {
        self.answer(action, delay, true)
    }

    /// Sends a text answer.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::TurnEnded`] after [`BotBus::end`].
    pub fn send_text(&mut self, text: impl Into<String>, delay: Duration) -> Result<(), BusError> {
        let action = self.text_action(text);
        self.send(action, delay)
    }

    /// Sends a text as the last answer of the turn.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::TurnEnded`] if the turn already ended.
    pub fn end_text(&mut self, text: impl Into<String>, delay: Duration) -> Result<(), BusError> {
        let action = self.text_action(text);
        self.end(action, delay)
    }

    /// Creates a text action from the bot to the user.
    #[must_use]
    pub fn text_action(&self, text: impl Into<String>) -> Action {
        Action::text(
            self.bot_id().clone(),
            self.application_id().clone(),
            self.user_id().clone(),
            text,
        )
    }

    /// Returns a label key in the bot's namespace, categorized by story.
    #[must_use]
    pub fn i18n(&self, default_label: impl Into<String>) -> I18nLabelKey {
        I18nLabelKey::new(self.scope.bot.namespace(), &self.scope.story.id, default_label)
    }

    /// Translates a label for the user's locale and interface.
    pub async fn translate(&self, key: &I18nLabelKey) -> String {
        self.scope
            .translator
            .translate(key, self.locale(), self.user_interface_type())
            .await
    }

    /// Returns true once the last answer was sent.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Returns the answers sent so far with their computed delays.
    #[must_use]
    pub fn dispatch_log(&self) -> &[DispatchedAction] {
        &self.dispatch_log
    }

    pub(crate) fn into_dispatch_log(self) -> Vec<DispatchedAction> {
        self.dispatch_log
    }

    fn answer(&mut self, mut action: Action, delay: Duration, last: bool) -> Result<(), BusError> {
        if self.ended {
            return Err(BusError::TurnEnded);
        }

        self.current_delay = (self.current_delay + delay).min(self.scope.config.max_turn_delay());

        action.metadata.last_answer = last;
        action.metadata.significance = self.significance;
        action.metadata.delivery = DeliveryState::Dispatched;
        action.state.test_event = self.scope.preferences.test;
        action.messages.append(&mut self.pending_messages);
        action.date = self.scope.turn_start
            + chrono::Duration::from_std(self.current_delay).unwrap_or(chrono::Duration::zero());

        debug!(
            action_id = %action.id,
            delay_ms = self.current_delay.as_millis() as u64,
            last_answer = last,
            "answer queued"
        );

        self.scope.dialog.current_story.add_action(action.clone());
        self.dispatch_log.push(DispatchedAction {
            action,
            delay: self.current_delay,
        });
        self.ended = last;
        Ok(())
    }
}

/// Entity type of a value set by a handler without prior extraction.
fn value_entity_type(value: &Value) -> parlance_nlp::EntityType {
    let dimension = match value {
        Value::Number { .. } => "number",
        Value::Ordinal { .. } => "ordinal",
        Value::Date(_) | Value::DateInterval { .. } => "datetime",
        Value::AmountOfMoney { .. } => "amount-of-money",
        Value::Distance { .. } => "distance",
        Value::Temperature { .. } => "temperature",
        Value::Volume { .. } => "volume",
        Value::Url { .. } => "url",
        Value::Email { .. } => "email",
        Value::PhoneNumber { .. } => "phone-number",
    };
    parlance_nlp::EntityType::builtin(dimension)
}
