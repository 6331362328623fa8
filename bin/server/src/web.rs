//! JSON over HTTP connector.
//!
//! A `POST` to the configured path carries one user event. The request
//! stays open while the engine answers: delivered actions are collected
//! from the callback's reply channel until the last answer arrives, the
//! turn's delivery task finishes, or the response budget runs out.

use crate::app::AppState;
use async_trait::async_trait;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use parlance_connector::{Connector, ConnectorCallback, ConnectorError};
use parlance_core::{ActionId, ConnectorType, PlayerId, UserInterfaceType};
use parlance_dialog::{Action, ActionPayload, ActionSignificance, ConnectorMessage, Event};
use rootcause::Report;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Connector type id of the web transport.
pub const WEB_CONNECTOR_TYPE: &str = "web";

/// Hands delivered actions back to the HTTP request waiting for them.
#[derive(Debug, Default)]
pub struct WebConnector;

impl WebConnector {
    /// Creates the connector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WebConnector {
    fn connector_type(&self) -> ConnectorType {
        ConnectorType::new(WEB_CONNECTOR_TYPE, UserInterfaceType::TextChat)
    }

    async fn send(
        &self,
        action: Action,
        callback: &ConnectorCallback,
        _delay: Duration,
    ) -> Result<(), Report<ConnectorError>> {
        debug!(action_id = %action.id, "replying on web request");
        callback.reply(action)
    }
}

/// Choice made by tapping a button.
#[derive(Debug, Clone, Deserialize)]
pub struct WebChoice {
    pub intent: String,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

/// Body of an inbound web event.
#[derive(Debug, Clone, Deserialize)]
pub struct WebRequest {
    pub user_id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub choice: Option<WebChoice>,
    /// Locale to remember for the user.
    #[serde(default)]
    pub locale: Option<String>,
}

/// One bot answer as rendered for the web.
#[derive(Debug, Clone, Serialize)]
pub struct WebAnswer {
    pub id: ActionId,
    #[serde(flatten)]
    pub payload: ActionPayload,
    pub significance: ActionSignificance,
    pub last_answer: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<ConnectorMessage>,
}

impl WebAnswer {
    fn render(connector: &dyn Connector, action: &Action) -> Self {
        Self {
            id: action.id,
            payload: action.payload.clone(),
            significance: action.metadata.significance,
            last_answer: action.metadata.last_answer,
            messages: connector.messages_for(action).into_iter().cloned().collect(),
        }
    }
}

/// Body of the reply to a web event.
#[derive(Debug, Clone, Serialize)]
pub struct WebResponse {
    pub responses: Vec<WebAnswer>,
}

/// Errors answered to web clients.
#[derive(Debug)]
pub enum WebError {
    /// The request carries neither text nor choice.
    EmptyEvent,
    /// The web connector is not registered.
    ConnectorUnavailable(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::EmptyEvent => (
                StatusCode::BAD_REQUEST,
                "Request needs either a text or a choice",
            ),
            Self::ConnectorUnavailable(msg) => {
                tracing::error!("Web connector unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Connector unavailable")
            }
        };

        (status, message).into_response()
    }
}

/// Receives one user event and answers with the bot's responses.
pub async fn receive(
    State(state): State<Arc<AppState>>,
    Json(request): Json<WebRequest>,
) -> Result<Json<WebResponse>, WebError> {
    let registered = state
        .registry
        .get(&state.web.connector_id)
        .await
        .map_err(|report| WebError::ConnectorUnavailable(report.to_string()))?;
    let configuration = &registered.configuration;

    let payload = match (request.choice, request.text) {
        (Some(choice), _) => ActionPayload::Choice {
            intent: choice.intent,
            parameters: choice.parameters,
        },
        (None, Some(text)) => ActionPayload::Sentence { text: Some(text) },
        (None, None) => return Err(WebError::EmptyEvent),
    };
    let user_id = PlayerId::user(request.user_id);

    if let Some(locale) = request.locale {
        state.remember_locale(&user_id, &locale).await;
    }

    let event = Event::new(
        user_id,
        configuration.bot_id.clone(),
        configuration.application_id.clone(),
        payload,
    );

    let (replies, mut answers) = mpsc::unbounded_channel();
    let callback = ConnectorCallback::new(
        configuration.connector_id.clone(),
        configuration.application_id.clone(),
        configuration.connector_type.clone(),
    )
    .with_reply_channel(replies);

    let connector = Arc::clone(&registered.connector);
    let outcome = state
        .controller
        .handle(event, Arc::clone(&connector), callback)
        .await;

    let deadline = tokio::time::Instant::now() + state.web.response_timeout();
    let mut responses = Vec::with_capacity(outcome.dispatched.len());
    loop {
        match tokio::time::timeout_at(deadline, answers.recv()).await {
            Ok(Some(action)) => {
                let last = action.is_last_answer();
                responses.push(WebAnswer::render(connector.as_ref(), &action));
                if last {
                    break;
                }
            }
            Ok(None) => break,
            Err(_) => {
                warn!(
                    received = responses.len(),
                    expected = outcome.dispatched.len(),
                    "web response budget exhausted"
                );
                break;
            }
        }
    }

    Ok(Json(WebResponse { responses }))
}
