//! Application state and HTTP routes.

use crate::bot::{KeywordClassifier, sample_bot};
use crate::config::ServerConfig;
use crate::web::{self, WEB_CONNECTOR_TYPE, WebConnector};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use parlance_connector::{
    ConnectorConfiguration, ConnectorError, ConnectorHealth, ConnectorRegistry,
};
use parlance_core::{ApplicationId, ConnectorType, Locale, PlayerId, UserInterfaceType};
use parlance_dialog::{DialogStore, InMemoryDialogStore};
use parlance_engine::ConversationController;
use parlance_translator::{InMemoryI18nStore, LabelTranslator};
use rootcause::Report;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::WebConnectorConfig;

/// Shared application state.
pub struct AppState {
    pub controller: Arc<ConversationController>,
    pub registry: Arc<ConnectorRegistry>,
    pub store: Arc<dyn DialogStore>,
    pub web: WebConnectorConfig,
}

impl AppState {
    /// Wires the sample bot to in-memory storage and registers the web
    /// connector.
    ///
    /// # Errors
    ///
    /// Returns an error if the web connector id is already registered.
    pub async fn build(config: &ServerConfig) -> Result<Arc<Self>, Report<ConnectorError>> {
        let store: Arc<dyn DialogStore> = Arc::new(InMemoryDialogStore::new());
        let translator = LabelTranslator::new(Arc::new(InMemoryI18nStore::new()));
        let controller = ConversationController::new(
            Arc::new(sample_bot(&config.web.bot_id)),
            Arc::clone(&store),
            Arc::new(translator),
            config.engine.clone(),
        )
        .with_nlp(Arc::new(KeywordClassifier::sample()));

        let registry = Arc::new(ConnectorRegistry::new());
        registry
            .register(
                ConnectorConfiguration {
                    connector_id: config.web.connector_id.clone(),
                    path: config.web.path.clone(),
                    connector_type: ConnectorType::new(
                        WEB_CONNECTOR_TYPE,
                        UserInterfaceType::TextChat,
                    ),
                    application_id: ApplicationId::new(&config.web.application_id),
                    bot_id: PlayerId::bot(&config.web.bot_id),
                },
                Arc::new(WebConnector::new()),
            )
            .await?;

        Ok(Arc::new(Self {
            controller: Arc::new(controller),
            registry,
            store,
            web: config.web.clone(),
        }))
    }

    /// Saves the locale a user talks in.
    pub async fn remember_locale(&self, user_id: &PlayerId, locale: &str) {
        let locale = Locale::new(locale);
        let result = match self.store.preferences(user_id).await {
            Ok(mut preferences) if preferences.locale != locale => {
                preferences.locale = locale;
                self.store.save_preferences(user_id, preferences).await
            }
            Ok(_) => Ok(()),
            Err(report) => Err(report),
        };
        if let Err(report) = result {
            warn!(user_id = %user_id, error = %report, "user locale not saved");
        }
    }
}

/// Builds the router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(&state.web.path, post(web::receive))
        .route("/healthz", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health of the process and its connectors.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub connectors: BTreeMap<String, ConnectorHealth>,
}

async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthReport>) {
    let connectors: BTreeMap<String, ConnectorHealth> =
        state.registry.health().await.into_iter().collect();
    let healthy = connectors.values().all(ConnectorHealth::is_healthy);

    let (status, label) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    (
        status,
        Json(HealthReport {
            status: label,
            connectors,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::util::ServiceExt;

    async fn state() -> Arc<AppState> {
        let config: ServerConfig = config::Config::builder()
            .build()
            .expect("config")
            .try_deserialize()
            .expect("defaults");
        AppState::build(&config).await.expect("state")
    }

    async fn post(router: Router, body: Value) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/io/web")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn greeting_returns_every_answer_until_the_last() {
        let router = router(state().await);

        let (status, body) = post(router, json!({"user_id": "alice", "text": "hello"})).await;

        assert_eq!(status, StatusCode::OK);
        let responses = body["responses"].as_array().expect("responses");
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["text"], "Hello, I am parlance.");
        assert_eq!(responses[0]["last_answer"], false);
        assert_eq!(responses[1]["last_answer"], true);
    }

    #[tokio::test]
    async fn help_carries_quick_replies() {
        let router = router(state().await);

        let (_, body) = post(router, json!({"user_id": "alice", "text": "help"})).await;

        let responses = body["responses"].as_array().expect("responses");
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["messages"][0]["kind"], "web");
        assert_eq!(
            responses[0]["messages"][0]["quick_replies"][0]["intent"],
            "greetings"
        );
    }

    #[tokio::test]
    async fn choice_selects_the_story() {
        let router = router(state().await);

        let (_, body) = post(
            router,
            json!({"user_id": "alice", "choice": {"intent": "greetings"}}),
        )
        .await;

        assert_eq!(body["responses"][0]["text"], "Hello, I am parlance.");
    }

    #[tokio::test]
    async fn unknown_sentence_is_echoed() {
        let router = router(state().await);

        let (_, body) = post(router, json!({"user_id": "alice", "text": "weather?"})).await;

        assert_eq!(
            body["responses"][0]["text"],
            "Sorry, I did not understand \"weather?\"."
        );
    }

    #[tokio::test]
    async fn empty_event_is_rejected() {
        let router = router(state().await);

        let (status, _) = post(router, json!({"user_id": "alice"})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unregistered_connector_is_unavailable() {
        let state = state().await;
        state.registry.clear().await;

        let (status, _) = post(router(state), json!({"user_id": "alice", "text": "hi"})).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn locale_is_remembered() {
        let state = state().await;

        post(
            router(Arc::clone(&state)),
            json!({"user_id": "alice", "text": "bonjour", "locale": "fr-FR"}),
        )
        .await;

        let preferences = state
            .store
            .preferences(&PlayerId::user("alice"))
            .await
            .expect("preferences");
        assert_eq!(preferences.locale, Locale::new("fr-FR"));
    }

    #[tokio::test]
    async fn health_lists_connectors() {
        let router = router(state().await);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["status"], "ok");
        assert_eq!(body["connectors"]["web"]["status"], "healthy");
    }
}
