//! HTTP server for Backlog webhooks.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{any, get},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::backlog::{BacklogClient, TrackerApi};
use crate::config::Config;
use crate::directory::resolve_directories;
use crate::error::{BridgeError, ClientError};
use crate::format::format_message;
use crate::mentions::resolve_mentions;
use crate::models::{PostResult, WebhookEvent};
use crate::slack::{ChatApi, SlackClient};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Backlog API client.
    pub tracker: Arc<dyn TrackerApi>,
    /// Slack API client.
    pub chat: Arc<dyn ChatApi>,
    /// Backlog space URL used for issue links.
    pub backlog_base_url: String,
}

impl AppState {
    /// Build the production clients from configuration.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let tracker = BacklogClient::new(&config.backlog_base_url, &config.backlog_api_key)?;
        let chat = SlackClient::new(&config.slack_api_url, &config.slack_token)?;

        Ok(Self {
            backlog_base_url: tracker.base_url().to_string(),
            tracker: Arc::new(tracker),
            chat: Arc::new(chat),
        })
    }
}

/// Target channel: the first `channelId` query parameter.
///
/// Later duplicates are ignored.
#[must_use]
pub fn channel_id(query: &[(String, String)]) -> Option<&str> {
    query
        .iter()
        .find(|(key, _)| key == "channelId")
        .map(|(_, value)| value.as_str())
}

/// Build the HTTP router for the bridge.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(webhook_handler))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::mirror_request())
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Entry point for Backlog webhooks.
///
/// CORS preflight is answered by the CORS layer before this runs. The query
/// is extracted as raw pairs so it never rejects a request on its own.
pub async fn webhook_handler(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Response {
    debug!(body = %String::from_utf8_lossy(&body), "Received Backlog webhook");

    if method != Method::POST {
        return (StatusCode::BAD_REQUEST, "not allowed").into_response();
    }

    match handle_event(&state, &method, channel_id(&query), &body).await {
        Ok(_) => (StatusCode::OK, "OK").into_response(),
        Err(e) => e.into_response(),
    }
}

/// Relay one Backlog event to Slack.
///
/// 1. Validates method and body
/// 2. Fetches both user directories concurrently
/// 3. Resolves mentions and fetches the issue detail
/// 4. Formats and posts the message
pub async fn handle_event(
    state: &AppState,
    method: &Method,
    channel_id: Option<&str>,
    body: &[u8],
) -> Result<PostResult, BridgeError> {
    if method != Method::POST {
        return Err(BridgeError::InvalidRequest("uri not allowed"));
    }

    let event = WebhookEvent::from_body(body).map_err(|e| {
        error!(
            error = %e,
            body = %String::from_utf8_lossy(body),
            "Cannot parse webhook body"
        );
        BridgeError::InvalidRequest("invalid body")
    })?;

    let backlog_key = event.backlog_key();
    info!(backlog_key = %backlog_key, "Start");

    let directories = resolve_directories(
        state.tracker.as_ref(),
        state.chat.as_ref(),
        &event.project.project_key,
    )
    .await
    .inspect_err(|e| error!(error = %e, backlog_key = %backlog_key, "Cannot fetch users"))?;

    let mentions = resolve_mentions(&event, &directories.tracker_users, &directories.chat);

    // Unguarded: failures are only reported by the unhandled path in `IntoResponse`.
    let issue = state
        .tracker
        .issue(&event.project.project_key, event.content.key_id)
        .await
        .map_err(BridgeError::IssueFetch)?;

    info!(
        backlog_key = %backlog_key,
        mentions = %mentions.join(","),
        "Start message post"
    );
    let message = format_message(&event, &issue, &mentions, &state.backlog_base_url);

    state
        .chat
        .post_message(&message, channel_id)
        .await
        .map_err(|e| {
            error!(error = %e, backlog_key = %backlog_key, "Failed to post Slack message");
            BridgeError::UpstreamPost(e)
        })
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        if let Self::IssueFetch(source) = &self {
            error!(error = %source, "Unhandled failure while fetching issue detail");
        }
        (self.status_code(), self.response_body()).into_response()
    }
}
