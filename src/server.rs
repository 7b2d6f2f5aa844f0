//! Webhook receiver for Slack interactivity requests.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/api/slack/sentiment` | Message shortcut interactivity endpoint |
//!
//! Slack expects an acknowledgement within three seconds, so the shortcut
//! endpoint answers `200` as soon as the request is verified and parsed,
//! and does the analysis on a spawned task.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "Missing Slack payload." } }
//! ```
//!
//! Error codes: `bad_request` (400), `invalid_signature` (400).

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::analyzer::ThreadAnalyzer;
use crate::config::Config;
use crate::models::ShortcutPayload;
use crate::shortcut::handle_sentiment_shortcut;
use crate::signature::{verify_signature, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::slack::SlackClient;
use crate::traits::ChatPlatform;

/// Shared state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub platform: Arc<dyn ChatPlatform>,
    pub analyzer: ThreadAnalyzer,
    /// When `None`, signature verification is skipped.
    pub signing_secret: Option<Arc<str>>,
}

/// Starts the HTTP server on `[server].bind` with the Slack client and
/// analyzer built from `config`. Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let platform = SlackClient::new(&config.slack, config.secrets.slack_bot_token.clone())?;
    let analyzer = ThreadAnalyzer::from_config(config)?;

    if config.secrets.slack_signing_secret.is_none() {
        tracing::warn!("SLACK_SIGNING_SECRET is not set; request signatures will not be verified");
    }

    let state = AppState {
        platform: Arc::new(platform),
        analyzer,
        signing_secret: config.secrets.slack_signing_secret.as_deref().map(Arc::from),
    };

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("Sentiment service running on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

/// Build the router. Exposed so tests can serve it on an ephemeral port.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/slack/sentiment", post(handle_sentiment))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn invalid_signature(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "invalid_signature".to_string(),
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    message: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Sentiment service running.".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /api/slack/sentiment ============

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Extract the `payload` field from a form-encoded body.
fn form_payload(body: &[u8]) -> Option<String> {
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == "payload")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Handler for `POST /api/slack/sentiment`.
///
/// The raw body is needed for signature verification, so the form is
/// decoded by hand rather than with the `Form` extractor.
async fn handle_sentiment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    if let Some(secret) = &state.signing_secret {
        verify_signature(
            secret,
            header(&headers, SIGNATURE_HEADER),
            header(&headers, TIMESTAMP_HEADER),
            &body,
            chrono::Utc::now().timestamp(),
        )
        .map_err(|e| invalid_signature(e.to_string()))?;
    }

    let raw = form_payload(&body).ok_or_else(|| bad_request("Missing Slack payload."))?;

    let payload: ShortcutPayload = serde_json::from_str(&raw).map_err(|e| {
        tracing::error!(error = %e, "Invalid Slack shortcut payload");
        bad_request("Invalid Slack payload.")
    })?;

    tokio::spawn(async move {
        if let Err(e) =
            handle_sentiment_shortcut(state.platform.as_ref(), &state.analyzer, &payload).await
        {
            tracing::error!(error = %e, "Failed to process sentiment shortcut");
        }
    });

    Ok(StatusCode::OK)
}
