//! HTTP routing and request shaping.
//!
//! Routes:
//! - GET  /        plain-text starter guide
//! - GET  /health  status, model identifier, endpoint list
//! - POST /chat    complete JSON response
//! - POST /stream  plain-text token stream
//!
//! Every response, errors included, carries permissive CORS headers; OPTIONS
//! preflights are answered by the CORS layer before they reach a handler.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::server::error::{ApiError, AVAILABLE_ENDPOINTS};
use crate::server::guide;
use crate::transform::into_text_stream;
use crate::upstream::{ChatMessage, UpstreamClient};

/// Application state shared across handlers.
pub struct AppState {
    pub client: UpstreamClient,
    pub config: Arc<Config>,
    pub start_time: Instant,
}

/// Build the axum router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(starter_guide).fallback(method_not_allowed))
        .route("/health", get(health).fallback(method_not_allowed))
        .route("/chat", post(chat).fallback(method_not_allowed))
        .route("/stream", post(stream).fallback(method_not_allowed))
        .fallback(unknown_path)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

// ─── Request/Response Types ────────────────────────────────────────────────

/// Chat request body: either a full message list or a prompt/system pair.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub system: Option<String>,
}

impl ChatRequest {
    /// Normalize both accepted shapes into one ordered message sequence.
    ///
    /// A provided `messages` list is passed through verbatim. A `prompt`
    /// becomes one user message, preceded by a system message when `system`
    /// is present. Neither present is a client error.
    pub fn normalize(self) -> Result<Vec<ChatMessage>, ApiError> {
        if let Some(messages) = self.messages {
            return Ok(messages);
        }

        if let Some(prompt) = self.prompt {
            let mut messages = Vec::with_capacity(2);
            if let Some(system) = self.system {
                messages.push(ChatMessage {
                    role: "system".to_string(),
                    content: system,
                });
            }
            messages.push(ChatMessage {
                role: "user".to_string(),
                content: prompt,
            });
            return Ok(messages);
        }

        Err(ApiError::MissingInput)
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub uptime_secs: u64,
    pub endpoints: EndpointList,
}

#[derive(Debug, Serialize)]
pub struct EndpointList {
    pub chat: String,
    pub stream: String,
}

// ─── Route Handlers ────────────────────────────────────────────────────────

async fn starter_guide(headers: HeaderMap) -> impl IntoResponse {
    let origin = request_origin(&headers);
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        guide::render(&origin),
    )
}

/// Reconstruct the origin the client reached us on, for example URLs in the
/// guide. Falls back to plain http and a generic host.
fn request_origin(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost:8080");
    format!("{scheme}://{host}")
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.config.upstream.model.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        endpoints: EndpointList {
            chat: "/chat".to_string(),
            stream: "/stream".to_string(),
        },
    })
}

async fn chat(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = parse_body(body)?;
    let request_id = Uuid::new_v4().to_string();

    info!(
        request_id = request_id,
        model = state.config.upstream.model,
        messages = messages.len(),
        "Chat request"
    );

    let response = state.client.chat(&messages).await?;
    Ok(Json(response))
}

async fn stream(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let messages = parse_body(body)?;
    let request_id = Uuid::new_v4().to_string();

    info!(
        request_id = request_id,
        model = state.config.upstream.model,
        messages = messages.len(),
        "Stream request"
    );

    let upstream = state.client.chat_stream(&messages).await?;
    let body = Body::from_stream(into_text_stream(upstream));

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        body,
    )
        .into_response())
}

fn parse_body(
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Vec<ChatMessage>, ApiError> {
    let Json(request) = body.map_err(|_| ApiError::InvalidJson)?;
    request.normalize()
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn unknown_path() -> ApiError {
    ApiError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> ChatRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_normalize_prompt_with_system() {
        let messages = request(r#"{"prompt":"hi","system":"be brief"}"#)
            .normalize()
            .unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, "be brief");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content, "hi");
    }

    #[test]
    fn test_normalize_prompt_only() {
        let messages = request(r#"{"prompt":"hi"}"#).normalize().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[0].content, "hi");
    }

    #[test]
    fn test_normalize_messages_pass_through() {
        let messages = request(
            r#"{"messages":[{"role":"user","content":"a"},{"role":"assistant","content":"b"}]}"#,
        )
        .normalize()
        .unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "a");
        assert_eq!(messages[1].role, "assistant");
    }

    #[test]
    fn test_normalize_messages_wins_over_prompt() {
        let messages = request(
            r#"{"messages":[{"role":"user","content":"a"}],"prompt":"ignored"}"#,
        )
        .normalize()
        .unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "a");
    }

    #[test]
    fn test_normalize_empty_body_is_error() {
        assert!(matches!(
            request("{}").normalize(),
            Err(ApiError::MissingInput)
        ));
    }

    #[test]
    fn test_request_origin_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "gw.example:9000".parse().unwrap());
        assert_eq!(request_origin(&headers), "http://gw.example:9000");

        headers.insert("x-forwarded-proto", "https".parse().unwrap());
        assert_eq!(request_origin(&headers), "https://gw.example:9000");
    }

    #[test]
    fn test_available_endpoints_cover_routes() {
        assert_eq!(AVAILABLE_ENDPOINTS, ["/", "/health", "/chat", "/stream"]);
    }
}
