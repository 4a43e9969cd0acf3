//! API error taxonomy and HTTP mapping.
//!
//! Client mistakes map to 400/404/405 with descriptive JSON bodies; a failed
//! upstream call maps to 502. Garbled upstream stream frames never reach this
//! layer (the transformer absorbs them silently).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};
use thiserror::Error;

use crate::upstream::UpstreamError;

/// Paths advertised on 404 responses and in the health check.
pub const AVAILABLE_ENDPOINTS: [&str; 4] = ["/", "/health", "/chat", "/stream"];

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid JSON body")]
    InvalidJson,

    #[error("request body provides neither 'messages' nor 'prompt'")]
    MissingInput,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson | ApiError::MissingInput => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn body(&self) -> Value {
        match self {
            ApiError::InvalidJson => json!({
                "error": "Request body is not valid JSON",
            }),
            ApiError::MissingInput => json!({
                "error": "Provide either 'messages' or 'prompt' in the request body",
                "example": {
                    "messages": [
                        { "role": "system", "content": "You are a helpful assistant" },
                        { "role": "user", "content": "Hello!" }
                    ]
                },
                "simpleExample": {
                    "prompt": "Hello!",
                    "system": "You are a helpful assistant"
                },
            }),
            ApiError::MethodNotAllowed => json!({
                "error": "Method not allowed",
            }),
            ApiError::NotFound => json!({
                "error": "Not found",
                "availableEndpoints": AVAILABLE_ENDPOINTS,
            }),
            ApiError::Upstream(e) => json!({
                "error": format!("Upstream inference call failed: {e}"),
            }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
