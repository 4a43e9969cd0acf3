//! HTTP client for the inference capability.
//!
//! The service accepts `POST {base_url}/{model}` with `{messages, stream}` and
//! returns either a JSON object (non-streaming) or an event-stream body that
//! the transform layer consumes chunk by chunk.

use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

/// One chat message, in the wire shape the inference service expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("request to inference service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("inference service returned HTTP {0}")]
    Status(StatusCode),
}

/// Wire request for the run endpoint.
#[derive(Serialize)]
struct RunRequest<'a> {
    messages: &'a [ChatMessage],
    stream: bool,
}

/// Client for the upstream inference service. Cheap to share: holds a pooled
/// reqwest client and the configuration.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    config: Arc<Config>,
}

impl UpstreamClient {
    pub fn new(config: Arc<Config>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.upstream.connect_timeout())
            .build()?;
        Ok(Self { http, config })
    }

    async fn post_run(
        &self,
        messages: &[ChatMessage],
        stream: bool,
    ) -> Result<reqwest::Response, UpstreamError> {
        let url = self.config.upstream.run_url();
        debug!(url = %url, stream, messages = messages.len(), "Upstream run request");

        let mut request = self.http.post(&url).json(&RunRequest { messages, stream });
        if let Some(token) = &self.config.upstream.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status()));
        }
        Ok(response)
    }

    /// Non-streaming call: the service's JSON response, returned verbatim.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<Value, UpstreamError> {
        let response = self.post_run(messages, false).await?;
        Ok(response.json().await?)
    }

    /// Streaming call: the raw event-stream body as a stream of byte chunks.
    pub async fn chat_stream(
        &self,
        messages: &[ChatMessage],
    ) -> Result<BoxStream<'static, Result<Bytes, reqwest::Error>>, UpstreamError> {
        let response = self.post_run(messages, true).await?;
        Ok(response.bytes_stream().boxed())
    }
}
