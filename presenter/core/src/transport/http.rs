//! HTTP Transport
//!
//! reqwest client for the chat relay.
//!
//! # Endpoints
//!
//! - `POST {base}/api/chat/stream` - `data:` lines with text deltas
//! - `POST {base}/api/chat` - single `{"response": "..."}` object
//! - `GET {base}/api/health` - liveness

use std::time::Duration;

use async_trait::async_trait;

use super::traits::{ChatReply, ChatRequest, ChatTransport, EventStream, TransportError};
use crate::config::TransportConfig;
use crate::stream::StreamConsumer;

/// Health probes never wait longer than this
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP chat transport
#[derive(Clone, Debug)]
pub struct HttpTransport {
    base_url: String,
    stream_path: String,
    chat_path: String,
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport from configuration
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            stream_path: config.stream_path.clone(),
            chat_path: config.chat_path.clone(),
            http_client,
        })
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(
        &self,
        path: &str,
        request: &ChatRequest,
    ) -> Result<reqwest::Response, TransportError> {
        let response = self
            .http_client
            .post(self.url(path))
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }
        Ok(response)
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(self.url("/api/health"))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .is_ok_and(|r| r.status().is_success())
    }

    async fn open_stream(&self, request: &ChatRequest) -> Result<EventStream, TransportError> {
        let response = self.post(&self.stream_path, request).await?;
        tracing::debug!(url = %response.url(), "chat stream opened");
        Ok(StreamConsumer::new(Box::pin(response.bytes_stream())).into_event_stream())
    }

    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, TransportError> {
        let response = self.post(&self.chat_path, request).await?;
        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        let text = data
            .get("response")
            .and_then(|r| r.as_str())
            .ok_or_else(|| TransportError::Decode("missing `response` field".to_string()))?;

        Ok(ChatReply {
            response: text.to_string(),
        })
    }
}
