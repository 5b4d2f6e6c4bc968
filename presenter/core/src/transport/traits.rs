//! Chat Transport Traits
//!
//! The engine talks to the chat service only through [`ChatTransport`], so the
//! turn logic can be exercised against an in-memory transport in tests.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stream::StreamEvent;

/// Transport failures
///
/// Every variant triggers the whole-message fallback when it happens on the
/// streaming path.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Non-success HTTP status
    #[error("server returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (may be empty)
        body: String,
    },

    /// Connection could not be established or the request failed
    #[error("network error: {0}")]
    Network(String),

    /// Body read failed part way through
    #[error("stream read failed: {0}")]
    Read(String),

    /// Reply arrived but did not have the expected shape
    #[error("malformed reply: {0}")]
    Decode(String),
}

/// Framed events from an open stream
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, TransportError>> + Send>>;

/// One user message sent to the chat service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// User text
    pub message: String,
}

impl ChatRequest {
    /// Create a request for a user message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Complete reply from the non-streaming endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Assistant text
    pub response: String,
}

/// Chat service client
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Transport name for logs
    fn name(&self) -> &str;

    /// Check if the service is reachable
    async fn health_check(&self) -> bool;

    /// Open the streaming endpoint
    ///
    /// Errors here mean no event was produced; errors while reading arrive
    /// inside the returned stream.
    async fn open_stream(&self, request: &ChatRequest) -> Result<EventStream, TransportError>;

    /// Call the non-streaming endpoint and wait for the whole reply
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, TransportError>;
}
