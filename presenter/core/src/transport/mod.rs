//! Chat Transport
//!
//! Client side of the chat relay. Two endpoints are used per turn at most:
//! the streaming endpoint first, then the whole-message endpoint if the
//! stream could not be opened or broke part way.
//!
//! # Usage
//!
//! ```ignore
//! use presenter_core::transport::{ChatRequest, ChatTransport, HttpTransport};
//!
//! let transport = HttpTransport::new(&config.transport)?;
//! let mut events = transport.open_stream(&ChatRequest::new("Hello!")).await?;
//! ```

mod http;
mod traits;

pub use http::HttpTransport;
pub use traits::{ChatReply, ChatRequest, ChatTransport, EventStream, TransportError};
