//! Stream Consumer
//!
//! Reads the chunked body of a streaming chat response and frames it into
//! discrete events.
//!
//! # Wire format
//!
//! ```text
//! data: {"delta": "Hel"}\n
//! data: {"delta": "lo"}\n
//! data: {"event": "message_end"}\n      (or `data: [DONE]`, or body closure)
//! ```
//!
//! Chunk boundaries are arbitrary: a line, or a single UTF-8 character, may be
//! split across reads. Undecodable `data:` lines are logged and skipped; any
//! other line is ignored. Read errors surface as
//! [`TransportError::Read`](crate::transport::TransportError::Read) so the
//! caller can fall back to the whole-message path.

mod consumer;
mod framer;

pub use consumer::StreamConsumer;
pub use framer::{FramedStats, SseFramer, StreamEvent};
