//! Output Sinks
//!
//! The append-only surface one assistant message is revealed into. The
//! reveal driver owns the sink for the duration of one turn; a sink that has
//! gone away reports [`SinkError::Detached`] and the turn is aborted.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::messages::{MessageId, PresenterMessage};

/// Presentation errors raised by a sink
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SinkError {
    /// The surface behind the sink no longer exists
    #[error("output sink for {0} is detached")]
    Detached(String),
}

/// Append-only text surface for one message
pub trait OutputSink: Send {
    /// Append revealed text
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Detached`] if the surface is gone.
    fn append(&mut self, text: &str) -> Result<(), SinkError>;

    /// Scroll the sink's container so its end is visible
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Detached`] if the surface is gone.
    fn scroll_to_end(&mut self) -> Result<(), SinkError>;

    /// Called once when the reveal into this sink has finished
    fn finish(&mut self) {}
}

/// Sink that forwards reveal output to a UI surface as [`PresenterMessage`]s
pub struct ChannelSink {
    id: MessageId,
    tx: mpsc::UnboundedSender<PresenterMessage>,
}

impl ChannelSink {
    /// Create a sink for an already-announced message
    pub fn new(id: MessageId, tx: mpsc::UnboundedSender<PresenterMessage>) -> Self {
        Self { id, tx }
    }

    /// The message this sink writes into
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    fn send(&self, msg: PresenterMessage) -> Result<(), SinkError> {
        self.tx
            .send(msg)
            .map_err(|_| SinkError::Detached(self.id.to_string()))
    }
}

impl OutputSink for ChannelSink {
    fn append(&mut self, text: &str) -> Result<(), SinkError> {
        self.send(PresenterMessage::Append {
            id: self.id.clone(),
            text: text.to_string(),
        })
    }

    fn scroll_to_end(&mut self) -> Result<(), SinkError> {
        self.send(PresenterMessage::ScrollToEnd {
            id: self.id.clone(),
        })
    }

    fn finish(&mut self) {
        let _ = self.send(PresenterMessage::MessageFinished {
            id: self.id.clone(),
        });
    }
}

#[derive(Debug, Default)]
struct StringSinkInner {
    text: String,
    scrolls: usize,
    finished: bool,
    detached: bool,
}

/// In-memory sink, cloneable so a caller can observe it while a driver owns it
#[derive(Clone, Debug, Default)]
pub struct StringSink {
    inner: Arc<Mutex<StringSinkInner>>,
}

impl StringSink {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Text revealed so far
    #[must_use]
    pub fn text(&self) -> String {
        self.inner.lock().text.clone()
    }

    /// Number of scroll requests
    #[must_use]
    pub fn scrolls(&self) -> usize {
        self.inner.lock().scrolls
    }

    /// Whether the reveal reported completion
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.lock().finished
    }

    /// Simulate the surface disappearing
    pub fn detach(&self) {
        self.inner.lock().detached = true;
    }
}

impl OutputSink for StringSink {
    fn append(&mut self, text: &str) -> Result<(), SinkError> {
        let mut inner = self.inner.lock();
        if inner.detached {
            return Err(SinkError::Detached("string sink".to_string()));
        }
        inner.text.push_str(text);
        Ok(())
    }

    fn scroll_to_end(&mut self) -> Result<(), SinkError> {
        let mut inner = self.inner.lock();
        if inner.detached {
            return Err(SinkError::Detached("string sink".to_string()));
        }
        inner.scrolls += 1;
        Ok(())
    }

    fn finish(&mut self) {
        self.inner.lock().finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_sink_appends() {
        let sink = StringSink::new();
        let mut writer = sink.clone();
        writer.append("he").unwrap();
        writer.append("y").unwrap();
        writer.scroll_to_end().unwrap();
        assert_eq!(sink.text(), "hey");
        assert_eq!(sink.scrolls(), 1);
        assert!(!sink.is_finished());
        writer.finish();
        assert!(sink.is_finished());
    }

    #[test]
    fn test_string_sink_detached() {
        let sink = StringSink::new();
        let mut writer = sink.clone();
        sink.detach();
        assert!(writer.append("x").is_err());
        assert!(writer.scroll_to_end().is_err());
        assert_eq!(sink.text(), "");
    }

    #[test]
    fn test_channel_sink_forwards() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = MessageId::new();
        let mut sink = ChannelSink::new(id.clone(), tx);
        sink.append("a").unwrap();
        sink.scroll_to_end().unwrap();
        sink.finish();

        assert_eq!(
            rx.try_recv().unwrap(),
            PresenterMessage::Append {
                id: id.clone(),
                text: "a".to_string()
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            PresenterMessage::ScrollToEnd { id: id.clone() }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            PresenterMessage::MessageFinished { id }
        );
    }

    #[test]
    fn test_channel_sink_detached_when_surface_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut sink = ChannelSink::new(MessageId::new(), tx);
        drop(rx);
        assert!(matches!(sink.append("a"), Err(SinkError::Detached(_))));
    }
}
