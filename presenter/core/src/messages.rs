//! Presenter Messages
//!
//! Messages sent from the presentation engine to a UI surface. The engine owns
//! pacing and turn state; a surface only applies what it is told, which is how
//! one assistant message's text element acts as the output sink of a turn.

use serde::{Deserialize, Serialize};

/// Messages from the engine to a UI surface
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresenterMessage {
    /// A new message line was created
    MessageStarted {
        /// Unique message ID for tracking
        id: MessageId,
        /// Who the message belongs to
        role: MessageRole,
        /// Initial content (complete for user/system lines, empty for a reveal)
        content: String,
    },

    /// Text revealed into an assistant message
    Append {
        /// Message the text belongs to
        id: MessageId,
        /// The revealed text (usually a single character)
        text: String,
    },

    /// Scroll the conversation so the given message's end is visible
    ScrollToEnd {
        /// Message being revealed
        id: MessageId,
    },

    /// The reveal into a message has finished
    MessageFinished {
        /// Message that finished
        id: MessageId,
    },

    /// A user-visible failure notice (both transports failed)
    Notice {
        /// Notice text
        text: String,
    },
}

/// Message identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a new unique message ID
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("msg_{id}"))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who sent a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    /// User input
    User,
    /// The avatar speaking
    Assistant,
    /// System notice
    System,
}
