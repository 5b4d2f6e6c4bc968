//! Display State Types
//!
//! The TUI is a thin client: it renders what the presenter engine tells it.
//! [`DisplayState`] is the surface side of every `ChannelSink`; each assistant
//! message line is the sink of one reveal, and `Append` grows it in place.

use std::collections::HashMap;

use presenter_core::{MessageId, MessageRole, PresenterMessage};

/// A rendered conversation line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayMessage {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: DisplayRole,
    /// Speaker name captured when the line was created
    pub speaker: String,
    /// The message content
    pub content: String,
    /// Whether a reveal is still writing into this line
    pub streaming: bool,
    /// Failure line, drawn in the error colour
    pub is_error: bool,
}

impl DisplayMessage {
    /// Create a display line
    pub fn new(id: MessageId, role: MessageRole, speaker: &str, content: String) -> Self {
        let role = DisplayRole::from(role);
        Self {
            id,
            role,
            speaker: speaker.to_string(),
            content,
            streaming: role == DisplayRole::Assistant,
            is_error: false,
        }
    }

    /// Prompt prefix shown before the content
    pub fn prefix(&self) -> String {
        match self.role {
            DisplayRole::User => "USER> ".to_string(),
            DisplayRole::Assistant => format!("{}> ", self.speaker),
            DisplayRole::System => String::new(),
        }
    }

    /// Append revealed text
    pub fn append(&mut self, text: &str) {
        self.content.push_str(text);
    }
}

/// Display role for messages
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayRole {
    /// User input
    User,
    /// The avatar
    Assistant,
    /// System line
    System,
}

impl From<MessageRole> for DisplayRole {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => DisplayRole::User,
            MessageRole::Assistant => DisplayRole::Assistant,
            MessageRole::System => DisplayRole::System,
        }
    }
}

/// Conversation as currently shown
#[derive(Debug)]
pub struct DisplayState {
    messages: Vec<DisplayMessage>,
    index: HashMap<MessageId, usize>,
    /// Name given to assistant lines created from now on
    assistant_name: String,
    /// Lines scrolled up from the bottom (0 = follow the end)
    pub scroll_offset: u16,
    /// Set when something changed and a redraw is due
    dirty: bool,
}

impl DisplayState {
    /// Create an empty conversation with an assistant name
    pub fn new(assistant_name: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            index: HashMap::new(),
            assistant_name: assistant_name.into(),
            scroll_offset: 0,
            dirty: true,
        }
    }

    /// Apply one engine message
    pub fn apply(&mut self, msg: PresenterMessage) {
        match msg {
            PresenterMessage::MessageStarted { id, role, content } => {
                let line = DisplayMessage::new(id, role, &self.assistant_name, content);
                self.push(line);
                self.scroll_offset = 0;
            }
            PresenterMessage::Append { id, text } => match self.get_mut(&id) {
                Some(line) => line.append(&text),
                None => tracing::warn!(%id, "append to unknown message ignored"),
            },
            PresenterMessage::ScrollToEnd { .. } => {
                self.scroll_offset = 0;
            }
            PresenterMessage::MessageFinished { id } => {
                if let Some(line) = self.get_mut(&id) {
                    line.streaming = false;
                }
            }
            PresenterMessage::Notice { text } => {
                self.error(text);
                self.scroll_offset = 0;
            }
        }
        self.dirty = true;
    }

    /// Add a local system line
    pub fn system(&mut self, text: impl Into<String>) {
        let line = DisplayMessage::new(
            MessageId::new(),
            MessageRole::System,
            &self.assistant_name,
            text.into(),
        );
        self.push(line);
        self.dirty = true;
    }

    /// Add a system line reporting a failure
    pub fn error(&mut self, text: impl Into<String>) {
        self.system(text);
        if let Some(line) = self.messages.last_mut() {
            line.is_error = true;
        }
    }

    /// Change the name used for new assistant lines
    ///
    /// Lines already shown keep the name they were created with.
    pub fn set_assistant_name(&mut self, name: impl Into<String>) {
        self.assistant_name = name.into();
    }

    /// Current assistant name
    pub fn assistant_name(&self) -> &str {
        &self.assistant_name
    }

    /// All lines in order
    pub fn messages(&self) -> &[DisplayMessage] {
        &self.messages
    }

    /// Whether any reveal is still writing
    pub fn is_streaming(&self) -> bool {
        self.messages.iter().any(|m| m.streaming)
    }

    /// Scroll up by `lines`
    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
        self.dirty = true;
    }

    /// Scroll down by `lines`
    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
        self.dirty = true;
    }

    /// Take the redraw flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn push(&mut self, line: DisplayMessage) {
        self.index.insert(line.id.clone(), self.messages.len());
        self.messages.push(line);
    }

    fn get_mut(&mut self, id: &MessageId) -> Option<&mut DisplayMessage> {
        let idx = *self.index.get(id)?;
        self.messages.get_mut(idx)
    }
}
