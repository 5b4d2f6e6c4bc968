//! Widgets

mod chat_log;

pub use chat_log::{ChatLog, ChatLogState};
