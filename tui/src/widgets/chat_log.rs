//! ChatLog Widget
//!
//! A borderless, bottom-anchored conversation view. Each display message is
//! one logical line (`PREFIX> text`) wrapped to the area width.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::StatefulWidget;
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

use crate::display::{DisplayMessage, DisplayRole};
use crate::theme::{ASSISTANT_ACCENT, DIM_GRAY, ERROR_RED, USER_GREEN};

/// Shown after the text of a line that is still being revealed
const REVEAL_CURSOR: &str = "▌";

/// Scroll bookkeeping filled in during render
#[derive(Debug, Default)]
pub struct ChatLogState {
    /// Wrapped lines in the whole conversation
    pub total_lines: usize,
    /// Requested offset, clamped to what the content allows
    pub scroll_offset: usize,
}

/// One wrapped screen row
#[derive(Debug, PartialEq, Eq)]
struct Row {
    prefix: String,
    prefix_style: Style,
    text: String,
    style: Style,
}

/// The conversation view
pub struct ChatLog<'a> {
    messages: &'a [DisplayMessage],
    scroll_offset: usize,
}

impl<'a> ChatLog<'a> {
    /// View over `messages`, scrolled `scroll_offset` rows up from the end
    pub fn new(messages: &'a [DisplayMessage], scroll_offset: u16) -> Self {
        Self {
            messages,
            scroll_offset: usize::from(scroll_offset),
        }
    }
}

fn styles(role: DisplayRole) -> (Style, Style) {
    match role {
        DisplayRole::User => (
            Style::default().fg(USER_GREEN).add_modifier(Modifier::BOLD),
            Style::default().fg(USER_GREEN),
        ),
        DisplayRole::Assistant => (
            Style::default()
                .fg(ASSISTANT_ACCENT)
                .add_modifier(Modifier::BOLD),
            Style::default(),
        ),
        DisplayRole::System => (Style::default(), Style::default().fg(DIM_GRAY)),
    }
}

fn rows(message: &DisplayMessage, width: usize) -> Vec<Row> {
    let prefix = message.prefix();
    let (prefix_style, mut style) = styles(message.role);
    if message.is_error {
        style = Style::default().fg(ERROR_RED);
    }

    let mut full = format!("{prefix}{}", message.content);
    if message.streaming {
        full.push_str(REVEAL_CURSOR);
    }

    let mut out = Vec::new();
    for (source_idx, source_line) in full.split('\n').enumerate() {
        if source_line.is_empty() {
            out.push(Row {
                prefix: String::new(),
                prefix_style,
                text: String::new(),
                style,
            });
            continue;
        }
        for (wrap_idx, piece) in wrap(source_line, width.max(1)).into_iter().enumerate() {
            let piece = piece.into_owned();
            if source_idx == 0 && wrap_idx == 0 && !prefix.is_empty() {
                if let Some(rest) = piece.strip_prefix(prefix.as_str()) {
                    out.push(Row {
                        prefix: prefix.clone(),
                        prefix_style,
                        text: rest.to_string(),
                        style,
                    });
                    continue;
                }
            }
            out.push(Row {
                prefix: String::new(),
                prefix_style,
                text: piece,
                style,
            });
        }
    }
    out
}

impl StatefulWidget for ChatLog<'_> {
    type State = ChatLogState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let width = usize::from(area.width);
        let height = usize::from(area.height);
        let all: Vec<Row> = self.messages.iter().flat_map(|m| rows(m, width)).collect();

        state.total_lines = all.len();
        let max_offset = all.len().saturating_sub(height);
        state.scroll_offset = self.scroll_offset.min(max_offset);

        let end = all.len() - state.scroll_offset;
        let start = end.saturating_sub(height);

        for (y, row) in (area.y..area.bottom()).zip(&all[start..end]) {
            let mut x = area.x;
            if !row.prefix.is_empty() {
                buf.set_stringn(x, y, &row.prefix, width, row.prefix_style);
                let used = u16::try_from(row.prefix.width()).unwrap_or(area.width);
                x = x.saturating_add(used);
            }
            let remaining = usize::from(area.right().saturating_sub(x));
            buf.set_stringn(x, y, &row.text, remaining, row.style);
        }
    }
}
