//! Server-push line framer
//!
//! Turns an arbitrary sequence of byte chunks into complete `data:` lines and
//! then into [`StreamEvent`]s.

// ============================================================================
// Events
// ============================================================================

/// A framed event from the chat stream
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    /// Text to reveal
    Delta(String),
    /// End of the assistant turn
    End,
}

/// `event` values that mark the end of a turn
const END_EVENTS: &[&str] = &["message_end", "end", "done"];

/// Sentinel some relays send instead of a JSON end marker
const DONE_SENTINEL: &str = "[DONE]";

/// Line prefix carrying a payload
const DATA_PREFIX: &str = "data:";

/// Framing counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FramedStats {
    /// Complete lines seen (including ignored ones)
    pub lines: u64,
    /// Events produced
    pub events: u64,
    /// `data:` lines dropped because they could not be decoded
    pub dropped: u64,
}

// ============================================================================
// Framer
// ============================================================================

/// Incremental framer for `data: {json}` lines
///
/// Bytes are buffered until a newline arrives, so a line (or a multi-byte
/// UTF-8 sequence) split across chunks is decoded only once it is complete.
#[derive(Debug, Default)]
pub struct SseFramer {
    buffer: Vec<u8>,
    stats: FramedStats,
}

impl SseFramer {
    /// Create an empty framer
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning the events of every line it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.frame_line(&line[..pos], &mut events);
        }
        events
    }

    /// Flush an unterminated trailing line (call once the body has closed)
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.frame_line(&line, &mut events);
        }
        events
    }

    /// Bytes still waiting for a newline
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }

    /// Counters so far
    pub fn stats(&self) -> FramedStats {
        self.stats
    }

    fn frame_line(&mut self, raw: &[u8], events: &mut Vec<StreamEvent>) {
        self.stats.lines += 1;

        let line = match std::str::from_utf8(raw) {
            Ok(line) => line.trim_end_matches('\r'),
            Err(e) => {
                self.stats.dropped += 1;
                tracing::warn!(error = %e, "dropping stream line with invalid UTF-8");
                return;
            }
        };

        // Comments, `event:` lines and keep-alives carry nothing we use.
        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            return;
        };
        let payload = payload.trim();
        if payload.is_empty() {
            return;
        }

        if payload == DONE_SENTINEL {
            self.emit(StreamEvent::End, events);
            return;
        }

        let data: serde_json::Value = match serde_json::from_str(payload) {
            Ok(data) => data,
            Err(e) => {
                self.stats.dropped += 1;
                tracing::warn!(error = %e, line = %payload, "dropping malformed stream frame");
                return;
            }
        };

        if let Some(delta) = data.get("delta").and_then(|d| d.as_str()) {
            if !delta.is_empty() {
                self.emit(StreamEvent::Delta(delta.to_string()), events);
            }
        }

        let is_end = data
            .get("event")
            .and_then(|e| e.as_str())
            .is_some_and(|e| END_EVENTS.contains(&e));
        if is_end {
            self.emit(StreamEvent::End, events);
        }
    }

    fn emit(&mut self, event: StreamEvent, events: &mut Vec<StreamEvent>) {
        self.stats.events += 1;
        events.push(event);
    }
}
