//! Stream consumer
//!
//! Pulls byte chunks from a response body and hands out framed events in
//! arrival order, with exactly one terminal `End`.

use std::collections::VecDeque;
use std::fmt::Display;

use bytes::Bytes;
use futures::{Stream, StreamExt};

use super::framer::{FramedStats, SseFramer, StreamEvent};
use crate::transport::{EventStream, TransportError};

/// Consumer over any chunked byte stream
pub struct StreamConsumer<S> {
    body: S,
    framer: SseFramer,
    pending: VecDeque<StreamEvent>,
    /// `End` or a read error has been handed out
    done: bool,
}

impl<S, E> StreamConsumer<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    /// Wrap a byte stream
    pub fn new(body: S) -> Self {
        Self {
            body,
            framer: SseFramer::new(),
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// Next framed event
    ///
    /// Yields `Delta`s in order, then `End` exactly once (explicit marker or
    /// body closure), then `None`. A read error is yielded once as
    /// `Err(TransportError::Read)` and also terminates the sequence.
    pub async fn next_event(&mut self) -> Option<Result<StreamEvent, TransportError>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                if event == StreamEvent::End {
                    self.done = true;
                    // Anything after the end marker is not part of this turn.
                    self.pending.clear();
                }
                return Some(Ok(event));
            }
            if self.done {
                return None;
            }

            match self.body.next().await {
                Some(Ok(chunk)) => {
                    let events = self.framer.push(&chunk);
                    self.pending.extend(events);
                }
                Some(Err(e)) => {
                    self.done = true;
                    tracing::warn!(error = %e, "stream read failed");
                    return Some(Err(TransportError::Read(e.to_string())));
                }
                None => {
                    let events = self.framer.finish();
                    self.pending.extend(events);
                    self.pending.push_back(StreamEvent::End);
                    tracing::debug!(stats = ?self.framer.stats(), "stream body closed");
                }
            }
        }
    }

    /// Framing counters so far
    pub fn stats(&self) -> FramedStats {
        self.framer.stats()
    }
}

impl<S, E> StreamConsumer<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin + Send + 'static,
    E: Display + Send + 'static,
{
    /// Turn the consumer into a boxed event stream
    pub fn into_event_stream(self) -> EventStream {
        futures::stream::unfold(self, |mut consumer| async move {
            let event = consumer.next_event().await?;
            Some((event, consumer))
        })
        .boxed()
    }
}
