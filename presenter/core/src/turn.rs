//! Turn Runner
//!
//! Orchestrates one user turn: announce the user line, stream the reply into
//! a fresh assistant message, and fall back to the whole-message endpoint if
//! streaming fails. Both paths end in the same reveal primitive.
//!
//! ```text
//! user text ─► open_stream ──ok──► Delta ─► enqueue ─┐
//!                  │                End  ─► signal_end├─► reveal ─► Streamed
//!                  │ err            Err  ─────────────┘      │
//!                  ▼                                         ▼ (partial ended)
//!               send ──ok──► reveal_all(response) ─────────► FellBack
//!                  │ err
//!                  ▼
//!               Notice ─────────────────────────────────────► Failed
//! ```

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;

use crate::config::RevealConfig;
use crate::messages::{MessageId, MessageRole, PresenterMessage};
use crate::reveal::{spawn_reveal, RevealHandle, RevealOutcome};
use crate::sink::ChannelSink;
use crate::stage::Stage;
use crate::stream::StreamEvent;
use crate::transport::{ChatRequest, ChatTransport, EventStream, TransportError};

/// Text shown when neither endpoint produced a reply
pub const FAILURE_NOTICE: &str = "An error occurred. Please try again.";

/// How a turn ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The streamed reply was revealed
    Streamed,
    /// Streaming failed; the whole-message reply was revealed instead
    FellBack,
    /// Both endpoints failed, or the surface went away
    Failed,
}

/// Runs turns against a transport, reporting to a surface
pub struct TurnRunner<T: ChatTransport> {
    transport: Arc<T>,
    reveal: RevealConfig,
    stage: Stage,
    tx: mpsc::UnboundedSender<PresenterMessage>,
}

impl<T: ChatTransport> Clone for TurnRunner<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            reveal: self.reveal.clone(),
            stage: self.stage.clone(),
            tx: self.tx.clone(),
        }
    }
}

impl<T: ChatTransport + 'static> TurnRunner<T> {
    /// Create a runner
    pub fn new(
        transport: Arc<T>,
        reveal: RevealConfig,
        stage: Stage,
        tx: mpsc::UnboundedSender<PresenterMessage>,
    ) -> Self {
        Self {
            transport,
            reveal,
            stage,
            tx,
        }
    }

    /// The shared stage
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Run one turn to completion
    ///
    /// Returns once the reply (or the failure notice) is fully shown and the
    /// avatar is idle again.
    pub async fn run_turn(&self, user_text: &str) -> TurnOutcome {
        self.announce(MessageRole::User, user_text);
        let request = ChatRequest::new(user_text);

        let failure = match self.transport.open_stream(&request).await {
            Ok(events) => match self.stream_reply(events).await {
                Ok(RevealOutcome::Aborted) => return TurnOutcome::Failed,
                Ok(_) => return TurnOutcome::Streamed,
                Err(e) => e,
            },
            Err(e) => e,
        };

        tracing::warn!(
            transport = self.transport.name(),
            error = %failure,
            "streaming failed, falling back to whole message"
        );
        self.fallback(&request).await
    }

    /// Reveal a streamed reply; `Err` if the stream broke part way
    async fn stream_reply(&self, mut events: EventStream) -> Result<RevealOutcome, TransportError> {
        let handle = self.start_reply();

        loop {
            let next = tokio::select! {
                outcome = handle.finished() => {
                    tracing::debug!(?outcome, "reveal ended before the stream, dropping the rest");
                    return Ok(outcome);
                }
                next = events.next() => next,
            };
            let Some(event) = next else {
                break;
            };
            match event {
                Ok(StreamEvent::Delta(text)) => {
                    handle.enqueue(text);
                }
                Ok(StreamEvent::End) => break,
                Err(e) => {
                    // Let what already arrived finish cleanly before falling back.
                    handle.signal_end();
                    handle.finished().await;
                    return Err(e);
                }
            }
        }

        handle.signal_end();
        let outcome = handle.finished().await;
        tracing::debug!(?outcome, "streamed reply revealed");
        Ok(outcome)
    }

    async fn fallback(&self, request: &ChatRequest) -> TurnOutcome {
        match self.transport.send(request).await {
            Ok(reply) => match self.start_reply().reveal_all(reply.response).await {
                RevealOutcome::Aborted => TurnOutcome::Failed,
                _ => TurnOutcome::FellBack,
            },
            Err(e) => {
                tracing::error!(
                    transport = self.transport.name(),
                    error = %e,
                    "fallback failed"
                );
                self.stage.stop_talking();
                let _ = self.tx.send(PresenterMessage::Notice {
                    text: FAILURE_NOTICE.to_string(),
                });
                TurnOutcome::Failed
            }
        }
    }

    /// Announce an empty assistant message and start revealing into it
    fn start_reply(&self) -> RevealHandle {
        let id = self.announce(MessageRole::Assistant, "");
        let sink = ChannelSink::new(id, self.tx.clone());
        spawn_reveal(self.reveal.clone(), sink, self.stage.clone())
    }

    fn announce(&self, role: MessageRole, content: &str) -> MessageId {
        let id = MessageId::new();
        let _ = self.tx.send(PresenterMessage::MessageStarted {
            id: id.clone(),
            role,
            content: content.to_string(),
        });
        id
    }
}
