//! Reveal Driver
//!
//! Runs one [`RevealScheduler`] against one sink on a tokio task. The task
//! waits on either a command from a [`RevealHandle`] or the scheduler's single
//! deadline, then carries out the reported effects on the sink and the
//! [`Stage`].

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};

use super::scheduler::{RevealEffect, RevealScheduler};
use crate::config::RevealConfig;
use crate::sink::{OutputSink, SinkError};
use crate::stage::Stage;

/// How a reveal ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Everything queued was revealed and the grace period ran out
    Completed,
    /// Cancelled through the handle
    Cancelled,
    /// The sink went away mid-turn
    Aborted,
}

#[derive(Debug)]
enum RevealCommand {
    Enqueue(String),
    SignalEnd,
    Cancel,
    StartTalking,
    StopTalking,
}

/// Handle to a running reveal
///
/// Cheap to clone. Commands sent after the reveal has finished are ignored.
#[derive(Clone, Debug)]
pub struct RevealHandle {
    tx: mpsc::UnboundedSender<RevealCommand>,
    outcome: watch::Receiver<Option<RevealOutcome>>,
}

impl RevealHandle {
    /// Queue text for reveal
    pub fn enqueue(&self, text: impl Into<String>) -> bool {
        self.send(RevealCommand::Enqueue(text.into()))
    }

    /// No more text will arrive for this turn
    pub fn signal_end(&self) -> bool {
        self.send(RevealCommand::SignalEnd)
    }

    /// Stop revealing and drop whatever is queued
    pub fn cancel(&self) -> bool {
        self.send(RevealCommand::Cancel)
    }

    /// Start the avatar's talk cycle directly
    pub fn start_talking(&self) -> bool {
        self.send(RevealCommand::StartTalking)
    }

    /// Stop the avatar's talk cycle directly
    pub fn stop_talking(&self) -> bool {
        self.send(RevealCommand::StopTalking)
    }

    /// Reveal a whole message and wait until it is on screen
    ///
    /// Resolves once the last character is shown and the avatar has gone
    /// back to idle.
    pub async fn reveal_all(&self, text: impl Into<String>) -> RevealOutcome {
        self.enqueue(text);
        self.signal_end();
        self.finished().await
    }

    /// Wait for the reveal to end
    pub async fn finished(&self) -> RevealOutcome {
        let mut outcome = self.outcome.clone();
        let reported = outcome.wait_for(Option::is_some).await.map(|value| *value);
        match reported {
            Ok(Some(outcome)) => outcome,
            // Driver task is gone without reporting.
            _ => RevealOutcome::Cancelled,
        }
    }

    /// Whether the reveal has ended
    pub fn is_finished(&self) -> bool {
        self.outcome.borrow().is_some()
    }

    fn send(&self, command: RevealCommand) -> bool {
        match self.tx.send(command) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(command = ?e.0, "reveal already finished, command ignored");
                false
            }
        }
    }
}

/// Start the drain task for one sink
///
/// The sink is owned by the task for the whole turn. Must be called from
/// within a tokio runtime.
pub fn spawn_reveal<S>(config: RevealConfig, sink: S, stage: Stage) -> RevealHandle
where
    S: OutputSink + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let (outcome_tx, outcome_rx) = watch::channel(None);

    let driver = RevealDriver {
        scheduler: RevealScheduler::new(config),
        sink,
        stage,
        cancelled: false,
    };
    tokio::spawn(async move {
        let outcome = driver.run(rx).await;
        tracing::debug!(?outcome, "reveal finished");
        let _ = outcome_tx.send(Some(outcome));
    });

    RevealHandle {
        tx,
        outcome: outcome_rx,
    }
}

struct RevealDriver<S> {
    scheduler: RevealScheduler,
    sink: S,
    stage: Stage,
    cancelled: bool,
}

impl<S: OutputSink> RevealDriver<S> {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<RevealCommand>) -> RevealOutcome {
        let mut commands_open = true;

        loop {
            let deadline = self.scheduler.next_deadline();
            // Only polled when a deadline exists; the fallback keeps the
            // expression valid while the branch is disabled.
            let wake_at = deadline
                .map(Instant::from_std)
                .unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

            let effects = tokio::select! {
                command = rx.recv(), if commands_open => match command {
                    Some(command) => self.command(command),
                    None => {
                        // Every handle is gone: nothing else can be queued.
                        commands_open = false;
                        self.scheduler.signal_end()
                    }
                },
                _ = sleep_until(wake_at), if deadline.is_some() => {
                    self.scheduler.tick(Instant::now().into_std())
                }
            };

            match self.apply(effects) {
                Ok(false) => {}
                Ok(true) if self.cancelled => return RevealOutcome::Cancelled,
                Ok(true) => return RevealOutcome::Completed,
                Err(e) => {
                    tracing::warn!(error = %e, "sink detached, aborting reveal");
                    let effects = self.scheduler.cancel();
                    self.apply_detached(effects);
                    return RevealOutcome::Aborted;
                }
            }

            if !commands_open && self.scheduler.next_deadline().is_none() {
                // Idle with no way to receive more input.
                return RevealOutcome::Completed;
            }
        }
    }

    fn command(&mut self, command: RevealCommand) -> Vec<RevealEffect> {
        let now = Instant::now().into_std();
        match command {
            RevealCommand::Enqueue(text) => self.scheduler.enqueue(text, now),
            RevealCommand::SignalEnd => self.scheduler.signal_end(),
            RevealCommand::Cancel => {
                self.cancelled = true;
                self.scheduler.cancel()
            }
            RevealCommand::StartTalking => {
                self.stage.start_talking();
                Vec::new()
            }
            RevealCommand::StopTalking => {
                self.stage.stop_talking();
                Vec::new()
            }
        }
    }

    /// Carry out effects; `Ok(true)` once the turn has finished
    fn apply(&mut self, effects: Vec<RevealEffect>) -> Result<bool, SinkError> {
        let mut finished = false;
        for effect in effects {
            match effect {
                RevealEffect::StartTalking => self.stage.start_talking(),
                RevealEffect::Append(ch) => {
                    let mut buf = [0u8; 4];
                    self.sink.append(ch.encode_utf8(&mut buf))?;
                }
                RevealEffect::TypeSound => self.stage.type_sound(),
                RevealEffect::ScrollToEnd => self.sink.scroll_to_end()?,
                RevealEffect::StopTalking => self.stage.stop_talking(),
                RevealEffect::TurnFinished => {
                    self.sink.finish();
                    finished = true;
                }
            }
        }
        Ok(finished)
    }

    /// Carry out the abort effects without touching the broken sink
    fn apply_detached(&mut self, effects: Vec<RevealEffect>) {
        for effect in effects {
            if effect == RevealEffect::StopTalking {
                self.stage.stop_talking();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::animator::{AnimatorState, AvatarAnimator, AvatarImages};
    use crate::sink::StringSink;
    use crate::sound::CountingCue;
    use pretty_assertions::assert_eq;

    const DELAY: Duration = Duration::from_millis(40);
    const GRACE: Duration = Duration::from_millis(500);

    fn config() -> RevealConfig {
        RevealConfig {
            typewriter_delay: DELAY,
            grace_period: GRACE,
        }
    }

    fn stage() -> (Stage, Arc<CountingCue>) {
        let cue = Arc::new(CountingCue::new());
        let animator = AvatarAnimator::new(
            AvatarImages::new("idle.png", "talk.png"),
            Duration::from_millis(150),
        )
        .shared();
        (Stage::new(animator, cue.clone()), cue)
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_all_resolves_after_last_char() {
        let (stage, _) = stage();
        let sink = StringSink::new();
        let handle = spawn_reveal(config(), sink.clone(), stage.clone());

        let start = Instant::now();
        let outcome = handle.reveal_all("Hello").await;

        assert_eq!(outcome, RevealOutcome::Completed);
        assert_eq!(sink.text(), "Hello");
        assert!(sink.is_finished());
        assert!(start.elapsed() >= DELAY * 4 + GRACE);
        assert_eq!(stage.state(), AnimatorState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_segments_one_talk_cycle() {
        let (stage, cue) = stage();
        let sink = StringSink::new();
        let handle = spawn_reveal(config(), sink.clone(), stage.clone());

        handle.enqueue("Hello");
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.enqueue(" world");
        handle.signal_end();

        // Mid-turn the avatar is talking.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(stage.state(), AnimatorState::Talking);

        assert_eq!(handle.finished().await, RevealOutcome::Completed);
        assert_eq!(sink.text(), "Hello world");
        assert_eq!(sink.scrolls(), 11);

        let animator = stage.animator().lock();
        assert_eq!(animator.talk_starts(), 1);
        assert_eq!(animator.image_resets(), 1);
        assert_eq!(cue.clicks(), 10);
        assert_eq!(cue.stops(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_segment_within_grace_keeps_talking() {
        let (stage, _) = stage();
        let sink = StringSink::new();
        let handle = spawn_reveal(config(), sink.clone(), stage.clone());

        handle.enqueue("ab");
        // Drained after ~80ms, then well inside the grace period.
        tokio::time::sleep(DELAY * 2 + GRACE / 2).await;
        assert_eq!(stage.state(), AnimatorState::Talking);
        handle.enqueue("cd");
        handle.signal_end();

        handle.finished().await;
        assert_eq!(sink.text(), "abcd");
        assert_eq!(stage.animator().lock().talk_starts(), 1);
        assert_eq!(stage.animator().lock().image_resets(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_reveal_still_toggles_avatar() {
        let (stage, _) = stage();
        let sink = StringSink::new();
        let handle = spawn_reveal(config(), sink.clone(), stage.clone());

        assert_eq!(handle.reveal_all("").await, RevealOutcome::Completed);
        assert_eq!(sink.text(), "");
        let animator = stage.animator().lock();
        assert_eq!(animator.talk_starts(), 1);
        assert_eq!(animator.image_resets(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_drain() {
        let (stage, cue) = stage();
        let sink = StringSink::new();
        let handle = spawn_reveal(config(), sink.clone(), stage.clone());

        handle.enqueue("a long answer");
        tokio::time::sleep(DELAY * 3).await;
        handle.cancel();

        assert_eq!(handle.finished().await, RevealOutcome::Cancelled);
        let shown = sink.text();
        assert!("a long answer".starts_with(&shown));
        assert!(shown.len() < "a long answer".len());
        assert_eq!(stage.state(), AnimatorState::Idle);
        assert_eq!(cue.stops(), 1);

        // Further commands are ignored once finished.
        tokio::task::yield_now().await;
        assert!(!handle.enqueue("late"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_detached_sink_aborts_turn() {
        let (stage, _) = stage();
        let sink = StringSink::new();
        let handle = spawn_reveal(config(), sink.clone(), stage.clone());

        handle.enqueue("abcdef");
        handle.signal_end();
        tokio::time::sleep(DELAY * 2).await;
        sink.detach();

        assert_eq!(handle.finished().await, RevealOutcome::Aborted);
        assert_eq!(stage.state(), AnimatorState::Idle);
        assert!(sink.text().len() < 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handles_finish_the_turn() {
        let (stage, _) = stage();
        let sink = StringSink::new();
        let handle = spawn_reveal(config(), sink.clone(), stage.clone());
        let watcher = handle.outcome.clone();

        handle.enqueue("bye");
        drop(handle);

        let mut watcher = watcher;
        let outcome = *watcher.wait_for(Option::is_some).await.unwrap();
        assert_eq!(outcome, Some(RevealOutcome::Completed));
        assert_eq!(sink.text(), "bye");
        assert_eq!(stage.state(), AnimatorState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_without_text() {
        let (stage, _) = stage();
        let sink = StringSink::new();
        let handle = spawn_reveal(config(), sink.clone(), stage.clone());

        handle.signal_end();
        assert_eq!(handle.finished().await, RevealOutcome::Completed);
        assert_eq!(stage.animator().lock().talk_starts(), 0);
        assert!(sink.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_talking_passthroughs() {
        let (stage, _) = stage();
        let handle = spawn_reveal(config(), StringSink::new(), stage.clone());

        handle.start_talking();
        tokio::task::yield_now().await;
        assert_eq!(stage.state(), AnimatorState::Talking);

        handle.stop_talking();
        tokio::task::yield_now().await;
        assert_eq!(stage.state(), AnimatorState::Idle);
        handle.cancel();
    }
}
