//! Reveal Scheduler
//!
//! Pure typewriter state machine. It owns the FIFO of pending segments and a
//! single deadline, and reports what should happen as [`RevealEffect`]s. It
//! never sleeps and never touches the sink or the avatar itself; a driver
//! calls [`RevealScheduler::tick`] when [`RevealScheduler::next_deadline`] is
//! reached and carries out the effects.
//!
//! # State table
//!
//! | State     | Input      | Guard               | Next      | Effects                                  |
//! |-----------|------------|---------------------|-----------|------------------------------------------|
//! | Idle      | enqueue    |                     | Draining  | StartTalking, tick due now               |
//! | Draining  | enqueue    |                     | Draining  | segment queued                           |
//! | Quiescing | enqueue    |                     | Draining  | grace cancelled, tick due now            |
//! | Draining  | tick       | character available | Draining  | Append, TypeSound, ScrollToEnd, +delay   |
//! | Draining  | tick       | queue empty         | Quiescing | grace due +grace                         |
//! | Quiescing | tick       | end signalled       | Idle      | StopTalking, TurnFinished                |
//! | Quiescing | tick       | end not signalled   | Quiescing | grace re-armed                           |
//! | Idle      | signal_end | nothing queued      | Idle      | TurnFinished                             |
//! | any       | cancel     |                     | Idle      | StopTalking if talking, TurnFinished     |
//!
//! `TypeSound` is only reported for non-whitespace characters.

use std::collections::VecDeque;
use std::time::Instant;

use crate::config::RevealConfig;

// ============================================================================
// Types
// ============================================================================

/// One fragment of text to reveal
///
/// Identity is the content plus its enqueue order within the turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextSegment {
    /// Enqueue order, starting at 0 for each scheduler
    pub seq: u64,
    /// Text to reveal
    pub text: String,
}

/// Drain loop state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RevealState {
    /// Nothing to reveal, not talking
    #[default]
    Idle,
    /// Revealing one character per tick
    Draining,
    /// Queue empty, waiting out the grace period
    Quiescing,
}

/// Side effect requested by the scheduler
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RevealEffect {
    /// Avatar enters the talking state
    StartTalking,
    /// Append one character to the sink
    Append(char),
    /// Play one type sound
    TypeSound,
    /// Scroll the sink's container to its end
    ScrollToEnd,
    /// Avatar returns to idle
    StopTalking,
    /// The turn is over; nothing else will be revealed
    TurnFinished,
}

// ============================================================================
// Scheduler
// ============================================================================

/// Typewriter scheduler for one sink
#[derive(Debug)]
pub struct RevealScheduler {
    config: RevealConfig,
    queue: VecDeque<TextSegment>,
    /// Byte offset into the front segment
    cursor: usize,
    state: RevealState,
    end_signaled: bool,
    talking: bool,
    /// The only pending deadline (next character or grace expiry)
    deadline: Option<Instant>,
    next_seq: u64,
    revealed_chars: u64,
    finished: bool,
}

impl RevealScheduler {
    /// Create an idle scheduler
    pub fn new(config: RevealConfig) -> Self {
        Self {
            config,
            queue: VecDeque::new(),
            cursor: 0,
            state: RevealState::Idle,
            end_signaled: false,
            talking: false,
            deadline: None,
            next_seq: 0,
            revealed_chars: 0,
            finished: false,
        }
    }

    /// Queue a segment for reveal
    ///
    /// Empty segments are accepted and still go through start/stop.
    pub fn enqueue(&mut self, text: impl Into<String>, now: Instant) -> Vec<RevealEffect> {
        let segment = TextSegment {
            seq: self.next_seq,
            text: text.into(),
        };
        self.next_seq += 1;
        tracing::debug!(seq = segment.seq, len = segment.text.len(), state = ?self.state, "enqueue");
        self.queue.push_back(segment);

        let mut effects = Vec::new();
        match self.state {
            RevealState::Idle => {
                // A fresh turn on a scheduler that already finished one.
                self.finished = false;
                self.end_signaled = false;
                self.state = RevealState::Draining;
                self.talking = true;
                self.deadline = Some(now);
                effects.push(RevealEffect::StartTalking);
            }
            RevealState::Quiescing => {
                self.state = RevealState::Draining;
                self.deadline = Some(now);
            }
            RevealState::Draining => {}
        }
        effects
    }

    /// Mark that no further segments will arrive for this turn
    ///
    /// Does not restart the grace timer.
    pub fn signal_end(&mut self) -> Vec<RevealEffect> {
        self.end_signaled = true;
        if self.state == RevealState::Idle && !self.finished {
            self.finished = true;
            tracing::debug!("end signalled with nothing queued");
            return vec![RevealEffect::TurnFinished];
        }
        Vec::new()
    }

    /// Force `Idle` from any state, dropping everything queued
    pub fn cancel(&mut self) -> Vec<RevealEffect> {
        let dropped = self.queue.len();
        self.queue.clear();
        self.cursor = 0;
        self.state = RevealState::Idle;
        self.deadline = None;
        self.end_signaled = true;

        let mut effects = Vec::new();
        if self.talking {
            self.talking = false;
            effects.push(RevealEffect::StopTalking);
        }
        if !self.finished {
            self.finished = true;
            effects.push(RevealEffect::TurnFinished);
        }
        tracing::debug!(dropped, "reveal cancelled");
        effects
    }

    /// Advance if the deadline has been reached
    pub fn tick(&mut self, now: Instant) -> Vec<RevealEffect> {
        match self.deadline {
            Some(due) if now >= due => {}
            _ => return Vec::new(),
        }

        match self.state {
            RevealState::Idle => {
                self.deadline = None;
                Vec::new()
            }
            RevealState::Draining => self.drain_one(now),
            RevealState::Quiescing => self.grace_expired(now),
        }
    }

    fn drain_one(&mut self, now: Instant) -> Vec<RevealEffect> {
        while let Some(front) = self.queue.front() {
            if let Some(ch) = front.text[self.cursor..].chars().next() {
                self.cursor += ch.len_utf8();
                self.revealed_chars += 1;
                self.deadline = Some(now + self.config.typewriter_delay);

                let mut effects = vec![RevealEffect::Append(ch)];
                if !ch.is_whitespace() {
                    effects.push(RevealEffect::TypeSound);
                }
                effects.push(RevealEffect::ScrollToEnd);
                return effects;
            }
            // Segment exhausted: continue straight into the next one.
            self.queue.pop_front();
            self.cursor = 0;
        }

        self.state = RevealState::Quiescing;
        self.deadline = Some(now + self.config.grace_period);
        tracing::debug!(revealed = self.revealed_chars, "queue drained, quiescing");
        Vec::new()
    }

    fn grace_expired(&mut self, now: Instant) -> Vec<RevealEffect> {
        if !self.end_signaled {
            self.deadline = Some(now + self.config.grace_period);
            return Vec::new();
        }

        self.state = RevealState::Idle;
        self.deadline = None;
        self.finished = true;
        tracing::debug!(revealed = self.revealed_chars, "turn finished");

        let mut effects = Vec::new();
        if self.talking {
            self.talking = false;
            effects.push(RevealEffect::StopTalking);
        }
        effects.push(RevealEffect::TurnFinished);
        effects
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Current state
    pub fn state(&self) -> RevealState {
        self.state
    }

    /// When `tick` next has something to do
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the scheduler has asked the avatar to talk
    pub fn is_talking(&self) -> bool {
        self.talking
    }

    /// Whether `signal_end` (or `cancel`) has been called this turn
    pub fn end_signaled(&self) -> bool {
        self.end_signaled
    }

    /// Whether the last turn has finished
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Segments still queued, including the one being revealed
    pub fn queued_segments(&self) -> usize {
        self.queue.len()
    }

    /// Characters waiting to be revealed
    pub fn pending_chars(&self) -> usize {
        self.queue
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let start = if i == 0 { self.cursor } else { 0 };
                s.text[start..].chars().count()
            })
            .sum()
    }

    /// Characters revealed so far
    pub fn revealed_chars(&self) -> u64 {
        self.revealed_chars
    }

    /// Timing configuration
    pub fn config(&self) -> &RevealConfig {
        &self.config
    }
}
