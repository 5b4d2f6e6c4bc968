//! Reveal Scheduler
//!
//! Typewriter reveal of queued text segments into one sink, with the avatar
//! talking for exactly the span of the turn.
//!
//! # Architecture
//!
//! ```text
//!   RevealHandle ──enqueue / signal_end / cancel──┐
//!                                                 ▼
//!                                   ┌──────────────────────────┐
//!                                   │  driver task (per sink)  │
//!                                   │  select! { command,      │
//!                                   │    sleep_until(deadline) }│
//!                                   └────────────┬─────────────┘
//!                                                │ tick(now)
//!                                                ▼
//!                                   ┌──────────────────────────┐
//!                                   │  RevealScheduler (pure)  │
//!                                   └────────────┬─────────────┘
//!                                                │ RevealEffect
//!                              ┌─────────────────┴──────────────┐
//!                              ▼                                ▼
//!                         OutputSink                 Stage (animator + sound)
//! ```
//!
//! The scheduler is deterministic given its inputs and the `now` it is handed,
//! so its tests run on a hand-advanced clock. The driver tests use tokio's
//! paused clock.

mod driver;
mod scheduler;

pub use driver::{spawn_reveal, RevealHandle, RevealOutcome};
pub use scheduler::{RevealEffect, RevealScheduler, RevealState, TextSegment};
