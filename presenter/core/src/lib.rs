//! Presenter Core - Streaming Presentation Engine for buddy
//!
//! This crate turns a chat reply, streamed in chunks at whatever rate the
//! network manages, into a paced typewriter reveal with a talking avatar and
//! type sounds. It has no UI framework dependency; a surface receives
//! [`PresenterMessage`]s and renders the avatar from the shared animator.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          UI Surface                               │
//! │   chat log (one line per message)        avatar sprite pane       │
//! │          ▲  PresenterMessage                  ▲ current_image()   │
//! └──────────┼────────────────────────────────────┼───────────────────┘
//!            │                                    │
//! ┌──────────┼────────────────────────────────────┼───────────────────┐
//! │          │            PRESENTER CORE          │                   │
//! │   ┌──────┴──────┐   effects   ┌───────────────┴─────────────┐     │
//! │   │ ChannelSink │◄────────────│ reveal driver ──► Stage      │     │
//! │   └─────────────┘             │   (RevealScheduler)  │       │     │
//! │                               └──────────▲───────────┼───────┘     │
//! │                                          │ enqueue    ▼            │
//! │   ┌───────────────┐  events  ┌───────────┴───┐  AvatarAnimator     │
//! │   │ ChatTransport │─────────►│  TurnRunner   │  + SoundCue         │
//! │   │ (HTTP / SSE)  │          └───────────────┘                     │
//! │   └───────────────┘                                                │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Overview
//!
//! - [`config`]: Layered configuration (defaults, TOML file, environment, CLI)
//! - [`stream`]: Framing of `data:` lines into delta/end events
//! - [`transport`]: Chat relay client (streaming and whole-message endpoints)
//! - [`reveal`]: Typewriter scheduler and its per-sink driver task
//! - [`animator`]: Idle/talking avatar state machine
//! - [`stage`]: Animator and sound, as seen by the reveal driver
//! - [`sink`]: Output sinks a reveal writes into
//! - [`sound`]: Type sound devices
//! - [`messages`]: Messages from the engine to a UI surface
//! - [`turn`]: One user turn, with the whole-message fallback
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use presenter_core::{
//!     load_config, AvatarAnimator, HttpTransport, SilentCue, Stage, TurnRunner,
//! };
//! use tokio::sync::mpsc;
//!
//! let config = load_config()?;
//! let animator = AvatarAnimator::new(config.avatar.initial().images, config.avatar.mouth_interval);
//! let stage = Stage::new(animator.shared(), Arc::new(SilentCue));
//! let (tx, mut rx) = mpsc::unbounded_channel();
//!
//! let transport = Arc::new(HttpTransport::new(&config.transport)?);
//! let runner = TurnRunner::new(transport, config.reveal.clone(), stage, tx);
//! runner.run_turn("Hello!").await;
//!
//! while let Ok(msg) = rx.try_recv() {
//!     // Render message to UI
//! }
//! ```
//!
//! # One talker at a time
//!
//! The animator is process-wide. Two reveals may run into two sinks, but only
//! one of them should be driving the avatar; [`TurnRunner`] waits for each
//! reveal to finish before returning.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animator;
pub mod config;
pub mod messages;
pub mod reveal;
pub mod sink;
pub mod sound;
pub mod stage;
pub mod stream;
pub mod transport;
pub mod turn;

// Re-exports for convenience
pub use animator::{AnimatorState, AvatarAnimator, AvatarImages, MouthPose, SharedAnimator};
pub use config::{
    load_config, load_config_from_path, AvatarProfile, ConfigError, ConfigOverrides,
    ConfigSource, PresenterConfig, RevealConfig,
};
pub use messages::{MessageId, MessageRole, PresenterMessage};
pub use reveal::{
    spawn_reveal, RevealEffect, RevealHandle, RevealOutcome, RevealScheduler, RevealState,
};
pub use sink::{ChannelSink, OutputSink, SinkError, StringSink};
pub use sound::{CountingCue, SilentCue, SoundCue};
pub use stage::Stage;
pub use stream::{StreamConsumer, StreamEvent};
pub use transport::{
    ChatReply, ChatRequest, ChatTransport, EventStream, HttpTransport, TransportError,
};
pub use turn::{TurnOutcome, TurnRunner};
