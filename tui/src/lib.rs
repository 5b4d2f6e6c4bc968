//! buddy TUI - Terminal surface for the presenter engine
//!
//! A full-screen chat where the avatar talks while the reply is typed out.
//!
//! # Architecture
//!
//! - **App**: event loop, turn tasks, layout
//! - **Display**: conversation state fed by `PresenterMessage`s
//! - **Avatar**: sprite pane drawn from the shared animator
//! - **Sound**: terminal bell as the type sound
//! - **Widgets**: bottom-anchored chat log

pub mod app;
pub mod avatar;
pub mod cli;
pub mod display;
pub mod sound;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use cli::Cli;
