//! Main Application
//!
//! The App is a thin display client around the presenter engine:
//! - Terminal events become turns, scrolling and avatar switches
//! - `PresenterMessage`s from the engine update `DisplayState`
//! - The frame tick advances the shared avatar animator and rings the bell
//!
//! A turn runs in its own task; the loop never waits on the network.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use presenter_core::{
    AnimatorState, AvatarAnimator, AvatarProfile, ChatTransport, HttpTransport, PresenterConfig,
    PresenterMessage, Stage, TurnOutcome, TurnRunner,
};

use crate::avatar::Avatar;
use crate::display::DisplayState;
use crate::sound::{TerminalBell, BEL};
use crate::theme::{ASSISTANT_ACCENT, DIM_GRAY, USER_GREEN};
use crate::widgets::{ChatLog, ChatLogState};

/// Frame tick, fast enough for the mouth swap
const FRAME: Duration = Duration::from_millis(16);

/// Input box height (lines)
const INPUT_HEIGHT: u16 = 3;

/// Avatar pane width (columns)
const AVATAR_WIDTH: u16 = 16;

/// Rows moved by PageUp/PageDown
const PAGE: u16 = 5;

/// Main application state
pub struct App<T: ChatTransport + 'static = HttpTransport> {
    running: bool,

    // === Engine ===
    transport: Arc<T>,
    runner: TurnRunner<T>,
    stage: Stage,
    bell: Arc<TerminalBell>,
    rx: mpsc::UnboundedReceiver<PresenterMessage>,
    /// The turn currently being shown, if any
    turn: Option<JoinHandle<TurnOutcome>>,
    /// Startup health probe
    health: Option<JoinHandle<bool>>,

    // === Display ===
    display: DisplayState,
    avatar: Avatar,
    profiles: Vec<AvatarProfile>,
    profile_idx: usize,
    log_state: ChatLogState,
    input_buffer: String,
    base_url: String,
    /// Set when the avatar image changed since the last draw
    avatar_dirty: bool,
}

impl App<HttpTransport> {
    /// Create an app talking to the configured HTTP relay
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &PresenterConfig) -> anyhow::Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config.transport)?);
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: ChatTransport + 'static> App<T> {
    /// Create an app over any transport
    pub fn with_transport(config: &PresenterConfig, transport: Arc<T>) -> Self {
        let profiles = if config.avatar.profiles.is_empty() {
            vec![config.avatar.initial()]
        } else {
            config.avatar.profiles.clone()
        };
        let first = profiles[0].clone();

        let animator =
            AvatarAnimator::new(first.images.clone(), config.avatar.mouth_interval).shared();
        let bell = Arc::new(TerminalBell::new(&config.sound));
        let stage = Stage::new(animator.clone(), bell.clone());
        let (tx, rx) = mpsc::unbounded_channel();
        let runner = TurnRunner::new(
            Arc::clone(&transport),
            config.reveal.clone(),
            stage.clone(),
            tx,
        );

        let mut display = DisplayState::new(first.name.clone());
        display.system(format!("> SYSTEM: {} Online", first.name));

        Self {
            running: true,
            transport,
            runner,
            stage,
            bell,
            rx,
            turn: None,
            health: None,
            display,
            avatar: Avatar::new(animator),
            profiles,
            profile_idx: 0,
            log_state: ChatLogState::default(),
            input_buffer: String::new(),
            base_url: config.transport.base_url.clone(),
            avatar_dirty: true,
        }
    }

    /// Main event loop
    ///
    /// # Errors
    ///
    /// Returns an error if drawing to the terminal fails.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        self.load_sprites().await;
        let mut event_stream = EventStream::new();
        self.probe_health();
        self.render(terminal)?;

        while self.running {
            tokio::select! {
                biased;

                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key);
                        }
                        Some(Ok(Event::Resize(..))) => self.avatar_dirty = true,
                        Some(Ok(_)) => {}
                        Some(Err(e)) => tracing::warn!(error = %e, "terminal event error"),
                        None => self.running = false,
                    }
                }

                Some(msg) = self.rx.recv() => {
                    self.display.apply(msg);
                }

                () = tokio::time::sleep(FRAME) => {}
            }

            self.drain_messages();
            self.tick().await;

            if self.bell.take_pending() {
                let backend = terminal.backend_mut();
                backend.write_all(BEL.as_bytes())?;
                Backend::flush(backend)?;
            }

            self.render(terminal)?;
        }

        if let Some(turn) = self.turn.take() {
            turn.abort();
        }
        self.stage.stop_talking();
        Ok(())
    }

    fn render(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        let text_dirty = self.display.take_dirty();
        if text_dirty || std::mem::take(&mut self.avatar_dirty) {
            terminal.draw(|frame| self.draw(frame))?;
        }
        Ok(())
    }

    /// Apply every engine message already queued
    pub fn drain_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            self.display.apply(msg);
        }
    }

    /// Per-frame work: finished tasks and the mouth cycle
    pub async fn tick(&mut self) {
        if self.turn.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(turn) = self.turn.take() {
                match turn.await {
                    Ok(outcome) => tracing::debug!(?outcome, "turn finished"),
                    Err(e) => tracing::error!(error = %e, "turn task failed"),
                }
            }
        }

        if self.health.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(probe) = self.health.take() {
                if !matches!(probe.await, Ok(true)) {
                    tracing::warn!(base_url = %self.base_url, "relay health check failed");
                    self.display
                        .error(format!("> SYSTEM: relay not reachable at {}", self.base_url));
                }
            }
        }

        if self.stage.tick() {
            self.avatar_dirty = true;
        }
    }

    fn probe_health(&mut self) {
        let transport = Arc::clone(&self.transport);
        self.health = Some(tokio::spawn(async move { transport.health_check().await }));
    }

    /// Handle one key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
                self.avatar_dirty = true;
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
                self.avatar_dirty = true;
            }
            KeyCode::PageUp => self.display.scroll_up(PAGE),
            KeyCode::PageDown => self.display.scroll_down(PAGE),
            KeyCode::F(2) => self.cycle_avatar(),
            _ => {}
        }
    }

    /// Start a turn with the input buffer
    ///
    /// Ignored while a turn is still being shown; the input stays put.
    pub fn submit(&mut self) {
        if self.turn_in_flight() {
            tracing::debug!("turn in flight, input held");
            return;
        }
        let text = self.input_buffer.trim().to_string();
        if text.is_empty() {
            return;
        }
        self.input_buffer.clear();

        let runner = self.runner.clone();
        self.turn = Some(tokio::spawn(async move { runner.run_turn(&text).await }));
    }

    /// Read every configured avatar's sprites so drawing never waits on disk
    pub async fn load_sprites(&mut self) {
        self.avatar
            .preload(self.profiles.iter().map(|profile| &profile.images))
            .await;
        self.avatar_dirty = true;
    }

    /// Switch to the next configured avatar
    pub fn cycle_avatar(&mut self) {
        if self.profiles.len() < 2 {
            return;
        }
        self.profile_idx = (self.profile_idx + 1) % self.profiles.len();
        let profile = self.profiles[self.profile_idx].clone();

        self.stage.update_images(profile.images);
        self.display.set_assistant_name(profile.name.clone());
        self.display
            .system(format!("> SYSTEM: {} Online", profile.name));
        self.avatar_dirty = true;
    }

    /// Whether a turn task is still running
    pub fn turn_in_flight(&self) -> bool {
        self.turn.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Whether the loop should keep going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Conversation state
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Text typed so far
    pub fn input(&self) -> &str {
        &self.input_buffer
    }

    /// The shared stage (animator and sound)
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Draw one frame
    pub fn draw(&mut self, frame: &mut ratatui::Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(INPUT_HEIGHT),
                Constraint::Length(1),
            ])
            .split(frame.area());
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(AVATAR_WIDTH)])
            .split(rows[0]);

        frame.render_stateful_widget(
            ChatLog::new(self.display.messages(), self.display.scroll_offset),
            top[0],
            &mut self.log_state,
        );
        // Keep the offset within what the log can actually scroll.
        self.display.scroll_offset =
            u16::try_from(self.log_state.scroll_offset).unwrap_or(u16::MAX);

        self.avatar.render(top[1], frame.buffer_mut());
        self.draw_input(frame, rows[1]);
        self.draw_status(frame, rows[2]);
    }

    fn draw_input(&self, frame: &mut ratatui::Frame, area: Rect) {
        let style = if self.turn_in_flight() {
            Style::default().fg(DIM_GRAY)
        } else {
            Style::default().fg(USER_GREEN)
        };
        let line = Line::from(vec![
            Span::styled("USER> ", style.add_modifier(Modifier::BOLD)),
            Span::styled(format!("{}_", self.input_buffer), style),
        ]);
        frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: false }), area);
    }

    fn draw_status(&self, frame: &mut ratatui::Frame, area: Rect) {
        let talking = self.stage.state() == AnimatorState::Talking;
        let status = Line::from(vec![
            Span::styled(
                self.display.assistant_name().to_string(),
                Style::default().fg(ASSISTANT_ACCENT),
            ),
            Span::styled(
                format!(
                    " | {} | {} | F2 avatar  PgUp/PgDn scroll  Esc quit",
                    if talking { "talking" } else { "idle" },
                    self.base_url
                ),
                Style::default().fg(DIM_GRAY),
            ),
        ]);
        frame.render_widget(Paragraph::new(status), area);
    }
}
