//! Engine-to-screen tests
//!
//! Runs real turns through the presenter engine, feeds the messages into the
//! TUI display state and renders the chat log into a test buffer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use buddy_tui::display::DisplayState;
use buddy_tui::widgets::{ChatLog, ChatLogState};
use presenter_core::turn::FAILURE_NOTICE;
use presenter_core::{
    AnimatorState, AvatarAnimator, AvatarImages, ChatReply, ChatRequest, ChatTransport,
    EventStream, PresenterMessage, RevealConfig, SilentCue, Stage, StreamEvent, TransportError,
    TurnOutcome, TurnRunner,
};

/// Streams `deltas`, optionally breaking afterwards, and answers the
/// whole-message endpoint with `reply`
struct FakeRelay {
    deltas: Vec<&'static str>,
    break_stream: bool,
    reply: Option<&'static str>,
}

#[async_trait]
impl ChatTransport for FakeRelay {
    fn name(&self) -> &str {
        "fake"
    }

    async fn health_check(&self) -> bool {
        true
    }

    async fn open_stream(&self, _request: &ChatRequest) -> Result<EventStream, TransportError> {
        let mut events: Vec<Result<StreamEvent, TransportError>> = self
            .deltas
            .iter()
            .map(|d| Ok(StreamEvent::Delta((*d).to_string())))
            .collect();
        if self.break_stream {
            events.push(Err(TransportError::Read("connection reset".to_string())));
        } else {
            events.push(Ok(StreamEvent::End));
        }
        Ok(futures::stream::iter(events).boxed())
    }

    async fn send(&self, _request: &ChatRequest) -> Result<ChatReply, TransportError> {
        match self.reply {
            Some(text) => Ok(ChatReply {
                response: text.to_string(),
            }),
            None => Err(TransportError::Status {
                status: 503,
                body: "busy".to_string(),
            }),
        }
    }
}

struct Surface {
    runner: TurnRunner<FakeRelay>,
    rx: mpsc::UnboundedReceiver<PresenterMessage>,
    display: DisplayState,
}

fn surface(relay: FakeRelay) -> Surface {
    let animator = AvatarAnimator::new(
        AvatarImages::new("idle_inu.png", "talk_inu.png"),
        Duration::from_millis(150),
    )
    .shared();
    let stage = Stage::new(animator, Arc::new(SilentCue));
    let (tx, rx) = mpsc::unbounded_channel();
    let reveal = RevealConfig {
        typewriter_delay: Duration::from_millis(40),
        grace_period: Duration::from_millis(500),
    };
    Surface {
        runner: TurnRunner::new(Arc::new(relay), reveal, stage, tx),
        rx,
        display: DisplayState::new("INU BUDDY"),
    }
}

impl Surface {
    async fn turn(&mut self, text: &str) -> TurnOutcome {
        let outcome = self.runner.run_turn(text).await;
        while let Ok(msg) = self.rx.try_recv() {
            self.display.apply(msg);
        }
        outcome
    }

    fn screen(&self, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let mut state = ChatLogState::default();
        terminal
            .draw(|frame| {
                frame.render_stateful_widget(
                    ChatLog::new(self.display.messages(), 0),
                    frame.area(),
                    &mut state,
                );
            })
            .unwrap();

        let buffer = terminal.backend().buffer().clone();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }
}

#[tokio::test(start_paused = true)]
async fn test_streamed_turn_on_screen() {
    let mut s = surface(FakeRelay {
        deltas: vec!["Hello", " there"],
        break_stream: false,
        reply: None,
    });

    assert_eq!(s.turn("hi").await, TurnOutcome::Streamed);
    assert_eq!(
        s.screen(40, 3),
        vec!["USER> hi", "INU BUDDY> Hello there", ""]
    );
    assert!(!s.display.is_streaming());
    assert_eq!(s.runner.stage().state(), AnimatorState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_broken_stream_keeps_partial_then_falls_back() {
    let mut s = surface(FakeRelay {
        deltas: vec!["Hel"],
        break_stream: true,
        reply: Some("Hello again"),
    });

    assert_eq!(s.turn("hi").await, TurnOutcome::FellBack);
    assert_eq!(
        s.screen(40, 3),
        vec!["USER> hi", "INU BUDDY> Hel", "INU BUDDY> Hello again"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_total_failure_shows_notice_line() {
    let mut s = surface(FakeRelay {
        deltas: vec![],
        break_stream: true,
        reply: None,
    });

    assert_eq!(s.turn("hi").await, TurnOutcome::Failed);
    let screen = s.screen(50, 4);
    assert_eq!(screen[0], "USER> hi");
    assert!(screen.iter().any(|row| row == FAILURE_NOTICE));
    assert_eq!(s.runner.stage().state(), AnimatorState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_avatar_switch_between_turns() {
    let mut s = surface(FakeRelay {
        deltas: vec!["ok"],
        break_stream: false,
        reply: None,
    });

    s.turn("one").await;
    s.display.set_assistant_name("SPECTRA");
    s.runner
        .stage()
        .update_images(AvatarImages::new("idle.png", "talk.png"));
    s.turn("two").await;

    assert_eq!(
        s.screen(30, 4),
        vec!["USER> one", "INU BUDDY> ok", "USER> two", "SPECTRA> ok"]
    );
    assert_eq!(
        s.runner.stage().animator().lock().current_image(),
        "idle.png"
    );
}
