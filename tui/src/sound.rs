//! Terminal Bell
//!
//! The terminal's only built-in sound. Clicks requested by the reveal driver
//! are coalesced into a pending flag that the render loop drains, so the
//! driver task never writes to the terminal itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use presenter_core::config::SoundConfig;
use presenter_core::SoundCue;

/// BEL byte written to the terminal
pub const BEL: &str = "\x07";

/// A rate-limited terminal bell
#[derive(Debug)]
pub struct TerminalBell {
    enabled: bool,
    min_gap: Duration,
    last_click: Mutex<Option<Instant>>,
    pending: AtomicBool,
}

impl TerminalBell {
    /// Create a bell from the sound settings
    pub fn new(config: &SoundConfig) -> Self {
        Self {
            enabled: config.enabled,
            min_gap: config.min_gap,
            last_click: Mutex::new(None),
            pending: AtomicBool::new(false),
        }
    }

    /// Whether the bell rings at all
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Take the pending ring, if any
    pub fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    fn click_at(&self, now: Instant) {
        if !self.enabled {
            return;
        }
        let mut last = self.last_click.lock();
        if let Some(prev) = *last {
            if now.duration_since(prev) < self.min_gap {
                return;
            }
        }
        *last = Some(now);
        self.pending.store(true, Ordering::Release);
    }
}

impl SoundCue for TerminalBell {
    fn play_type_sound(&self) {
        self.click_at(Instant::now());
    }

    fn stop_all(&self) {
        self.pending.store(false, Ordering::Release);
    }
}
