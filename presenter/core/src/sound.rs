//! Type Sounds
//!
//! The click that accompanies each printed character. Synthesis is left to
//! the surface; the engine only decides when a click is due.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Sound device used while talking
pub trait SoundCue: Send + Sync {
    /// Play one short type click
    fn play_type_sound(&self);

    /// Silence anything still playing
    fn stop_all(&self);
}

/// A cue that never makes a sound
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentCue;

impl SoundCue for SilentCue {
    fn play_type_sound(&self) {}

    fn stop_all(&self) {}
}

/// A cue that counts calls, for headless runs and tests
#[derive(Debug, Default)]
pub struct CountingCue {
    clicks: AtomicUsize,
    stops: AtomicUsize,
}

impl CountingCue {
    /// Create a zeroed counter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of clicks played
    pub fn clicks(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }

    /// Number of `stop_all` calls
    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl SoundCue for CountingCue {
    fn play_type_sound(&self) {
        self.clicks.fetch_add(1, Ordering::SeqCst);
    }

    fn stop_all(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}
