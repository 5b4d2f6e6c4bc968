//! Avatar Animator
//!
//! Idle/talking state machine for the avatar sprite. While talking, the
//! displayed image alternates between the idle image (closed mouth) and the
//! talk image (open mouth) at a fixed interval that is independent of, and
//! faster than, the character reveal.
//!
//! # Design
//!
//! The animator owns no timer. It stores a single optional swap deadline and
//! is advanced by whoever drives it through [`AvatarAnimator::tick`], passing
//! the current time. Because there is exactly one deadline slot, a second
//! concurrent swap timer cannot exist; `start_talking` while already talking
//! simply re-arms that slot.
//!
//! # Hot-swapping images
//!
//! [`AvatarAnimator::update_images`] replaces the image pair without touching
//! the talk cycle. While talking, the next swap tick picks up the new pair;
//! while idle, the new idle image is shown immediately.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Idle/talk image pair of one avatar
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvatarImages {
    /// Shown while idle and on the closed-mouth beat
    pub idle: String,
    /// Shown on the open-mouth beat
    pub talk: String,
}

impl AvatarImages {
    /// Create an image pair
    pub fn new(idle: impl Into<String>, talk: impl Into<String>) -> Self {
        Self {
            idle: idle.into(),
            talk: talk.into(),
        }
    }
}

/// Animator state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimatorState {
    /// Idle image, no sound
    Idle,
    /// Mouth alternating, type sounds permitted
    Talking,
}

/// Which beat of the talk cycle is showing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouthPose {
    /// Idle image
    Closed,
    /// Talk image
    Open,
}

impl MouthPose {
    fn toggled(self) -> Self {
        match self {
            Self::Closed => Self::Open,
            Self::Open => Self::Closed,
        }
    }
}

/// Process-wide animator shared between the reveal driver and the renderer
pub type SharedAnimator = Arc<Mutex<AvatarAnimator>>;

/// Avatar animator managing the mouth cycle
#[derive(Debug)]
pub struct AvatarAnimator {
    /// Current image pair (read at every swap)
    images: AvatarImages,
    /// Swap interval
    interval: Duration,
    /// Idle or talking
    state: AnimatorState,
    /// Current beat
    mouth: MouthPose,
    /// The one and only swap deadline
    next_swap: Option<Instant>,
    /// Image currently on screen
    displayed: String,
    /// Number of times the displayed image changed
    image_changes: u64,
    /// Number of effective resets to the idle image
    image_resets: u64,
    /// Number of Idle -> Talking transitions
    talk_starts: u64,
}

impl AvatarAnimator {
    /// Create an idle animator
    pub fn new(images: AvatarImages, interval: Duration) -> Self {
        let displayed = images.idle.clone();
        Self {
            images,
            interval,
            state: AnimatorState::Idle,
            mouth: MouthPose::Closed,
            next_swap: None,
            displayed,
            image_changes: 0,
            image_resets: 0,
            talk_starts: 0,
        }
    }

    /// Wrap into the shared handle used by drivers and renderers
    pub fn shared(self) -> SharedAnimator {
        Arc::new(Mutex::new(self))
    }

    /// Enter `Talking` and arm the swap timer
    ///
    /// If already talking, the existing timer is cancelled and the cycle
    /// restarts from the closed-mouth beat; there is never more than one.
    pub fn start_talking(&mut self, now: Instant) {
        if self.state == AnimatorState::Talking {
            tracing::debug!("start_talking while talking, re-arming swap timer");
            self.next_swap = None;
        } else {
            self.talk_starts += 1;
        }
        self.state = AnimatorState::Talking;
        self.mouth = MouthPose::Closed;
        let closed = self.images.idle.clone();
        self.show(closed);
        self.next_swap = Some(now + self.interval);
    }

    /// Return to `Idle`, cancel the swap timer and show the idle image
    ///
    /// Idempotent: returns `false` and changes nothing when already idle.
    pub fn stop_talking(&mut self) -> bool {
        if self.state == AnimatorState::Idle {
            return false;
        }
        self.state = AnimatorState::Idle;
        self.next_swap = None;
        self.mouth = MouthPose::Closed;
        let idle = self.images.idle.clone();
        self.show(idle);
        self.image_resets += 1;
        true
    }

    /// Replace the image pair without restarting a talk cycle
    pub fn update_images(&mut self, images: AvatarImages) {
        self.images = images;
        if self.state == AnimatorState::Idle {
            let idle = self.images.idle.clone();
            self.show(idle);
        }
    }

    /// Change the swap interval (applies from the next re-arm)
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Advance the mouth cycle if the swap deadline has passed
    ///
    /// Returns `true` if the displayed image changed. At most one swap
    /// happens per call, so a late driver never produces a burst of flaps.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_swap else {
            return false;
        };
        if now < due {
            return false;
        }

        self.mouth = self.mouth.toggled();
        let image = match self.mouth {
            MouthPose::Closed => self.images.idle.clone(),
            MouthPose::Open => self.images.talk.clone(),
        };
        self.next_swap = Some(now + self.interval);
        self.show(image)
    }

    fn show(&mut self, image: String) -> bool {
        if self.displayed == image {
            return false;
        }
        self.displayed = image;
        self.image_changes += 1;
        true
    }

    /// Image that should be on screen right now
    pub fn current_image(&self) -> &str {
        &self.displayed
    }

    /// Current image pair
    pub fn images(&self) -> &AvatarImages {
        &self.images
    }

    /// Current state
    pub fn state(&self) -> AnimatorState {
        self.state
    }

    /// Current beat
    pub fn mouth(&self) -> MouthPose {
        self.mouth
    }

    /// Whether type sounds may play
    pub fn sound_permitted(&self) -> bool {
        self.state == AnimatorState::Talking
    }

    /// When the next swap is due, if talking
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_swap
    }

    /// Swap interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Total number of image changes so far
    pub fn image_changes(&self) -> u64 {
        self.image_changes
    }

    /// Total number of effective idle resets so far
    pub fn image_resets(&self) -> u64 {
        self.image_resets
    }

    /// Total number of Idle -> Talking transitions so far
    pub fn talk_starts(&self) -> u64 {
        self.talk_starts
    }
}
