//! Stage
//!
//! The side-effect adapter between the reveal state machine and the shared
//! avatar/sound devices. Reveal drivers never touch the animator directly;
//! they call the stage at the transition points the scheduler reports.

use std::sync::Arc;

use tokio::time::Instant;

use crate::animator::{AnimatorState, AvatarImages, SharedAnimator};
use crate::sound::SoundCue;

/// Shared animator plus the sound device, injected into every reveal driver
///
/// Only one assistant turn is expected to talk at a time; two concurrent
/// drivers on the same stage would race the animator state.
#[derive(Clone)]
pub struct Stage {
    animator: SharedAnimator,
    sound: Arc<dyn SoundCue>,
}

impl Stage {
    /// Create a stage around an animator and a sound device
    pub fn new(animator: SharedAnimator, sound: Arc<dyn SoundCue>) -> Self {
        Self { animator, sound }
    }

    /// The shared animator (for renderers and image hot-swaps)
    pub fn animator(&self) -> &SharedAnimator {
        &self.animator
    }

    /// Begin the mouth cycle
    pub fn start_talking(&self) {
        self.animator.lock().start_talking(Instant::now().into_std());
        tracing::debug!("avatar talking");
    }

    /// End the mouth cycle and silence the sound device
    ///
    /// Does nothing when the avatar is already idle.
    pub fn stop_talking(&self) {
        let stopped = self.animator.lock().stop_talking();
        if stopped {
            self.sound.stop_all();
            tracing::debug!("avatar idle");
        }
    }

    /// Click for one printed character, if the avatar is talking
    pub fn type_sound(&self) {
        let permitted = self.animator.lock().sound_permitted();
        if permitted {
            self.sound.play_type_sound();
        }
    }

    /// Advance the mouth cycle; returns `true` if the image changed
    pub fn tick(&self) -> bool {
        self.animator.lock().tick(Instant::now().into_std())
    }

    /// Hot-swap the avatar images
    pub fn update_images(&self, images: AvatarImages) {
        tracing::info!(idle = %images.idle, talk = %images.talk, "avatar images updated");
        self.animator.lock().update_images(images);
    }

    /// Current animator state
    pub fn state(&self) -> AnimatorState {
        self.animator.lock().state()
    }
}
