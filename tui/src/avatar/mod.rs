//! Avatar Pane
//!
//! Draws whatever image the shared animator currently shows. The animator
//! lives in `presenter-core` and flips between the idle and talk images; this
//! module only turns an image name into colored cells and centers them.

mod sprites;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;

use presenter_core::{AvatarImages, SharedAnimator};

pub use sprites::{build_frame, ColoredCell, Frame, SpriteLibrary};

/// The avatar as drawn in the terminal
pub struct Avatar {
    animator: SharedAnimator,
    sprites: SpriteLibrary,
}

impl Avatar {
    /// Create an avatar view over a shared animator
    pub fn new(animator: SharedAnimator) -> Self {
        Self {
            animator,
            sprites: SpriteLibrary::new(),
        }
    }

    /// Read the sprites for every image pair ahead of the first draw
    pub async fn preload<'a>(&mut self, pairs: impl IntoIterator<Item = &'a AvatarImages>) {
        for images in pairs {
            self.sprites.load(&images.idle).await;
            self.sprites.load(&images.talk).await;
        }
        tracing::debug!(sprites = self.sprites.len(), "avatar sprites loaded");
    }

    /// Number of images with a resolved frame
    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    /// Name of the image currently shown
    pub fn current_image(&self) -> String {
        self.animator.lock().current_image().to_string()
    }

    /// Render the current image centered in `area`
    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        let image = self.current_image();
        let frame = self.sprites.frame(&image);
        render_frame(frame, area, buf);
    }
}

/// Draw a frame centered in `area`, skipping transparent cells
pub fn render_frame(frame: &Frame, area: Rect, buf: &mut Buffer) {
    let x_offset = area.width.saturating_sub(frame.width) / 2;
    let y_offset = area.height.saturating_sub(frame.height) / 2;

    for (row_idx, row) in frame.cells.iter().enumerate() {
        let Ok(row_idx) = u16::try_from(row_idx) else {
            break;
        };
        let y = area.y + y_offset + row_idx;
        if y >= area.bottom() {
            break;
        }

        for (col_idx, cell) in row.iter().enumerate() {
            let Ok(col_idx) = u16::try_from(col_idx) else {
                break;
            };
            let x = area.x + x_offset + col_idx;
            if x >= area.right() {
                break;
            }
            if cell.is_empty() {
                continue;
            }
            buf.set_string(x, y, cell.ch.to_string(), Style::default().fg(cell.fg));
        }
    }
}
