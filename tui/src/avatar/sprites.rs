//! Sprite Definitions
//!
//! Blocky pixel art using Unicode block elements and colors. Each avatar
//! image name used by the animator (`idle_inu.png`, `talk.png`, ...) maps to
//! one [`Frame`] here.

use std::collections::HashMap;

use ratatui::style::Color;

use crate::theme::{
    INU_CREAM, INU_DARK, INU_FUR, INU_FUR_SHADOW, INU_TONGUE, SPECTRA_SHADOW, SPECTRA_SHELL,
    SPECTRA_VISOR, SPECTRA_VOICE,
};

/// A single colored cell in a sprite
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColoredCell {
    /// The character to display
    pub ch: char,
    /// Foreground color
    pub fg: Color,
}

impl ColoredCell {
    /// Create a new colored cell
    pub const fn new(ch: char, fg: Color) -> Self {
        Self { ch, fg }
    }

    /// Empty/transparent cell
    pub const fn empty() -> Self {
        Self {
            ch: ' ',
            fg: Color::Reset,
        }
    }

    /// Check if cell is empty/transparent
    pub fn is_empty(&self) -> bool {
        self.ch == ' '
    }
}

/// One avatar image as a grid of colored cells
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// 2D grid of colored cells (row-major)
    pub cells: Vec<Vec<ColoredCell>>,
    /// Width in terminal cells
    pub width: u16,
    /// Height in terminal cells
    pub height: u16,
}

impl Frame {
    /// Create a frame from a grid of colored cells
    pub fn new(cells: Vec<Vec<ColoredCell>>) -> Self {
        let height = u16::try_from(cells.len()).unwrap_or(u16::MAX);
        let width = cells
            .iter()
            .map(|row| u16::try_from(row.len()).unwrap_or(u16::MAX))
            .max()
            .unwrap_or(0);

        Self {
            cells,
            width,
            height,
        }
    }

    /// Build a frame from plain text, one row per line, in a single color
    pub fn from_text(text: &str, color: Color) -> Self {
        let cells = text
            .lines()
            .map(|line| {
                line.chars()
                    .map(|c| {
                        if c == ' ' {
                            ColoredCell::empty()
                        } else {
                            ColoredCell::new(c, color)
                        }
                    })
                    .collect()
            })
            .collect();
        Self::new(cells)
    }

    /// Get cell at position (returns empty if out of bounds)
    pub fn get(&self, x: u16, y: u16) -> &ColoredCell {
        static EMPTY: ColoredCell = ColoredCell::empty();
        self.cells
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .unwrap_or(&EMPTY)
    }
}

// ============================================================================
// Sprite Builder Helpers
// ============================================================================

/// Parse a sprite definition using a color map
///
/// Format: each character in the pattern maps to a (char, Color) in the palette.
/// Special: ' ' (space) is always transparent.
pub fn build_frame(pattern: &[&str], palette: &[(char, char, Color)]) -> Frame {
    let color_map: HashMap<char, (char, Color)> = palette
        .iter()
        .map(|&(key, ch, color)| (key, (ch, color)))
        .collect();

    let cells: Vec<Vec<ColoredCell>> = pattern
        .iter()
        .map(|line| {
            line.chars()
                .map(|c| {
                    if c == ' ' {
                        ColoredCell::empty()
                    } else if let Some(&(ch, color)) = color_map.get(&c) {
                        ColoredCell::new(ch, color)
                    } else {
                        // Unknown char - show as-is in default color
                        ColoredCell::new(c, Color::Reset)
                    }
                })
                .collect()
        })
        .collect();

    Frame::new(cells)
}

// ============================================================================
// Built-in Avatars
// ============================================================================

const INU_PALETTE: &[(char, char, Color)] = &[
    ('F', '█', INU_FUR),
    ('S', '█', INU_FUR_SHADOW),
    ('^', '▲', INU_FUR_SHADOW),
    ('C', '█', INU_CREAM),
    ('e', '●', INU_DARK),
    ('n', '▼', INU_DARK),
    ('m', '▬', INU_DARK),
    ('t', '█', INU_TONGUE),
];

const INU_IDLE: &[&str] = &[
    " ^      ^ ",
    " SFFFFFFS ",
    "FFeFFFFeFF",
    "FCCCnnCCCF",
    " CCCmmCCC ",
    "  FFFFFF  ",
];

const INU_TALK: &[&str] = &[
    " ^      ^ ",
    " SFFFFFFS ",
    "FFeFFFFeFF",
    "FCCCnnCCCF",
    " CCCttCCC ",
    "  FFttFF  ",
];

const SPECTRA_PALETTE: &[(char, char, Color)] = &[
    ('B', '█', SPECTRA_SHELL),
    ('D', '█', SPECTRA_SHADOW),
    ('a', '│', SPECTRA_SHADOW),
    ('V', '▀', SPECTRA_VISOR),
    ('o', '◉', SPECTRA_VISOR),
    ('-', '─', SPECTRA_SHADOW),
    ('w', '▓', SPECTRA_VOICE),
];

const SPECTRA_IDLE: &[&str] = &[
    "    a     ",
    " DBBBBBBD ",
    "BVoVVVVoVB",
    "BBBBBBBBBB",
    "BBB----BBB",
    " DBBBBBBD ",
];

const SPECTRA_TALK: &[&str] = &[
    "    a     ",
    " DBBBBBBD ",
    "BVoVVVVoVB",
    "BBBBBBBBBB",
    "BBBwwwwBBB",
    " DBBwwBBD ",
];

/// Built-in art keyed by image file stem
fn builtin(stem: &str) -> Option<Frame> {
    let frame = match stem {
        "idle_inu" => build_frame(INU_IDLE, INU_PALETTE),
        "talk_inu" => build_frame(INU_TALK, INU_PALETTE),
        "idle" => build_frame(SPECTRA_IDLE, SPECTRA_PALETTE),
        "talk" => build_frame(SPECTRA_TALK, SPECTRA_PALETTE),
        _ => return None,
    };
    Some(frame)
}

/// Placeholder for images that could not be resolved
fn placeholder(image: &str) -> Frame {
    let talking = image.contains("talk");
    let mouth = if talking { "│  ( o )  │" } else { "│  ( - )  │" };
    Frame::from_text(
        &format!("┌─────────┐\n│  •   •  │\n{mouth}\n└─────────┘"),
        CUSTOM_FALLBACK,
    )
}

const CUSTOM_FALLBACK: Color = Color::Gray;

// ============================================================================
// Sprite Library
// ============================================================================

/// Resolves avatar image names to frames
///
/// Names are resolved in order: built-in art by file stem, then a text file
/// at that path (one row per line), then a placeholder face. Files are read
/// by [`SpriteLibrary::load`] before the render loop starts; [`frame`] never
/// touches the filesystem.
///
/// [`frame`]: SpriteLibrary::frame
#[derive(Debug, Default)]
pub struct SpriteLibrary {
    cache: HashMap<String, Frame>,
}

impl SpriteLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the sprite file behind `image` into the cache
    ///
    /// Built-in names and images already cached are left alone. A missing or
    /// empty file caches the placeholder so the render path stays a lookup.
    pub async fn load(&mut self, image: &str) {
        if self.cache.contains_key(image) {
            return;
        }
        if let Some(frame) = builtin(stem_of(image)) {
            self.cache.insert(image.to_string(), frame);
            return;
        }

        let frame = match tokio::fs::read_to_string(image).await {
            Ok(text) if !text.trim().is_empty() => {
                tracing::debug!(image, "loaded sprite from file");
                Frame::from_text(&text, crate::theme::CUSTOM_SPRITE)
            }
            Ok(_) => {
                tracing::warn!(image, "sprite file is empty, using placeholder");
                placeholder(image)
            }
            Err(e) => {
                tracing::warn!(image, error = %e, "unknown avatar image, using placeholder");
                placeholder(image)
            }
        };
        self.cache.insert(image.to_string(), frame);
    }

    /// Frame for an image name
    ///
    /// Images that were never loaded fall back to built-in art or the
    /// placeholder.
    pub fn frame(&mut self, image: &str) -> &Frame {
        self.cache.entry(image.to_string()).or_insert_with(|| {
            builtin(stem_of(image)).unwrap_or_else(|| {
                tracing::debug!(image, "sprite not loaded, using placeholder");
                placeholder(image)
            })
        })
    }

    /// Number of resolved images
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether nothing has been resolved yet
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

fn stem_of(image: &str) -> &str {
    std::path::Path::new(image)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(image)
}
