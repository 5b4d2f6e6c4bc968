//! Theme and Colors
//!
//! Palettes for the built-in avatar sprites and the chat log.

use ratatui::style::Color;

// ============================================================================
// INU BUDDY Palette (shiba-style dog)
// ============================================================================

/// Fur - warm tan (main color)
pub const INU_FUR: Color = Color::Rgb(222, 160, 96);

/// Fur shadow - darker tan for ears and outline
pub const INU_FUR_SHADOW: Color = Color::Rgb(170, 110, 60);

/// Muzzle and cheeks - cream
pub const INU_CREAM: Color = Color::Rgb(250, 236, 210);

/// Eyes and nose
pub const INU_DARK: Color = Color::Rgb(40, 30, 30);

/// Open mouth and tongue
pub const INU_TONGUE: Color = Color::Rgb(230, 110, 130);

// ============================================================================
// SPECTRA Palette (visor robot)
// ============================================================================

/// Shell - cool violet
pub const SPECTRA_SHELL: Color = Color::Rgb(150, 130, 230);

/// Shell shadow
pub const SPECTRA_SHADOW: Color = Color::Rgb(95, 80, 170);

/// Visor glow - cyan
pub const SPECTRA_VISOR: Color = Color::Rgb(110, 230, 255);

/// Speaker grille while talking
pub const SPECTRA_VOICE: Color = Color::Rgb(255, 210, 120);

// ============================================================================
// UI Colors
// ============================================================================

/// Assistant prompt prefix
pub const ASSISTANT_ACCENT: Color = Color::Magenta;

/// User input green
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Error notices
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Text drawn from a custom sprite file
pub const CUSTOM_SPRITE: Color = Color::Rgb(220, 220, 220);
