//! Colours and styles for the TUI.
//!
//! The series colours and the chart background come from the chart's own
//! [`Rgba`] constants, so the raster and the surrounding text agree.

use netpulse_core::Rgba;
use ratatui::style::{Color, Modifier, Style};

// ── Palette ───────────────────────────────────────────────────────────

pub const DOWNLOAD: Color = from_rgba(Rgba::DOWNLOAD);
pub const UPLOAD: Color = from_rgba(Rgba::UPLOAD);
pub const SURFACE: Color = from_rgba(Rgba::BACKGROUND);

pub const ACCENT: Color = Color::Rgb(225, 53, 255);
pub const HIGHLIGHT: Color = DOWNLOAD;
pub const HEALTHY: Color = Color::Rgb(80, 250, 123);
pub const WARNING: Color = Color::Rgb(241, 250, 140);
pub const FAILURE: Color = Color::Rgb(255, 99, 99);

pub const TEXT: Color = Color::Rgb(189, 193, 207);
pub const MUTED: Color = Color::Rgb(98, 114, 164);
const SELECTED_BG: Color = Color::Rgb(40, 42, 54);

/// Terminal colour for a raster pixel. Alpha is dropped; the chart raster
/// is cleared to an opaque background before anything is drawn.
pub const fn from_rgba(c: Rgba) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

// ── Styles ────────────────────────────────────────────────────────────

pub fn title() -> Style {
    Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

pub fn border(focused: bool) -> Style {
    Style::default().fg(if focused { ACCENT } else { MUTED })
}

pub fn table_header() -> Style {
    Style::default()
        .fg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::default().fg(TEXT)
}

pub fn table_selected() -> Style {
    Style::default()
        .fg(ACCENT)
        .bg(SELECTED_BG)
        .add_modifier(Modifier::BOLD)
}

pub fn tab(active: bool) -> Style {
    if active {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT)
    }
}

/// Description half of a key hint ("quit" in "q quit").
pub fn hint() -> Style {
    Style::default().fg(MUTED)
}

/// Key half of a key hint.
pub fn hint_key() -> Style {
    Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

/// Label column in key/value panels.
pub fn label() -> Style {
    Style::default().fg(TEXT)
}

/// Filled popup background.
pub fn popup() -> Style {
    Style::default().bg(SURFACE)
}
