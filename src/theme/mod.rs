//! Colour themes

mod palettes;

pub use palettes::{PAPER, TOKYO_NIGHT};

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// A color theme for the shelf and the reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,

    // Background colors
    pub bg_primary: Color,
    pub bg_card: Color,
    pub bg_page: Color,

    // Foreground colors
    pub fg_primary: Color,
    pub fg_page: Color,
    pub fg_muted: Color,

    // Accent colors
    pub accent_primary: Color,
    pub accent_secondary: Color,

    // Semantic colors
    pub success: Color,
    pub error: Color,
    pub info: Color,

    // UI elements
    pub border: Color,
    pub border_focused: Color,
    pub selection: Color,
    pub disabled: Color,
}

impl Theme {
    /// Built-in theme by name (case insensitive), falling back to Tokyo Night
    pub fn by_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("paper") {
            Theme::paper()
        } else {
            Theme::tokyo_night()
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::tokyo_night()
    }
}
