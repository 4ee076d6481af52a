//! Built-in palettes

use ratatui::style::Color;

use super::Theme;

/// Tokyo Night, dark
pub const TOKYO_NIGHT: Theme = Theme {
    name: String::new(), // String::from is not const

    bg_primary: Color::Rgb(26, 27, 38), // #1a1b26
    bg_card: Color::Rgb(36, 40, 59),    // #24283b
    bg_page: Color::Rgb(31, 35, 53),    // #1f2335

    fg_primary: Color::Rgb(169, 177, 214), // #a9b1d6
    fg_page: Color::Rgb(192, 202, 245),    // #c0caf5
    fg_muted: Color::Rgb(86, 95, 137),     // #565f89

    accent_primary: Color::Rgb(122, 162, 247),   // #7aa2f7
    accent_secondary: Color::Rgb(187, 154, 247), // #bb9af7

    success: Color::Rgb(158, 206, 106), // #9ece6a
    error: Color::Rgb(247, 118, 142),   // #f7768e
    info: Color::Rgb(125, 207, 255),    // #7dcfff

    border: Color::Rgb(65, 72, 104),           // #414868
    border_focused: Color::Rgb(122, 162, 247), // #7aa2f7
    selection: Color::Rgb(40, 52, 87),         // #283457
    disabled: Color::Rgb(59, 66, 97),          // #3b4261
};

/// Warm light palette for daytime reading
pub const PAPER: Theme = Theme {
    name: String::new(),

    bg_primary: Color::Rgb(245, 240, 225), // #f5f0e1
    bg_card: Color::Rgb(235, 228, 208),    // #ebe4d0
    bg_page: Color::Rgb(251, 248, 239),    // #fbf8ef

    fg_primary: Color::Rgb(60, 56, 54), // #3c3836
    fg_page: Color::Rgb(40, 40, 40),    // #282828
    fg_muted: Color::Rgb(146, 131, 116), // #928374

    accent_primary: Color::Rgb(7, 102, 120),    // #076678
    accent_secondary: Color::Rgb(143, 63, 113), // #8f3f71

    success: Color::Rgb(121, 116, 14), // #79740e
    error: Color::Rgb(157, 0, 6),      // #9d0006
    info: Color::Rgb(66, 123, 88),     // #427b58

    border: Color::Rgb(213, 196, 161),       // #d5c4a1
    border_focused: Color::Rgb(7, 102, 120), // #076678
    selection: Color::Rgb(221, 209, 180),    // #ddd1b4
    disabled: Color::Rgb(189, 174, 147),     // #bdae93
};

impl Theme {
    pub fn tokyo_night() -> Self {
        Theme { name: "Tokyo Night".to_string(), ..TOKYO_NIGHT }
    }

    pub fn paper() -> Self {
        Theme { name: "Paper".to_string(), ..PAPER }
    }
}
