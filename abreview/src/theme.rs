//! Color theme system for abreview.
//!
//! A `Theme` holds named `ratatui::style::Color` fields covering every UI surface
//! abreview renders. Two built-in themes are provided:
//!
//! - `dark` uses ANSI 16 colors so it works on any terminal, including
//!   256-color SSH sessions with no truecolor support.
//! - `catppuccin_mocha` uses the Catppuccin Mocha palette in RGB and requires
//!   truecolor.

use ratatui::style::Color;
use tracing::warn;

use abreview_core::choice::ChoiceCategory;

#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    pub border_active: Color,
    pub border_inactive: Color,

    // Choice line and page strip
    pub left_chosen: Color,
    pub right_chosen: Color,
    pub tie: Color,
    pub unevaluated: Color,
    /// Background of the current page in the strip.
    pub current_page: Color,

    // Text
    pub folder_label: Color,
    pub muted: Color,
    pub error: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub status_mode_normal: Color,
    pub status_mode_test: Color,

    pub background: Color,
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            left_chosen: Color::Green,
            right_chosen: Color::Blue,
            tie: Color::Yellow,
            unevaluated: Color::DarkGray,
            current_page: Color::Cyan,

            folder_label: Color::White,
            muted: Color::DarkGray,
            error: Color::Red,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_normal: Color::Cyan,
            status_mode_test: Color::Magenta,

            background: Color::Reset,
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let blue = Color::Rgb(137, 180, 250); // #89b4fa
        let mauve = Color::Rgb(203, 166, 247); // #cba6f7
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let base = Color::Rgb(30, 30, 46); // #1e1e2e
        let text = Color::Rgb(205, 214, 244); // #cdd6f4

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            left_chosen: green,
            right_chosen: blue,
            tie: yellow,
            unevaluated: overlay1,
            current_page: lavender,

            folder_label: text,
            muted: overlay1,
            error: red,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_normal: lavender,
            status_mode_test: mauve,

            background: base,
        }
    }

    /// Resolves a theme name from config. Unknown names fall back to `dark()`
    /// with a logged warning so a typo never prevents startup.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }

    /// Color for a choice category.
    pub fn category(&self, category: ChoiceCategory) -> Color {
        match category {
            ChoiceCategory::LeftChosen => self.left_chosen,
            ChoiceCategory::RightChosen => self.right_chosen,
            ChoiceCategory::Tie => self.tie,
            ChoiceCategory::Unevaluated => self.unevaluated,
        }
    }
}
