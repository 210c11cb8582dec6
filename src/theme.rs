use crossterm::style::{self, SetBackgroundColor, SetForegroundColor};
use serde::Deserialize;

/// The eight basic terminal colors prompts draw with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    fn ansi(self) -> style::Color {
        match self {
            Color::Black => style::Color::Black,
            Color::Red => style::Color::DarkRed,
            Color::Green => style::Color::DarkGreen,
            Color::Yellow => style::Color::DarkYellow,
            Color::Blue => style::Color::DarkBlue,
            Color::Magenta => style::Color::DarkMagenta,
            Color::Cyan => style::Color::DarkCyan,
            Color::White => style::Color::Grey,
        }
    }

    pub fn fg(self) -> SetForegroundColor {
        SetForegroundColor(self.ansi())
    }

    /// No prompt paints backgrounds yet; hosts drawing around a prompt can.
    pub fn bg(self) -> SetBackgroundColor {
        SetBackgroundColor(self.ansi())
    }
}

pub const ACCENT: Color = Color::Green; // "? " marker and hints
pub const ANSWER: Color = Color::Cyan; // submitted answers and the highlighted option
pub const ALERT: Color = Color::Red; // validation failures and filter matches

/// Palette shared by every prompt variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub accent: Color,
    pub answer: Color,
    pub alert: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: ACCENT,
            answer: ANSWER,
            alert: ALERT,
        }
    }
}
