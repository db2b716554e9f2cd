//! Color palettes selected by `ui.theme`.

use ratatui::style::{Color, Modifier, Style};

use crate::app::StatusKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub accent: Color,
    pub text: Color,
    pub faint: Color,
    pub border: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub success: Color,
    pub error: Color,
    pub info: Color,
    pub added: Color,
    pub deleted: Color,
}

/// Warm orange, the default.
const DEFAULT: Theme = Theme {
    accent: Color::Rgb(255, 140, 0),
    text: Color::Reset,
    faint: Color::DarkGray,
    border: Color::Rgb(120, 90, 60),
    selected_bg: Color::Rgb(255, 140, 0),
    selected_fg: Color::Black,
    success: Color::Green,
    error: Color::Red,
    info: Color::Yellow,
    added: Color::Green,
    deleted: Color::Red,
};

const DARK: Theme = Theme {
    accent: Color::Rgb(130, 170, 255),
    text: Color::Rgb(220, 220, 220),
    faint: Color::Rgb(110, 110, 110),
    border: Color::Rgb(70, 70, 90),
    selected_bg: Color::Rgb(60, 70, 110),
    selected_fg: Color::White,
    success: Color::Rgb(120, 200, 120),
    error: Color::Rgb(240, 100, 100),
    info: Color::Rgb(230, 200, 110),
    added: Color::Rgb(120, 200, 120),
    deleted: Color::Rgb(240, 100, 100),
};

const LIGHT: Theme = Theme {
    accent: Color::Rgb(0, 95, 175),
    text: Color::Black,
    faint: Color::Gray,
    border: Color::Rgb(180, 180, 180),
    selected_bg: Color::Rgb(200, 220, 245),
    selected_fg: Color::Black,
    success: Color::Rgb(0, 130, 0),
    error: Color::Rgb(190, 0, 0),
    info: Color::Rgb(150, 100, 0),
    added: Color::Rgb(0, 130, 0),
    deleted: Color::Rgb(190, 0, 0),
};

impl Theme {
    /// Palette for a theme name; unknown names get the default.
    pub fn named(name: &str) -> Self {
        match name {
            "dark" => DARK,
            "light" => LIGHT,
            _ => DEFAULT,
        }
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn faint(&self) -> Style {
        Style::default().fg(self.faint)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.selected_fg)
            .bg(self.selected_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status(&self, kind: StatusKind) -> Style {
        let color = match kind {
            StatusKind::Info => self.info,
            StatusKind::Success => self.success,
            StatusKind::Error => self.error,
        };
        Style::default().fg(color)
    }
}
