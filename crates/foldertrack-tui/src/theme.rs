use ratatui::style::{Color, Modifier, Style};

use foldertrack_core::NoticeLevel;

/// Color theme for the TUI.
pub struct Theme {
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub out_store: Color,
    pub selected: Color,

    pub header_fg: Color,
    pub header_bg: Color,
    pub border: Color,
    pub text: Color,
    pub dim: Color,
    pub highlight_bg: Color,
    pub active: Color,
    pub spinner: Color,
    pub footer_fg: Color,
    pub footer_bg: Color,
}

impl Theme {
    pub const NAMES: &'static [&'static str] = &["default", "contrast"];

    /// Look a theme up by its config name; unknown names fall back to `default`.
    pub fn named(name: &str) -> Self {
        match name {
            "contrast" => Self::contrast(),
            _ => Self::standard(),
        }
    }

    /// Muted blue header with soft accents.
    pub fn standard() -> Self {
        Self {
            success: Color::Rgb(0, 190, 90),
            warning: Color::Rgb(240, 190, 0),
            error: Color::Rgb(235, 80, 80),
            out_store: Color::Rgb(240, 150, 40),
            selected: Color::Rgb(90, 160, 255),

            header_fg: Color::White,
            header_bg: Color::Rgb(30, 70, 120),
            border: Color::Rgb(70, 70, 90),
            text: Color::White,
            dim: Color::Rgb(120, 120, 140),
            highlight_bg: Color::Rgb(30, 40, 70),
            active: Color::Rgb(80, 150, 255),
            spinner: Color::Rgb(80, 150, 255),
            footer_fg: Color::Rgb(120, 120, 140),
            footer_bg: Color::Reset,
        }
    }

    /// Plain ANSI colors for low-color terminals and projectors.
    pub fn contrast() -> Self {
        Self {
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            out_store: Color::Yellow,
            selected: Color::Cyan,

            header_fg: Color::Black,
            header_bg: Color::White,
            border: Color::White,
            text: Color::White,
            dim: Color::Gray,
            highlight_bg: Color::DarkGray,
            active: Color::Cyan,
            spinner: Color::Cyan,
            footer_fg: Color::White,
            footer_bg: Color::Reset,
        }
    }

    pub fn notice_color(&self, level: NoticeLevel) -> Color {
        match level {
            NoticeLevel::Success => self.success,
            NoticeLevel::Warning => self.warning,
            NoticeLevel::Error => self.error,
        }
    }

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default()
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn footer_style(&self) -> Style {
        Style::default().fg(self.footer_fg).bg(self.footer_bg)
    }
}
