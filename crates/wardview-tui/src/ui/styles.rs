use ratatui::style::{Color, Modifier, Style};

use wardview_core::utils::NOT_SPECIFIED;

// Clinical palette
pub const TEAL: Color = Color::Rgb(56, 150, 160);
pub const MINT: Color = Color::Rgb(110, 180, 130);
pub const AMBER: Color = Color::Rgb(210, 170, 80);
pub const ALERT: Color = Color::Rgb(205, 80, 80);
pub const SLATE: Color = Color::Rgb(120, 130, 140);
pub const TEXT: Color = Color::Rgb(225, 228, 232);
pub const ROW_BG: Color = Color::Rgb(36, 52, 60);
pub const BAR_BG: Color = Color::Rgb(24, 32, 38);

pub fn title_style() -> Style {
    Style::default().fg(TEAL).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(ROW_BG).fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(TEXT)
}

pub fn muted_style() -> Style {
    Style::default().fg(SLATE)
}

/// Section and group headings inside a panel.
pub fn heading_style() -> Style {
    Style::default().fg(AMBER).add_modifier(Modifier::BOLD)
}

pub fn success_style() -> Style {
    Style::default().fg(MINT)
}

pub fn error_style() -> Style {
    Style::default().fg(ALERT).add_modifier(Modifier::BOLD)
}

/// Record value, dimmed and italic when the backend left it empty.
pub fn value_style(value: &str) -> Style {
    if value == NOT_SPECIFIED {
        muted_style().add_modifier(Modifier::ITALIC)
    } else {
        list_item_style()
    }
}

pub fn tab_style(selected: bool) -> Style {
    match selected {
        true => title_style().add_modifier(Modifier::UNDERLINED),
        false => muted_style(),
    }
}

pub fn border_style(focused: bool) -> Style {
    Style::default().fg(if focused { TEAL } else { SLATE })
}

pub fn search_style() -> Style {
    Style::default().fg(AMBER)
}

pub fn status_bar_style() -> Style {
    Style::default().bg(BAR_BG).fg(TEXT)
}

/// Key name in help text and hints.
pub fn key_style() -> Style {
    Style::default().fg(AMBER).add_modifier(Modifier::BOLD)
}
