use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(block, area);

    let back_hint = if app.navigator.can_go_back() {
        "Press Esc to go back or 1 for the patient list"
    } else {
        "Press 1 for the patient list"
    };

    let lines = vec![
        Line::from(Span::styled("404", styles::error_style())),
        Line::from(""),
        Line::from(Span::styled("This page does not exist", styles::title_style())),
        Line::from(""),
        Line::from(Span::styled(back_hint, styles::muted_style())),
    ];

    let inner = centered_rect_fixed(52, 5, area);
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}
