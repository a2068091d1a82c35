use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::styles;

const KEY_GROUPS: [(&str, &[(&str, &str)]); 4] = [
    (
        "Navigation",
        &[
            ("1-4", "Patients / Departments / Profile / Help"),
            ("←/→", "Previous / next tab"),
            ("↑/↓ j/k", "Move selection or scroll"),
            ("Enter", "Open patient / jump to index entry"),
            ("Tab", "Switch focus (index ↔ record)"),
            ("Esc", "Clear search or go back"),
        ],
    ),
    (
        "Patients",
        &[
            ("n / PgDn", "Next page"),
            ("p / PgUp", "Previous page"),
            ("r", "Retry the last failed load"),
            ("u", "Reload from the first page"),
        ],
    ),
    (
        "Search",
        &[
            ("/", "Filter loaded patients or the record index"),
            ("Enter", "Keep filter"),
        ],
    ),
    ("General", &[("?", "Toggle help"), ("q", "Quit")]),
];

/// Key binding reference shared by the help page and the help overlay.
pub fn help_lines() -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, (group, keys)) in KEY_GROUPS.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(format!(" {}", group), styles::heading_style())));
        for (key, desc) in keys.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<10}", key), styles::key_style()),
                Span::styled(*desc, styles::list_item_style()),
            ]));
        }
    }
    lines
}

pub fn render(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Help ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(help_lines()).block(block), area);
}
