use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let config = &app.config;
    let field = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<20}", label), styles::muted_style()),
            Span::raw(value),
        ])
    };

    let lines = vec![
        Line::from(Span::styled(config.profile.name.clone(), styles::title_style())),
        Line::from(""),
        Line::from(Span::styled("Account", styles::heading_style())),
        field("Name:", config.profile.name.clone()),
        field("Email:", config.profile.email.clone()),
        Line::from(""),
        Line::from(Span::styled("Connection", styles::heading_style())),
        field("Backend:", config.api.base_url.clone()),
        field("Request timeout:", format!("{} s", config.api.request_timeout_secs)),
        field(
            "Page sizes:",
            format!(
                "{} per fetch, {} per page",
                config.pagination.server_page_size, config.pagination.client_page_size
            ),
        ),
    ];

    let block = Block::default()
        .title(" Profile ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
