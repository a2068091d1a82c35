use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use wardview_core::models::PatientSummary;
use wardview_core::utils::{format_date, format_value, truncate};

use crate::app::{App, Focus};
use crate::ui::styles;

/// Render the patient list: paged table plus a summary of the selected row.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    render_patient_table(frame, app, chunks[0]);
    render_patient_summary(frame, app, chunks[1]);
}

/// "Page 2 of 3" style indicator, with the loading flag when a fetch is out.
fn page_indicator(app: &App) -> Line<'static> {
    let list = &app.patients;
    let pages = list.page_count().max(1);
    let mut spans = vec![Span::raw(format!(" Page {} of {} ", list.current_page() + 1, pages))];
    if let Some(pending) = list.pending_page() {
        spans.push(Span::styled(
            format!("- loading page {}... ", pending + 1),
            styles::muted_style(),
        ));
    } else if list.is_loading() {
        spans.push(Span::styled("- loading... ", styles::muted_style()));
    } else if list.state().is_exhausted() && list.total_records() > 0 {
        spans.push(Span::styled("- all loaded ", styles::success_style()));
    }
    Line::from(spans)
}

fn render_patient_table(frame: &mut Frame, app: &App, area: Rect) {
    let list = &app.patients;
    let visible = app.visible_patients();
    let focused = matches!(app.focus, Focus::List);

    let title = match list.filter_term() {
        Some(term) => format!(
            " Patients ({} of {} loaded match \"{}\") ",
            list.filtered().len(),
            list.state().loaded().len(),
            term
        ),
        None => format!(" Patients ({}) ", list.total_records()),
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .title_bottom(page_indicator(app).alignment(Alignment::Right))
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if visible.is_empty() {
        frame.render_widget(empty_state(app).block(block), area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("DNI"),
        Cell::from("Name"),
        Cell::from("Age"),
        Cell::from("Date"),
        Cell::from("Time"),
        Cell::from("Location"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = visible
        .iter()
        .enumerate()
        .map(|(i, patient)| {
            let style = if i == app.patient_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                Cell::from(patient.id.clone()),
                Cell::from(truncate(&patient.full_name(), 32)),
                Cell::from(format!("{:>3}", patient.age)),
                Cell::from(format_date(Some(&patient.visit_date))),
                Cell::from(format_value(Some(&patient.visit_time))),
                Cell::from(format_value(Some(&patient.location))),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Fill(3),
        Constraint::Length(4),
        Constraint::Length(11),
        Constraint::Length(6),
        Constraint::Fill(2),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.patient_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

/// What to show when the current page has no rows.
fn empty_state(app: &App) -> Paragraph<'static> {
    let list = &app.patients;

    let lines = if let Some(err) = list.last_error() {
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(format!("  {}", err), styles::error_style())),
            Line::from(""),
        ];
        if err.is_connection_failure() {
            lines.push(Line::from(Span::styled(
                "  Check that the backend is running and reachable.",
                styles::muted_style(),
            )));
        }
        lines.push(Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("[r]", styles::key_style()),
            Span::styled(" to retry", styles::muted_style()),
        ]));
        lines
    } else if list.is_loading() {
        vec![Line::from(""), Line::from(Span::styled("  Loading patients...", styles::muted_style()))]
    } else if list.filter_term().is_some() {
        vec![
            Line::from(""),
            Line::from(Span::styled("  No loaded patient matches the filter", styles::muted_style())),
        ]
    } else {
        vec![Line::from(""), Line::from(Span::styled("  No patients", styles::muted_style()))]
    };

    Paragraph::new(lines)
}

fn render_patient_summary(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);

    let (title, content) = match app.selected_patient() {
        Some(patient) => (format!(" {} ", patient.id), summary_lines(patient)),
        None => (
            " No Patient Selected ".to_string(),
            vec![Line::from(Span::styled(
                "Select a patient from the list",
                styles::muted_style(),
            ))],
        ),
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn summary_lines(patient: &PatientSummary) -> Vec<Line<'static>> {
    let field = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<10}", label), styles::muted_style()),
            Span::raw(value),
        ])
    };

    vec![
        Line::from(Span::styled(patient.full_name(), styles::title_style())),
        Line::from(""),
        field("DNI:", patient.id.clone()),
        field("Age:", patient.age.to_string()),
        field("Date:", format_date(Some(&patient.visit_date))),
        field("Time:", format_value(Some(&patient.visit_time))),
        field("Location:", format_value(Some(&patient.location))),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", styles::muted_style()),
            Span::styled("Enter", styles::key_style()),
            Span::styled(" to open the clinical record", styles::muted_style()),
        ]),
    ]
}
