use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::styles;

/// One entry of the hospital directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub category: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const DIRECTORY: [DirectoryEntry; 9] = [
    DirectoryEntry {
        category: "Services",
        name: "Medicina",
        description: "Internal medicine and clinical specialties. Admits adult patients for diagnosis and non-surgical treatment.",
    },
    DirectoryEntry {
        category: "Services",
        name: "Cirugía",
        description: "General and specialised surgery, including pre- and post-operative care.",
    },
    DirectoryEntry {
        category: "Services",
        name: "Pediatría",
        description: "Care for newborns, children and adolescents.",
    },
    DirectoryEntry {
        category: "Care settings",
        name: "Hospitalización",
        description: "Inpatient wards. Beds are assigned per service and shown on each patient record.",
    },
    DirectoryEntry {
        category: "Care settings",
        name: "Consulta externa",
        description: "Scheduled outpatient consultations.",
    },
    DirectoryEntry {
        category: "Care settings",
        name: "Emergencia",
        description: "24-hour emergency care and triage.",
    },
    DirectoryEntry {
        category: "Professionals",
        name: "Dr. Juan Pérez",
        description: "Medicina. Attending physician.",
    },
    DirectoryEntry {
        category: "Professionals",
        name: "Dra. María Gómez",
        description: "Pediatría. Attending physician.",
    },
    DirectoryEntry {
        category: "Professionals",
        name: "Dr. Carlos López",
        description: "Cirugía. Attending surgeon.",
    },
];

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_directory(frame, app, chunks[0]);
    render_entry(frame, app, chunks[1]);
}

fn render_directory(frame: &mut Frame, app: &App, area: Rect) {
    let mut items = Vec::new();
    let mut selected_row = 0;
    let mut last_category = "";

    for (i, entry) in DIRECTORY.iter().enumerate() {
        if entry.category != last_category {
            items.push(ListItem::new(Line::from(Span::styled(
                entry.category,
                styles::heading_style(),
            ))));
            last_category = entry.category;
        }
        if i == app.department_selection {
            selected_row = items.len();
        }
        let style = if i == app.department_selection {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        items.push(ListItem::new(Line::from(format!("  {}", entry.name))).style(style));
    }

    let focused = matches!(app.focus, Focus::List);
    let block = Block::default()
        .title(" Departments ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let mut state = ListState::default();
    state.select(Some(selected_row));

    frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
}

fn render_entry(frame: &mut Frame, app: &App, area: Rect) {
    let (title, content) = match DIRECTORY.get(app.department_selection) {
        Some(entry) => (
            format!(" {} ", entry.name),
            vec![
                Line::from(Span::styled(entry.name, styles::title_style())),
                Line::from(Span::styled(entry.category, styles::muted_style())),
                Line::from(""),
                Line::from(entry.description),
            ],
        ),
        None => (
            " Nothing selected ".to_string(),
            vec![Line::from(Span::styled(
                "Select an entry from the list",
                styles::muted_style(),
            ))],
        ),
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_groups_are_contiguous() {
        let categories: Vec<&str> = DIRECTORY.iter().map(|e| e.category).collect();
        let mut seen: Vec<&str> = Vec::new();
        for category in categories {
            if seen.last() != Some(&category) {
                assert!(!seen.contains(&category), "{} appears twice", category);
                seen.push(category);
            }
        }
        assert_eq!(seen, vec!["Services", "Care settings", "Professionals"]);
    }
}
