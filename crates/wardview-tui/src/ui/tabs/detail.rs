//! Patient record view: a searchable index on the left, the full clinical
//! record on the right. Choosing an index entry scrolls the record to the
//! matching anchor.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use serde_json::Value;

use wardview_core::index::{flatten, IndexEntry};
use wardview_core::models::detail::{
    BACKGROUND_SUBSECTIONS, PHYSICAL_EXAM_SUBSECTIONS, SECTION_ANAMNESIS, SECTION_BACKGROUND,
    SECTION_BIOLOGICAL, SECTION_EVOLUTION, SECTION_IDENTIFICATION, SECTION_ILLNESS,
    SECTION_PHYSICAL_EXAM,
};
use wardview_core::models::PatientDetail;
use wardview_core::utils::{format_date, format_value, value_lines, NOT_SPECIFIED};

use crate::app::{App, Focus};
use crate::ui::styles;

/// Column width of field labels in the record.
const LABEL_WIDTH: usize = 24;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let detail = &app.detail;

    let Some(ref patient) = detail.patient else {
        render_placeholder(frame, app, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);

    render_index(frame, app, chunks[0]);
    render_record(frame, app, patient, chunks[1]);
}

fn render_placeholder(frame: &mut Frame, app: &App, area: Rect) {
    let detail = &app.detail;
    let dni = detail.dni.as_deref().unwrap_or("-");

    let lines = if let Some(ref err) = detail.error {
        vec![
            Line::from(""),
            Line::from(Span::styled(format!("  {}", err), styles::error_style())),
            Line::from(""),
            Line::from(vec![
                Span::styled("  Press ", styles::muted_style()),
                Span::styled("[r]", styles::key_style()),
                Span::styled(" to retry or ", styles::muted_style()),
                Span::styled("Esc", styles::key_style()),
                Span::styled(" to go back", styles::muted_style()),
            ]),
        ]
    } else {
        vec![
            Line::from(""),
            Line::from(Span::styled("  Loading patient record...", styles::muted_style())),
        ]
    };

    let block = Block::default()
        .title(format!(" Patient {} ", dni))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_index(frame: &mut Frame, app: &App, area: Rect) {
    let sections = app.detail_sections();
    let entries = flatten(&sections);
    let focused = matches!(app.focus, Focus::List);

    let items: Vec<ListItem> = if entries.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            " No matching sections",
            styles::muted_style(),
        )))]
    } else {
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let selected = i == app.detail.index_selection;
                let line = match *entry {
                    IndexEntry::Section(section) => {
                        let mut spans = vec![Span::styled(
                            section.title.clone(),
                            if selected { styles::selected_style() } else { styles::heading_style() },
                        )];
                        if let Some(ref date) = section.date {
                            spans.push(Span::styled(
                                format!("  {}", format_date(Some(date))),
                                styles::muted_style(),
                            ));
                        }
                        Line::from(spans)
                    }
                    IndexEntry::Subsection(_, sub) => {
                        let mut spans = vec![Span::styled(
                            format!("  {}", sub.title),
                            if selected { styles::selected_style() } else { styles::list_item_style() },
                        )];
                        if let Some(ref date) = sub.date {
                            spans.push(Span::styled(format!("  {}", date), styles::muted_style()));
                        }
                        Line::from(spans)
                    }
                };
                ListItem::new(line)
            })
            .collect()
    };

    let title = if app.detail.index_query.is_empty() {
        " Index ".to_string()
    } else {
        format!(" Index: \"{}\" ", app.detail.index_query)
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let mut state = ListState::default();
    if !entries.is_empty() {
        state.select(Some(app.detail.index_selection.min(entries.len() - 1)));
    }

    frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
}

fn render_record(frame: &mut Frame, app: &App, patient: &PatientDetail, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);
    let record = record_lines(patient);

    let block = Block::default()
        .title(format!(" {} - DNI {} ", patient.full_name(), patient.dni))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let paragraph = Paragraph::new(record.lines)
        .block(block)
        .scroll((app.detail.scroll, 0));
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Record layout
// ============================================================================

/// Rendered record plus the line offset of every anchor.
pub struct RecordLines {
    pub lines: Vec<Line<'static>>,
    pub anchors: Vec<(String, u16)>,
}

impl RecordLines {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            anchors: Vec::new(),
        }
    }

    fn anchor(&mut self, id: &str) {
        let offset = u16::try_from(self.lines.len()).unwrap_or(u16::MAX);
        self.anchors.push((id.to_string(), offset));
    }

    fn heading(&mut self, id: &str, title: &str) {
        if !self.lines.is_empty() {
            self.blank();
        }
        self.anchor(id);
        self.lines.push(Line::from(Span::styled(title.to_string(), styles::title_style())));
    }

    fn subheading(&mut self, id: &str, title: &str) {
        self.anchor(id);
        self.lines.push(Line::from(Span::styled(format!(" {}", title), styles::heading_style())));
    }

    fn field(&mut self, label: &str, value: String) {
        let style = styles::value_style(&value);
        self.lines.push(Line::from(vec![
            Span::styled(format!("  {:<width$}", label, width = LABEL_WIDTH), styles::muted_style()),
            Span::styled(value, style),
        ]));
    }

    fn text(&mut self, value: Option<&str>) {
        let value = format_value(value);
        let style = styles::value_style(&value);
        for line in value.lines() {
            self.lines.push(Line::from(Span::styled(format!("  {}", line), style)));
        }
    }

    fn json(&mut self, value: &Value) {
        let rows = value_lines(value);
        if rows.is_empty() {
            self.text(None);
        }
        for (label, value) in rows {
            if label.is_empty() {
                self.text(Some(&value));
            } else {
                self.field(&label, value);
            }
        }
    }

    fn blank(&mut self) {
        self.lines.push(Line::from(""));
    }

    pub fn offset_of(&self, anchor: &str) -> Option<u16> {
        self.anchors
            .iter()
            .find(|(id, _)| id == anchor)
            .map(|(_, offset)| *offset)
    }
}

fn opt(value: &Option<String>) -> String {
    format_value(value.as_deref())
}

/// Lay out the whole record, one block per index section.
pub fn record_lines(patient: &PatientDetail) -> RecordLines {
    let mut out = RecordLines::new();

    out.heading(SECTION_IDENTIFICATION, "Datos de filiación");
    out.field("DNI", patient.dni.clone());
    out.field("Nombre", format_value(Some(&patient.full_name())));
    out.field("Sexo", opt(&patient.sex));
    out.field("Fecha de nacimiento", format_date(patient.birth_date.as_deref()));
    out.field(
        "Edad",
        patient.age.map(|a| a.to_string()).unwrap_or_else(|| NOT_SPECIFIED.to_string()),
    );
    out.field("Lugar de nacimiento", opt(&patient.birthplace));
    out.field("Religión", opt(&patient.religion));
    out.field("Dirección", opt(&patient.address));
    out.field("Grupo sanguíneo", opt(&patient.blood_group));
    out.field("Factor RH", opt(&patient.rh_factor));
    out.field("Estado civil", opt(&patient.marital_status));
    out.field("Grado de instrucción", opt(&patient.education));
    out.field("Ocupación", opt(&patient.occupation));
    out.field("Familiar encargado", opt(&patient.responsible_relative));
    out.field("Estado actual", opt(&patient.current_status));
    out.field("Cama", opt(&patient.bed));

    out.heading(SECTION_ILLNESS, "Historia de la enfermedad");
    let history = patient.illness_history.clone().unwrap_or_default();
    out.field("Fecha de ingreso", format_date(history.admission_date.as_deref()));
    out.field("Fecha hasta", format_date(history.until_date.as_deref()));
    out.field("Tiempo de enfermedad", opt(&history.duration));
    out.field("Forma de inicio", opt(&history.onset));
    out.field("Curso", opt(&history.course));
    out.field("Síntomas", opt(&history.symptoms));

    out.heading(SECTION_ANAMNESIS, "Anamnesis");
    out.text(patient.anamnesis.as_deref());

    out.heading(SECTION_BIOLOGICAL, "Funciones biológicas");
    let functions = patient.biological_functions.clone().unwrap_or_default();
    out.field("Apetito", opt(&functions.appetite));
    out.field("Deposición", opt(&functions.bowel));
    out.field("Sed", opt(&functions.thirst));
    out.field("Sueño", opt(&functions.sleep));
    out.field("Micción", opt(&functions.urination));
    out.field("Deseo sexual", opt(&functions.sexual_desire));

    out.heading(SECTION_BACKGROUND, "Antecedentes");
    let background = patient.background.clone().unwrap_or_default();
    for (id, title) in BACKGROUND_SUBSECTIONS {
        out.subheading(id, title);
        match id {
            "antecedentes-personales" => out.text(background.personal.as_deref()),
            "antecedentes-academica" => out.text(background.academic_history.as_deref()),
            "antecedentes-judiciales" => out.text(background.judicial.as_deref()),
            "antecedentes-patologicos" => out.json(&background.pathological),
            "antecedentes-familiares" => out.json(&background.family),
            "antecedentes-personalidad" => out.text(background.previous_personality.as_deref()),
            _ => out.json(&background.socioeconomic),
        }
    }

    out.heading(SECTION_PHYSICAL_EXAM, "Examen físico");
    let exam = patient.physical_exam.clone().unwrap_or_default();
    let [(vitals_id, vitals_title), (general_id, general_title)] = PHYSICAL_EXAM_SUBSECTIONS;
    out.subheading(vitals_id, vitals_title);
    out.json(&exam.vital_signs);
    out.subheading(general_id, general_title);
    out.text(exam.general.as_deref());

    out.heading(SECTION_EVOLUTION, "Evolución");
    if patient.evolution.is_empty() {
        out.text(None);
    }
    let sections = patient.sections();
    let evolution_titles = sections
        .iter()
        .find(|s| s.id == SECTION_EVOLUTION)
        .map(|s| s.subsections.as_slice())
        .unwrap_or_default();
    for (i, note) in patient.evolution.iter().enumerate() {
        let anchor = PatientDetail::evolution_anchor(i);
        let title = evolution_titles
            .iter()
            .find(|s| s.id == anchor)
            .map(|s| s.title.clone())
            .unwrap_or_default();
        out.subheading(&anchor, &title);

        let when = [note.date.as_deref(), note.time.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !when.is_empty() {
            out.lines.push(Line::from(Span::styled(format!("  {}", when), styles::muted_style())));
        }
        out.text(Some(&note.content));
    }

    out
}

/// Line offset of `anchor` in the rendered record.
pub fn anchor_offset(patient: &PatientDetail, anchor: &str) -> Option<u16> {
    record_lines(patient).offset_of(anchor)
}
