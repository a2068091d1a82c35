//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use wardview_core::index::flatten;
use wardview_core::routing::Route;

use crate::app::{can_add_search_char, App, AppState, Focus, Tab, PAGE_SCROLL_SIZE};
use crate::ui::tabs::{departments, detail};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle search mode
    if matches!(app.state, AppState::Searching) {
        handle_search_input(app, key);
        return Ok(false);
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            app.navigate(Tab::ALL[index].route());
            return Ok(false);
        }
        KeyCode::Left if app.focus == Focus::List => {
            let tab = app.current_tab().map(|t| t.prev()).unwrap_or(Tab::Patients);
            app.navigate(tab.route());
            return Ok(false);
        }
        KeyCode::Right if app.focus == Focus::List && !matches!(app.route(), Route::PatientDetail(_)) => {
            let tab = app.current_tab().map(|t| t.next()).unwrap_or(Tab::Patients);
            app.navigate(tab.route());
            return Ok(false);
        }
        KeyCode::Char('/') => {
            if matches!(app.route(), Route::Patients | Route::PatientDetail(_)) {
                app.start_search();
            }
            return Ok(false);
        }
        KeyCode::Esc => {
            if app.focus == Focus::Detail {
                app.focus = Focus::List;
            } else if !app.search_query.is_empty() {
                app.clear_search();
            } else {
                app.go_back();
            }
            return Ok(false);
        }
        _ => {}
    }

    // View-specific input
    match app.route().clone() {
        Route::Patients => handle_patients_input(app, key),
        Route::PatientDetail(_) => handle_detail_input(app, key),
        Route::Departments => handle_departments_input(app, key),
        Route::ErrorPage => {
            if key.code == KeyCode::Enter {
                app.navigate(Route::Patients);
            }
        }
        Route::Profile | Route::Help => {}
    }

    Ok(false)
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.clear_search();
        }
        KeyCode::Enter => {
            // Keep search query active
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            app.search_query.pop();
            app.apply_search();
        }
        KeyCode::Char(c) => {
            if can_add_search_char(app.search_query.chars().count(), c) {
                app.search_query.push(c);
                app.apply_search();
            }
        }
        _ => {}
    }
}

fn handle_patients_input(app: &mut App, key: KeyEvent) {
    let max_index = app.visible_patients().len().saturating_sub(1);

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.patient_selection = (app.patient_selection + 1).min(max_index);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.patient_selection = app.patient_selection.saturating_sub(1);
        }
        KeyCode::Home => app.patient_selection = 0,
        KeyCode::End => app.patient_selection = max_index,
        KeyCode::Char('n') | KeyCode::PageDown => app.next_page(),
        KeyCode::Char('p') | KeyCode::PageUp => app.prev_page(),
        KeyCode::Char('r') => app.retry(),
        KeyCode::Char('u') => app.reload(),
        KeyCode::Tab => {
            app.focus = match app.focus {
                Focus::List => Focus::Detail,
                Focus::Detail => Focus::List,
            };
        }
        KeyCode::Enter => app.open_selected_patient(),
        _ => {}
    }
}

fn handle_detail_input(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('r') {
        if app.detail.patient.is_none() {
            app.reload_detail();
        }
        return;
    }
    if key.code == KeyCode::Tab {
        app.focus = match app.focus {
            Focus::List => Focus::Detail,
            Focus::Detail => Focus::List,
        };
        return;
    }

    match app.focus {
        Focus::List => {
            let entry_count = flatten(&app.detail_sections()).len();
            let max_index = entry_count.saturating_sub(1);
            match key.code {
                KeyCode::Char('j') | KeyCode::Down => {
                    app.detail.index_selection = (app.detail.index_selection + 1).min(max_index);
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    app.detail.index_selection = app.detail.index_selection.saturating_sub(1);
                }
                KeyCode::Home => app.detail.index_selection = 0,
                KeyCode::End => app.detail.index_selection = max_index,
                KeyCode::Enter | KeyCode::Right => jump_to_selected_entry(app),
                _ => {}
            }
        }
        Focus::Detail => match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                app.detail.scroll = app.detail.scroll.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.detail.scroll = app.detail.scroll.saturating_sub(1);
            }
            KeyCode::PageDown => {
                app.detail.scroll = app.detail.scroll.saturating_add(PAGE_SCROLL_SIZE);
            }
            KeyCode::PageUp => {
                app.detail.scroll = app.detail.scroll.saturating_sub(PAGE_SCROLL_SIZE);
            }
            KeyCode::Home => app.detail.scroll = 0,
            _ => {}
        },
    }
}

/// Scroll the record to the selected index entry and focus the record.
fn jump_to_selected_entry(app: &mut App) {
    let sections = app.detail_sections();
    let entries = flatten(&sections);
    let Some(entry) = entries.get(app.detail.index_selection) else {
        return;
    };
    let offset = app
        .detail
        .patient
        .as_ref()
        .and_then(|patient| detail::anchor_offset(patient, entry.anchor()));

    if let Some(offset) = offset {
        app.detail.scroll = offset;
        app.focus = Focus::Detail;
    }
}

fn handle_departments_input(app: &mut App, key: KeyEvent) {
    let max_index = departments::DIRECTORY.len().saturating_sub(1);
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.department_selection = (app.department_selection + 1).min(max_index);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.department_selection = app.department_selection.saturating_sub(1);
        }
        KeyCode::Home => app.department_selection = 0,
        KeyCode::End => app.department_selection = max_index,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use wardview_core::config::Config;
    use wardview_core::models::PatientDetail;

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_input(app, KeyEvent::new(code, KeyModifiers::NONE)).expect("input")
    }

    fn test_app() -> App {
        let mut config = Config::default();
        config.api.base_url = "http://127.0.0.1:9/api".to_string();
        App::new(config).expect("app")
    }

    /// App showing a loaded record, without any fetch.
    fn app_on_record() -> App {
        let mut app = test_app();
        app.navigator.navigate(Route::PatientDetail("1".to_string()));
        app.detail.dni = Some("1".to_string());
        app.detail.patient = Some(PatientDetail {
            dni: "1".to_string(),
            ..Default::default()
        });
        app
    }

    #[test]
    fn test_help_overlay_toggle() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.state, AppState::ShowingHelp);
        // Other keys are swallowed by the overlay
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.route(), &Route::Patients);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_quit_confirmation() {
        let mut app = test_app();
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!press(&mut app, KeyCode::Char('n')));
        assert_eq!(app.state, AppState::Normal);

        press(&mut app, KeyCode::Char('q'));
        assert!(press(&mut app, KeyCode::Char('y')));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_number_keys_switch_views() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.route(), &Route::Departments);
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.route(), &Route::Profile);
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.route(), &Route::Help);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.route(), &Route::Profile);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.route(), &Route::Help);
    }

    #[test]
    fn test_departments_selection_is_clamped() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Up);
        assert_eq!(app.department_selection, 0);
        press(&mut app, KeyCode::End);
        assert_eq!(app.department_selection, departments::DIRECTORY.len() - 1);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.department_selection, departments::DIRECTORY.len() - 1);
    }

    #[test]
    fn test_search_is_only_offered_where_it_applies() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_index_search_and_jump() {
        let mut app = app_on_record();

        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.state, AppState::Searching);
        for c in "judi".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.detail.index_query, "judi");

        // Antecedentes, then Judiciales
        press(&mut app, KeyCode::Down);
        assert_eq!(app.detail.index_selection, 1);
        press(&mut app, KeyCode::Enter);

        let patient = app.detail.patient.clone().expect("record");
        assert_eq!(app.focus, Focus::Detail);
        assert_eq!(
            Some(app.detail.scroll),
            detail::anchor_offset(&patient, "antecedentes-judiciales")
        );

        // Esc returns focus to the index, then clears the search
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.focus, Focus::List);
        press(&mut app, KeyCode::Esc);
        assert!(app.detail.index_query.is_empty());
    }

    #[test]
    fn test_record_scrolling() {
        let mut app = app_on_record();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Detail);
        press(&mut app, KeyCode::PageDown);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.detail.scroll, PAGE_SCROLL_SIZE + 1);
        press(&mut app, KeyCode::Home);
        assert_eq!(app.detail.scroll, 0);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.detail.scroll, 0);
    }

    #[test]
    fn test_search_backspace_and_length_limit() {
        let mut app = app_on_record();
        press(&mut app, KeyCode::Char('/'));
        for _ in 0..100 {
            press(&mut app, KeyCode::Char('x'));
        }
        assert_eq!(app.search_query.chars().count(), 64);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.search_query.chars().count(), 63);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state, AppState::Normal);
        assert!(app.search_query.is_empty());
    }
}
