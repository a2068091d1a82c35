//! Application state management for wardview.
//!
//! This module contains the core `App` struct: UI state, the patient list,
//! the open patient record, and coordination of background fetches.

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use wardview_core::api::{ApiClient, ApiError};
use wardview_core::config::Config;
use wardview_core::index::{filter_sections, Section};
use wardview_core::models::{PatientDetail, PatientPage, PatientSummary};
use wardview_core::pagination::{FetchOutcome, FetchTicket, PageRequest, PatientList};
use wardview_core::routing::{Navigator, Route};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for search input.
const MAX_SEARCH_LENGTH: usize = 64;

/// Lines to scroll on page up/down in the record view.
pub const PAGE_SCROLL_SIZE: u16 = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Patients,
    Departments,
    Profile,
    Help,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Patients, Tab::Departments, Tab::Profile, Tab::Help];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Patients => "Patients",
            Tab::Departments => "Departments",
            Tab::Profile => "Profile",
            Tab::Help => "Help",
        }
    }

    pub fn route(&self) -> Route {
        match self {
            Tab::Patients => Route::Patients,
            Tab::Departments => Route::Departments,
            Tab::Profile => Route::Profile,
            Tab::Help => Route::Help,
        }
    }

    /// Tab highlighted for a route. The error page belongs to no tab.
    pub fn for_route(route: &Route) -> Option<Self> {
        match route {
            Route::Patients | Route::PatientDetail(_) => Some(Tab::Patients),
            Route::Departments => Some(Tab::Departments),
            Route::Profile => Some(Tab::Profile),
            Route::Help => Some(Tab::Help),
            Route::ErrorPage => None,
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Patients => Tab::Departments,
            Tab::Departments => Tab::Profile,
            Tab::Profile => Tab::Help,
            Tab::Help => Tab::Patients,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Patients => Tab::Help,
            Tab::Departments => Tab::Patients,
            Tab::Profile => Tab::Departments,
            Tab::Help => Tab::Profile,
        }
    }
}

/// Current UI focus area (list/index panel or detail/record panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// State of the open patient record.
#[derive(Debug, Clone, Default)]
pub struct DetailView {
    pub dni: Option<String>,
    pub patient: Option<PatientDetail>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub index_query: String,
    pub index_selection: usize,
    pub scroll: u16,
}

impl DetailView {
    fn open(dni: String) -> Self {
        Self {
            dni: Some(dni),
            is_loading: true,
            ..Self::default()
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from spawned fetches back to the main loop.
enum FetchResult {
    PatientPage {
        ticket: FetchTicket,
        result: Result<PatientPage, ApiError>,
    },
    PatientDetail {
        dni: String,
        result: Result<PatientDetail, ApiError>,
    },
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub config: Config,
    api: ApiClient,
    pub navigator: Navigator,

    // UI State
    pub state: AppState,
    pub focus: Focus,
    pub search_query: String,
    pub status_message: Option<String>,

    // Patients view
    pub patients: PatientList,
    pub patient_selection: usize,

    // Record view
    pub detail: DetailView,

    // Departments view
    pub department_selection: usize,

    // Background task channel
    fetch_rx: mpsc::Receiver<FetchResult>,
    fetch_tx: mpsc::Sender<FetchResult>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(&config.api)?;
        debug!(base_url = api.base_url(), "API client configured");

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let patients = PatientList::new(config.pagination);

        Ok(Self {
            config,
            api,
            navigator: Navigator::new(Route::Patients),

            state: AppState::Normal,
            focus: Focus::List,
            search_query: String::new(),
            status_message: None,

            patients,
            patient_selection: 0,

            detail: DetailView::default(),

            department_selection: 0,

            fetch_rx: rx,
            fetch_tx: tx,
        })
    }

    /// Load the first page of the initial view.
    pub fn start(&mut self) {
        let route = self.navigator.current().clone();
        info!(route = %route, "Opening initial view");
        self.enter_route(&route);
    }

    pub fn route(&self) -> &Route {
        self.navigator.current()
    }

    pub fn current_tab(&self) -> Option<Tab> {
        Tab::for_route(self.route())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn navigate(&mut self, route: Route) {
        if let Some(left) = self.navigator.navigate(route) {
            self.leave_route(&left);
            let entered = self.navigator.current().clone();
            self.enter_route(&entered);
        }
    }

    pub fn go_back(&mut self) {
        if let Some(left) = self.navigator.back() {
            self.leave_route(&left);
            let entered = self.navigator.current().clone();
            self.enter_route(&entered);
        }
    }

    fn leave_route(&mut self, route: &Route) {
        debug!(route = %route, "Leaving view");
        match route {
            // Bumps the cache generation so late page responses are dropped
            Route::Patients => self.patients.reset(),
            Route::PatientDetail(_) => self.detail = DetailView::default(),
            _ => {}
        }
        self.search_query.clear();
        self.focus = Focus::List;
        if self.state == AppState::Searching {
            self.state = AppState::Normal;
        }
    }

    fn enter_route(&mut self, route: &Route) {
        debug!(route = %route, "Entering view");
        match route {
            Route::Patients => {
                self.patients.reset();
                self.patient_selection = 0;
                self.request_page(0);
            }
            Route::PatientDetail(dni) => self.load_patient_detail(dni.clone()),
            Route::Departments => self.department_selection = 0,
            Route::ErrorPage => warn!("Unknown route, showing error page"),
            Route::Profile | Route::Help => {}
        }
    }

    // =========================================================================
    // Patient list
    // =========================================================================

    /// Show client page `page_index`, fetching from the backend if needed.
    pub fn request_page(&mut self, page_index: usize) {
        match self.patients.request_page(page_index) {
            PageRequest::Ready => self.patient_selection = 0,
            PageRequest::NeedsFetch => self.spawn_page_fetch(),
        }
    }

    pub fn next_page(&mut self) {
        if self.patients.has_next_page() {
            self.request_page(self.patients.current_page() + 1);
        }
    }

    pub fn prev_page(&mut self) {
        if let Some(page) = self.patients.current_page().checked_sub(1) {
            self.request_page(page);
        }
    }

    /// Re-request the page that failed, or the current one.
    pub fn retry(&mut self) {
        let page = self
            .patients
            .pending_page()
            .unwrap_or(self.patients.current_page());
        self.status_message = None;
        self.request_page(page);
    }

    /// Drop everything loaded and start again from the first page.
    pub fn reload(&mut self) {
        self.patients.reset();
        self.patient_selection = 0;
        self.search_query.clear();
        self.request_page(0);
    }

    fn spawn_page_fetch(&mut self) {
        // One fetch at a time; the pending page is picked up when it lands
        let Some(ticket) = self.patients.begin_fetch() else {
            return;
        };
        debug!(page = ticket.page, limit = ticket.limit, "Spawning patient page fetch");

        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_patient_page(ticket.page, ticket.limit).await;
            Self::send_result(&tx, FetchResult::PatientPage { ticket, result }).await;
        });
    }

    pub fn visible_patients(&self) -> Vec<&PatientSummary> {
        self.patients.visible()
    }

    pub fn selected_patient(&self) -> Option<&PatientSummary> {
        self.patients.visible().get(self.patient_selection).copied()
    }

    pub fn open_selected_patient(&mut self) {
        let route = self
            .selected_patient()
            .map(|patient| Route::PatientDetail(patient.id.clone()));
        if let Some(route) = route {
            self.navigate(route);
        }
    }

    // =========================================================================
    // Patient record
    // =========================================================================

    fn load_patient_detail(&mut self, dni: String) {
        self.detail = DetailView::open(dni.clone());

        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_patient_detail(&dni).await;
            Self::send_result(&tx, FetchResult::PatientDetail { dni, result }).await;
        });
    }

    pub fn reload_detail(&mut self) {
        if let Some(dni) = self.detail.dni.clone() {
            self.load_patient_detail(dni);
        }
    }

    /// Index sections of the open record, filtered by the index search.
    pub fn detail_sections(&self) -> Vec<Section> {
        match self.detail.patient {
            Some(ref patient) => {
                let sections = patient.sections();
                filter_sections(&sections, &self.detail.index_query).into_owned()
            }
            None => Vec::new(),
        }
    }

    // =========================================================================
    // Search
    // =========================================================================

    pub fn start_search(&mut self) {
        self.state = AppState::Searching;
        self.search_query.clear();
        self.apply_search();
    }

    /// Apply `search_query` to whatever the current view searches.
    pub fn apply_search(&mut self) {
        match self.navigator.current() {
            Route::Patients => {
                self.patients.filter(&self.search_query);
                self.patient_selection = 0;
            }
            Route::PatientDetail(_) => {
                self.detail.index_query = self.search_query.clone();
                self.detail.index_selection = 0;
            }
            _ => {}
        }
    }

    pub fn clear_search(&mut self) {
        self.search_query.clear();
        self.apply_search();
    }

    // =========================================================================
    // Background tasks
    // =========================================================================

    async fn send_result(tx: &mpsc::Sender<FetchResult>, result: FetchResult) {
        if tx.send(result).await.is_err() {
            debug!("Fetch result dropped, app is shutting down");
        }
    }

    /// Check for completed background fetches and apply them.
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.fetch_rx.try_recv() {
            results.push(result);
        }

        for result in results {
            self.process_fetch_result(result);
        }
    }

    fn process_fetch_result(&mut self, result: FetchResult) {
        match result {
            FetchResult::PatientPage { ticket, result } => self.apply_page_result(ticket, result),
            FetchResult::PatientDetail { dni, result } => self.apply_detail_result(dni, result),
        }
    }

    fn apply_page_result(&mut self, ticket: FetchTicket, result: Result<PatientPage, ApiError>) {
        match self.patients.settle_fetch(ticket, result) {
            Ok(FetchOutcome::Applied { .. }) => {
                self.status_message = None;
                match self.patients.resume_pending() {
                    Some(PageRequest::Ready) => self.patient_selection = 0,
                    Some(PageRequest::NeedsFetch) => self.spawn_page_fetch(),
                    None => {}
                }
            }
            Ok(FetchOutcome::Stale | FetchOutcome::Skipped) => {}
            Err(_) => {
                self.status_message = self
                    .patients
                    .last_error()
                    .map(|e| format!("{} - press [r] to retry", e));
            }
        }
    }

    fn apply_detail_result(&mut self, dni: String, result: Result<PatientDetail, ApiError>) {
        if self.detail.dni.as_deref() != Some(dni.as_str()) {
            debug!(dni = %dni, "Discarding record for a patient no longer on screen");
            return;
        }

        self.detail.is_loading = false;
        match result {
            Ok(patient) => {
                self.detail.patient = Some(patient);
                self.detail.error = None;
            }
            Err(err) => {
                warn!(dni = %dni, error = %err, "Failed to load patient record");
                self.detail.error = Some(if err.is_connection_failure() {
                    format!("Cannot reach the server ({})", err)
                } else {
                    format!("Failed to load the patient record: {}", err)
                });
            }
        }
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a search character should be accepted
pub fn can_add_search_char(current_len: usize, c: char) -> bool {
    current_len < MAX_SEARCH_LENGTH && !c.is_control()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        let mut config = Config::default();
        config.api.base_url = "http://127.0.0.1:9/api".to_string();
        App::new(config).expect("app")
    }

    fn patients(range: std::ops::RangeInclusive<usize>) -> Vec<PatientSummary> {
        range
            .map(|n| PatientSummary {
                id: n.to_string(),
                name: format!("Paciente {}", n),
                paternal_surname: None,
                maternal_surname: None,
                age: 40,
                visit_date: String::new(),
                visit_time: String::new(),
                location: String::new(),
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Tab Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_tab_next_prev_wrap() {
        assert_eq!(Tab::Patients.next(), Tab::Departments);
        assert_eq!(Tab::Help.next(), Tab::Patients);
        assert_eq!(Tab::Patients.prev(), Tab::Help);
        assert_eq!(Tab::Profile.prev(), Tab::Departments);
    }

    #[test]
    fn test_tab_for_route() {
        assert_eq!(Tab::for_route(&Route::PatientDetail("1".to_string())), Some(Tab::Patients));
        assert_eq!(Tab::for_route(&Route::Profile), Some(Tab::Profile));
        assert_eq!(Tab::for_route(&Route::ErrorPage), None);
        for tab in Tab::ALL {
            assert_eq!(Tab::for_route(&tab.route()), Some(tab));
        }
    }

    // -------------------------------------------------------------------------
    // Background Result Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_page_result_applies_and_serves_pending_page() {
        let mut app = test_app();
        assert_eq!(app.patients.request_page(1), PageRequest::NeedsFetch);
        let ticket = app.patients.begin_fetch().expect("ticket");

        app.process_fetch_result(FetchResult::PatientPage {
            ticket,
            result: Ok(PatientPage::new(patients(1..=10), 30)),
        });

        assert_eq!(app.patients.current_page(), 1);
        assert_eq!(app.visible_patients()[0].id, "6");
        assert_eq!(app.selected_patient().map(|p| p.id.as_str()), Some("6"));
    }

    #[test]
    fn test_page_failure_sets_status_and_keeps_records() {
        let mut app = test_app();
        app.patients.request_page(0);
        let ticket = app.patients.begin_fetch().expect("ticket");

        app.process_fetch_result(FetchResult::PatientPage {
            ticket,
            result: Err(ApiError::Unreachable("refused".to_string())),
        });

        assert!(app.patients.last_error().is_some());
        assert!(app
            .status_message
            .as_deref()
            .map(|m| m.contains("retry"))
            .unwrap_or(false));
        assert!(app.visible_patients().is_empty());
    }

    #[test]
    fn test_page_result_after_leaving_view_is_dropped() {
        let mut app = test_app();
        app.patients.request_page(0);
        let ticket = app.patients.begin_fetch().expect("ticket");

        app.navigate(Route::Departments);
        app.process_fetch_result(FetchResult::PatientPage {
            ticket,
            result: Ok(PatientPage::new(patients(1..=10), 10)),
        });

        assert!(app.patients.state().loaded().is_empty());
    }

    #[test]
    fn test_page_failure_after_leaving_view_is_ignored() {
        let mut app = test_app();
        app.patients.request_page(0);
        let ticket = app.patients.begin_fetch().expect("ticket");

        app.navigate(Route::Profile);
        app.process_fetch_result(FetchResult::PatientPage {
            ticket,
            result: Err(ApiError::Unreachable("refused".to_string())),
        });

        assert!(app.status_message.is_none());
        assert!(app.patients.last_error().is_none());
    }

    #[test]
    fn test_detail_result_for_other_patient_is_discarded() {
        let mut app = test_app();
        app.detail = DetailView::open("111".to_string());

        app.process_fetch_result(FetchResult::PatientDetail {
            dni: "222".to_string(),
            result: Ok(PatientDetail {
                dni: "222".to_string(),
                ..Default::default()
            }),
        });
        assert!(app.detail.patient.is_none());
        assert!(app.detail.is_loading);

        app.process_fetch_result(FetchResult::PatientDetail {
            dni: "111".to_string(),
            result: Ok(PatientDetail {
                dni: "111".to_string(),
                ..Default::default()
            }),
        });
        assert!(!app.detail.is_loading);
        assert_eq!(app.detail.patient.as_ref().map(|p| p.dni.as_str()), Some("111"));
        assert_eq!(app.detail_sections().len(), 7);
    }

    #[test]
    fn test_detail_failure_is_shown() {
        let mut app = test_app();
        app.detail = DetailView::open("111".to_string());
        app.process_fetch_result(FetchResult::PatientDetail {
            dni: "111".to_string(),
            result: Err(ApiError::NotFound("no such patient".to_string())),
        });
        assert!(app.detail.patient.is_none());
        assert!(app.detail.error.is_some());
    }

    // -------------------------------------------------------------------------
    // Navigation and Search Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_navigate_between_static_pages() {
        let mut app = test_app();
        app.navigate(Route::Departments);
        app.navigate(Route::parse("/profile"));
        assert_eq!(app.current_tab(), Some(Tab::Profile));

        app.navigate(Route::parse("/no-such-page"));
        assert_eq!(app.route(), &Route::ErrorPage);
        assert_eq!(app.current_tab(), None);

        app.go_back();
        assert_eq!(app.route(), &Route::Profile);
    }

    #[test]
    fn test_search_filters_loaded_patients() {
        let mut app = test_app();
        app.patients.request_page(0);
        let ticket = app.patients.begin_fetch().expect("ticket");
        app.process_fetch_result(FetchResult::PatientPage {
            ticket,
            result: Ok(PatientPage::new(patients(1..=10), 10)),
        });

        app.start_search();
        app.search_query.push_str("10");
        app.apply_search();
        assert_eq!(app.visible_patients().len(), 1);

        app.clear_search();
        assert_eq!(app.visible_patients().len(), 5);
    }

    #[test]
    fn test_index_search_on_record() {
        let mut app = test_app();
        app.navigator.navigate(Route::PatientDetail("1".to_string()));
        app.detail = DetailView {
            patient: Some(PatientDetail {
                dni: "1".to_string(),
                ..Default::default()
            }),
            ..DetailView::open("1".to_string())
        };

        app.search_query = "judi".to_string();
        app.apply_search();
        let sections = app.detail_sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].subsections[0].title, "Judiciales");
    }

    #[test]
    fn test_can_add_search_char() {
        assert!(can_add_search_char(0, 'a'));
        assert!(can_add_search_char(63, 'ñ'));
        assert!(!can_add_search_char(64, 'a'));
        assert!(!can_add_search_char(0, '\n'));
        assert!(!can_add_search_char(0, '\x00'));
    }
}
