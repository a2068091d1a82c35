use std::fmt;

use tracing::warn;

use crate::api::ApiError;
use crate::models::{PatientPage, PatientSummary};

use super::state::{FetchOutcome, FetchTicket, PaginationSettings, PaginationState};

/// Last failure shown to the user. Connection failures are kept apart so
/// the view can offer a retry instead of an empty table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    ConnectionFailed(String),
    Failed(String),
}

impl LoadError {
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, LoadError::ConnectionFailed(_))
    }
}

impl From<&ApiError> for LoadError {
    fn from(err: &ApiError) -> Self {
        if err.is_connection_failure() {
            LoadError::ConnectionFailed(err.to_string())
        } else {
            LoadError::Failed(err.to_string())
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::ConnectionFailed(msg) => write!(f, "Cannot reach the server ({})", msg),
            LoadError::Failed(msg) => write!(f, "Failed to load patients: {}", msg),
        }
    }
}

/// Answer to a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    /// The page is now current and can be rendered.
    Ready,
    /// The page needs more server pages; it stays pending until they arrive.
    NeedsFetch,
}

/// Presentation model of the patient list: the pagination cache plus the
/// page being shown, the active filter and the last error.
///
/// The filter only ever looks at records that are already loaded; it never
/// causes a fetch.
#[derive(Debug, Clone)]
pub struct PatientList {
    state: PaginationState,
    current_page: usize,
    pending_page: Option<usize>,
    filter: Option<String>,
    last_error: Option<LoadError>,
}

impl PatientList {
    pub fn new(settings: PaginationSettings) -> Self {
        Self {
            state: PaginationState::new(settings),
            current_page: 0,
            pending_page: None,
            filter: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    pub fn client_page_size(&self) -> usize {
        self.state.settings().client_page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Page waiting on a fetch, if any.
    pub fn pending_page(&self) -> Option<usize> {
        self.pending_page
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_fetching()
    }

    pub fn last_error(&self) -> Option<&LoadError> {
        self.last_error.as_ref()
    }

    pub fn total_records(&self) -> usize {
        self.state.total_records()
    }

    pub fn filter_term(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Ask for client page `page_index`.
    pub fn request_page(&mut self, page_index: usize) -> PageRequest {
        if self.filter.is_some() || self.state.can_serve(page_index) {
            self.current_page = page_index;
            self.pending_page = None;
            PageRequest::Ready
        } else {
            self.pending_page = Some(page_index);
            PageRequest::NeedsFetch
        }
    }

    /// Re-evaluate the pending page after a fetch settled.
    pub fn resume_pending(&mut self) -> Option<PageRequest> {
        self.pending_page.map(|page| self.request_page(page))
    }

    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        let ticket = self.state.begin_fetch();
        if ticket.is_some() {
            self.last_error = None;
        }
        ticket
    }

    pub fn complete_fetch(&mut self, ticket: FetchTicket, batch: PatientPage) -> FetchOutcome {
        self.state.complete_fetch(ticket, batch)
    }

    /// Record a failed fetch. Cached records are left as they were.
    /// Returns false if the failure belonged to a stale fetch.
    pub fn fail_fetch(&mut self, ticket: FetchTicket, err: &ApiError) -> bool {
        if !self.state.abandon_fetch(ticket) {
            return false;
        }
        warn!(page = ticket.page, error = %err, "Patient page fetch failed");
        self.last_error = Some(LoadError::from(err));
        true
    }

    /// Apply whatever a fetch started with [`begin_fetch`](Self::begin_fetch)
    /// produced. Failures of the current fetch come back as `Err` and are
    /// kept as the last error; results of a stale fetch are `Ok(Stale)`.
    pub fn settle_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<PatientPage, ApiError>,
    ) -> Result<FetchOutcome, ApiError> {
        match result {
            Ok(batch) => Ok(self.complete_fetch(ticket, batch)),
            Err(err) if self.fail_fetch(ticket, &err) => Err(err),
            Err(_) => Ok(FetchOutcome::Stale),
        }
    }

    /// Release an outstanding fetch that will never report back.
    pub fn cancel_fetch(&mut self, ticket: FetchTicket) {
        self.state.abandon_fetch(ticket);
    }

    /// All loaded records that pass the active filter, in server order.
    pub fn filtered(&self) -> Vec<&PatientSummary> {
        match self.filter {
            Some(ref query) => self.state.loaded().iter().filter(|p| p.matches(query)).collect(),
            None => self.state.loaded().iter().collect(),
        }
    }

    /// Records on the current page.
    pub fn visible(&self) -> Vec<&PatientSummary> {
        if self.filter.is_some() {
            let size = self.client_page_size();
            self.filtered()
                .into_iter()
                .skip(self.current_page.saturating_mul(size))
                .take(size)
                .collect()
        } else {
            self.state.page(self.current_page).iter().collect()
        }
    }

    /// Number of pages for the current view (reported total when unfiltered).
    pub fn page_count(&self) -> usize {
        let records = if self.filter.is_some() {
            self.filtered().len()
        } else {
            self.state.total_records()
        };
        records.div_ceil(self.client_page_size())
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page + 1 < self.page_count()
    }

    /// Filter loaded records by identifier or name (case-insensitive) and
    /// jump to the first page. A blank term clears the filter.
    pub fn filter(&mut self, term: &str) -> Vec<&PatientSummary> {
        let query = term.trim().to_lowercase();
        if query.is_empty() {
            self.clear_filter();
        } else {
            self.filter = Some(query);
            self.current_page = 0;
            self.pending_page = None;
        }
        self.filtered()
    }

    pub fn clear_filter(&mut self) {
        self.filter = None;
        self.current_page = 0;
        self.pending_page = None;
    }

    pub fn find(&self, id: &str) -> Option<&PatientSummary> {
        self.state.loaded().iter().find(|p| p.id == id)
    }

    /// Start over: empty cache, first page, no filter, no error.
    pub fn reset(&mut self) {
        self.state.reset();
        self.current_page = 0;
        self.pending_page = None;
        self.filter = None;
        self.last_error = None;
    }
}
