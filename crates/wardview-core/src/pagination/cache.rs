use std::future::Future;

use tracing::debug;

use crate::api::ApiError;
use crate::models::{PatientPage, PatientSummary};
use crate::routing::Route;

use super::list::{PageRequest, PatientList};
use super::state::{FetchOutcome, FetchTicket, PaginationSettings};

/// Upstream supplier of patient pages. Implemented by `ApiClient`; tests
/// plug in scripted sources.
pub trait PatientSource {
    fn fetch_page(
        &self,
        page: u32,
        limit: usize,
    ) -> impl Future<Output = Result<PatientPage, ApiError>> + Send;
}

/// Async driver over a [`PatientList`]: resolves page requests by fetching
/// server pages from a [`PatientSource`] as needed.
///
/// This is the entry point for embedders that can await fetches inline.
/// The TUI instead spawns each fetch and feeds the result back through
/// [`PatientList::settle_fetch`], the same step `fetch_next_server_page` ends with.
///
/// Methods take `&mut self`, so fetches on one cache never overlap.
pub struct PatientCache<S> {
    source: S,
    list: PatientList,
}

impl<S: PatientSource> PatientCache<S> {
    pub fn new(source: S, settings: PaginationSettings) -> Self {
        Self {
            source,
            list: PatientList::new(settings),
        }
    }

    pub fn list(&self) -> &PatientList {
        &self.list
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Serve client page `page_index`, fetching server pages until it is
    /// resident or the upstream runs out. On error the cache is unchanged
    /// and the page stays pending for [`retry`](Self::retry).
    pub async fn request_page(&mut self, page_index: usize) -> Result<Vec<PatientSummary>, ApiError> {
        loop {
            if self.list.request_page(page_index) == PageRequest::Ready {
                break;
            }
            match self.fetch_next_server_page().await? {
                FetchOutcome::Applied { .. } => continue,
                FetchOutcome::Stale | FetchOutcome::Skipped => break,
            }
        }
        Ok(self.visible())
    }

    /// Fetch one server page. A no-op once the cache is exhausted.
    pub async fn fetch_next_server_page(&mut self) -> Result<FetchOutcome, ApiError> {
        let Some(ticket) = self.list.begin_fetch() else {
            return Ok(FetchOutcome::Skipped);
        };
        debug!(page = ticket.page, limit = ticket.limit, "Fetching patient page");

        let guard = InFlight {
            list: &mut self.list,
            ticket: Some(ticket),
        };
        let result = self.source.fetch_page(ticket.page, ticket.limit).await;
        guard.settle(result)
    }

    /// Re-request the page that last failed (or the current one).
    pub async fn retry(&mut self) -> Result<Vec<PatientSummary>, ApiError> {
        let page = self.list.pending_page().unwrap_or(self.list.current_page());
        self.request_page(page).await
    }

    /// Filter loaded records; never fetches. See [`PatientList::filter`].
    pub fn filter(&mut self, term: &str) -> Vec<PatientSummary> {
        self.list.filter(term).into_iter().cloned().collect()
    }

    pub fn clear_filter(&mut self) {
        self.list.clear_filter();
    }

    /// Route to the detail view of a loaded record.
    pub fn select_record(&self, id: &str) -> Option<Route> {
        self.list
            .find(id)
            .map(|patient| Route::PatientDetail(patient.id.clone()))
    }

    pub fn reset(&mut self) {
        self.list.reset();
    }

    pub fn visible(&self) -> Vec<PatientSummary> {
        self.list.visible().into_iter().cloned().collect()
    }
}

/// Outstanding fetch. Dropping it before [`settle`](Self::settle) (the
/// request future was cancelled) releases the ticket so the cache can fetch
/// again.
struct InFlight<'a> {
    list: &'a mut PatientList,
    ticket: Option<FetchTicket>,
}

impl InFlight<'_> {
    fn settle(mut self, result: Result<PatientPage, ApiError>) -> Result<FetchOutcome, ApiError> {
        let Some(ticket) = self.ticket.take() else {
            return Ok(FetchOutcome::Stale);
        };
        self.list.settle_fetch(ticket, result)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            debug!(page = ticket.page, "Patient page fetch cancelled");
            self.list.cancel_fetch(ticket);
        }
    }
}
