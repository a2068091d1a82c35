use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{PatientPage, PatientSummary};

/// Records requested per upstream fetch.
pub const DEFAULT_SERVER_PAGE_SIZE: usize = 10;

/// Records shown per list page.
pub const DEFAULT_CLIENT_PAGE_SIZE: usize = 5;

/// Page number the backend uses for its first page.
pub const DEFAULT_FIRST_SERVER_PAGE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    pub server_page_size: usize,
    pub client_page_size: usize,
    pub first_server_page: u32,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            server_page_size: DEFAULT_SERVER_PAGE_SIZE,
            client_page_size: DEFAULT_CLIENT_PAGE_SIZE,
            first_server_page: DEFAULT_FIRST_SERVER_PAGE,
        }
    }
}

/// Permission to run one upstream fetch, handed out by
/// [`PaginationState::begin_fetch`] and redeemed when the response arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    /// Page number to send upstream.
    pub page: u32,
    /// Page size to send upstream.
    pub limit: usize,
    generation: u64,
}

/// What happened to the cache as the result of one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The batch was appended.
    Applied { appended: usize, exhausted: bool },
    /// The response belonged to a fetch that was reset or abandoned; dropped.
    Stale,
    /// No request was issued: the cache is exhausted or a fetch is already running.
    Skipped,
}

/// Accumulated server pages plus the bookkeeping needed to slice client
/// pages out of them.
///
/// All mutation happens in [`complete_fetch`](Self::complete_fetch) and
/// [`reset`](Self::reset), each in one step, so the record count and the
/// records never disagree.
#[derive(Debug, Clone)]
pub struct PaginationState {
    settings: PaginationSettings,
    loaded: Vec<PatientSummary>,
    total_records: usize,
    next_server_page: u32,
    exhausted: bool,
    in_flight: Option<FetchTicket>,
    generation: u64,
}

impl PaginationState {
    pub fn new(settings: PaginationSettings) -> Self {
        let settings = PaginationSettings {
            server_page_size: settings.server_page_size.max(1),
            client_page_size: settings.client_page_size.max(1),
            ..settings
        };

        Self {
            settings,
            loaded: Vec::new(),
            total_records: 0,
            next_server_page: 0,
            exhausted: false,
            in_flight: None,
            generation: 0,
        }
    }

    pub fn settings(&self) -> &PaginationSettings {
        &self.settings
    }

    pub fn loaded(&self) -> &[PatientSummary] {
        &self.loaded
    }

    pub fn total_records(&self) -> usize {
        self.total_records
    }

    /// Zero-based cursor of the next server page to fetch.
    pub fn next_server_page(&self) -> u32 {
        self.next_server_page
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Records that must be resident to serve client page `page_index`.
    pub fn records_needed(&self, page_index: usize) -> usize {
        page_index
            .saturating_add(1)
            .saturating_mul(self.settings.client_page_size)
    }

    pub fn is_resident(&self, page_index: usize) -> bool {
        self.records_needed(page_index) <= self.loaded.len()
    }

    /// True when client page `page_index` can be answered without another
    /// fetch: it is resident, nothing more exists upstream, or it starts
    /// past the reported total.
    pub fn can_serve(&self, page_index: usize) -> bool {
        let start = page_index.saturating_mul(self.settings.client_page_size);
        let past_total = self.next_server_page > 0 && start >= self.total_records;
        self.is_resident(page_index) || self.exhausted || past_total
    }

    /// Slice of resident records for client page `page_index`. Short at the
    /// tail, empty past it.
    pub fn page(&self, page_index: usize) -> &[PatientSummary] {
        let len = self.loaded.len();
        let start = page_index
            .saturating_mul(self.settings.client_page_size)
            .min(len);
        let end = self.records_needed(page_index).min(len);
        &self.loaded[start..end]
    }

    /// Claim the next server page. Returns `None` when the cache is
    /// exhausted or another fetch is still outstanding.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        if self.exhausted {
            debug!(loaded = self.loaded.len(), "Cache exhausted, not fetching");
            return None;
        }
        if self.in_flight.is_some() {
            debug!("Fetch already in flight");
            return None;
        }

        let ticket = FetchTicket {
            page: self.settings.first_server_page + self.next_server_page,
            limit: self.settings.server_page_size,
            generation: self.generation,
        };
        self.in_flight = Some(ticket);
        Some(ticket)
    }

    /// Apply a fetched batch. Responses for tickets that are no longer
    /// outstanding are discarded.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, batch: PatientPage) -> FetchOutcome {
        if self.in_flight != Some(ticket) {
            debug!(page = ticket.page, "Discarding stale page response");
            return FetchOutcome::Stale;
        }
        self.in_flight = None;

        let mut records = batch.records;
        if records.len() > ticket.limit {
            debug!(received = records.len(), limit = ticket.limit, "Server ignored limit, truncating");
            records.truncate(ticket.limit);
        }

        let appended = records.len();
        self.loaded.extend(records);
        self.total_records = batch
            .total_records
            .unwrap_or(self.total_records)
            .max(self.loaded.len());
        self.next_server_page += 1;
        self.exhausted = appended < ticket.limit || self.loaded.len() >= self.total_records;

        debug!(
            page = ticket.page,
            appended,
            loaded = self.loaded.len(),
            total = self.total_records,
            exhausted = self.exhausted,
            "Applied server page"
        );

        FetchOutcome::Applied {
            appended,
            exhausted: self.exhausted,
        }
    }

    /// Release an outstanding ticket without touching the records (failed
    /// or cancelled fetch). Returns false if the ticket was already stale.
    pub fn abandon_fetch(&mut self, ticket: FetchTicket) -> bool {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    /// Drop everything loaded. Any outstanding fetch becomes stale.
    pub fn reset(&mut self) {
        self.loaded.clear();
        self.total_records = 0;
        self.next_server_page = 0;
        self.exhausted = false;
        self.in_flight = None;
        self.generation += 1;
    }
}
