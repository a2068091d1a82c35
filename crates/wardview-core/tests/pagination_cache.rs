//! Drives `PatientCache` against scripted in-memory sources.

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use wardview_core::api::ApiError;
use wardview_core::models::{PatientPage, PatientSummary};
use wardview_core::pagination::{FetchOutcome, LoadError, PaginationSettings, PatientCache, PatientSource};
use wardview_core::routing::Route;

// ============================================================================
// Scripted sources
// ============================================================================

fn patient(n: usize) -> PatientSummary {
    let names = ["Rosa", "Luis", "Mariana", "Jorge", "Ana", "Pedro"];
    PatientSummary {
        id: format!("{:08}", n),
        name: names[(n - 1) % names.len()].to_string(),
        paternal_surname: Some("Quispe".to_string()),
        maternal_surname: None,
        age: 20 + n as u32,
        visit_date: "2025-06-26".to_string(),
        visit_time: "08:00".to_string(),
        location: "Pabellón A".to_string(),
    }
}

/// Serves `total` numbered patients in server pages, counting every call.
/// Calls whose index is in `fail_on` fail with a connection error.
struct ScriptedSource {
    total: usize,
    first_page: u32,
    calls: AtomicUsize,
    fail_on: Mutex<HashSet<usize>>,
    requested: Mutex<Vec<(u32, usize)>>,
}

impl ScriptedSource {
    fn new(total: usize) -> Self {
        Self {
            total,
            first_page: 1,
            calls: AtomicUsize::new(0),
            fail_on: Mutex::new(HashSet::new()),
            requested: Mutex::new(Vec::new()),
        }
    }

    fn failing_on(self, call: usize) -> Self {
        self.fail_on.lock().expect("lock").insert(call);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn requested(&self) -> Vec<(u32, usize)> {
        self.requested.lock().expect("lock").clone()
    }

    fn respond(&self, page: u32, limit: usize) -> Result<PatientPage, ApiError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().expect("lock").push((page, limit));
        if self.fail_on.lock().expect("lock").contains(&call) {
            return Err(ApiError::Unreachable("connection refused".to_string()));
        }

        let start = (page - self.first_page) as usize * limit;
        let end = (start + limit).min(self.total);
        let records = (start.min(self.total)..end).map(|i| patient(i + 1)).collect();
        Ok(PatientPage::new(records, self.total))
    }
}

impl PatientSource for ScriptedSource {
    fn fetch_page(
        &self,
        page: u32,
        limit: usize,
    ) -> impl Future<Output = Result<PatientPage, ApiError>> + Send {
        std::future::ready(self.respond(page, limit))
    }
}

/// Answers with whatever the backend sent that was not a page.
struct MalformedSource;

impl PatientSource for MalformedSource {
    fn fetch_page(
        &self,
        _page: u32,
        _limit: usize,
    ) -> impl Future<Output = Result<PatientPage, ApiError>> + Send {
        std::future::ready(Ok(PatientPage::malformed()))
    }
}

/// Never answers.
struct HangingSource;

impl PatientSource for HangingSource {
    fn fetch_page(
        &self,
        _page: u32,
        _limit: usize,
    ) -> impl Future<Output = Result<PatientPage, ApiError>> + Send {
        std::future::pending()
    }
}

fn settings(server: usize, client: usize) -> PaginationSettings {
    PaginationSettings {
        server_page_size: server,
        client_page_size: client,
        ..PaginationSettings::default()
    }
}

fn ids(records: &[PatientSummary]) -> Vec<String> {
    records.iter().map(|p| p.id.clone()).collect()
}

fn expected_ids(range: std::ops::RangeInclusive<usize>) -> Vec<String> {
    range.map(|n| format!("{:08}", n)).collect()
}

// ============================================================================
// Paging
// ============================================================================

#[tokio::test]
async fn test_twelve_records_in_pages_of_five() {
    let mut cache = PatientCache::new(ScriptedSource::new(12), settings(10, 5));

    let page = cache.request_page(0).await.expect("page 0");
    assert_eq!(ids(&page), expected_ids(1..=5));
    assert_eq!(cache.source().calls(), 1);
    assert_eq!(cache.list().total_records(), 12);

    let page = cache.request_page(2).await.expect("page 2");
    assert_eq!(ids(&page), expected_ids(11..=12));
    assert_eq!(cache.source().calls(), 2);
    assert_eq!(cache.list().state().loaded().len(), 12);
    assert!(cache.list().state().is_exhausted());

    let page = cache.request_page(3).await.expect("page 3");
    assert!(page.is_empty());
    assert_eq!(cache.source().calls(), 2);

    assert_eq!(cache.source().requested(), vec![(1, 10), (2, 10)]);
}

#[tokio::test]
async fn test_pages_are_full_except_at_the_tail() {
    let mut cache = PatientCache::new(ScriptedSource::new(23), settings(10, 5));
    for index in 0..4 {
        let page = cache.request_page(index).await.expect("page");
        assert_eq!(page.len(), 5);
    }
    assert_eq!(cache.request_page(4).await.expect("tail").len(), 3);
    assert_eq!(cache.list().page_count(), 5);
}

#[tokio::test]
async fn test_repeated_requests_are_identical_and_free() {
    let mut cache = PatientCache::new(ScriptedSource::new(30), settings(10, 5));
    let first = cache.request_page(1).await.expect("page");
    let second = cache.request_page(1).await.expect("page");
    assert_eq!(first, second);
    assert_eq!(cache.source().calls(), 1);
}

#[tokio::test]
async fn test_far_page_fetches_every_server_page_in_order() {
    let mut cache = PatientCache::new(ScriptedSource::new(100), settings(10, 5));
    let page = cache.request_page(7).await.expect("page 7");
    assert_eq!(ids(&page), expected_ids(36..=40));
    assert_eq!(
        cache.source().requested(),
        vec![(1, 10), (2, 10), (3, 10), (4, 10)]
    );
}

#[tokio::test]
async fn test_loaded_records_never_shrink() {
    let mut cache = PatientCache::new(ScriptedSource::new(47), settings(10, 4));
    let mut previous = 0;
    for index in [0, 5, 2, 11, 3, 9, 20, 1] {
        cache.request_page(index).await.expect("page");
        let loaded = cache.list().state().loaded().len();
        assert!(loaded >= previous);
        previous = loaded;
    }
    assert_eq!(previous, 47);
}

#[tokio::test]
async fn test_no_fetch_after_exhaustion() {
    let mut cache = PatientCache::new(ScriptedSource::new(7), settings(10, 5));
    cache.request_page(0).await.expect("page");
    assert!(cache.list().state().is_exhausted());

    let outcome = cache.fetch_next_server_page().await.expect("skipped");
    assert_eq!(outcome, FetchOutcome::Skipped);
    assert_eq!(cache.source().calls(), 1);
}

#[tokio::test]
async fn test_exact_multiple_of_server_page_stops_at_total() {
    let mut cache = PatientCache::new(ScriptedSource::new(20), settings(10, 5));
    cache.request_page(3).await.expect("page");
    assert!(cache.list().state().is_exhausted());
    assert!(cache.request_page(4).await.expect("past end").is_empty());
    assert_eq!(cache.source().calls(), 2);
}

#[tokio::test]
async fn test_zero_based_backend_pages() {
    let mut source = ScriptedSource::new(15);
    source.first_page = 0;
    let settings = PaginationSettings {
        first_server_page: 0,
        ..settings(10, 5)
    };
    let mut cache = PatientCache::new(source, settings);
    let page = cache.request_page(2).await.expect("page");
    assert_eq!(ids(&page), expected_ids(11..=15));
    assert_eq!(cache.source().requested(), vec![(0, 10), (1, 10)]);
}

#[tokio::test]
async fn test_empty_backend() {
    let mut cache = PatientCache::new(ScriptedSource::new(0), settings(10, 5));
    assert!(cache.request_page(0).await.expect("page").is_empty());
    assert_eq!(cache.list().total_records(), 0);
    assert_eq!(cache.list().page_count(), 0);
    assert_eq!(cache.source().calls(), 1);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_transport_failure_leaves_cache_untouched_then_retry_recovers() {
    let source = ScriptedSource::new(12).failing_on(1);
    let mut cache = PatientCache::new(source, settings(10, 5));
    cache.request_page(0).await.expect("page 0");

    let err = cache.request_page(2).await.expect_err("second fetch fails");
    assert!(err.is_connection_failure());
    assert_eq!(cache.list().state().loaded().len(), 10);
    assert_eq!(cache.list().total_records(), 12);
    assert_eq!(cache.list().current_page(), 0);
    assert_eq!(cache.list().pending_page(), Some(2));
    assert!(!cache.list().is_loading());
    assert!(matches!(cache.list().last_error(), Some(LoadError::ConnectionFailed(_))));

    let page = cache.retry().await.expect("retry");
    assert_eq!(ids(&page), expected_ids(11..=12));
    assert_eq!(cache.list().current_page(), 2);
    assert!(cache.list().last_error().is_none());
    assert_eq!(cache.source().calls(), 3);
}

#[tokio::test]
async fn test_failure_on_first_fetch_shows_nothing() {
    let source = ScriptedSource::new(12).failing_on(0);
    let mut cache = PatientCache::new(source, settings(10, 5));

    assert!(cache.request_page(0).await.is_err());
    assert!(cache.visible().is_empty());
    assert_eq!(cache.list().total_records(), 0);

    let page = cache.retry().await.expect("retry");
    assert_eq!(ids(&page), expected_ids(1..=5));
}

#[tokio::test]
async fn test_malformed_response_is_an_empty_batch() {
    let mut cache = PatientCache::new(MalformedSource, settings(10, 5));
    let page = cache.request_page(0).await.expect("malformed is not an error");
    assert!(page.is_empty());

    let state = cache.list().state();
    assert!(state.is_exhausted());
    assert_eq!(state.next_server_page(), 1);
    assert_eq!(state.total_records(), 0);
    assert!(cache.list().last_error().is_none());
}

#[tokio::test]
async fn test_cancelled_fetch_releases_guard() {
    let mut cache = PatientCache::new(HangingSource, settings(10, 5));

    let result = tokio::time::timeout(Duration::from_millis(20), cache.request_page(0)).await;
    assert!(result.is_err());
    assert!(!cache.list().is_loading());
    assert!(cache.list().state().loaded().is_empty());
    assert_eq!(cache.list().state().next_server_page(), 0);
}

// ============================================================================
// Filter, selection, reset
// ============================================================================

#[tokio::test]
async fn test_filter_over_loaded_records() {
    let mut cache = PatientCache::new(ScriptedSource::new(40), settings(10, 5));
    cache.request_page(0).await.expect("page");

    // Names cycle through six values; ten records are loaded
    let matches = cache.filter("ANA");
    assert_eq!(ids(&matches), vec!["00000003", "00000005", "00000009"]);
    assert_eq!(cache.source().calls(), 1);

    let by_id = cache.filter("00000007");
    assert_eq!(by_id.len(), 1);

    let all = cache.filter("");
    assert_eq!(all.len(), 10);
    assert_eq!(cache.list().filter_term(), None);

    assert!(cache.filter("zzz").is_empty());
    cache.clear_filter();
    assert_eq!(cache.visible().len(), 5);
}

#[tokio::test]
async fn test_filtered_pages_never_fetch() {
    let mut cache = PatientCache::new(ScriptedSource::new(40), settings(10, 2));
    cache.request_page(0).await.expect("page");
    cache.filter("quispe");

    let page = cache.request_page(4).await.expect("filtered page");
    assert_eq!(ids(&page), expected_ids(9..=10));
    assert!(cache.request_page(5).await.expect("past filter").is_empty());
    assert_eq!(cache.source().calls(), 1);
}

#[tokio::test]
async fn test_select_record_routes_to_detail() {
    let mut cache = PatientCache::new(ScriptedSource::new(12), settings(10, 5));
    cache.request_page(0).await.expect("page");

    assert_eq!(
        cache.select_record("00000004"),
        Some(Route::PatientDetail("00000004".to_string()))
    );
    assert_eq!(cache.select_record("99999999"), None);
}

#[tokio::test]
async fn test_reset_starts_over() {
    let mut cache = PatientCache::new(ScriptedSource::new(12), settings(10, 5));
    cache.request_page(2).await.expect("page");
    let generation = cache.list().state().generation();

    cache.reset();
    assert!(cache.list().state().loaded().is_empty());
    assert!(!cache.list().state().is_exhausted());
    assert_eq!(cache.list().state().generation(), generation + 1);

    let page = cache.request_page(0).await.expect("page after reset");
    assert_eq!(ids(&page), expected_ids(1..=5));
    assert_eq!(cache.source().requested().last(), Some(&(1, 10)));
}
