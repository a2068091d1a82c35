//! Incremental patient list pagination.
//!
//! The backend is paged in large server pages; the list shows smaller
//! client pages sliced out of everything loaded so far.
//!
//! - `state`: the cache itself (`PaginationState`), pure bookkeeping
//! - `list`: presentation model with current page, filter and last error
//! - `cache`: async driver that fetches from a `PatientSource`

pub mod cache;
pub mod list;
pub mod state;

pub use cache::{PatientCache, PatientSource};
pub use list::{LoadError, PageRequest, PatientList};
pub use state::{FetchOutcome, FetchTicket, PaginationSettings, PaginationState};
