//! Core library for wardview.
//!
//! Holds everything that does not touch the terminal: the backend client,
//! patient models, the paginated patient cache, the record index filter,
//! routing and configuration.

pub mod api;
pub mod config;
pub mod index;
pub mod models;
pub mod pagination;
pub mod routing;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use config::Config;
pub use index::{filter_sections, flatten, IndexEntry, Section, Subsection};
pub use pagination::{PaginationSettings, PatientCache, PatientList, PatientSource};
pub use routing::{Navigator, Route};
