//! REST client for the hospital patient backend.
//!
//! The backend exposes `GET /pacientes?page=&limit=` for the paged list and
//! `GET /pacientes/{dni}` for a full record.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
