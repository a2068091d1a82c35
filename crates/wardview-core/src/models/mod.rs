//! Data models for the patient backend.
//!
//! - `PatientSummary`, `PatientPage`: rows and batches of the patient list
//! - `PatientDetail` and its blocks: the full clinical record

use serde::{Deserialize, Deserializer};

pub mod detail;
pub mod patient;

pub use detail::{
    Background, BiologicalFunctions, EvolutionNote, IllnessHistory, PatientDetail, PhysicalExam,
};
pub use patient::{PaginationMeta, PatientPage, PatientPageResponse, PatientSummary};

/// Deserialize an explicit JSON `null` the same way as a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
