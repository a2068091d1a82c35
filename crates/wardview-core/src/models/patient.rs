use serde::{Deserialize, Serialize};

use crate::utils::contains_ignore_case;

use super::null_as_default;

/// One row of the patient list as returned by `GET /pacientes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSummary {
    #[serde(rename = "dni")]
    pub id: String,
    #[serde(rename = "nombre", default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "apellidoPaterno", default)]
    pub paternal_surname: Option<String>,
    #[serde(rename = "apellidoMaterno", default)]
    pub maternal_surname: Option<String>,
    #[serde(rename = "edad", default, deserialize_with = "null_as_default")]
    pub age: u32,
    #[serde(rename = "fecha", default, deserialize_with = "null_as_default")]
    pub visit_date: String,
    #[serde(rename = "hora", default, deserialize_with = "null_as_default")]
    pub visit_time: String,
    #[serde(rename = "ubicacion", default, deserialize_with = "null_as_default")]
    pub location: String,
}

impl PatientSummary {
    /// Given name followed by whichever surnames are present.
    pub fn full_name(&self) -> String {
        let mut parts = vec![self.name.trim()];
        for surname in [&self.paternal_surname, &self.maternal_surname].into_iter().flatten() {
            let surname = surname.trim();
            if !surname.is_empty() && surname != "null" {
                parts.push(surname);
            }
        }
        parts.retain(|p| !p.is_empty());
        parts.join(" ")
    }

    /// Case-insensitive substring match on identifier or name.
    /// `query` must already be lowercased.
    pub fn matches(&self, query: &str) -> bool {
        contains_ignore_case(&self.id, query) || contains_ignore_case(&self.full_name(), query)
    }
}

/// Pagination metadata block of a list response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    #[serde(rename = "currentPage", default, deserialize_with = "null_as_default")]
    pub current_page: u32,
    #[serde(rename = "totalPages", default, deserialize_with = "null_as_default")]
    pub total_pages: u32,
    #[serde(rename = "totalRecords")]
    pub total_records: usize,
}

/// Wire shape of `GET /pacientes?page=&limit=`.
#[derive(Debug, Clone, Deserialize)]
pub struct PatientPageResponse {
    pub data: Vec<PatientSummary>,
    pub pagination: PaginationMeta,
}

/// One server-side batch of patients.
///
/// `total_records` is `None` when the backend answered with something that
/// could not be understood; such a batch carries no records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientPage {
    pub records: Vec<PatientSummary>,
    pub total_records: Option<usize>,
}

impl PatientPage {
    pub fn new(records: Vec<PatientSummary>, total_records: usize) -> Self {
        Self {
            records,
            total_records: Some(total_records),
        }
    }

    /// Batch used in place of a malformed response.
    pub fn malformed() -> Self {
        Self::default()
    }
}

impl From<PatientPageResponse> for PatientPage {
    fn from(response: PatientPageResponse) -> Self {
        Self::new(response.data, response.pagination.total_records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(id: &str, name: &str) -> PatientSummary {
        PatientSummary {
            id: id.to_string(),
            name: name.to_string(),
            paternal_surname: None,
            maternal_surname: None,
            age: 40,
            visit_date: String::new(),
            visit_time: String::new(),
            location: String::new(),
        }
    }

    #[test]
    fn test_parse_page_response() {
        let json = r#"{
            "data": [
                {"dni": "71234567", "nombre": "Rosa", "apellidoPaterno": "Quispe", "apellidoMaterno": null,
                 "edad": 34, "fecha": "2025-06-26", "hora": "08:00", "ubicacion": "Cama 12"},
                {"dni": "40011122", "nombre": "Luis"}
            ],
            "pagination": {"currentPage": 1, "totalPages": 2, "totalRecords": 12}
        }"#;

        let resp: PatientPageResponse = serde_json::from_str(json).expect("valid page JSON");
        let page = PatientPage::from(resp);

        assert_eq!(page.total_records, Some(12));
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].id, "71234567");
        assert_eq!(page.records[0].full_name(), "Rosa Quispe");
        assert_eq!(page.records[0].location, "Cama 12");
        assert_eq!(page.records[1].age, 0);
    }

    #[test]
    fn test_null_fields_keep_the_row() {
        let json = r#"{
            "data": [
                {"dni": "1", "nombre": "Ana", "edad": null, "fecha": null, "hora": null, "ubicacion": null},
                {"dni": "2", "nombre": null, "edad": 30, "fecha": "2025-06-26"}
            ],
            "pagination": {"currentPage": null, "totalPages": 1, "totalRecords": 2}
        }"#;

        let resp: PatientPageResponse = serde_json::from_str(json).expect("nulls are accepted");
        let page = PatientPage::from(resp);

        assert_eq!(page.total_records, Some(2));
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].full_name(), "Ana");
        assert_eq!(page.records[0].age, 0);
        assert!(page.records[0].visit_date.is_empty());
        assert!(page.records[1].name.is_empty());
        assert_eq!(page.records[1].id, "2");
    }

    #[test]
    fn test_page_response_requires_pagination() {
        let json = r#"{"data": []}"#;
        assert!(serde_json::from_str::<PatientPageResponse>(json).is_err());
    }

    #[test]
    fn test_full_name_skips_missing_surnames() {
        let mut p = patient("1", "Ana");
        p.maternal_surname = Some("Torres".to_string());
        p.paternal_surname = Some("null".to_string());
        assert_eq!(p.full_name(), "Ana Torres");
    }

    #[test]
    fn test_matches_name_or_id() {
        let mut p = patient("70011223", "María");
        p.paternal_surname = Some("Gómez".to_string());

        assert!(p.matches("maría"));
        assert!(p.matches("gómez"));
        assert!(p.matches("0011"));
        assert!(!p.matches("pérez"));
    }
}
