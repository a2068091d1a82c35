//! API client for the hospital patient backend.
//!
//! Two endpoints are used: the paged patient list and the full record of
//! one patient. No authentication is involved.

use std::future::Future;
use std::time::Duration;

use reqwest::{header, Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ApiSettings;
use crate::models::{PatientDetail, PatientPage, PatientPageResponse};
use crate::pagination::PatientSource;

use super::ApiError;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn patients_url(&self, page: u32, limit: usize) -> Result<Url, ApiError> {
        let mut url = self.parse_url(&format!("{}/pacientes", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());
        Ok(url)
    }

    pub(crate) fn patient_url(&self, dni: &str) -> Result<Url, ApiError> {
        let mut url = self.parse_url(&format!("{}/pacientes", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidResponse(format!("Cannot build a path on {}", self.base_url)))?
            .push(dni);
        Ok(url)
    }

    fn parse_url(&self, raw: &str) -> Result<Url, ApiError> {
        Url::parse(raw).map_err(|e| ApiError::InvalidResponse(format!("Bad backend URL {}: {}", raw, e)))
    }

    /// Check response status, returning appropriate error for non-success codes.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// GET `url` and return the body text, retrying rate-limited requests
    /// with exponential backoff.
    async fn get_text(&self, url: Url) -> Result<String, ApiError> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(url.clone())
                .header(header::ACCEPT, "application/json")
                .send()
                .await
                .map_err(ApiError::from_send_error)?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response.text().await?),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(url = %url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let body = self.get_text(url.clone()).await?;
        serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e)))
    }

    /// Fetch one server page of the patient list.
    ///
    /// A body that is not a page (missing `data` or `pagination`, wrong
    /// types) is logged and returned as [`PatientPage::malformed`], so the
    /// cache treats it as an empty batch rather than a failure.
    pub async fn fetch_patient_page(&self, page: u32, limit: usize) -> Result<PatientPage, ApiError> {
        let url = self.patients_url(page, limit)?;
        debug!(url = %url, "GET patient page");

        let body = self.get_text(url).await?;
        Ok(parse_patient_page(&body, page))
    }

    /// Fetch the full record of one patient.
    pub async fn fetch_patient_detail(&self, dni: &str) -> Result<PatientDetail, ApiError> {
        let url = self.patient_url(dni)?;
        debug!(url = %url, "GET patient detail");
        self.get(url).await
    }
}

fn parse_patient_page(body: &str, page: u32) -> PatientPage {
    match serde_json::from_str::<PatientPageResponse>(body) {
        Ok(response) => response.into(),
        Err(e) => {
            warn!(page = page, error = %e, "Malformed patient page response");
            PatientPage::malformed()
        }
    }
}

impl PatientSource for ApiClient {
    fn fetch_page(
        &self,
        page: u32,
        limit: usize,
    ) -> impl Future<Output = Result<PatientPage, ApiError>> + Send {
        self.fetch_patient_page(page, limit)
    }
}
