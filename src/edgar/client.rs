// src/edgar/client.rs
use crate::edgar::models::{Cik, CompanySubmission, TickerEntry, TickerMap};
use crate::utils::error::EdgarError;
use reqwest::{header, StatusCode};
use std::collections::HashMap;
use std::time::Duration;

/// Base URL for the submissions/ticker metadata endpoints.
const SEC_BASE: &str = "https://data.sec.gov";
/// The ticker map lives on www.sec.gov, not data.sec.gov.
const TICKER_MAP_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// Timeouts: metadata endpoints answer quickly, filing documents can be large.
const METADATA_TIMEOUT: Duration = Duration::from_secs(30);
const DOCUMENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Retries after the initial attempt, with doubling backoff from 0.6s.
const MAX_RETRIES: u32 = 4;
const BACKOFF_BASE_MS: u64 = 600;

/// Transient statuses worth retrying on an idempotent GET. 403 is included
/// because SEC serves it under load as well as for identification problems.
const RETRYABLE_STATUS: [u16; 6] = [403, 429, 500, 502, 503, 504];

fn is_retryable(status: StatusCode) -> bool {
    RETRYABLE_STATUS.contains(&status.as_u16())
}

/// Backoff before retry number `retry` (1-based): 0.6s, 1.2s, 2.4s, 4.8s.
fn backoff_delay(retry: u32) -> Duration {
    Duration::from_millis(BACKOFF_BASE_MS << (retry.saturating_sub(1)))
}

/// HTTP client for EDGAR interaction.
///
/// Every request carries the operator-configured descriptive User-Agent
/// (SEC rejects or throttles unidentified clients) and, via the reqwest
/// gzip/deflate features, an `Accept-Encoding: gzip, deflate` header with
/// transparent decompression. All calls are GETs and logically idempotent.
pub struct EdgarClient {
    http: reqwest::Client,
}

impl EdgarClient {
    pub fn new(user_agent: &str) -> Result<EdgarClient, EdgarError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()?;
        Ok(EdgarClient { http })
    }

    /// GET with bounded retries on transient failures. On exhausting
    /// retries the last failure is propagated; a final 403 becomes the
    /// identification hint rather than a bare status.
    async fn get_with_retry(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<reqwest::Response, EdgarError> {
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            let result = self
                .http
                .get(url)
                .header(header::ACCEPT, "application/json,text/html,text/plain,*/*")
                .timeout(timeout)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    if !is_retryable(status) {
                        tracing::error!("HTTP error status: {} for URL: {}", status, url);
                        return Err(EdgarError::Http(status));
                    }
                    if attempts > MAX_RETRIES {
                        if status == StatusCode::FORBIDDEN {
                            tracing::warn!(
                                "Still 403 Forbidden after {} attempts for {}",
                                attempts,
                                url
                            );
                            return Err(EdgarError::IdentificationRejected);
                        }
                        return Err(EdgarError::RetriesExhausted {
                            url: url.to_string(),
                            attempts,
                            status,
                        });
                    }
                    tracing::warn!(
                        "HTTP {} from {} (attempt {}), backing off {:?}",
                        status,
                        url,
                        attempts,
                        backoff_delay(attempts)
                    );
                }
                Err(e) => {
                    let transient = e.is_timeout() || e.is_connect();
                    if !transient || attempts > MAX_RETRIES {
                        return Err(e.into());
                    }
                    tracing::warn!(
                        "Request to {} failed ({}), backing off {:?}",
                        url,
                        e,
                        backoff_delay(attempts)
                    );
                }
            }

            tokio::time::sleep(backoff_delay(attempts)).await;
        }
    }

    /// Fetches the company submission record for a CIK.
    pub async fn fetch_submissions(&self, cik: &Cik) -> Result<CompanySubmission, EdgarError> {
        let url = format!("{}/submissions/CIK{}.json", SEC_BASE, cik);
        tracing::info!("Fetching submissions: {}", url);

        let response = self.get_with_retry(&url, METADATA_TIMEOUT).await?;
        response
            .json::<CompanySubmission>()
            .await
            .map_err(|e| EdgarError::Parse(format!("submissions for CIK {}: {}", cik, e)))
    }

    /// Fetches the ticker -> CIK snapshot.
    pub async fn fetch_ticker_map(&self) -> Result<TickerMap, EdgarError> {
        tracing::info!("Fetching ticker map: {}", TICKER_MAP_URL);

        let response = self.get_with_retry(TICKER_MAP_URL, METADATA_TIMEOUT).await?;
        let map: HashMap<String, TickerEntry> = response
            .json()
            .await
            .map_err(|e| EdgarError::Parse(format!("company ticker map: {}", e)))?;
        Ok(TickerMap::from_index_map(map))
    }

    /// Downloads a filing document body (HTML, usually) from its URL.
    pub async fn fetch_document(&self, url: &str) -> Result<String, EdgarError> {
        tracing::info!("Downloading document from: {}", url);

        let response = self.get_with_retry(url, DOCUMENT_TIMEOUT).await?;
        let body = response.text().await?;
        tracing::debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
