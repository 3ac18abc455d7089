//! Treasury fiscal-data API integration for the `rates_of_exchange` dataset.
//!
//! One fetch session issues the filtered query, then follows `links.next`
//! until the server stops handing one back. Any failed page aborts the whole
//! session: we never want to persist a partial quarter.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::config::{RATES_FIELDS, RatesConfig};
use crate::domain::{FetchedRecords, Page, QueryBoundary};
use crate::error::AppError;

/// Raw HTTP result: status code plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal "GET a URL" capability the fetcher depends on.
///
/// Implementations should only fail for transport-level problems (DNS,
/// connect, timeout). Non-2xx responses come back as `Ok` so the fetcher can
/// report the status code.
pub trait Transport {
    fn get(&self, url: &str) -> Result<HttpResponse, AppError>;
}

/// Blocking `reqwest` transport with a request timeout.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::fetch(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, AppError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::fetch(format!("Treasury request failed: {e}")))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| AppError::fetch(format!("Failed to read Treasury response body: {e}")))?;

        Ok(HttpResponse { status, body })
    }
}

pub struct TreasuryClient<T> {
    transport: T,
    endpoint: String,
    max_pages: usize,
}

impl TreasuryClient<HttpTransport> {
    pub fn from_config(config: &RatesConfig) -> Result<Self, AppError> {
        let transport = HttpTransport::new(config.request_timeout)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: Transport> TreasuryClient<T> {
    pub fn new(transport: T, config: &RatesConfig) -> Self {
        Self {
            transport,
            endpoint: config.endpoint(),
            max_pages: config.max_pages,
        }
    }

    /// Fetch every record with `record_date >= boundary`.
    ///
    /// Returns the records flattened in page order together with the
    /// `total-count` the first page declared.
    pub fn fetch_all(&self, boundary: &QueryBoundary) -> Result<FetchedRecords, AppError> {
        let base_url = format!("{}{}", self.endpoint, query_string(boundary));

        let first = self.fetch_page(&base_url)?;
        let declared_total = first
            .total_count()
            .ok_or_else(|| AppError::fetch("Treasury response is missing meta.total-count."))?;
        debug!(records = first.data.len(), declared_total, "fetched first page");

        let mut next = first.next().cloned();
        let mut records = first.data;
        let mut pages = 1usize;

        while let Some(link) = next {
            if pages >= self.max_pages {
                return Err(AppError::fetch(format!(
                    "Treasury pagination did not terminate after {pages} pages."
                )));
            }

            let page = self.fetch_page(&format!("{base_url}{}", link.as_str()))?;
            pages += 1;
            debug!(page = pages, records = page.data.len(), "fetched page");

            next = page.next().cloned();
            records.extend(page.data);
        }

        info!(
            boundary = %boundary,
            pages,
            records = records.len(),
            declared_total,
            "fetch session complete"
        );

        Ok(FetchedRecords {
            records,
            declared_total,
            pages,
        })
    }

    fn fetch_page(&self, url: &str) -> Result<Page, AppError> {
        debug!(url, "requesting page");
        let resp = self.transport.get(url)?;

        if !resp.is_success() {
            return Err(AppError::http_status(resp.status));
        }

        serde_json::from_str(&resp.body)
            .map_err(|e| AppError::fetch(format!("Failed to parse Treasury response: {e}")))
    }
}

/// `?fields=...&filter=record_date:gte:<boundary>`
pub fn query_string(boundary: &QueryBoundary) -> String {
    format!("?fields={RATES_FIELDS}&filter=record_date:gte:{boundary}")
}
