//! Shared domain types.
//!
//! Records are deserialized straight from the fiscal-data JSON and written
//! unchanged to Parquet, so field names here match the API's column names.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

/// Date format used by the API, the CLI and partition file names.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One row of the `rates_of_exchange` dataset.
///
/// `exchange_rate` is kept as the published decimal text. The API serves every
/// value as a string and we don't want float rounding in the persisted copy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExchangeRateRecord {
    pub country_currency_desc: String,
    pub exchange_rate: String,
    pub record_date: NaiveDate,
}

/// Opaque continuation returned in `links.next`.
///
/// The API currently hands back a query fragment like `&page[number]=2&page[size]=100`,
/// but nothing here relies on that. The value is only ever appended to the
/// original query string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct NextLink(String);

impl NextLink {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty continuation means the result set is exhausted.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    #[serde(rename = "total-count")]
    pub total_count: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub next: Option<NextLink>,
}

/// A single decoded response body.
///
/// Only the first page's `meta` is consulted, so later pages may omit it.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub data: Vec<ExchangeRateRecord>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
    #[serde(default)]
    pub links: PageLinks,
}

impl Page {
    /// Continuation to the following page, if there is one. Null, missing and
    /// blank `links.next` values all end pagination.
    pub fn next(&self) -> Option<&NextLink> {
        self.links.next.as_ref().filter(|link| !link.is_blank())
    }

    pub fn total_count(&self) -> Option<usize> {
        self.meta.as_ref().map(|m| m.total_count)
    }
}

/// Inclusive lower bound on `record_date` for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueryBoundary(NaiveDate);

impl QueryBoundary {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl std::fmt::Display for QueryBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

/// Output of a completed fetch session.
#[derive(Debug, Clone)]
pub struct FetchedRecords {
    /// All records, flattened in page order.
    pub records: Vec<ExchangeRateRecord>,
    /// `meta.total-count` from the first page.
    pub declared_total: usize,
    pub pages: usize,
}

/// All records sharing one `record_date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub date: NaiveDate,
    pub records: Vec<ExchangeRateRecord>,
}

impl Partition {
    /// File name used when persisting, e.g. `2024-03-31.parquet`.
    pub fn file_name(&self) -> String {
        partition_file_name(self.date)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub fn partition_file_name(date: NaiveDate) -> String {
    format!("{}.parquet", date.format(DATE_FORMAT))
}

/// Partitions keyed (and iterated) by ascending date.
pub type Partitions = BTreeMap<NaiveDate, Partition>;
