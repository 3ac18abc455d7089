//! Completeness validation and date partitioning.
//!
//! The fetcher hands us one flat list of records plus the count the server
//! promised. Before anything touches disk we check those agree, then split the
//! records into one group per `record_date`.

use crate::domain::{ExchangeRateRecord, Partition, Partitions};
use crate::error::AppError;

/// Validate the record count and group records by `record_date`.
///
/// Groups iterate in ascending date order; records inside a group keep their
/// fetch order.
pub fn partition(records: Vec<ExchangeRateRecord>, declared_total: usize) -> Result<Partitions, AppError> {
    if records.len() != declared_total {
        return Err(AppError::completeness(declared_total, records.len()));
    }

    let mut partitions = Partitions::new();
    for record in records {
        partitions
            .entry(record.record_date)
            .or_insert_with(|| Partition {
                date: record.record_date,
                records: Vec::new(),
            })
            .records
            .push(record);
    }

    Ok(partitions)
}

/// Total number of records across all partitions.
pub fn record_count(partitions: &Partitions) -> usize {
    partitions.values().map(Partition::len).sum()
}
