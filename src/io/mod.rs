//! Input/output helpers.
//!
//! - completeness check + date partitioning (`ingest`)
//! - Parquet partition files (`parquet`)

pub mod ingest;
pub mod parquet;

pub use self::ingest::*;
pub use self::parquet::*;
