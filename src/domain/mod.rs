//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the published record shape (`ExchangeRateRecord`)
//! - one decoded API response (`Page`) and its opaque continuation (`NextLink`)
//! - the query lower bound (`QueryBoundary`)
//! - grouped outputs (`Partition`, `Partitions`)

pub mod types;

pub use types::*;
