//! Remote data sources.

#[cfg(test)]
pub(crate) mod scripted;
pub mod treasury;

pub use treasury::*;
