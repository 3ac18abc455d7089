//! `quarterly-fx` library crate.
//!
//! The binary (`fxq`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes or hitting the network
//! - the partition reader can be reused from other tools

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod quarter;
