//! `car-report` library crate.
//!
//! The binary (`car-report`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the extraction and analysis stages can be driven from other tools
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod clean;
pub mod cli;
pub mod domain;
pub mod error;
pub mod extract;
pub mod io;
pub mod plot;
pub mod report;
