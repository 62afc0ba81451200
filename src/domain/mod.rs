//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the declared listing schema and column names
//! - the raw CSV table and cleaned listing rows (`Table`, `CarRecord`)
//! - the resolved run configuration (`RunConfig`)

pub mod types;

pub use types::*;
