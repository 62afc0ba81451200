//! Input/output helpers.
//!
//! - CSV ingest + validation + intermediate CSV write (`ingest`)
//! - spreadsheet export of the processed table (`export`)
//! - report JSON read/write (`reports`)

pub mod export;
pub mod ingest;
pub mod reports;

pub use export::*;
pub use ingest::*;
pub use reports::*;
