//! Input helpers.
//!
//! - CSV ingest, typing and schema checks (`ingest`)

pub mod ingest;

pub use ingest::*;
