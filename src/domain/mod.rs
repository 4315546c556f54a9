//! Domain types used throughout the service.
//!
//! This module defines:
//!
//! - the in-memory table (`Table`, `Column`, `ColumnData`, `DType`)
//! - startup configuration (`DatasetConfig`, `ServerConfig`)
//! - fixed analysis constants (working window, periods, horizons)
//! - serializable endpoint payloads (`Series`, `DataInfo`, `ArimaOutput`, ...)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
