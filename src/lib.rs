//! `power-ts` library crate.
//!
//! The binary (`pwr`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the HTTP router can be driven in-process by integration tests
//! - the analysis code stays independent of the transport

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod server;
