//! Statistical models behind the analytical endpoints.
//!
//! Models are plain functions over `&[f64]` so the orchestration code can stay
//! independent of how the dataset is stored.

pub mod arima;
pub mod decompose;

pub use arima::*;
pub use decompose::*;
