//! Dataset lifecycle.
//!
//! - preprocessing of the date column (`preprocess`)
//! - daily aggregation (`resample`)
//! - the process-wide loaded dataset (`store`)
//! - synthetic sample files for offline use (`sample`)

pub mod preprocess;
pub mod resample;
pub mod sample;
pub mod store;

pub use preprocess::preprocess;
pub use resample::resample_daily_sum;
pub use store::DatasetStore;
