//! Dataset summaries: a structural report, descriptive statistics, and their
//! terminal rendering.
//!
//! Formatting lives here so the orchestration code only assembles values.

pub mod describe;
pub mod format;
pub mod info;

pub use describe::describe;
pub use format::format_description;
pub use info::format_table_info;
