//! Dataset quality summarization.
//!
//! Loads partitioned CSV shards into an untyped frame, computes the
//! quality report (record count, time span, completeness, dtypes,
//! duplicates, schema compliance, sample rows) and persists it as JSON.

pub mod frame;
pub mod loader;
pub mod report;
pub mod schema;
pub mod summarize;
pub mod types;
pub mod utility;
