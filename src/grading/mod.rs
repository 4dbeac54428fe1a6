//! Rubric scoring of repository hygiene and dataset quality.
//!
//! One static table maps criterion name to evaluator; every criterion is
//! worth the same ten points. Scoring is pure over the summary document,
//! the repository metadata snapshot and the injected thresholds.

pub mod rubric;
pub mod types;

/// Object-store key the grading document is written to.
pub const GRADING_KEY: &str = "reports/grading_summary.json";
