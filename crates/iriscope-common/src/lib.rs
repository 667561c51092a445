//! iriscope-common — Shared types and errors used across all Iriscope crates.

pub mod error;
pub mod grade;
pub mod record;

// Re-export commonly used types
pub use error::{ApiError, Result};
pub use grade::DrGrade;
pub use record::{AnalysisRecord, ClinicalSummary, SuggestedQa};
