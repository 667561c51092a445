//! iriscope-client — API client wrapper for the external inference service.
//!
//! The backend owns every response shape and is only loosely consistent
//! about field names, so everything it sends passes through the normalizer
//! before the rest of the application sees it:
//!
//!   backend JSON -> [`normalize::normalize_analysis`] -> `AnalysisRecord`
//!   consult JSON -> [`consult::extract_answer`] -> answer, or
//!                   [`consult::fallback_answer`] when the call fails.

pub mod backend;
pub mod consult;
pub mod normalize;

pub use backend::{ClientError, InferenceClient};
pub use consult::{extract_answer, fallback_answer, truncate_response};
pub use normalize::normalize_analysis;
