//! iriscope-web — Web dashboard for Iriscope
//! Provides:
//!   - Retinal image upload and analysis view
//!   - Diagnosis dashboard with severity gauge, clinical details, and Q&A
//!   - Report download page
//!   - Backend status panel
//!   - CORS proxy relay to the external inference service

pub mod config;
pub mod handlers;
pub mod proxy;
pub mod router;
pub mod state;
