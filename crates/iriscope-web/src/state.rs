//! Shared application state for the web server.

use std::sync::{Arc, Mutex};

use iriscope_client::InferenceClient;
use iriscope_common::grade::DrGrade;

use crate::config::Config;

/// The most recent analysis, shared by the views that need it.
/// Last-writer-wins; a single active browser tab is assumed.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub last_analysis_id: Option<String>,
    pub last_grade: Option<DrGrade>,
    /// Data URI of the last uploaded image, for the dashboard preview.
    pub last_image: Option<String>,
}

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub config: Config,
    /// Typed client for the inference service.
    pub client: InferenceClient,
    /// Plain HTTP client used by the proxy relay.
    pub http: reqwest::Client,
    session: Mutex<SessionContext>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let client = InferenceClient::new(config.backend.base_url.clone());
        Self {
            config,
            client,
            http: reqwest::Client::new(),
            session: Mutex::new(SessionContext::default()),
        }
    }

    /// Snapshot of the session context. Locks are held only for the copy,
    /// never across awaits.
    pub fn session(&self) -> SessionContext {
        self.session.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last_analysis_id(&self) -> Option<String> {
        self.session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last_analysis_id
            .clone()
    }

    pub fn remember_analysis(&self, analysis_id: &str, grade: DrGrade) {
        let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        session.last_analysis_id = Some(analysis_id.to_string());
        session.last_grade = Some(grade);
    }

    pub fn remember_image(&self, data_uri: String) {
        let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        session.last_image = Some(data_uri);
    }
}

pub type SharedState = Arc<AppState>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_starts_empty() {
        let state = AppState::new(Config::default());
        let session = state.session();
        assert!(session.last_analysis_id.is_none());
        assert!(session.last_grade.is_none());
        assert!(session.last_image.is_none());
    }

    #[test]
    fn last_writer_wins() {
        let state = AppState::new(Config::default());
        state.remember_analysis("first", DrGrade::Mild);
        state.remember_analysis("second", DrGrade::Severe);
        let session = state.session();
        assert_eq!(session.last_analysis_id.as_deref(), Some("second"));
        assert_eq!(session.last_grade, Some(DrGrade::Severe));
    }

    #[test]
    fn image_is_remembered_independently() {
        let state = AppState::new(Config::default());
        state.remember_image("data:image/png;base64,AAAA".to_string());
        assert!(state.session().last_analysis_id.is_none());
        assert_eq!(
            state.session().last_image.as_deref(),
            Some("data:image/png;base64,AAAA")
        );
    }
}
