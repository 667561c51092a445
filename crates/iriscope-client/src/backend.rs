//! Thin typed wrapper over the inference service's HTTP API.
//!
//! Endpoints:
//!   POST /predict              — multipart image upload -> analysis object
//!   GET  /analysis/{id}        — previously issued analysis
//!   POST /consult              — {analysis_id, question} -> answer-bearing object
//!   GET  /generate-report/{id} — PDF bytes
//!   GET  /health               — liveness probe (the only call with a timeout)
//!   GET  /model-info           — model metadata

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use iriscope_common::error::ApiError;

/// Fixed timeout on the health probe; every other call runs to completion.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("API error [{status}]: {message}")]
    Api { status: u16, message: String },
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) => ApiError::Http(e),
            ClientError::Serde(e) => ApiError::Serialization(e),
            ClientError::Api { status, message } => ApiError::Upstream { status, message },
        }
    }
}

/// Map an error response body to a message. The backend is inconsistent
/// here too: FastAPI-style `detail`, axios-style `error`, or a bare
/// `message` have all been observed.
fn error_message(body: &Value) -> String {
    body.pointer("/error/message")
        .and_then(Value::as_str)
        .or_else(|| body["error"].as_str())
        .or_else(|| body["detail"].as_str())
        .or_else(|| body["message"].as_str())
        .unwrap_or("unknown API error")
        .to_string()
}

async fn check_response_status(resp: reqwest::Response) -> Result<Value, ClientError> {
    let status = resp.status().as_u16();
    if status >= 400 {
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        return Err(ClientError::Api { status, message: error_message(&body) });
    }
    Ok(resp.json().await?)
}

/// Client for the external inference service.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    base_url: String,
    client: reqwest::Client,
}

impl InferenceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET /health with the fixed probe timeout.
    pub async fn health(&self) -> Result<Value, ClientError> {
        let resp = self
            .client
            .get(self.url("/health"))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await?;
        check_response_status(resp).await
    }

    /// GET /model-info.
    pub async fn model_info(&self) -> Result<Value, ClientError> {
        let resp = self.client.get(self.url("/model-info")).send().await?;
        check_response_status(resp).await
    }

    /// POST /predict — upload a retinal image as a multipart `file` part.
    pub async fn analyze_image(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Value, ClientError> {
        tracing::debug!(file_name, size = bytes.len(), "uploading image for analysis");

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp = self
            .client
            .post(self.url("/predict"))
            .multipart(form)
            .send()
            .await?;
        check_response_status(resp).await
    }

    /// GET /analysis/{id}.
    pub async fn get_analysis(&self, analysis_id: &str) -> Result<Value, ClientError> {
        let resp = self
            .client
            .get(self.url(&format!("/analysis/{analysis_id}")))
            .send()
            .await?;
        check_response_status(resp).await
    }

    /// POST /consult with the analysis id and a free-text question.
    pub async fn get_consultation(
        &self,
        analysis_id: &str,
        question: &str,
    ) -> Result<Value, ClientError> {
        tracing::debug!(analysis_id, "sending consultation request");

        let body = serde_json::json!({
            "analysis_id": analysis_id,
            "question": question,
        });
        let resp = self
            .client
            .post(self.url("/consult"))
            .json(&body)
            .send()
            .await?;
        check_response_status(resp).await
    }

    /// GET /generate-report/{id} — raw PDF bytes.
    pub async fn generate_report(&self, analysis_id: &str) -> Result<Vec<u8>, ClientError> {
        let resp = self
            .client
            .get(self.url(&format!("/generate-report/{analysis_id}")))
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status >= 400 {
            let body: Value = resp.json().await.unwrap_or(Value::Null);
            return Err(ClientError::Api { status, message: error_message(&body) });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}
