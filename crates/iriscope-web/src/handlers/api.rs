//! JSON API consumed by the page scripts.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use iriscope_client::{extract_answer, fallback_answer, normalize_analysis, truncate_response};
use iriscope_common::error::ApiError;
use iriscope_common::grade::DrGrade;
use iriscope_common::record::AnalysisRecord;

use crate::state::SharedState;

/// The backend surface reported by the status panel. A single health probe
/// decides the state of all of them.
const KNOWN_ENDPOINTS: &[(&str, &str, &str)] = &[
    ("Prediction API", "/predict", "POST"),
    ("Consultation API", "/consult", "POST"),
    ("Report Generation", "/generate-report", "GET"),
    ("Health Check", "/health", "GET"),
    ("Model Information", "/model-info", "GET"),
];

/// GET /api/status — single health probe, fanned out to every endpoint row.
pub async fn api_status(State(state): State<SharedState>) -> Json<Value> {
    let online = match state.client.health().await {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(error = %err, "health check failed");
            false
        }
    };
    let status = if online { "online" } else { "offline" };

    let endpoints: Vec<Value> = KNOWN_ENDPOINTS
        .iter()
        .map(|(name, endpoint, method)| {
            json!({
                "name": name,
                "endpoint": endpoint,
                "method": method,
                "status": status,
            })
        })
        .collect();

    Json(json!({
        "backend_url": state.client.base_url(),
        "checked_at": Utc::now().to_rfc3339(),
        "endpoints": endpoints,
    }))
}

/// GET /api/analysis/{id} — fetch and normalize one analysis.
pub async fn api_analysis(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<AnalysisRecord>, ApiError> {
    let payload = state.client.get_analysis(&id).await?;
    let record = normalize_analysis(&payload);
    state.remember_analysis(&record.analysis_id, record.class_label);
    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
pub struct ConsultRequest {
    pub question: String,
    #[serde(default)]
    pub analysis_id: Option<String>,
}

/// POST /api/consult — one remote call; transport errors and unusable
/// response shapes are answered with the synthesized fallback instead of
/// being surfaced. A missing analysis id short-circuits before any network
/// call.
pub async fn api_consult(
    State(state): State<SharedState>,
    Json(req): Json<ConsultRequest>,
) -> Result<Json<Value>, ApiError> {
    let analysis_id = req
        .analysis_id
        .or_else(|| state.last_analysis_id())
        .ok_or(ApiError::MissingAnalysisId)?;

    let grade = state.session().last_grade.unwrap_or(DrGrade::Unknown);

    let answer = match state.client.get_consultation(&analysis_id, &req.question).await {
        Ok(payload) => match extract_answer(&payload) {
            Some(text) => text,
            None => {
                tracing::warn!(analysis_id = %analysis_id, "consultation response had no usable answer field, using fallback");
                fallback_answer(grade, &req.question)
            }
        },
        Err(err) => {
            tracing::warn!(analysis_id = %analysis_id, error = %err, "consultation failed, using fallback");
            fallback_answer(grade, &req.question)
        }
    };

    Ok(Json(json!({ "answer": truncate_response(&answer) })))
}

/// GET /api/report/{id} — PDF passthrough with a fixed attachment filename.
pub async fn api_report(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.client.generate_report(&id).await.map_err(ApiError::from)?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"Iriscope_Report_{id}.pdf\""),
            ),
        ],
        bytes,
    ))
}

/// GET /api/model-info — raw passthrough of the backend's model metadata.
pub async fn api_model_info(
    State(state): State<SharedState>,
) -> Result<Json<Value>, ApiError> {
    let info = state.client.model_info().await?;
    Ok(Json(info))
}
