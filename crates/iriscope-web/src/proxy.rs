//! CORS proxy relay — re-issues browser requests to the inference service.
//! Thin byte-forwarding only: no payload transformation beyond content-type
//! pass-through, and the PDF attachment headers on report downloads.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::state::SharedState;

const REPORT_FILENAME: &str = "Iriscope_Report.pdf";

fn upstream_status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY)
}

/// Upstream failures are reported verbatim: the upstream status when one
/// exists, else 502.
fn proxy_error(err: reqwest::Error) -> Response {
    let status = err
        .status()
        .map(|s| upstream_status(s.as_u16()))
        .unwrap_or(StatusCode::BAD_GATEWAY);
    tracing::warn!(error = %err, "proxy request failed");
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

/// Pass an upstream response through: status, content type, and body bytes.
async fn relay_body(resp: reqwest::Response, is_report: bool) -> Response {
    let status = upstream_status(resp.status().as_u16());
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json")
        .to_string();

    let bytes = match resp.bytes().await {
        Ok(bytes) => bytes,
        Err(err) => return proxy_error(err),
    };

    if is_report {
        return (
            status,
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{REPORT_FILENAME}\""),
                ),
            ],
            bytes,
        )
            .into_response();
    }

    (status, [(header::CONTENT_TYPE, content_type)], bytes).into_response()
}

pub async fn proxy_get(
    State(state): State<SharedState>,
    Path(path): Path<String>,
) -> Response {
    let url = format!("{}/{}", state.client.base_url(), path);
    tracing::debug!(%url, "proxying GET request");

    match state
        .http
        .get(&url)
        .header(header::ACCEPT, "application/json")
        .send()
        .await
    {
        Ok(resp) => relay_body(resp, path.contains("generate-report")).await,
        Err(err) => proxy_error(err),
    }
}

pub async fn proxy_post(
    State(state): State<SharedState>,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let url = format!("{}/{}", state.client.base_url(), path);
    tracing::debug!(%url, size = body.len(), "proxying POST request");

    // Forward the body byte-for-byte under the incoming content type, so
    // both JSON and multipart uploads (boundary included) survive the hop.
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json")
        .to_string();

    match state
        .http
        .post(&url)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::ACCEPT, "application/json")
        .body(body.to_vec())
        .send()
        .await
    {
        Ok(resp) => relay_body(resp, false).await,
        Err(err) => proxy_error(err),
    }
}
