//! Upload page and the analyze action: multipart image upload to the
//! inference service, session bookkeeping, redirect to the dashboard.

use axum::extract::{Multipart, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use base64::{prelude::BASE64_STANDARD, Engine};

use iriscope_client::normalize_analysis;

use crate::handlers::dashboard::{escape_html, NAV_HTML};
use crate::state::SharedState;

pub async fn upload_page(State(_state): State<SharedState>) -> Html<String> {
    Html(render_upload_page(None))
}

pub async fn analyze_submit(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Response {
    let mut file_name = "upload.png".to_string();
    let mut content_type = "image/png".to_string();
    let mut bytes: Option<Vec<u8>> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                if let Some(name) = field.file_name() {
                    file_name = name.to_string();
                }
                if let Some(mime) = field.content_type() {
                    content_type = mime.to_string();
                }
                match field.bytes().await {
                    Ok(data) => bytes = Some(data.to_vec()),
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to read uploaded file");
                        return Html(render_upload_page(Some(
                            "The uploaded file could not be read. Please try again.",
                        )))
                        .into_response();
                    }
                }
            }
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(error = %err, "malformed multipart upload");
                return Html(render_upload_page(Some(
                    "The upload was malformed. Please try again.",
                )))
                .into_response();
            }
        }
    }

    let Some(bytes) = bytes.filter(|b| !b.is_empty()) else {
        return Html(render_upload_page(Some(
            "No image selected. Please upload a retinal image first.",
        )))
        .into_response();
    };

    // Cache the preview before the upstream call, so the dashboard can show
    // the image even when analysis fails later.
    let data_uri = format!("data:{};base64,{}", content_type, BASE64_STANDARD.encode(&bytes));
    state.remember_image(data_uri);

    tracing::info!(file = %file_name, size = bytes.len(), "analyzing retinal image");

    match state.client.analyze_image(&file_name, bytes, &content_type).await {
        Ok(payload) => {
            let record = normalize_analysis(&payload);
            state.remember_analysis(&record.analysis_id, record.class_label);
            Redirect::to(&format!("/dashboard?analysis_id={}", record.analysis_id))
                .into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, "image analysis failed");
            Html(render_upload_page(Some(
                "There was an error analyzing the image. Please try again.",
            )))
            .into_response()
        }
    }
}

fn render_upload_page(error: Option<&str>) -> String {
    let alert_html = match error {
        Some(message) => format!(
            r#"<div class="alert alert-danger">
                <span>{}</span>
                <button class="alert-close" type="button">&times;</button>
            </div>"#,
            escape_html(message)
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Retinal Image Analysis — Iriscope</title>
    <link rel="stylesheet" href="/static/css/main.css">
</head>
<body>
<div class="app-container">
{nav}
<main class="main-content">
    <div class="page-header">
        <div>
            <h1 class="page-title">Retinal Image Analysis</h1>
            <p class="text-muted">Upload a high-quality retinal image for AI-powered diabetic retinopathy detection and analysis.</p>
        </div>
    </div>

    {alert}

    <div class="grid-2">
        <div class="card">
            <div class="card-header">Upload Image</div>
            <form method="POST" action="/analyze" enctype="multipart/form-data" id="upload-form">
                <label class="upload-drop" for="file-input">
                    <span id="upload-hint">Drop a retinal image here, or click to browse</span>
                    <input type="file" id="file-input" name="file" accept="image/jpeg,image/png">
                </label>
                <button type="submit" class="btn btn-primary btn-block" id="analyze-btn" disabled>Analyze Image</button>
                <p class="text-muted small">For clinical use only. Supported formats: JPG, PNG.</p>
            </form>
        </div>

        <div class="card">
            <div class="card-header">Image Preview</div>
            <div class="image-frame" id="preview-frame">
                <div class="image-placeholder" id="preview-placeholder">No image selected</div>
            </div>
        </div>
    </div>

    <div class="card" id="api-status" data-endpoint="/api/status">
        <div class="card-header">Backend API Status</div>
        <div class="status-grid" id="status-grid">
            <span class="text-muted">Checking…</span>
        </div>
        <p class="text-muted small" id="status-backend"></p>
    </div>
</main>
</div>
<script src="/static/js/main.js"></script>
</body>
</html>"#,
        nav = NAV_HTML,
        alert = alert_html,
    )
}
