//! Reports page — download link for the PDF report of the last analysis.
//! The PDF itself is rendered by the inference service; this page only
//! links the passthrough endpoint.

use axum::extract::State;
use axum::response::Html;

use crate::handlers::dashboard::{escape_html, NAV_HTML};
use crate::state::SharedState;

pub async fn reports_page(State(state): State<SharedState>) -> Html<String> {
    Html(render_reports_page(state.last_analysis_id().as_deref()))
}

fn render_reports_page(analysis_id: Option<&str>) -> String {
    let body_html = match analysis_id {
        Some(id) => format!(
            r#"<p>Latest analysis: <span class="badge badge-outline">ID: {id}</span></p>
            <a href="/api/report/{id}" class="btn btn-primary">Download PDF Report</a>
            <p class="text-muted small">The report is generated by the inference service and downloaded as a PDF attachment.</p>"#,
            id = escape_html(id)
        ),
        None => r#"<p class="text-muted">No analysis available yet. Upload and analyze a retinal image first.</p>
            <a href="/" class="btn btn-outline">Go to Analysis</a>"#
            .to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Reports — Iriscope</title>
    <link rel="stylesheet" href="/static/css/main.css">
</head>
<body>
<div class="app-container">
{nav}
<main class="main-content">
    <div class="page-header">
        <div>
            <h1 class="page-title">Reports</h1>
            <p class="text-muted">Download the clinical PDF report for the most recent analysis</p>
        </div>
    </div>

    <div class="card">
        <div class="card-header">Report Generation</div>
        {body}
    </div>
</main>
</div>
<script src="/static/js/main.js"></script>
</body>
</html>"#,
        nav = NAV_HTML,
        body = body_html,
    )
}
