//! Dashboard handler — renders the analysis results: diagnosis summary,
//! severity gauge, clinical assessment, and the Q&A panel.

use axum::extract::{Query, State};
use axum::response::Html;
use serde::Deserialize;

use iriscope_client::normalize_analysis;
use iriscope_common::record::AnalysisRecord;

use crate::state::SharedState;

/// Navigation HTML template shared across all pages
pub const NAV_HTML: &str = include_str!("../../templates/nav.html");

/// Minimal HTML escaping for backend- and user-supplied text interpolated
/// into the rendered pages.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub analysis_id: Option<String>,
    pub demo: Option<String>,
}

pub async fn dashboard(
    State(state): State<SharedState>,
    Query(query): Query<DashboardQuery>,
) -> Html<String> {
    let mut record = resolve_record(&state, &query).await;

    // Attach the locally-cached upload for the preview pane.
    if record.image_url.is_none() {
        record.image_url = state.session().last_image;
    }

    // Remember for the Q&A panel and the reports page (last-writer-wins).
    state.remember_analysis(&record.analysis_id, record.class_label);

    Html(render_dashboard(&record))
}

/// Resolve which record to show: demo mode, an explicit id, or the most
/// recent analysis. Fetch failures fall back to the demo record so the page
/// always renders.
async fn resolve_record(state: &SharedState, query: &DashboardQuery) -> AnalysisRecord {
    if query.demo.as_deref() == Some("true") {
        return AnalysisRecord::demo();
    }

    let id = query
        .analysis_id
        .clone()
        .or_else(|| state.last_analysis_id());

    match id {
        Some(id) => match state.client.get_analysis(&id).await {
            Ok(payload) => normalize_analysis(&payload),
            Err(err) => {
                tracing::warn!(analysis_id = %id, error = %err, "analysis fetch failed, showing demo record");
                let mut record = AnalysisRecord::demo();
                record.analysis_id = id;
                record
            }
        },
        None => AnalysisRecord::demo(),
    }
}

fn severity_bar_class(severity: u8) -> &'static str {
    match severity {
        0..=24 => "success",
        25..=49 => "warning",
        50..=74 => "caution",
        _ => "danger",
    }
}

fn render_dashboard(record: &AnalysisRecord) -> String {
    let grade = record.class_label;
    let severity = record.severity_index;
    let bar_class = severity_bar_class(severity);

    let image_html = match &record.image_url {
        Some(data_uri) => format!(
            r#"<img src="{}" alt="Analyzed retinal image" class="retina-image">"#,
            data_uri
        ),
        None => r#"<div class="image-placeholder">Analyzed retinal image</div>"#.to_string(),
    };

    let qa_items: String = record
        .suggested_questions_with_answers
        .iter()
        .map(|qa| {
            format!(
                r#"
            <details class="qa-item">
                <summary>{}</summary>
                <p class="text-muted">{}</p>
            </details>"#,
                escape_html(&qa.question),
                escape_html(&qa.answer)
            )
        })
        .collect();

    let cs = &record.clinical_summary;

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Analysis Results — Iriscope</title>
    <link rel="stylesheet" href="/static/css/main.css">
</head>
<body>
<div class="app-container">
{nav}
<main class="main-content">
    <div class="page-header">
        <div>
            <h1 class="page-title">Analysis Results</h1>
            <p class="text-muted">Detailed analysis of the retinal image</p>
        </div>
        <div class="d-flex gap-3">
            <span class="badge badge-outline">ID: {analysis_id}</span>
            <a href="/api/report/{analysis_id}" class="btn btn-primary">Generate Report</a>
        </div>
    </div>

    <div class="tabs">
        <button class="tab-btn active" data-tab="overview">Overview</button>
        <button class="tab-btn" data-tab="clinical">Clinical Details</button>
        <button class="tab-btn" data-tab="qa">Q&amp;A</button>
    </div>

    <section class="tab-panel active" id="tab-overview">
        <div class="grid-2">
            <div class="card">
                <div class="card-header">Diagnosis Summary</div>
                <h3 class="diagnosis-title">{grade} Diabetic Retinopathy</h3>
                <p class="text-muted">Confidence: {confidence}%</p>

                <div class="gauge-row">
                    <span>Severity Index</span>
                    <span class="gauge-value">{severity}/100</span>
                </div>
                <div class="progress-track" role="progressbar" aria-valuemin="0" aria-valuemax="100" aria-valuenow="{severity}">
                    <div class="progress-bar {bar_class}" style="width:{severity}%"></div>
                </div>

                <div class="section-divider"></div>
                <h4>AI Explanation</h4>
                <p class="text-muted">{explanation}</p>
            </div>

            <div class="card">
                <div class="card-header">Image Analysis</div>
                <div class="image-frame">
                    {image_html}
                </div>
            </div>
        </div>
    </section>

    <section class="tab-panel" id="tab-clinical">
        <div class="card">
            <div class="card-header">Clinical Assessment</div>
            <div class="grid-2">
                <div>
                    <h4 class="field-label">Observed Abnormalities</h4>
                    <p>{observed}</p>
                    <h4 class="field-label">Associated Risks</h4>
                    <p>{risks}</p>
                </div>
                <div>
                    <h4 class="field-label">Lifestyle Recommendations</h4>
                    <p>{lifestyle}</p>
                    <h4 class="field-label">Recommended Follow-up</h4>
                    <p>{followup}</p>
                </div>
            </div>
            <div class="section-divider"></div>
            <p class="disclaimer text-muted">
                This analysis is provided as a decision support tool and should not replace
                professional medical advice. Always consult with a healthcare professional
                for diagnosis and treatment decisions.
            </p>
        </div>
    </section>

    <section class="tab-panel" id="tab-qa">
        <div class="card">
            <div class="card-header">AI-Powered Q&amp;A</div>
            <div class="qa-list" id="qa-list">
                {qa_items}
            </div>
            <div class="qa-ask">
                <h4>Ask a Custom Question</h4>
                <form id="consult-form" data-analysis-id="{analysis_id}">
                    <input type="text" id="consult-question" placeholder="Type your question about the analysis..." required>
                    <button type="submit" class="btn btn-primary">Send</button>
                </form>
                <p class="text-muted small">Ask specific questions about the diagnosis, treatment options, or clinical implications.</p>
            </div>
        </div>
    </section>
</main>
</div>
<script src="/static/js/main.js"></script>
</body>
</html>"#,
        nav = NAV_HTML,
        analysis_id = escape_html(&record.analysis_id),
        grade = grade.as_str(),
        confidence = record.confidence_percentage,
        severity = severity,
        bar_class = bar_class,
        explanation = escape_html(&record.explanation),
        image_html = image_html,
        observed = escape_html(&cs.observed_abnormalities),
        risks = escape_html(&cs.risks),
        lifestyle = escape_html(&cs.lifestyle_notes),
        followup = escape_html(&cs.recommended_followup),
        qa_items = qa_items,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use iriscope_common::grade::DrGrade;

    #[test]
    fn severity_bar_bands() {
        assert_eq!(severity_bar_class(10), "success");
        assert_eq!(severity_bar_class(35), "warning");
        assert_eq!(severity_bar_class(60), "caution");
        assert_eq!(severity_bar_class(90), "danger");
    }

    #[test]
    fn renders_demo_record() {
        let page = render_dashboard(&AnalysisRecord::demo());
        assert!(page.contains("demo-12345"));
        assert!(page.contains("Mild Diabetic Retinopathy"));
        assert!(page.contains("Confidence: 87%"));
        assert!(page.contains("35/100"));
    }

    #[test]
    fn escapes_backend_text() {
        let mut record = AnalysisRecord::demo();
        record.explanation = "<script>alert(1)</script>".to_string();
        record.class_label = DrGrade::Moderate;
        let page = render_dashboard(&record);
        assert!(!page.contains("<script>alert(1)</script>"));
        assert!(page.contains("&lt;script&gt;"));
    }
}
