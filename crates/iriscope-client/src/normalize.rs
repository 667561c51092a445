//! Response normalizer — maps an arbitrarily-shaped backend payload into the
//! canonical [`AnalysisRecord`].
//!
//! The backend has shipped the same facts under several field names over
//! time. Each target field therefore has an explicit ordered list of JSON
//! pointers, resolved first-match-wins, so the resolution order is auditable
//! and testable. The canonical field name always comes first, which makes
//! normalization idempotent.
//!
//! This function never fails: absent data becomes a documented default.

use serde_json::Value;
use uuid::Uuid;

use iriscope_common::grade::DrGrade;
use iriscope_common::record::{AnalysisRecord, ClinicalSummary, SuggestedQa, NO_EXPLANATION};

/// Confidence assigned when the label was repaired from the severity index
/// and the backend reported no confidence at all.
const REPAIRED_CONFIDENCE: u8 = 75;

type Pointers = &'static [&'static str];

const ANALYSIS_ID: Pointers = &["/analysis_id", "/id"];

const CLASS_LABEL: Pointers = &[
    "/class_label",
    "/prediction/class",
    "/prediction/class_name",
    "/prediction/className",
    "/highest_probability_class",
    "/class",
];

const SEVERITY_INDEX: Pointers = &[
    "/severity_index",
    "/prediction/severity_index",
    "/prediction/severityIndex",
];

const CONFIDENCE: Pointers = &[
    "/confidence_percentage",
    "/prediction/confidence",
    "/prediction/confidence_score",
    "/confidence",
    "/confidence_score",
];

const EXPLANATION: Pointers = &["/explanation", "/ai_explanation"];

/// First-match-wins combinator over a field's accessor list.
fn first_defined<'a>(payload: &'a Value, pointers: Pointers) -> Option<&'a Value> {
    pointers
        .iter()
        .filter_map(|p| payload.pointer(p))
        .find(|v| !v.is_null())
}

/// Numbers may arrive as JSON numbers or as numeric strings.
fn coerce_f64(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

fn coerce_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// Raw confidence may be a 0-1 fraction or an already-scaled percentage.
fn normalize_confidence(raw: f64) -> u8 {
    let pct = if raw > 1.0 { raw } else { raw * 100.0 };
    pct.round().clamp(0.0, 100.0) as u8
}

fn clamp_index(raw: f64) -> u8 {
    raw.round().clamp(0.0, 100.0) as u8
}

fn recommendations(payload: &Value) -> Option<&Vec<Value>> {
    payload.get("recommendations").and_then(Value::as_array)
}

/// Resolve the four clinical-summary members independently: a nested
/// `clinical_summary` value wins, then the flat alias the backend sometimes
/// sends instead, then the static table entry for the grade.
fn resolve_clinical_summary(payload: &Value, grade: DrGrade) -> ClinicalSummary {
    let table = grade.clinical_summary();
    let nested = payload.get("clinical_summary");
    let member = |key: &str| nested.and_then(|cs| cs.get(key)).and_then(coerce_string);

    let joined = recommendations(payload).map(|r| {
        r.iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    });
    let first = recommendations(payload)
        .and_then(|r| r.first())
        .and_then(coerce_string);

    ClinicalSummary {
        observed_abnormalities: member("observed_abnormalities")
            .or_else(|| payload.get("clinical_findings").and_then(coerce_string))
            .unwrap_or(table.observed_abnormalities),
        risks: member("risks")
            .or_else(|| payload.get("risk_factors").and_then(coerce_string))
            .unwrap_or(table.risks),
        lifestyle_notes: member("lifestyle_notes")
            .or(joined.filter(|s| !s.is_empty()))
            .unwrap_or(table.lifestyle_notes),
        recommended_followup: member("recommended_followup")
            .or(first)
            .unwrap_or(table.recommended_followup),
    }
}

fn resolve_suggested_qa(payload: &Value) -> Vec<SuggestedQa> {
    if let Some(arr) = payload
        .get("suggested_questions_with_answers")
        .and_then(Value::as_array)
    {
        let pairs: Vec<SuggestedQa> = arr
            .iter()
            .filter_map(|item| {
                Some(SuggestedQa {
                    question: coerce_string(item.get("question")?)?,
                    answer: coerce_string(item.get("answer")?)?,
                })
            })
            .collect();
        if !pairs.is_empty() {
            return pairs;
        }
    }

    let answer = recommendations(payload)
        .and_then(|r| r.first())
        .and_then(coerce_string)
        .unwrap_or_else(|| "Regular follow-up with your ophthalmologist is recommended.".to_string());

    vec![SuggestedQa {
        question: "What follow-up care is recommended?".to_string(),
        answer,
    }]
}

/// Map a backend payload into the canonical record.
pub fn normalize_analysis(payload: &Value) -> AnalysisRecord {
    let analysis_id = first_defined(payload, ANALYSIS_ID)
        .and_then(coerce_string)
        .unwrap_or_else(|| format!("analysis-{}", Uuid::new_v4()));

    let mut class_label = first_defined(payload, CLASS_LABEL)
        .and_then(coerce_string)
        .map(|label| DrGrade::from_label(&label))
        .unwrap_or(DrGrade::Unknown);

    let severity_index = first_defined(payload, SEVERITY_INDEX)
        .and_then(coerce_f64)
        .map(clamp_index)
        .unwrap_or(0);

    let mut confidence_percentage = first_defined(payload, CONFIDENCE)
        .and_then(coerce_f64)
        .map(normalize_confidence)
        .unwrap_or(0);

    let explanation = first_defined(payload, EXPLANATION)
        .and_then(coerce_string)
        .unwrap_or_else(|| NO_EXPLANATION.to_string());

    let mut clinical_summary = resolve_clinical_summary(payload, class_label);

    // Consistency repair: an Unknown label with a positive severity index is
    // reclassified from the severity bands, and the clinical summary is
    // re-selected from the same table so the two stay consistent.
    if class_label == DrGrade::Unknown && severity_index > 0 {
        class_label = DrGrade::from_severity_index(severity_index);
        clinical_summary = class_label.clinical_summary();
        if confidence_percentage == 0 {
            confidence_percentage = REPAIRED_CONFIDENCE;
        }
        tracing::debug!(
            severity = severity_index,
            repaired = class_label.as_str(),
            "reclassified unknown label from severity bands"
        );
    }

    AnalysisRecord {
        analysis_id,
        class_label,
        severity_index,
        confidence_percentage,
        explanation,
        clinical_summary,
        suggested_questions_with_answers: resolve_suggested_qa(payload),
        image_url: payload.get("image_url").and_then(coerce_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn confidence_fraction_scales_to_percentage() {
        assert_eq!(normalize_confidence(0.0), 0);
        assert_eq!(normalize_confidence(0.87), 87);
        assert_eq!(normalize_confidence(1.0), 100);
        assert_eq!(normalize_confidence(0.004), 0);
    }

    #[test]
    fn confidence_above_one_is_already_a_percentage() {
        assert_eq!(normalize_confidence(87.0), 87);
        assert_eq!(normalize_confidence(99.6), 100);
        assert_eq!(normalize_confidence(250.0), 100);
    }

    #[test]
    fn negative_confidence_clamps_to_zero() {
        assert_eq!(normalize_confidence(-0.5), 0);
    }

    #[test]
    fn resolves_nested_prediction_shape() {
        let payload = json!({
            "analysis_id": "abc-1",
            "prediction": { "class": "Moderate", "severity_index": 52, "confidence": 0.91 },
            "explanation": "Multiple hemorrhages visible."
        });
        let record = normalize_analysis(&payload);
        assert_eq!(record.analysis_id, "abc-1");
        assert_eq!(record.class_label, DrGrade::Moderate);
        assert_eq!(record.severity_index, 52);
        assert_eq!(record.confidence_percentage, 91);
        assert_eq!(record.explanation, "Multiple hemorrhages visible.");
        assert_eq!(record.clinical_summary, DrGrade::Moderate.clinical_summary());
    }

    #[test]
    fn resolves_alias_field_names() {
        let payload = json!({
            "prediction": { "class_name": "Severe", "severityIndex": "73" },
            "confidence_score": "88",
            "ai_explanation": "Extensive damage."
        });
        let record = normalize_analysis(&payload);
        assert_eq!(record.class_label, DrGrade::Severe);
        assert_eq!(record.severity_index, 73);
        assert_eq!(record.confidence_percentage, 88);
        assert_eq!(record.explanation, "Extensive damage.");
    }

    #[test]
    fn empty_payload_yields_documented_defaults() {
        let record = normalize_analysis(&json!({}));
        assert!(record.analysis_id.starts_with("analysis-"));
        assert_eq!(record.class_label, DrGrade::Unknown);
        assert_eq!(record.severity_index, 0);
        assert_eq!(record.confidence_percentage, 0);
        assert_eq!(record.explanation, NO_EXPLANATION);
        assert_eq!(record.clinical_summary, DrGrade::Unknown.clinical_summary());
        assert_eq!(record.suggested_questions_with_answers.len(), 1);
    }

    #[test]
    fn repair_reclassifies_unknown_label_from_severity() {
        let payload = json!({
            "analysis_id": "abc-2",
            "prediction": { "class": "something-else", "severity_index": 45, "confidence": 0 }
        });
        let record = normalize_analysis(&payload);
        assert_eq!(record.class_label, DrGrade::Moderate);
        assert_eq!(record.clinical_summary, DrGrade::Moderate.clinical_summary());
        assert_eq!(record.confidence_percentage, 75);
    }

    #[test]
    fn repair_keeps_reported_confidence_when_nonzero() {
        let payload = json!({
            "prediction": { "severity_index": 85, "confidence": 0.6 }
        });
        let record = normalize_analysis(&payload);
        assert_eq!(record.class_label, DrGrade::Proliferative);
        assert_eq!(record.confidence_percentage, 60);
    }

    #[test]
    fn unknown_label_with_zero_severity_is_left_alone() {
        let record = normalize_analysis(&json!({ "severity_index": 0 }));
        assert_eq!(record.class_label, DrGrade::Unknown);
        assert_eq!(record.confidence_percentage, 0);
    }

    #[test]
    fn synthesizes_clinical_summary_from_flat_fields() {
        let payload = json!({
            "analysis_id": "abc-3",
            "prediction": { "class": "Mild", "severity_index": 35, "confidence": 0.87 },
            "clinical_findings": "Few microaneurysms in peripheral retina",
            "risk_factors": "Low risk of vision loss if blood glucose is controlled",
            "recommendations": ["Annual eye examination", "Maintain good glycemic control"]
        });
        let record = normalize_analysis(&payload);
        let cs = &record.clinical_summary;
        assert_eq!(cs.observed_abnormalities, "Few microaneurysms in peripheral retina");
        assert_eq!(cs.risks, "Low risk of vision loss if blood glucose is controlled");
        assert_eq!(cs.lifestyle_notes, "Annual eye examination, Maintain good glycemic control");
        assert_eq!(cs.recommended_followup, "Annual eye examination");
    }

    #[test]
    fn backend_clinical_summary_wins_over_flat_fields() {
        let payload = json!({
            "prediction": { "class": "Mild", "severity_index": 30 },
            "clinical_summary": {
                "observed_abnormalities": "A",
                "risks": "B",
                "lifestyle_notes": "C",
                "recommended_followup": "D"
            },
            "clinical_findings": "ignored"
        });
        let cs = normalize_analysis(&payload).clinical_summary;
        assert_eq!(cs.observed_abnormalities, "A");
        assert_eq!(cs.recommended_followup, "D");
    }

    #[test]
    fn default_suggested_question_uses_first_recommendation() {
        let payload = json!({
            "prediction": { "class": "Mild", "severity_index": 30 },
            "recommendations": ["See a specialist"]
        });
        let qa = &normalize_analysis(&payload).suggested_questions_with_answers;
        assert_eq!(qa.len(), 1);
        assert_eq!(qa[0].question, "What follow-up care is recommended?");
        assert_eq!(qa[0].answer, "See a specialist");
    }

    #[test]
    fn normalization_is_idempotent_on_canonical_records() {
        let payload = json!({
            "analysis_id": "abc-4",
            "prediction": { "class": "Severe", "severity_index": 71, "confidence": 0.66 },
            "explanation": "Venous beading present.",
            "image_url": "data:image/png;base64,AAAA"
        });
        let once = normalize_analysis(&payload);
        let canonical = serde_json::to_value(&once).unwrap();
        let twice = normalize_analysis(&canonical);
        assert_eq!(once, twice);
    }
}
