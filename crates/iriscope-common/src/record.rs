//! Canonical client-side representation of one analysis result.
//! Field names mirror the backend's wire names so that normalizing an
//! already-canonical record is a no-op.

use serde::{Deserialize, Serialize};

use crate::grade::DrGrade;

/// Placeholder used when the backend supplies no explanation text.
pub const NO_EXPLANATION: &str = "No explanation available";

/// Four-part clinical assessment attached to every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalSummary {
    pub observed_abnormalities: String,
    pub risks: String,
    pub lifestyle_notes: String,
    pub recommended_followup: String,
}

/// One pre-answered follow-up question shown in the Q&A panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedQa {
    pub question: String,
    pub answer: String,
}

/// The canonical per-image diagnostic result held by the client.
/// Constructed once per backend response; never merged across sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub analysis_id: String,
    pub class_label: DrGrade,
    pub severity_index: u8,
    pub confidence_percentage: u8,
    pub explanation: String,
    pub clinical_summary: ClinicalSummary,
    #[serde(default)]
    pub suggested_questions_with_answers: Vec<SuggestedQa>,
    /// Locally-cached image data URI; never part of backend state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl AnalysisRecord {
    /// Built-in record rendered in demo mode and whenever the backend is
    /// unreachable and no analysis has been run yet.
    pub fn demo() -> Self {
        AnalysisRecord {
            analysis_id: "demo-12345".to_string(),
            class_label: DrGrade::Mild,
            severity_index: 35,
            confidence_percentage: 87,
            explanation: "The model has classified this image as showing mild diabetic \
                          retinopathy. There are a few microaneurysms visible in the peripheral \
                          retina, but no significant hemorrhages or exudates. The optic disc and \
                          macula appear normal. This stage requires monitoring but no immediate \
                          intervention."
                .to_string(),
            clinical_summary: DrGrade::Mild.clinical_summary(),
            suggested_questions_with_answers: vec![
                SuggestedQa {
                    question: "What lifestyle changes would be most effective?".to_string(),
                    answer: "Based on the mild diabetic retinopathy diagnosis, the most effective \
                             lifestyle changes include strict glycemic control, maintaining blood \
                             pressure within target range, regular physical activity, and a \
                             balanced diet low in refined carbohydrates."
                        .to_string(),
                },
                SuggestedQa {
                    question: "Is this condition likely to progress?".to_string(),
                    answer: "Mild diabetic retinopathy can progress to more severe forms if blood \
                             glucose levels are not well controlled. With proper management of \
                             diabetes, progression can be significantly slowed or halted in many \
                             cases."
                        .to_string(),
                },
                SuggestedQa {
                    question: "What follow-up care is recommended?".to_string(),
                    answer: "For mild diabetic retinopathy, annual comprehensive eye examinations \
                             are typically recommended. However, if there are changes in vision \
                             or if diabetes becomes difficult to control, more frequent \
                             examinations may be necessary."
                        .to_string(),
                },
                SuggestedQa {
                    question: "Are there any treatments needed at this stage?".to_string(),
                    answer: "At the mild stage of diabetic retinopathy, specific eye treatments \
                             are usually not required. The primary focus is on optimizing \
                             diabetes management through medication adherence, lifestyle \
                             modifications, and regular monitoring of blood glucose levels."
                        .to_string(),
                },
            ],
            image_url: None,
        }
    }
}
