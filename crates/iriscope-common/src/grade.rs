//! Diabetic-retinopathy grading scale and the static clinical lookup table.

use serde::{Deserialize, Serialize};

use crate::record::ClinicalSummary;

/// The five DR stages reported by the inference service, plus Unknown for
/// anything the backend sends that we cannot place on the scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrGrade {
    No,
    Mild,
    Moderate,
    Severe,
    Proliferative,
    Unknown,
}

impl DrGrade {
    /// Parse a backend-supplied class label. Unrecognized labels become
    /// `Unknown` rather than an error; the normalizer may still repair them
    /// from the severity index.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "No" => DrGrade::No,
            "Mild" => DrGrade::Mild,
            "Moderate" => DrGrade::Moderate,
            "Severe" => DrGrade::Severe,
            "Proliferative" => DrGrade::Proliferative,
            _ => DrGrade::Unknown,
        }
    }

    /// Reclassify from the 0-100 severity index.
    /// Bands: <20 No, <40 Mild, <60 Moderate, <80 Severe, else Proliferative.
    pub fn from_severity_index(severity: u8) -> Self {
        match severity {
            0..=19 => DrGrade::No,
            20..=39 => DrGrade::Mild,
            40..=59 => DrGrade::Moderate,
            60..=79 => DrGrade::Severe,
            _ => DrGrade::Proliferative,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DrGrade::No => "No",
            DrGrade::Mild => "Mild",
            DrGrade::Moderate => "Moderate",
            DrGrade::Severe => "Severe",
            DrGrade::Proliferative => "Proliferative",
            DrGrade::Unknown => "Unknown",
        }
    }

    /// True for the five stages the model can actually emit.
    pub fn is_known(&self) -> bool {
        !matches!(self, DrGrade::Unknown)
    }

    /// Predefined clinical assessment for this grade, used whenever the
    /// backend does not supply (all of) its own clinical summary.
    pub fn clinical_summary(&self) -> ClinicalSummary {
        let (observed, risks, lifestyle, followup) = match self {
            DrGrade::No => (
                "No visible signs of diabetic retinopathy detected",
                "Low risk of vision loss, but regular monitoring is essential due to diabetes",
                "Maintain good glycemic control, regular exercise, balanced diet, and blood pressure management",
                "Annual eye examination",
            ),
            DrGrade::Mild => (
                "Few microaneurysms visible in peripheral retina",
                "Low risk of vision loss if blood glucose is controlled",
                "Maintain good glycemic control, regular exercise, balanced diet, and blood pressure management",
                "Annual eye examination",
            ),
            DrGrade::Moderate => (
                "Multiple microaneurysms, dot and blot hemorrhages, hard exudates",
                "Moderate risk of vision loss; risk increases with poor glycemic control",
                "Strict glycemic control, blood pressure management, regular exercise, low-salt and low-sugar diet",
                "Follow-up examination in 6 months",
            ),
            DrGrade::Severe => (
                "Extensive microaneurysms, hemorrhages, venous beading, intraretinal microvascular abnormalities (IRMA)",
                "High risk of vision loss; significant risk of progression to proliferative stage",
                "Strict glycemic control, blood pressure management, cholesterol management, smoking cessation",
                "Follow-up examination in 3-4 months; may require referral to retina specialist",
            ),
            DrGrade::Proliferative => (
                "Neovascularization, vitreous hemorrhage, preretinal hemorrhage, fibrovascular proliferation",
                "Very high risk of severe vision loss or blindness without treatment",
                "Strict glycemic control, blood pressure management, immediate medical attention for any vision changes",
                "Immediate referral to retina specialist for laser treatment or other interventions",
            ),
            DrGrade::Unknown => (
                "Assessment could not be completed with confidence",
                "Unknown - proper evaluation by an ophthalmologist is required",
                "Continue diabetes management as directed by your healthcare provider",
                "Consult with an ophthalmologist for comprehensive evaluation",
            ),
        };
        ClinicalSummary {
            observed_abnormalities: observed.to_string(),
            risks: risks.to_string(),
            lifestyle_notes: lifestyle.to_string(),
            recommended_followup: followup.to_string(),
        }
    }
}

impl std::fmt::Display for DrGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_labels() {
        assert_eq!(DrGrade::from_label("Mild"), DrGrade::Mild);
        assert_eq!(DrGrade::from_label(" Proliferative "), DrGrade::Proliferative);
    }

    #[test]
    fn unrecognized_labels_are_unknown() {
        assert_eq!(DrGrade::from_label("mild"), DrGrade::Unknown);
        assert_eq!(DrGrade::from_label("stage 2"), DrGrade::Unknown);
        assert_eq!(DrGrade::from_label(""), DrGrade::Unknown);
    }

    #[test]
    fn severity_bands() {
        assert_eq!(DrGrade::from_severity_index(0), DrGrade::No);
        assert_eq!(DrGrade::from_severity_index(19), DrGrade::No);
        assert_eq!(DrGrade::from_severity_index(20), DrGrade::Mild);
        assert_eq!(DrGrade::from_severity_index(45), DrGrade::Moderate);
        assert_eq!(DrGrade::from_severity_index(79), DrGrade::Severe);
        assert_eq!(DrGrade::from_severity_index(80), DrGrade::Proliferative);
        assert_eq!(DrGrade::from_severity_index(100), DrGrade::Proliferative);
    }

    #[test]
    fn serializes_as_plain_label() {
        let json = serde_json::to_string(&DrGrade::Severe).unwrap();
        assert_eq!(json, "\"Severe\"");
    }

    #[test]
    fn clinical_table_differs_per_grade() {
        let mild = DrGrade::Mild.clinical_summary();
        let severe = DrGrade::Severe.clinical_summary();
        assert_ne!(mild.observed_abnormalities, severe.observed_abnormalities);
        assert_eq!(mild.recommended_followup, "Annual eye examination");
    }
}
