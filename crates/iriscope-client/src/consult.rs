//! Consultation answer handling: extraction from whatever shape the backend
//! returns, a canned keyword-matched fallback for when it fails, and the
//! truncator that keeps displayed answers short.

use serde_json::Value;

use iriscope_common::grade::DrGrade;

// ── Answer extraction ─────────────────────────────────────────────────────────

/// Fields the backend has been observed to carry the answer in, in
/// preference order.
const ANSWER_POINTERS: &[&str] = &[
    "/consultation",
    "/answer",
    "/response",
    "/consultation_response",
    "/message",
];

/// Minimum length for the last-resort "any long string field" scan.
const SCAN_MIN_LEN: usize = 50;

/// Pull the answer text out of a consultation response, or `None` when the
/// shape is unusable and the caller should fall back to the canned answers.
pub fn extract_answer(payload: &Value) -> Option<String> {
    if let Some(text) = payload.as_str() {
        return Some(text.to_string());
    }

    for pointer in ANSWER_POINTERS {
        if let Some(text) = payload.pointer(pointer).and_then(Value::as_str) {
            return Some(text.to_string());
        }
    }

    // Last resort: any string field long enough to plausibly be the answer.
    payload.as_object()?.values().find_map(|v| {
        v.as_str()
            .filter(|s| s.len() > SCAN_MIN_LEN)
            .map(str::to_string)
    })
}

// ── Fallback rule table ───────────────────────────────────────────────────────

enum RuleAnswer {
    /// Same answer for every grade.
    Fixed(&'static str),
    /// Answer variant selected by the diagnosis grade.
    PerGrade(fn(DrGrade) -> &'static str),
}

struct FallbackRule {
    keywords: &'static [&'static str],
    answer: RuleAnswer,
}

/// Ordered rule table: generic disease questions first, then grade-specific
/// templates. First keyword match wins.
const FALLBACK_RULES: &[FallbackRule] = &[
    FallbackRule {
        keywords: &["what is", "explain", "tell me about", "describe", "definition"],
        answer: RuleAnswer::Fixed(
            "Diabetic retinopathy is an eye condition that can cause vision loss and blindness \
             in people who have diabetes. It affects blood vessels in the retina (the \
             light-sensitive layer at the back of the eye). High blood sugar levels can damage \
             these vessels, causing them to leak fluid or bleed, which distorts vision.",
        ),
    },
    FallbackRule {
        keywords: &["treatment", "how to treat", "therapy", "manage", "medication", "surgery", "laser"],
        answer: RuleAnswer::Fixed(
            "Treatment depends on the severity. For early stages, controlling blood sugar, \
             blood pressure, and cholesterol is often sufficient. More advanced cases may \
             require laser treatment, anti-VEGF injections, or surgery. Regular eye exams are \
             essential for early detection and treatment.",
        ),
    },
    FallbackRule {
        keywords: &["cause", "reason", "why does", "how does it happen", "what leads to"],
        answer: RuleAnswer::Fixed(
            "Diabetic retinopathy is caused by prolonged high blood sugar levels damaging the \
             blood vessels in the retina. Over time, these vessels can weaken, bulge, or leak \
             fluid. In advanced stages, new abnormal blood vessels grow on the retina surface, \
             which can cause serious vision problems.",
        ),
    },
    FallbackRule {
        keywords: &["prevent", "avoid", "stop", "reduce risk", "lower chance"],
        answer: RuleAnswer::Fixed(
            "Prevention focuses on managing diabetes effectively: maintain good blood sugar \
             control, keep blood pressure and cholesterol levels in check, have regular eye \
             exams, exercise regularly, maintain a healthy diet, and avoid smoking and \
             excessive alcohol consumption.",
        ),
    },
    FallbackRule {
        keywords: &["who are you", "what are you", "are you ai", "are you a doctor", "your name", "who is"],
        answer: RuleAnswer::Fixed(
            "I am Iriscope, an AI assistant designed to provide information about diabetic \
             retinopathy based on retinal image analysis. I can help explain your diagnosis, \
             answer questions about diabetic retinopathy, and provide general guidance. \
             However, I'm not a replacement for professional medical advice from your \
             healthcare provider.",
        ),
    },
    FallbackRule {
        keywords: &["what should i do", "next steps", "what now", "treatment plan", "recommendations", "advice", "how to manage"],
        answer: RuleAnswer::PerGrade(next_steps_answer),
    },
    FallbackRule {
        keywords: &["will it get worse", "prognosis", "progression", "future", "outlook", "what to expect", "how bad"],
        answer: RuleAnswer::PerGrade(prognosis_answer),
    },
];

fn next_steps_answer(grade: DrGrade) -> &'static str {
    match grade {
        DrGrade::No => {
            "While no signs of diabetic retinopathy were detected, it's important to continue \
             managing your diabetes well. Maintain good blood sugar control, have regular eye \
             exams (at least annually), and follow a healthy lifestyle with proper diet and \
             exercise."
        }
        DrGrade::Mild => {
            "With mild diabetic retinopathy, focus on optimizing your diabetes management. \
             Maintain strict blood sugar control, keep blood pressure and cholesterol in \
             check, and ensure you have regular eye exams (at least annually). Report any \
             vision changes to your doctor immediately."
        }
        DrGrade::Moderate => {
            "For moderate diabetic retinopathy, more frequent monitoring is recommended \
             (typically every 6 months). Strict control of blood sugar, blood pressure, and \
             cholesterol is crucial. Your doctor may discuss treatment options if there are \
             specific areas of concern in your retina."
        }
        DrGrade::Severe => {
            "Severe diabetic retinopathy requires prompt attention from a retina specialist. \
             Treatment options like laser photocoagulation or anti-VEGF injections may be \
             necessary. Very strict diabetes management is crucial, along with frequent eye \
             examinations (every 3-4 months)."
        }
        DrGrade::Proliferative => {
            "Proliferative diabetic retinopathy requires immediate treatment from a retina \
             specialist. Treatments may include laser surgery, anti-VEGF injections, or \
             vitrectomy. Extremely strict diabetes management is crucial, and you'll need \
             frequent monitoring by your specialist."
        }
        DrGrade::Unknown => {
            "Since the diagnosis is uncertain, I recommend consulting with an ophthalmologist \
             for a comprehensive eye examination. Continue to manage your diabetes carefully \
             with good blood sugar control and follow your doctor's recommendations for \
             regular eye screenings."
        }
    }
}

fn prognosis_answer(grade: DrGrade) -> &'static str {
    match grade {
        DrGrade::No => {
            "Since no diabetic retinopathy was detected, your focus should be on prevention. \
             With good diabetes management, you can significantly reduce the risk of \
             developing retinopathy in the future. Regular monitoring is still important."
        }
        DrGrade::Mild => {
            "Mild diabetic retinopathy can progress if blood sugar levels remain elevated. \
             However, with proper diabetes management, progression can often be slowed or \
             halted. Regular monitoring is essential to catch any changes early."
        }
        DrGrade::Moderate => {
            "Moderate diabetic retinopathy has a higher risk of progression without proper \
             management. Strict diabetes control is essential. Some patients may need \
             treatment such as laser therapy to prevent further damage. Close monitoring by \
             an ophthalmologist is necessary."
        }
        DrGrade::Severe => {
            "Without treatment, severe diabetic retinopathy has a high risk of progressing to \
             vision loss. However, with appropriate treatment and strict diabetes management, \
             further damage can often be limited. Following your specialist's recommendations \
             is essential."
        }
        DrGrade::Proliferative => {
            "Proliferative diabetic retinopathy can lead to severe vision loss or blindness \
             if not treated promptly. With appropriate treatment, the risk of severe vision \
             loss can be reduced by more than 50%. Immediate and ongoing care from a \
             specialist is essential."
        }
        DrGrade::Unknown => {
            "Without a clear diagnosis, it's difficult to predict progression. The best \
             approach is to maintain optimal diabetes management and schedule a comprehensive \
             eye examination with an ophthalmologist to get a definitive diagnosis and \
             appropriate follow-up plan."
        }
    }
}

/// Best-effort canned answer for when the remote consultation call fails or
/// returns an unusable shape. Pure function of (grade, question) and the
/// static tables above.
pub fn fallback_answer(grade: DrGrade, question: &str) -> String {
    let normalized = question.trim().to_lowercase();

    for rule in FALLBACK_RULES {
        if rule.keywords.iter().any(|k| normalized.contains(k)) {
            return match rule.answer {
                RuleAnswer::Fixed(text) => text.to_string(),
                RuleAnswer::PerGrade(select) => select(grade).to_string(),
            };
        }
    }

    format!(
        "Based on the {} diabetic retinopathy diagnosis, I recommend discussing your \
         specific question with your healthcare provider. They can provide personalized \
         advice based on your complete medical history and current condition.",
        grade.as_str().to_lowercase()
    )
}

// ── Truncation ────────────────────────────────────────────────────────────────

/// Length below which answers are displayed untouched.
const TRUNCATE_THRESHOLD: usize = 200;

/// Split on sentence-terminal punctuation followed by whitespace. The
/// terminator stays with its sentence; runs of terminators ("...") are kept
/// together.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut rest = text;

    loop {
        let mut split_at = None;
        let mut after_terminal = false;
        for (i, ch) in rest.char_indices() {
            if after_terminal && ch.is_whitespace() {
                split_at = Some(i);
                break;
            }
            after_terminal = matches!(ch, '.' | '!' | '?');
        }
        match split_at {
            Some(i) => {
                sentences.push(rest[..i].trim_end());
                rest = rest[i..].trim_start();
                if rest.is_empty() {
                    break;
                }
            }
            None => {
                if !rest.is_empty() {
                    sentences.push(rest);
                }
                break;
            }
        }
    }
    sentences
}

/// Shorten a verbose generated answer for display: keep the first three
/// sentences (four if three land under 100 characters) and mark the cut.
pub fn truncate_response(response: &str) -> String {
    if response.len() < TRUNCATE_THRESHOLD {
        return response.to_string();
    }

    let sentences = split_sentences(response);
    if sentences.len() <= 3 {
        return response.to_string();
    }

    let mut short = sentences[..3].join(" ");
    if short.len() < 100 && sentences.len() > 3 {
        short = sentences[..4].join(" ");
    }
    format!("{}...", short)
}
