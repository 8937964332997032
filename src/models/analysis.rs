use serde::{Deserialize, Serialize};

/// Structured, bilingual explanation of one medical report image.
///
/// Every field is always present; lists and strings may be empty when the
/// model has nothing to report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Concise English summary of the key findings.
    pub summary_en: String,
    /// The same summary in Roman Urdu.
    pub summary_ur: String,
    pub abnormalities: Vec<String>,
    pub doctor_questions: Vec<String>,
    pub diet_advice: String,
    pub home_remedies: String,
    pub disclaimer: String,
}
