use super::gemini_types::GenerateContentRequest;
use super::AnalysisError;
use crate::models::{AnalysisResult, ImagePayload};

/// Turns one report image into one validated analysis.
///
/// The only seam the UI shell depends on; tests swap in `MockReportAnalyzer`.
pub trait ReportAnalyzer: Send + Sync {
    fn analyze(&self, image: &ImagePayload) -> Result<AnalysisResult, AnalysisError>;
}

/// Hosted model transport (allows mocking).
///
/// Returns the raw reply text; validation happens in the caller.
pub trait GenerativeClient: Send + Sync {
    fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<String, AnalysisError>;
}
