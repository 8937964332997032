use std::sync::{Arc, Mutex};

use super::gemini::GeminiClient;
use super::gemini_types::{Content, GenerateContentRequest, GenerationConfig, Part};
use super::parser::parse_analysis_reply;
use super::prompt::{response_schema, ANALYSIS_PROMPT, RESPONSE_MIME_TYPE, SYSTEM_INSTRUCTION};
use super::types::{GenerativeClient, ReportAnalyzer};
use super::AnalysisError;
use crate::config::AnalysisConfig;
use crate::models::{AnalysisResult, ImagePayload};

/// Build the multimodal request for one report image.
///
/// Image part first, then the instruction, with the structured-output
/// schema and persona attached.
pub fn build_request(image: &ImagePayload) -> GenerateContentRequest {
    GenerateContentRequest {
        system_instruction: Some(Content {
            role: None,
            parts: vec![Part::text(SYSTEM_INSTRUCTION)],
        }),
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![
                Part::inline_data(image.media_type.clone(), image.to_base64()),
                Part::text(ANALYSIS_PROMPT),
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: RESPONSE_MIME_TYPE.to_string(),
            response_schema: response_schema(),
        },
    }
}

/// Production analyzer: credential check, request, transport, validation.
///
/// Stateless between calls; one attempt per `analyze`.
pub struct GeminiReportAnalyzer {
    config: AnalysisConfig,
    client: Arc<dyn GenerativeClient>,
}

impl GeminiReportAnalyzer {
    pub fn new(config: AnalysisConfig, client: Arc<dyn GenerativeClient>) -> Self {
        Self { config, client }
    }

    /// Analyzer backed by a real `GeminiClient` for `config`.
    pub fn from_config(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        let client = GeminiClient::new(&config.base_url, config.timeout_secs)?;
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Analyzer configured from the process environment.
    pub fn from_env() -> Result<Self, AnalysisError> {
        Self::from_config(AnalysisConfig::from_env())
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn is_configured(&self) -> bool {
        self.config.credential().is_some()
    }

    fn run(&self, image: &ImagePayload) -> Result<AnalysisResult, AnalysisError> {
        let api_key = self
            .config
            .credential()
            .ok_or(AnalysisError::MissingCredential)?;
        image.validate()?;

        let request = build_request(image);
        let reply = self
            .client
            .generate_content(api_key, &self.config.model, &request)?;
        parse_analysis_reply(&reply)
    }
}

impl ReportAnalyzer for GeminiReportAnalyzer {
    fn analyze(&self, image: &ImagePayload) -> Result<AnalysisResult, AnalysisError> {
        let _span = tracing::info_span!(
            "report_analysis",
            model = %self.config.model,
            image_size = image.len(),
            media_type = %image.media_type,
        )
        .entered();
        let start = std::time::Instant::now();

        let outcome = self.run(image);

        match &outcome {
            Ok(result) => tracing::info!(
                elapsed_ms = %start.elapsed().as_millis(),
                abnormalities = result.abnormalities.len(),
                doctor_questions = result.doctor_questions.len(),
                "Report analysis complete"
            ),
            Err(e) => tracing::warn!(
                elapsed_ms = %start.elapsed().as_millis(),
                kind = %e.kind(),
                error = %e,
                "Report analysis failed"
            ),
        }
        outcome
    }
}

/// Mock analyzer for testing — returns a configured result or error.
pub struct MockReportAnalyzer {
    outcome: Mutex<Option<Result<AnalysisResult, AnalysisError>>>,
    fallback: Option<AnalysisResult>,
}

impl MockReportAnalyzer {
    /// Always succeeds with `result`.
    pub fn succeeding(result: AnalysisResult) -> Self {
        Self {
            outcome: Mutex::new(None),
            fallback: Some(result),
        }
    }

    /// Fails once with `error`, then behaves like `fallback` (or fails
    /// with an empty reply when there is none).
    pub fn failing_once(error: AnalysisError, fallback: Option<AnalysisResult>) -> Self {
        Self {
            outcome: Mutex::new(Some(Err(error))),
            fallback,
        }
    }
}

impl ReportAnalyzer for MockReportAnalyzer {
    fn analyze(&self, _image: &ImagePayload) -> Result<AnalysisResult, AnalysisError> {
        if let Some(next) = self.outcome.lock().ok().and_then(|mut o| o.take()) {
            return next;
        }
        self.fallback.clone().ok_or(AnalysisError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::gemini::{MockGenerativeClient, MockReply};
    use crate::analysis::ErrorKind;

    const SAMPLE_REPLY: &str = r#"{"summary_en":"Normal results","summary_ur":"Aapki report normal hai","abnormalities":[],"doctor_questions":["Kya mujhe dobara test karana chahiye?"],"diet_advice":"Balanced diet lein","home_remedies":"Paani zyada piyen","disclaimer":"Yeh AI hai, doctor ka mashwara zaroor lein"}"#;

    fn img() -> ImagePayload {
        ImagePayload::new(b"IMG".to_vec(), "image/png")
    }

    fn configured() -> AnalysisConfig {
        AnalysisConfig::default().with_api_key("test-key")
    }

    fn analyzer_with(
        config: AnalysisConfig,
        reply: MockReply,
    ) -> (GeminiReportAnalyzer, Arc<MockGenerativeClient>) {
        let client = Arc::new(MockGenerativeClient::with_reply(reply));
        (GeminiReportAnalyzer::new(config, client.clone()), client)
    }

    #[test]
    fn end_to_end_returns_exact_values() {
        let (analyzer, client) =
            analyzer_with(configured(), MockReply::Text(SAMPLE_REPLY.to_string()));
        let result = analyzer.analyze(&img()).unwrap();

        assert_eq!(
            result,
            AnalysisResult {
                summary_en: "Normal results".into(),
                summary_ur: "Aapki report normal hai".into(),
                abnormalities: vec![],
                doctor_questions: vec!["Kya mujhe dobara test karana chahiye?".into()],
                diet_advice: "Balanced diet lein".into(),
                home_remedies: "Paani zyada piyen".into(),
                disclaimer: "Yeh AI hai, doctor ka mashwara zaroor lein".into(),
            }
        );
        assert_eq!(client.call_count(), 1);
    }

    #[test]
    fn missing_credential_fails_without_network_call() {
        let (analyzer, client) =
            analyzer_with(AnalysisConfig::default(), MockReply::Text(SAMPLE_REPLY.into()));
        assert!(!analyzer.is_configured());

        let err = analyzer.analyze(&img()).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingCredential));
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn credential_check_precedes_image_validation() {
        let (analyzer, client) =
            analyzer_with(AnalysisConfig::default(), MockReply::Text(SAMPLE_REPLY.into()));
        let err = analyzer
            .analyze(&ImagePayload::new(Vec::new(), "image/png"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn configuration_error_is_distinct_from_analysis_error() {
        let (unconfigured, _) =
            analyzer_with(AnalysisConfig::default(), MockReply::Text("not json".into()));
        let (configured, _) = analyzer_with(configured(), MockReply::Text("not json".into()));

        let config_err = unconfigured.analyze(&img()).unwrap_err();
        let analysis_err = configured.analyze(&img()).unwrap_err();
        assert_eq!(config_err.kind(), ErrorKind::Configuration);
        assert_eq!(analysis_err.kind(), ErrorKind::Analysis);
        assert_ne!(config_err.user_message(), analysis_err.user_message());
    }

    #[test]
    fn non_json_reply_is_analysis_error() {
        let (analyzer, _) = analyzer_with(
            configured(),
            MockReply::Text("This does not look like a report.".into()),
        );
        let err = analyzer.analyze(&img()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidJson(_)));
        assert_eq!(err.kind(), ErrorKind::Analysis);
    }

    #[test]
    fn reply_without_disclaimer_is_analysis_error() {
        let mut value: serde_json::Value = serde_json::from_str(SAMPLE_REPLY).unwrap();
        value.as_object_mut().unwrap().remove("disclaimer");
        let (analyzer, _) = analyzer_with(configured(), MockReply::Text(value.to_string()));
        let err = analyzer.analyze(&img()).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingField("disclaimer")));
        assert_eq!(err.kind(), ErrorKind::Analysis);
    }

    #[test]
    fn empty_reply_is_analysis_error() {
        let (analyzer, _) = analyzer_with(configured(), MockReply::Text(String::new()));
        let err = analyzer.analyze(&img()).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyResponse));
    }

    #[test]
    fn transport_failures_propagate() {
        let (analyzer, _) = analyzer_with(configured(), MockReply::Timeout(120));
        let err = analyzer.analyze(&img()).unwrap_err();
        assert!(matches!(err, AnalysisError::Timeout(120)));
        assert_eq!(err.kind(), ErrorKind::Analysis);

        let (analyzer, _) =
            analyzer_with(configured(), MockReply::NetworkFailure("reset".into()));
        assert!(matches!(
            analyzer.analyze(&img()),
            Err(AnalysisError::Network(_))
        ));
    }

    #[test]
    fn unsupported_image_is_rejected_before_sending() {
        let (analyzer, client) =
            analyzer_with(configured(), MockReply::Text(SAMPLE_REPLY.into()));
        let err = analyzer
            .analyze(&ImagePayload::new(b"%PDF".to_vec(), "application/pdf"))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Image(_)));
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn sends_credential_model_and_image() {
        let config = configured().with_model("gemini-2.0-flash");
        let (analyzer, client) = analyzer_with(config, MockReply::Text(SAMPLE_REPLY.into()));
        let jpeg = ImagePayload::new(b"JPEG".to_vec(), "image/jpeg");
        analyzer.analyze(&jpeg).unwrap();

        let (key, model, request) = client.last_request().unwrap();
        assert_eq!(key, "test-key");
        assert_eq!(model, "gemini-2.0-flash");
        let blob = request.contents[0].parts[0].inline_data.as_ref().unwrap();
        assert_eq!(blob.mime_type, "image/jpeg");
        assert_eq!(blob.data, jpeg.to_base64());
    }

    #[test]
    fn repeated_calls_each_hit_the_service() {
        let (analyzer, client) =
            analyzer_with(configured(), MockReply::Text(SAMPLE_REPLY.into()));
        for _ in 0..3 {
            let result = analyzer.analyze(&img()).unwrap();
            assert!(!result.disclaimer.is_empty());
        }
        assert_eq!(client.call_count(), 3);
    }

    #[test]
    fn request_shape() {
        let request = build_request(&img());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"].as_array().unwrap().len(), 1);
        assert_eq!(json["contents"][0]["role"], "user");
        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["text"], ANALYSIS_PROMPT);
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], SYSTEM_INSTRUCTION);
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn from_config_builds_real_client() {
        let analyzer = GeminiReportAnalyzer::from_config(configured()).unwrap();
        assert_eq!(analyzer.model(), "gemini-2.5-flash");
        assert!(analyzer.is_configured());
    }

    #[test]
    fn mock_analyzer_fails_once_then_succeeds() {
        let result = parse_analysis_reply(SAMPLE_REPLY).unwrap();
        let mock = MockReportAnalyzer::failing_once(AnalysisError::Timeout(5), Some(result));
        assert!(mock.analyze(&img()).is_err());
        assert!(mock.analyze(&img()).is_ok());
    }
}
