use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::gemini_types::{GenerateContentRequest, GenerateContentResponse};
use super::types::GenerativeClient;
use super::AnalysisError;

/// Longest error body kept from a failed HTTP response.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Blocking HTTP client for the hosted Gemini API.
pub struct GeminiClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    /// Create a client for `base_url` with a whole-request timeout.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, AnalysisError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .build()
            .map_err(|e| AnalysisError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    /// Endpoint for `model`; accepts both `gemini-x` and `models/gemini-x`.
    pub fn endpoint(&self, model: &str) -> String {
        let model = model.trim().trim_start_matches("models/");
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}

impl GenerativeClient for GeminiClient {
    fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<String, AnalysisError> {
        let url = self.endpoint(model);

        // Key travels in a header so it never shows up in URLs or error text.
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    AnalysisError::Network(format!("cannot connect to {}", self.base_url))
                } else {
                    AnalysisError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response
                .text()
                .unwrap_or_default()
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect();
            return Err(AnalysisError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                AnalysisError::Timeout(self.timeout_secs)
            } else {
                AnalysisError::MalformedResponse(e.to_string())
            }
        })?;

        parsed.into_text()
    }
}

/// What `MockGenerativeClient` does when called.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    NetworkFailure(String),
    Timeout(u64),
    HttpStatus(u16),
}

/// Mock transport for testing: fixed reply, call counting, request capture.
pub struct MockGenerativeClient {
    reply: MockReply,
    calls: AtomicUsize,
    last_request: Mutex<Option<(String, String, GenerateContentRequest)>>,
}

impl MockGenerativeClient {
    pub fn new(reply_text: &str) -> Self {
        Self::with_reply(MockReply::Text(reply_text.to_string()))
    }

    pub fn with_reply(reply: MockReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Number of times `generate_content` was invoked.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(api_key, model, request)` of the most recent call.
    pub fn last_request(&self) -> Option<(String, String, GenerateContentRequest)> {
        self.last_request.lock().ok()?.clone()
    }
}

impl GenerativeClient for MockGenerativeClient {
    fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<String, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some((api_key.to_string(), model.to_string(), request.clone()));
        }
        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::NetworkFailure(msg) => Err(AnalysisError::Network(msg.clone())),
            MockReply::Timeout(secs) => Err(AnalysisError::Timeout(*secs)),
            MockReply::HttpStatus(status) => Err(AnalysisError::ApiError {
                status: *status,
                body: String::new(),
            }),
        }
    }
}
