//! Report analysis client: one image in, one validated `AnalysisResult` out.
//!
//! The hosted model sits behind `GenerativeClient` (transport) and the whole
//! operation behind `ReportAnalyzer`, so both can be replaced by fakes.

pub mod analyzer;
pub mod gemini;
pub mod gemini_types;
pub mod parser;
pub mod prompt;
pub mod types;

pub use analyzer::*;
pub use gemini::*;
pub use gemini_types::*;
pub use parser::*;
pub use prompt::*;
pub use types::*;

use serde::Serialize;
use thiserror::Error;

use crate::models::ImageError;

/// Message shown to the user for any failed analysis.
pub const RETRY_MESSAGE: &str =
    "Failed to analyze report. Please try again. Ensure the image is clear.";

/// Message shown when the service credential is not configured.
pub const CONFIGURATION_MESSAGE: &str =
    "Report analysis is not configured. Set API_KEY and restart HealthMate.";

/// Broad failure class, used by callers to pick user-facing handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Setup problem; retrying will not help until configuration changes.
    Configuration,
    /// The analysis attempt failed; the user may retry.
    Analysis,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Analysis => write!(f, "analysis"),
        }
    }
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("API key is missing — set API_KEY to enable report analysis")]
    MissingCredential,

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Could not reach the analysis service: {0}")]
    Network(String),

    #[error("Analysis request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Analysis service returned an error (HTTP {status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Analysis was blocked by the service: {0}")]
    Blocked(String),

    #[error("Analysis service returned an empty reply")]
    EmptyResponse,

    #[error("Malformed service response: {0}")]
    MalformedResponse(String),

    #[error("Reply is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Reply is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Reply field '{field}' must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Invalid image: {0}")]
    Image(#[from] ImageError),
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential | Self::HttpClient(_) => ErrorKind::Configuration,
            _ => ErrorKind::Analysis,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    /// Single message for the user; details stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Configuration => CONFIGURATION_MESSAGE,
            ErrorKind::Analysis => RETRY_MESSAGE,
        }
    }
}
