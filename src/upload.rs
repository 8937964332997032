//! Upload → analyze → store workflow behind the "Analyze" button.

use std::sync::Arc;

use uuid::Uuid;

use crate::analysis::{AnalysisError, ReportAnalyzer};
use crate::analysis_gate::{AnalysisGate, GateError};
use crate::models::ImagePayload;
use crate::session::{HealthSession, SessionError};

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// The report was stored as `Failed`; `report_id` can be retried.
    #[error("Analysis of report {report_id} failed: {source}")]
    Analysis {
        report_id: Uuid,
        #[source]
        source: AnalysisError,
    },

    #[error("Analysis task failed: {0}")]
    Task(String),
}

impl UploadError {
    /// Message for the upload screen's error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Analysis { source, .. } => source.user_message().to_string(),
            other => other.to_string(),
        }
    }

    /// Report left in `Failed`, if the failure came from the analysis.
    pub fn failed_report(&self) -> Option<Uuid> {
        match self {
            Self::Analysis { report_id, .. } => Some(*report_id),
            _ => None,
        }
    }
}

/// Create a report for `image`, analyze it, and store the outcome.
///
/// Rejected with `GateError::Busy` while another analysis is running. On
/// success the report is `Completed` and selected; on analysis failure it is
/// `Failed` and the error carries its id.
pub fn analyze_upload(
    session: &HealthSession,
    gate: &AnalysisGate,
    analyzer: &dyn ReportAnalyzer,
    title: &str,
    image: ImagePayload,
) -> Result<Uuid, UploadError> {
    let _guard = gate.try_acquire(title)?;
    let report_id = session.begin_report(title, image.clone())?;
    run_analysis(session, analyzer, report_id, &image)
}

/// Re-run analysis for a `Failed` report.
pub fn retry_upload(
    session: &HealthSession,
    gate: &AnalysisGate,
    analyzer: &dyn ReportAnalyzer,
    report_id: Uuid,
) -> Result<Uuid, UploadError> {
    let title = session.report(report_id)?.title;
    let _guard = gate.try_acquire(&title)?;
    let image = session.retry_report(report_id)?;
    run_analysis(session, analyzer, report_id, &image)
}

/// `analyze_upload` on the blocking thread pool, for async callers.
pub async fn analyze_upload_async(
    session: Arc<HealthSession>,
    gate: Arc<AnalysisGate>,
    analyzer: Arc<dyn ReportAnalyzer>,
    title: String,
    image: ImagePayload,
) -> Result<Uuid, UploadError> {
    tokio::task::spawn_blocking(move || {
        analyze_upload(&session, &gate, analyzer.as_ref(), &title, image)
    })
    .await
    .map_err(|e| UploadError::Task(e.to_string()))?
}

/// Marks the report `Failed` if the analyzer panics, so it stays retryable.
struct FailOnUnwind<'a> {
    session: &'a HealthSession,
    report_id: Uuid,
}

impl Drop for FailOnUnwind<'_> {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            return;
        }
        if let Err(e) = self.session.fail_report(self.report_id) {
            tracing::error!(
                report_id = %self.report_id,
                error = %e,
                "Could not fail report after panic"
            );
        }
    }
}

fn run_analysis(
    session: &HealthSession,
    analyzer: &dyn ReportAnalyzer,
    report_id: Uuid,
    image: &ImagePayload,
) -> Result<Uuid, UploadError> {
    let outcome = {
        let _unwind = FailOnUnwind { session, report_id };
        analyzer.analyze(image)
    };
    match outcome {
        Ok(result) => {
            session.complete_report(report_id, result)?;
            Ok(report_id)
        }
        Err(source) => {
            session.fail_report(report_id)?;
            Err(UploadError::Analysis { report_id, source })
        }
    }
}
