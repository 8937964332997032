use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::analysis::AnalysisResult;
use super::enums::ReportStatus;
use super::image::ImagePayload;

/// Title used when the user leaves the title blank.
pub const DEFAULT_REPORT_TITLE: &str = "Medical Report";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Report cannot move from {from} to {to}")]
pub struct InvalidTransition {
    pub from: ReportStatus,
    pub to: ReportStatus,
}

/// An uploaded report image with its processing state.
///
/// Status and analysis are private so the only way to reach `Completed` is
/// `complete()` with a result, and every other status carries none.
#[derive(Debug, Clone, Serialize)]
pub struct MedicalReport {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    #[serde(skip)]
    pub image: ImagePayload,
    status: ReportStatus,
    analysis: Option<AnalysisResult>,
}

impl MedicalReport {
    /// New report in `Pending`.
    pub fn new(title: &str, date: NaiveDate, image: ImagePayload) -> Self {
        let title = title.trim();
        Self {
            id: Uuid::new_v4(),
            title: if title.is_empty() {
                DEFAULT_REPORT_TITLE.to_string()
            } else {
                title.to_string()
            },
            date,
            image,
            status: ReportStatus::Pending,
            analysis: None,
        }
    }

    pub fn status(&self) -> ReportStatus {
        self.status
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    /// Pending/Failed → Analyzing. Failed reports may be re-analyzed.
    pub fn start_analysis(&mut self) -> Result<(), InvalidTransition> {
        match self.status {
            ReportStatus::Pending | ReportStatus::Failed => {
                self.status = ReportStatus::Analyzing;
                Ok(())
            }
            from => Err(InvalidTransition {
                from,
                to: ReportStatus::Analyzing,
            }),
        }
    }

    /// Analyzing → Completed, attaching the result.
    pub fn complete(&mut self, result: AnalysisResult) -> Result<(), InvalidTransition> {
        if self.status != ReportStatus::Analyzing {
            return Err(InvalidTransition {
                from: self.status,
                to: ReportStatus::Completed,
            });
        }
        self.status = ReportStatus::Completed;
        self.analysis = Some(result);
        Ok(())
    }

    /// Analyzing → Failed.
    pub fn fail(&mut self) -> Result<(), InvalidTransition> {
        if self.status != ReportStatus::Analyzing {
            return Err(InvalidTransition {
                from: self.status,
                to: ReportStatus::Failed,
            });
        }
        self.status = ReportStatus::Failed;
        self.analysis = None;
        Ok(())
    }

    /// Image as a data URI for the detail view.
    pub fn preview_uri(&self) -> String {
        self.image.to_data_uri()
    }
}
