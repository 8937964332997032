//! In-memory application state for one session.
//!
//! `HealthSession` owns the report and vitals collections, the selected
//! report and the active view. Nothing is persisted. Uses `RwLock` so the UI
//! thread can read while an analysis worker records its outcome.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::chart::{chart_points, ChartPoint};
use crate::models::{
    AnalysisResult, AppView, ImagePayload, InvalidTransition, MedicalReport, VitalReading,
    VitalType,
};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Internal lock error")]
    LockPoisoned,

    #[error("Report not found: {0}")]
    ReportNotFound(Uuid),

    #[error("Please enter a value for the reading")]
    EmptyVitalValue,

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}

pub struct HealthSession {
    view: RwLock<AppView>,
    /// Newest first.
    reports: RwLock<Vec<MedicalReport>>,
    /// Insertion order.
    vitals: RwLock<Vec<VitalReading>>,
    selected: RwLock<Option<Uuid>>,
}

impl Default for HealthSession {
    fn default() -> Self {
        Self::new()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, SessionError> {
    lock.read().map_err(|_| SessionError::LockPoisoned)
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, SessionError> {
    lock.write().map_err(|_| SessionError::LockPoisoned)
}

impl HealthSession {
    pub fn new() -> Self {
        Self {
            view: RwLock::new(AppView::Dashboard),
            reports: RwLock::new(Vec::new()),
            vitals: RwLock::new(Vec::new()),
            selected: RwLock::new(None),
        }
    }

    /// Session pre-filled with demo readings so the dashboard chart is not
    /// empty on first launch.
    pub fn with_sample_vitals() -> Self {
        let samples = [
            (VitalType::BloodPressure, (2023, 10, 1), "120/80"),
            (VitalType::Sugar, (2023, 10, 5), "95"),
            (VitalType::BloodPressure, (2023, 10, 10), "130/85"),
            (VitalType::Sugar, (2023, 10, 12), "110"),
        ];
        let vitals = samples
            .into_iter()
            .filter_map(|(vt, (y, m, d), value)| {
                NaiveDate::from_ymd_opt(y, m, d).map(|date| VitalReading::new(vt, date, value))
            })
            .collect();

        Self {
            vitals: RwLock::new(vitals),
            ..Self::new()
        }
    }

    // ── View ────────────────────────────────────────────────

    pub fn current_view(&self) -> Result<AppView, SessionError> {
        Ok(*read(&self.view)?)
    }

    pub fn set_view(&self, view: AppView) -> Result<(), SessionError> {
        *write(&self.view)? = view;
        tracing::debug!(view = %view, "View changed");
        Ok(())
    }

    // ── Vitals ──────────────────────────────────────────────

    /// Record a reading. Blank values are rejected.
    pub fn add_vital(
        &self,
        vital_type: VitalType,
        date: NaiveDate,
        value: &str,
    ) -> Result<VitalReading, SessionError> {
        if value.trim().is_empty() {
            return Err(SessionError::EmptyVitalValue);
        }
        let reading = VitalReading::new(vital_type, date, value);
        write(&self.vitals)?.push(reading.clone());
        tracing::info!(vital_type = %vital_type, "Vital reading recorded");
        Ok(reading)
    }

    /// All readings in the order they were logged.
    pub fn vitals(&self) -> Result<Vec<VitalReading>, SessionError> {
        Ok(read(&self.vitals)?.clone())
    }

    /// Readings for the history table: newest date first, ties in logged order.
    pub fn vitals_history(&self) -> Result<Vec<VitalReading>, SessionError> {
        let mut history = self.vitals()?;
        history.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(history)
    }

    pub fn chart_points(&self) -> Result<Vec<ChartPoint>, SessionError> {
        Ok(chart_points(&read(&self.vitals)?))
    }

    // ── Reports ─────────────────────────────────────────────

    /// Create a report for a new upload, already in `Analyzing`.
    pub fn begin_report(&self, title: &str, image: ImagePayload) -> Result<Uuid, SessionError> {
        let today = chrono::Local::now().date_naive();
        let mut report = MedicalReport::new(title, today, image);
        report.start_analysis()?;
        let id = report.id;
        write(&self.reports)?.insert(0, report);
        tracing::info!(report_id = %id, "Report upload started");
        Ok(id)
    }

    /// Move a failed report back to `Analyzing`; returns its image for the
    /// new attempt.
    pub fn retry_report(&self, id: Uuid) -> Result<ImagePayload, SessionError> {
        self.with_report_mut(id, |report| {
            report.start_analysis()?;
            Ok(report.image.clone())
        })
    }

    /// Attach a result, then select the report and show its detail view.
    pub fn complete_report(&self, id: Uuid, result: AnalysisResult) -> Result<(), SessionError> {
        self.with_report_mut(id, |report| Ok(report.complete(result)?))?;
        tracing::info!(report_id = %id, "Report analysis stored");
        self.select_report(id)
    }

    pub fn fail_report(&self, id: Uuid) -> Result<(), SessionError> {
        self.with_report_mut(id, |report| Ok(report.fail()?))?;
        tracing::info!(report_id = %id, "Report marked failed");
        Ok(())
    }

    pub fn report(&self, id: Uuid) -> Result<MedicalReport, SessionError> {
        read(&self.reports)?
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(SessionError::ReportNotFound(id))
    }

    /// All reports, newest first.
    pub fn reports(&self) -> Result<Vec<MedicalReport>, SessionError> {
        Ok(read(&self.reports)?.clone())
    }

    pub fn select_report(&self, id: Uuid) -> Result<(), SessionError> {
        if !read(&self.reports)?.iter().any(|r| r.id == id) {
            return Err(SessionError::ReportNotFound(id));
        }
        *write(&self.selected)? = Some(id);
        self.set_view(AppView::ReportDetail)
    }

    pub fn selected_report(&self) -> Result<Option<MedicalReport>, SessionError> {
        let selected = *read(&self.selected)?;
        match selected {
            Some(id) => self.report(id).map(Some),
            None => Ok(None),
        }
    }

    fn with_report_mut<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut MedicalReport) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let mut reports = write(&self.reports)?;
        let report = reports
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(SessionError::ReportNotFound(id))?;
        f(report)
    }
}
