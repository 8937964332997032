//! Busy flag for report analysis.
//!
//! Only one analysis may be outstanding at a time; a second submission while
//! one is running is rejected rather than queued. The guard returned by
//! `try_acquire()` must be held for the whole call.
//!
//! A panic while the guard is held poisons the lock. The lock protects no
//! data, so poisoning is cleared and the gate stays usable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use serde::Serialize;

/// Snapshot of the analysis currently running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveAnalysis {
    /// Title of the report being analyzed.
    pub title: String,
    /// When the analysis started (RFC 3339).
    pub started_at: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("An analysis is already running — wait for it to finish")]
    Busy,
}

pub struct AnalysisGate {
    lock: Mutex<()>,
    busy: AtomicBool,
    current: Mutex<Option<ActiveAnalysis>>,
}

/// RAII guard. Dropping it releases the gate and clears the current analysis.
pub struct AnalysisGuard<'a> {
    _guard: MutexGuard<'a, ()>,
    gate: &'a AnalysisGate,
}

impl Drop for AnalysisGuard<'_> {
    fn drop(&mut self) {
        *self
            .gate
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
        self.gate.busy.store(false, Ordering::Release);
    }
}

impl Default for AnalysisGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisGate {
    pub fn new() -> Self {
        Self {
            lock: Mutex::new(()),
            busy: AtomicBool::new(false),
            current: Mutex::new(None),
        }
    }

    /// Claim the gate without blocking.
    pub fn try_acquire(&self, title: &str) -> Result<AnalysisGuard<'_>, GateError> {
        let guard = match self.lock.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(GateError::Busy),
            Err(TryLockError::Poisoned(poisoned)) => {
                tracing::warn!("Analysis gate recovered after a panicked analysis");
                self.lock.clear_poison();
                poisoned.into_inner()
            }
        };
        self.busy.store(true, Ordering::Release);
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(ActiveAnalysis {
            title: title.to_string(),
            started_at: chrono::Utc::now().to_rfc3339(),
        });
        Ok(AnalysisGuard {
            _guard: guard,
            gate: self,
        })
    }

    /// What is running, if anything.
    pub fn current_analysis(&self) -> Option<ActiveAnalysis> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drives the "analyzing…" spinner and disables the analyze button.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}
