use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

/// Events emitted by the [`super::DetectionTaskRunner`].
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionEvent {
    JobSubmitted { generation: u64, rows: usize, columns: usize },
    JobStarted { generation: u64 },
    JobCompleted { generation: u64, columns: usize, elapsed: Duration },
    JobFailed { generation: u64, message: String },
    /// A job finished after a newer one was submitted; its result was dropped.
    StaleResultDiscarded { generation: u64, latest: u64 },
    /// No background executor was available; the job ran on the calling thread.
    FellBackToSync { generation: u64, reason: String },
}

/// Observer hook for detection events.
pub trait DetectionObserver: Send + Sync {
    fn on_event(&self, event: &DetectionEvent);
}

/// Forwards detection events to `tracing`.
#[derive(Debug, Default)]
pub struct TracingDetectionObserver;

impl DetectionObserver for TracingDetectionObserver {
    fn on_event(&self, event: &DetectionEvent) {
        match event {
            DetectionEvent::JobSubmitted { generation, rows, columns } => {
                debug!(generation, rows, columns, "detection job submitted")
            }
            DetectionEvent::JobStarted { generation } => {
                debug!(generation, "detection job started")
            }
            DetectionEvent::JobCompleted { generation, columns, elapsed } => {
                info!(
                    generation,
                    columns,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "detection job completed"
                )
            }
            DetectionEvent::JobFailed { generation, message } => {
                warn!(generation, %message, "detection job failed")
            }
            DetectionEvent::StaleResultDiscarded { generation, latest } => {
                debug!(generation, latest, "stale detection result discarded")
            }
            DetectionEvent::FellBackToSync { generation, reason } => {
                warn!(generation, %reason, "running detection synchronously")
            }
        }
    }
}

/// Running counters for a [`super::DetectionTaskRunner`].
///
/// The runner updates these as jobs progress; callers can snapshot them at any time.
pub struct DetectionMetrics {
    jobs_submitted: AtomicU64,
    jobs_completed: AtomicU64,
    jobs_failed: AtomicU64,
    stale_discarded: AtomicU64,
    sync_fallbacks: AtomicU64,
    last_elapsed: Mutex<Option<Duration>>,
}

impl DetectionMetrics {
    pub fn new() -> Self {
        Self {
            jobs_submitted: AtomicU64::new(0),
            jobs_completed: AtomicU64::new(0),
            jobs_failed: AtomicU64::new(0),
            stale_discarded: AtomicU64::new(0),
            sync_fallbacks: AtomicU64::new(0),
            last_elapsed: Mutex::new(None),
        }
    }

    pub fn on_submitted(&self) {
        let _ = self.jobs_submitted.fetch_add(1, Ordering::SeqCst);
    }

    pub fn on_completed(&self, elapsed: Duration) {
        let _ = self.jobs_completed.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_elapsed.lock() {
            *last = Some(elapsed);
        }
    }

    pub fn on_failed(&self) {
        let _ = self.jobs_failed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn on_stale_discarded(&self) {
        let _ = self.stale_discarded.fetch_add(1, Ordering::SeqCst);
    }

    pub fn on_sync_fallback(&self) {
        let _ = self.sync_fallbacks.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> DetectionMetricsSnapshot {
        DetectionMetricsSnapshot {
            jobs_submitted: self.jobs_submitted.load(Ordering::SeqCst),
            jobs_completed: self.jobs_completed.load(Ordering::SeqCst),
            jobs_failed: self.jobs_failed.load(Ordering::SeqCst),
            stale_discarded: self.stale_discarded.load(Ordering::SeqCst),
            sync_fallbacks: self.sync_fallbacks.load(Ordering::SeqCst),
            last_elapsed: self.last_elapsed.lock().ok().and_then(|g| *g),
        }
    }
}

impl Default for DetectionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of [`DetectionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionMetricsSnapshot {
    pub jobs_submitted: u64,
    pub jobs_completed: u64,
    pub jobs_failed: u64,
    pub stale_discarded: u64,
    pub sync_fallbacks: u64,
    pub last_elapsed: Option<Duration>,
}

impl fmt::Display for DetectionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "submitted={}, completed={}, failed={}, stale_discarded={}, sync_fallbacks={}, last_elapsed={:?}",
            self.jobs_submitted,
            self.jobs_completed,
            self.jobs_failed,
            self.stale_discarded,
            self.sync_fallbacks,
            self.last_elapsed
        )
    }
}
