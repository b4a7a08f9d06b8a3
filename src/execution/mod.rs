//! Background execution of type detection.
//!
//! [`DetectionTaskRunner`] moves [`crate::detection::TypeDetector`] work off the calling thread
//! onto a small rayon pool and provides:
//!
//! - job handles ([`DetectionJob`]) and callback-style completion ([`DetectionTaskRunner::submit_with`])
//! - generation tokens: every submission gets a monotonically increasing generation and results
//!   of superseded jobs are reported as [`DetectionOutcome::Stale`] instead of being delivered
//! - synchronous fallback when no background pool could be started
//! - observer hooks and metrics for monitoring
//!
//! There is no explicit cancellation; a superseded job runs to completion and its result is
//! dropped on arrival.

mod observer;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};

use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::detection::{DetectionOptions, TypeDetector};
use crate::error::{FilterError, FilterResult};
use crate::types::{ColumnInfo, DataSet};

pub use observer::{
    DetectionEvent, DetectionMetrics, DetectionMetricsSnapshot, DetectionObserver,
    TracingDetectionObserver,
};

/// Configuration for the [`DetectionTaskRunner`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunnerOptions {
    /// Worker threads in the background pool. Detection parallelizes across columns inside it.
    pub num_threads: usize,
    /// Prefix for worker thread names.
    pub thread_name_prefix: String,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            num_threads: 1,
            thread_name_prefix: "type-detection".to_string(),
        }
    }
}

/// One detection request: the data to scan and how to scan it.
#[derive(Debug, Clone)]
pub struct DetectionRequest {
    pub data: Arc<DataSet>,
    pub options: DetectionOptions,
}

impl DetectionRequest {
    pub fn new(data: impl Into<Arc<DataSet>>, options: DetectionOptions) -> Self {
        Self {
            data: data.into(),
            options,
        }
    }
}

/// Result of a finished detection job.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    /// The job was still the latest submission when it finished.
    Completed {
        generation: u64,
        columns: Vec<ColumnInfo>,
    },
    /// A newer job was submitted before this one finished; the result was discarded.
    Stale { generation: u64, latest: u64 },
}

impl DetectionOutcome {
    /// The detected columns, or `None` for a stale result.
    pub fn into_columns(self) -> Option<Vec<ColumnInfo>> {
        match self {
            DetectionOutcome::Completed { columns, .. } => Some(columns),
            DetectionOutcome::Stale { .. } => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, DetectionOutcome::Stale { .. })
    }
}

type JobMessage = Result<Vec<ColumnInfo>, String>;

/// Observer + metrics handle shared between the runner and its jobs.
#[derive(Clone)]
struct Reporter {
    observer: Option<Arc<dyn DetectionObserver>>,
    metrics: Arc<DetectionMetrics>,
}

impl Reporter {
    fn emit(&self, event: DetectionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

/// Handle to a submitted detection job.
pub struct DetectionJob {
    generation: u64,
    receiver: Receiver<JobMessage>,
    latest: Arc<AtomicU64>,
    reporter: Reporter,
}

impl DetectionJob {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether no newer job has been submitted since this one.
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }

    /// Block until the job finishes.
    ///
    /// Fails with [`FilterError::DetectionFailed`] if detection panicked or the worker went away
    /// without reporting; callers may then retry with [`DetectionTaskRunner::run_sync`].
    pub fn wait(self) -> FilterResult<DetectionOutcome> {
        let message = self.receiver.recv().map_err(|_| worker_vanished())?;
        resolve(&self.reporter, &self.latest, self.generation, message)
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`, returning `None`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<FilterResult<DetectionOutcome>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(message) => Some(resolve(&self.reporter, &self.latest, self.generation, message)),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => Some(Err(worker_vanished())),
        }
    }

    /// Non-blocking poll; `None` while the job is still running.
    pub fn try_wait(&self) -> Option<FilterResult<DetectionOutcome>> {
        match self.receiver.try_recv() {
            Ok(message) => Some(resolve(&self.reporter, &self.latest, self.generation, message)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(worker_vanished())),
        }
    }
}

/// Runs type detection in the background with stale-result discarding.
pub struct DetectionTaskRunner {
    pool: Option<ThreadPool>,
    /// Why `pool` is absent, reported on every synchronous fallback.
    fallback_reason: Option<String>,
    latest: Arc<AtomicU64>,
    observer: Option<Arc<dyn DetectionObserver>>,
    metrics: Arc<DetectionMetrics>,
}

impl DetectionTaskRunner {
    /// Create a runner with a background pool.
    ///
    /// If the pool cannot be built, the runner still works but executes every job synchronously
    /// on the submitting thread.
    pub fn new(options: RunnerOptions) -> Self {
        match Self::try_new(options) {
            Ok(runner) => runner,
            Err(e) => {
                warn!(error = %e, "detection will run synchronously");
                let mut runner = Self::synchronous();
                runner.fallback_reason = Some(e.to_string());
                runner
            }
        }
    }

    /// Create a runner with a background pool, failing if the pool cannot be started.
    pub fn try_new(options: RunnerOptions) -> FilterResult<Self> {
        let prefix = options.thread_name_prefix.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(options.num_threads.max(1))
            .thread_name(move |i| format!("{prefix}-{i}"))
            .build()
            .map_err(|e| FilterError::WorkerUnavailable {
                message: e.to_string(),
            })?;

        Ok(Self {
            pool: Some(pool),
            fallback_reason: None,
            latest: Arc::new(AtomicU64::new(0)),
            observer: None,
            metrics: Arc::new(DetectionMetrics::new()),
        })
    }

    /// Create a runner that always executes on the submitting thread.
    pub fn synchronous() -> Self {
        Self {
            pool: None,
            fallback_reason: Some("runner configured without a background pool".to_string()),
            latest: Arc::new(AtomicU64::new(0)),
            observer: None,
            metrics: Arc::new(DetectionMetrics::new()),
        }
    }

    /// Attach an observer for detection events.
    pub fn with_observer(mut self, observer: Arc<dyn DetectionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to the runner's metrics.
    pub fn metrics(&self) -> Arc<DetectionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Generation of the most recent submission (0 before the first).
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Whether jobs run on a background pool.
    pub fn is_background(&self) -> bool {
        self.pool.is_some()
    }

    /// Submit a job and get a handle to its result.
    ///
    /// Submitting supersedes every earlier job.
    pub fn submit(&self, request: DetectionRequest) -> DetectionJob {
        let generation = self.begin(&request);
        let (tx, rx) = mpsc::channel();
        let reporter = self.reporter();

        let worker_reporter = reporter.clone();
        self.dispatch(generation, move || {
            let message = run_job(&worker_reporter, generation, || detect(&request));
            let _ = tx.send(message);
        });

        DetectionJob {
            generation,
            receiver: rx,
            latest: Arc::clone(&self.latest),
            reporter,
        }
    }

    /// Submit a job and have `on_complete` called with its outcome.
    ///
    /// The callback runs on the worker thread (or on the caller's thread in synchronous mode).
    /// Returns the job's generation.
    pub fn submit_with<F>(&self, request: DetectionRequest, on_complete: F) -> u64
    where
        F: FnOnce(FilterResult<DetectionOutcome>) + Send + 'static,
    {
        let generation = self.begin(&request);
        let reporter = self.reporter();
        let latest = Arc::clone(&self.latest);

        self.dispatch(generation, move || {
            let message = run_job(&reporter, generation, || detect(&request));
            on_complete(resolve(&reporter, &latest, generation, message));
        });
        generation
    }

    /// Run detection on the calling thread, bypassing the pool and generation tracking.
    pub fn run_sync(&self, request: &DetectionRequest) -> Vec<ColumnInfo> {
        detect(request)
    }

    fn begin(&self, request: &DetectionRequest) -> u64 {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.metrics.on_submitted();
        self.emit(DetectionEvent::JobSubmitted {
            generation,
            rows: request.data.row_count(),
            columns: request.data.column_count(),
        });
        generation
    }

    fn dispatch<F>(&self, generation: u64, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match &self.pool {
            Some(pool) => pool.spawn(job),
            None => {
                self.metrics.on_sync_fallback();
                self.emit(DetectionEvent::FellBackToSync {
                    generation,
                    reason: self
                        .fallback_reason
                        .clone()
                        .unwrap_or_else(|| "no background pool".to_string()),
                });
                job();
            }
        }
    }

    fn reporter(&self) -> Reporter {
        Reporter {
            observer: self.observer.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }

    fn emit(&self, event: DetectionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

impl Default for DetectionTaskRunner {
    fn default() -> Self {
        Self::new(RunnerOptions::default())
    }
}

fn detect(request: &DetectionRequest) -> Vec<ColumnInfo> {
    TypeDetector::new(request.options.clone()).detect(&request.data)
}

/// Execute `work`, converting a panic into an error message.
fn run_job<F>(reporter: &Reporter, generation: u64, work: F) -> JobMessage
where
    F: FnOnce() -> Vec<ColumnInfo>,
{
    reporter.emit(DetectionEvent::JobStarted { generation });
    let start = Instant::now();

    match panic::catch_unwind(AssertUnwindSafe(work)) {
        Ok(columns) => {
            let elapsed = start.elapsed();
            reporter.metrics.on_completed(elapsed);
            reporter.emit(DetectionEvent::JobCompleted {
                generation,
                columns: columns.len(),
                elapsed,
            });
            Ok(columns)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            reporter.metrics.on_failed();
            reporter.emit(DetectionEvent::JobFailed {
                generation,
                message: message.clone(),
            });
            Err(message)
        }
    }
}

fn resolve(
    reporter: &Reporter,
    latest: &AtomicU64,
    generation: u64,
    message: JobMessage,
) -> FilterResult<DetectionOutcome> {
    // A superseded job is discarded whether it succeeded or failed.
    let latest = latest.load(Ordering::SeqCst);
    if latest != generation {
        reporter.metrics.on_stale_discarded();
        reporter.emit(DetectionEvent::StaleResultDiscarded { generation, latest });
        return Ok(DetectionOutcome::Stale { generation, latest });
    }
    let columns = message.map_err(|message| FilterError::DetectionFailed { message })?;
    Ok(DetectionOutcome::Completed {
        generation,
        columns,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "detection worker panicked".to_string()
    }
}

fn worker_vanished() -> FilterError {
    FilterError::DetectionFailed {
        message: "detection worker exited without a result".to_string(),
    }
}
