//! Progress reporting capability
//!
//! The scraping rounds report task lifecycle events through this trait so
//! the core never depends on a concrete display mechanism. The binary picks
//! an implementation from configuration; tests use [`NoopProgress`].

/// Receives task lifecycle notifications from the worker pool
pub trait ProgressReporter: Send + Sync {
    /// Called when a task begins executing (after acquiring a pool slot)
    fn on_task_started(&self, label: &str) {
        let _ = label;
    }

    /// Called when a task finishes, successfully or not
    fn on_task_completed(&self, label: &str) {
        let _ = label;
    }
}

/// Reporter that discards all notifications
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {}

/// Reporter that logs task completions through tracing
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn on_task_started(&self, label: &str) {
        tracing::debug!("started {}", label);
    }

    fn on_task_completed(&self, label: &str) {
        tracing::info!("completed {}", label);
    }
}
