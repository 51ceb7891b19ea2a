//! Bounded worker pool for the scraping rounds
//!
//! Both scraping rounds are embarrassingly parallel: one task per catalog
//! page, then one task per discovered record. All tasks of a round are
//! submitted before any result is awaited, and results are drained in
//! completion order. A semaphore caps how many tasks run at once; tasks
//! past the cap sit queued inside the pool.
//!
//! Task outcomes are explicit results. Failures, including panics caught at
//! the join boundary, are collected separately from successes and never
//! abort sibling tasks.

use crate::progress::ProgressReporter;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// One failed task, kept for logging and assertions
#[derive(Debug)]
pub struct TaskFailure {
    /// Human-readable task label (e.g. "page 12", "app 59958")
    pub label: String,

    /// What went wrong
    pub error: String,
}

/// Aggregated results of one scheduling round
#[derive(Debug)]
pub struct RoundOutcome<T> {
    /// Successful task values, in completion order
    pub successes: Vec<T>,

    /// Failed tasks; their contributions are simply omitted
    pub failures: Vec<TaskFailure>,
}

impl<T> RoundOutcome<T> {
    fn new() -> Self {
        Self {
            successes: Vec::new(),
            failures: Vec::new(),
        }
    }
}

/// Runs one round of independent tasks over a bounded worker pool
///
/// Every task is spawned immediately; a shared semaphore of `max_workers`
/// permits bounds actual concurrency. Results are collected as tasks
/// complete, in no particular order. A task that returns an error or panics
/// is recorded as a [`TaskFailure`] without affecting the rest of the
/// round. There is no cancellation: the round runs to completion for all
/// tasks.
///
/// # Arguments
///
/// * `max_workers` - Worker pool size (1 = effectively serial)
/// * `tasks` - Labelled task futures, each yielding `Result<T, String>`
/// * `reporter` - Progress sink notified as tasks start and finish
pub async fn run_round<T, Fut>(
    max_workers: usize,
    tasks: Vec<(String, Fut)>,
    reporter: Arc<dyn ProgressReporter>,
) -> RoundOutcome<T>
where
    T: Send + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
    let mut join_set = JoinSet::new();

    for (label, task) in tasks {
        let semaphore = Arc::clone(&semaphore);
        let reporter = Arc::clone(&reporter);

        join_set.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return (label, Err("worker pool closed".to_string())),
            };

            reporter.on_task_started(&label);
            let result = task.await;
            reporter.on_task_completed(&label);

            (label, result)
        });
    }

    let mut outcome = RoundOutcome::new();

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((_, Ok(value))) => outcome.successes.push(value),
            Ok((label, Err(error))) => {
                tracing::error!("Task {} failed: {}", label, error);
                outcome.failures.push(TaskFailure { label, error });
            }
            Err(join_error) => {
                tracing::error!("Task aborted: {}", join_error);
                outcome.failures.push(TaskFailure {
                    label: "<aborted>".to_string(),
                    error: join_error.to_string(),
                });
            }
        }
    }

    outcome
}
