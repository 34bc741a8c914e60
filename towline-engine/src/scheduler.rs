//! Phase scheduler
//!
//! Each phase runs a fixed cohort of workers against a shared iteration
//! budget: `Pending` until its start delay elapses, `Started` while
//! workers claim and run iterations, `Draining` once the deadline passes
//! or the budget is exhausted, and `Done` when in-flight work finishes or
//! the grace period forces cancellation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use towline_config::PhaseConfig;
use towline_driver::Browser;

use crate::workflow::{IterationStatus, WorkflowExecutor};

/// Phase lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseState {
    Pending,
    Started,
    Draining,
    Done,
}

/// Completion report for one phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseReport {
    pub name: String,
    pub final_state: PhaseState,
    /// Iterations claimed from the budget (started)
    pub iterations_started: u64,
    /// Iterations that attempted all six steps
    pub iterations_completed: u64,
    /// Whether the grace period expired and cancelled in-flight work
    pub forced_cancellation: bool,
}

/// Schedules one phase's worker cohort
pub struct PhaseScheduler {
    spec: PhaseConfig,
    executor: Arc<WorkflowExecutor>,
    browser: Arc<dyn Browser>,
}

impl PhaseScheduler {
    pub fn new(spec: PhaseConfig, executor: Arc<WorkflowExecutor>, browser: Arc<dyn Browser>) -> Self {
        Self {
            spec,
            executor,
            browser,
        }
    }

    /// Drive the phase from `Pending` to `Done`.
    ///
    /// `run_cancel` aborts the whole run; the phase derives its own child
    /// token from it for grace-deadline cancellation of in-flight
    /// iterations.
    pub async fn run(self, run_cancel: &CancellationToken) -> PhaseReport {
        let name = self.spec.name.clone();
        debug!(phase = %name, delay = ?self.spec.start_delay, "phase pending");
        tokio::time::sleep(self.spec.start_delay).await;

        info!(
            phase = %name,
            concurrency = self.spec.concurrency,
            budget = self.spec.iteration_budget,
            "phase started"
        );
        let deadline = Instant::now() + self.spec.max_duration;
        let total_budget = self.spec.iteration_budget;
        let budget = Arc::new(AtomicU64::new(total_budget));
        let completed = Arc::new(AtomicU64::new(0));

        // Cancels in-flight iterations once the grace period expires
        let iter_cancel = run_cancel.child_token();
        // Fires as soon as the budget is exhausted: the phase is draining
        // even if the deadline is still far off
        let budget_drained = CancellationToken::new();

        let mut workers = JoinSet::new();
        for worker_id in 0..self.spec.concurrency {
            let name = name.clone();
            let executor = Arc::clone(&self.executor);
            let browser = Arc::clone(&self.browser);
            let budget = Arc::clone(&budget);
            let completed = Arc::clone(&completed);
            let iter_cancel = iter_cancel.clone();
            let budget_drained = budget_drained.clone();

            workers.spawn(async move {
                loop {
                    if iter_cancel.is_cancelled() || Instant::now() >= deadline {
                        break;
                    }

                    // Claim one unit of the shared budget
                    let claim = budget.fetch_update(Ordering::AcqRel, Ordering::Acquire, |remaining| {
                        remaining.checked_sub(1)
                    });
                    let Ok(before) = claim else {
                        budget_drained.cancel();
                        break;
                    };
                    if before == 1 {
                        // Took the last unit; no further iterations will start
                        budget_drained.cancel();
                    }
                    let iteration = total_budget - before;

                    debug!(phase = %name, worker_id, iteration, "iteration claimed");
                    match executor
                        .run_iteration(browser.as_ref(), &name, iteration, &iter_cancel)
                        .await
                    {
                        IterationStatus::Completed => {
                            completed.fetch_add(1, Ordering::Relaxed);
                        }
                        IterationStatus::Aborted => {}
                        IterationStatus::Cancelled => break,
                    }
                }
                debug!(phase = %name, worker_id, "worker finished");
            });
        }

        // Supervise: everything may finish before the deadline; otherwise
        // enter draining at the deadline or on budget exhaustion
        let mut forced_cancellation = false;
        let drain_all = async {
            while let Some(joined) = workers.join_next().await {
                if let Err(err) = joined {
                    warn!(phase = %name, error = %err, "worker task failed");
                }
            }
        };
        tokio::pin!(drain_all);

        let mut state = tokio::select! {
            _ = &mut drain_all => PhaseState::Done,
            _ = budget_drained.cancelled() => PhaseState::Draining,
            _ = tokio::time::sleep_until(deadline) => PhaseState::Draining,
        };

        if state == PhaseState::Draining {
            info!(phase = %name, grace = ?self.spec.graceful_stop, "phase draining");
            tokio::select! {
                _ = &mut drain_all => {}
                _ = tokio::time::sleep(self.spec.graceful_stop) => {
                    warn!(phase = %name, "grace period expired, cancelling in-flight iterations");
                    forced_cancellation = true;
                    iter_cancel.cancel();
                    drain_all.await;
                }
            }
            state = PhaseState::Done;
        }

        let iterations_started = total_budget - budget.load(Ordering::Acquire);
        let iterations_completed = completed.load(Ordering::Relaxed);
        info!(
            phase = %name,
            started = iterations_started,
            completed = iterations_completed,
            forced_cancellation,
            "phase done"
        );

        PhaseReport {
            name: name.clone(),
            final_state: state,
            iterations_started,
            iterations_completed,
            forced_cancellation,
        }
    }
}
