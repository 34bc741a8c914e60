//! Workflow executor
//!
//! Runs one complete iteration of the fixed six-step dispatch workflow
//! against an exclusively-owned page, measuring each step and folding the
//! outcome into the metric registry. A failed post-condition check never
//! aborts the iteration (best-effort full traversal); only an action
//! failure abandons the remaining steps, and the page is released on
//! every path.

use std::sync::Arc;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use towline_config::{TargetConfig, WorkflowConfig};
use towline_driver::dom;
use towline_driver::{Browser, DriverResult, Page};
use towline_metrics::MetricRegistry;

/// Scalar counter fed by the queue-scan after the list view loads
pub const COMPLETED_ITEMS_COUNTER: &str = "completed_items_observed";

static NUMERIC_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("numeric id pattern"));

static COMPLETED_STATUS_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"alt="[^"]*\(completed\)[^"]*""#).expect("completed marker pattern"));

/// The fixed step sequence of one iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Authenticate,
    ListPendingWork,
    OpenTopItem,
    FindNearestResource,
    DispatchResource,
    SignOut,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::Authenticate,
        Step::ListPendingWork,
        Step::OpenTopItem,
        Step::FindNearestResource,
        Step::DispatchResource,
        Step::SignOut,
    ];

    /// Registry key for this step
    pub fn name(self) -> &'static str {
        match self {
            Step::Authenticate => "authenticate",
            Step::ListPendingWork => "list_pending_work",
            Step::OpenTopItem => "open_top_item",
            Step::FindNearestResource => "find_nearest_resource",
            Step::DispatchResource => "dispatch_resource",
            Step::SignOut => "sign_out",
        }
    }
}

/// How one iteration ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationStatus {
    /// All six steps were attempted
    Completed,
    /// An action failed; remaining steps were abandoned
    Aborted,
    /// Cancelled by the phase's grace deadline or run shutdown
    Cancelled,
}

/// Executes workflow iterations for one run
pub struct WorkflowExecutor {
    target: TargetConfig,
    workflow: WorkflowConfig,
    registry: Arc<MetricRegistry>,
}

impl WorkflowExecutor {
    pub fn new(target: TargetConfig, workflow: WorkflowConfig, registry: Arc<MetricRegistry>) -> Self {
        Self {
            target,
            workflow,
            registry,
        }
    }

    /// The operator account used for a given claimed iteration.
    ///
    /// Rotates deterministically through the configured credential pool so
    /// load spreads over a fixed set of accounts regardless of which
    /// worker claimed the iteration.
    pub fn operator_username(&self, phase: &str, iteration: u64) -> String {
        let region = phase.strip_prefix("area").unwrap_or(phase);
        let slot = (iteration % self.target.credential_pool_size) + 1;
        format!("dispatcher{}_{}", region, slot)
    }

    /// Run one complete iteration on a fresh page.
    ///
    /// The page is acquired here and released exactly once, whether the
    /// traversal completes, an action fails, or the iteration is
    /// cancelled mid-flight.
    pub async fn run_iteration(
        &self,
        browser: &dyn Browser,
        phase: &str,
        iteration: u64,
        cancel: &CancellationToken,
    ) -> IterationStatus {
        let page = match browser.new_page().await {
            Ok(page) => page,
            Err(err) => {
                warn!(phase, iteration, error = %err, "failed to acquire page");
                return IterationStatus::Aborted;
            }
        };

        let status = tokio::select! {
            status = self.traverse(page.as_ref(), phase, iteration) => status,
            _ = cancel.cancelled() => {
                debug!(phase, iteration, "iteration cancelled");
                IterationStatus::Cancelled
            }
        };

        // Release path runs on every outcome, outside the cancellable section
        if let Err(err) = page.close().await {
            warn!(phase, iteration, error = %err, "failed to release page");
        }

        status
    }

    async fn traverse(&self, page: &dyn Page, phase: &str, iteration: u64) -> IterationStatus {
        match self.traverse_inner(page, phase, iteration).await {
            Ok(()) => IterationStatus::Completed,
            Err(err) => {
                warn!(phase, iteration, error = %err, "iteration abandoned after action failure");
                IterationStatus::Aborted
            }
        }
    }

    /// The fixed step sequence. Action errors propagate and abandon the
    /// iteration; check failures are recorded and traversal continues.
    async fn traverse_inner(&self, page: &dyn Page, phase: &str, iteration: u64) -> DriverResult<()> {
        self.authenticate(page, phase, iteration).await?;
        self.list_pending_work(page, phase).await?;
        self.open_top_item(page, phase).await?;
        self.find_nearest_resource(page, phase).await?;
        self.dispatch_resource(page, phase).await?;
        self.sign_out(page, phase).await?;
        Ok(())
    }

    async fn authenticate(&self, page: &dyn Page, phase: &str, iteration: u64) -> DriverResult<()> {
        page.goto(&self.target.url(dom::ROUTE_SIGN_IN)).await?;
        page.type_text(dom::SEL_USERNAME_INPUT, &self.operator_username(phase, iteration))
            .await?;
        page.type_text(dom::SEL_PASSWORD_INPUT, &self.target.password).await?;

        let started = Instant::now();
        let (nav, click) = tokio::join!(page.wait_for_navigation(), page.click(dom::SEL_SIGN_IN_BUTTON));
        click?;
        nav?;
        let elapsed = started.elapsed();

        let heading = page.text_content(dom::SEL_HEADING).await?;
        self.record(phase, Step::Authenticate, elapsed, heading == dom::HEADING_HOME);
        Ok(())
    }

    async fn list_pending_work(&self, page: &dyn Page, phase: &str) -> DriverResult<()> {
        let started = Instant::now();
        let (nav, click) = tokio::join!(page.wait_for_navigation(), page.click(dom::SEL_QUEUE_NAV_BUTTON));
        click?;
        nav?;
        let elapsed = started.elapsed();

        let heading = page.text_content(dom::SEL_HEADING).await?;
        let passed = heading == dom::HEADING_QUEUE;
        self.record(phase, Step::ListPendingWork, elapsed, passed);

        if passed {
            // Let asynchronous status images settle, then scan the queue
            // once before moving on
            tokio::time::sleep(self.workflow.settle_after_queue_view).await;
            self.scan_completed_items(page, phase).await?;
        }
        Ok(())
    }

    /// Count queue rows whose status image marks them completed and feed
    /// the count into the phase's scalar counter
    async fn scan_completed_items(&self, page: &dyn Page, phase: &str) -> DriverResult<()> {
        let markup = page.inner_html(dom::SEL_QUEUE_TABLE).await?;
        let completed = COMPLETED_STATUS_IMAGE.find_iter(&markup).count() as u64;
        if completed > 0 {
            self.registry.increment_scalar(phase, COMPLETED_ITEMS_COUNTER, completed);
        }
        debug!(phase, completed, "queue scan");
        Ok(())
    }

    async fn open_top_item(&self, page: &dyn Page, phase: &str) -> DriverResult<()> {
        let started = Instant::now();
        let (nav, click) = tokio::join!(page.wait_for_navigation(), page.click(dom::SEL_TOP_QUEUE_ROW));
        click?;
        nav?;
        let elapsed = started.elapsed();

        let heading = page.text_content(dom::SEL_HEADING).await?;
        self.record(phase, Step::OpenTopItem, elapsed, heading == dom::HEADING_DETAIL);
        Ok(())
    }

    async fn find_nearest_resource(&self, page: &dyn Page, phase: &str) -> DriverResult<()> {
        let started = Instant::now();
        page.click(dom::SEL_NEAREST_LOOKUP_BUTTON).await?;
        page.wait_for_visible(dom::SEL_RESULT_DIALOG, Some(self.workflow.resource_lookup_timeout))
            .await?;
        let elapsed = started.elapsed();

        let resource_id = page.text_content(dom::SEL_RESOURCE_ID).await?;
        self.record(
            phase,
            Step::FindNearestResource,
            elapsed,
            NUMERIC_ID.is_match(&resource_id),
        );
        Ok(())
    }

    async fn dispatch_resource(&self, page: &dyn Page, phase: &str) -> DriverResult<()> {
        let started = Instant::now();
        page.click(dom::SEL_DISPATCH_BUTTON).await?;
        // No step-level bound; the iteration's cancellation covers a
        // dispatch that never confirms
        page.wait_for_visible(dom::SEL_DISPATCH_SUCCESS, None).await?;
        let elapsed = started.elapsed();

        let status = page.text_content(dom::SEL_ORDER_STATUS).await?;
        self.record(phase, Step::DispatchResource, elapsed, status == dom::STATUS_DISPATCHED);
        Ok(())
    }

    async fn sign_out(&self, page: &dyn Page, phase: &str) -> DriverResult<()> {
        page.goto(&self.target.url(dom::ROUTE_ROOT)).await?;

        let started = Instant::now();
        page.click(dom::SEL_SIGN_OUT_BUTTON).await?;
        page.wait_for_visible(dom::SEL_SIGN_IN_BUTTON, None).await?;
        let elapsed = started.elapsed();

        let heading = page.text_content(dom::SEL_HEADING).await?;
        self.record(phase, Step::SignOut, elapsed, heading == dom::HEADING_SIGN_IN);
        Ok(())
    }

    fn record(&self, phase: &str, step: Step, elapsed: Duration, passed: bool) {
        if passed {
            self.registry.record_success(phase, step.name(), elapsed);
        } else {
            debug!(phase, step = step.name(), "post-condition check failed");
            self.registry.record_failure(phase, step.name());
        }
    }
}
