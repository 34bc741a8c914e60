//! Phase scheduling properties: shared budgets, concurrency ceilings,
//! staggered starts, and the draining/grace cancellation law.


use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use scripted_driver::{Script, ScriptedBrowser, Telemetry, COMPLETED_ROWS};
use towline_config::{PhaseConfig, TargetConfig, TowlineConfig, WorkflowConfig};
use towline_driver::Browser;
use towline_engine::{PhaseScheduler, PhaseState, RunCoordinator, Step, WorkflowExecutor};
use towline_metrics::MetricRegistry;

fn harness(script: Script) -> (Arc<MetricRegistry>, Arc<WorkflowExecutor>, Arc<dyn Browser>, Arc<Telemetry>) {
    let registry = Arc::new(MetricRegistry::new());
    let executor = Arc::new(WorkflowExecutor::new(
        TargetConfig::default(),
        WorkflowConfig::default(),
        Arc::clone(&registry),
    ));
    let browser = Arc::new(ScriptedBrowser::new(script));
    let telemetry = browser.telemetry();
    let browser: Arc<dyn Browser> = browser;
    (registry, executor, browser, telemetry)
}

#[tokio::test(start_paused = true)]
async fn test_shared_budget_is_consumed_exactly() {
    let (registry, executor, browser, telemetry) = harness(Script::default());
    let mut spec = PhaseConfig::new("areaX", 2, 5, Duration::ZERO);
    spec.graceful_stop = Duration::from_secs(5);

    let started = Instant::now();
    let report = PhaseScheduler::new(spec, executor, browser)
        .run(&CancellationToken::new())
        .await;

    // Phase finished well before its deadline, without cancellation
    assert!(started.elapsed() < Duration::from_secs(60));
    assert_eq!(report.final_state, PhaseState::Done);
    assert!(!report.forced_cancellation);
    assert_eq!(report.iterations_started, 5);
    assert_eq!(report.iterations_completed, 5);

    // Every step of every iteration succeeded: 6 x 5 recordings
    let snapshot = registry.snapshot();
    for step in Step::ALL {
        let step = snapshot.step("areaX", step.name()).unwrap();
        assert_eq!(step.successes, 5);
        assert_eq!(step.attempts, 5);
        assert_eq!(step.trend.count, 5);
        assert!(step.trend.min >= 1);
    }
    assert_eq!(
        snapshot.scalar("areaX", towline_engine::workflow::COMPLETED_ITEMS_COUNTER),
        5 * COMPLETED_ROWS
    );

    // One page per iteration, always released
    assert_eq!(telemetry.pages_opened.load(std::sync::atomic::Ordering::SeqCst), 5);
    assert_eq!(telemetry.pages_closed.load(std::sync::atomic::Ordering::SeqCst), 5);
}

#[tokio::test(start_paused = true)]
async fn test_budget_smaller_than_concurrency() {
    let (_, executor, browser, telemetry) = harness(Script::default());
    let spec = PhaseConfig::new("areaX", 2, 1, Duration::ZERO);

    let report = PhaseScheduler::new(spec, executor, browser)
        .run(&CancellationToken::new())
        .await;

    // One worker claims the only unit; the other exits without claiming
    assert_eq!(report.iterations_started, 1);
    assert_eq!(report.iterations_completed, 1);
    assert_eq!(telemetry.pages_opened.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_worker_ceiling_is_respected() {
    let (_, executor, browser, telemetry) = harness(Script::default());
    let spec = PhaseConfig::new("areaX", 2, 8, Duration::ZERO);

    PhaseScheduler::new(spec, executor, browser)
        .run(&CancellationToken::new())
        .await;

    // Pages are held one per in-flight iteration, so the open-page high
    // water mark bounds concurrent workers
    assert!(telemetry.max_open_pages.load(std::sync::atomic::Ordering::SeqCst) <= 2);
}

#[tokio::test(start_paused = true)]
async fn test_phases_start_staggered_and_all_complete() {
    let mut config = TowlineConfig::default();
    // Production marker keeps the configured timings unhalved
    config.target.base_url = "https://app-load.example.com".to_string();
    config.phases.phases = vec![
        PhaseConfig::new("area2", 1, 2, Duration::ZERO),
        PhaseConfig::new("area3", 2, 2, Duration::from_secs(40)),
    ];

    let browser = Arc::new(ScriptedBrowser::new(Script::default()));
    let coordinator = RunCoordinator::new(&config, browser).unwrap();

    let started = Instant::now();
    let outcome = coordinator.run(CancellationToken::new()).await.unwrap();

    // The run cannot end before the delayed phase has even begun
    assert!(started.elapsed() >= Duration::from_secs(40));
    assert_eq!(outcome.phases.len(), 2);
    for report in &outcome.phases {
        assert_eq!(report.final_state, PhaseState::Done);
        assert_eq!(report.iterations_started, 2);
    }
    assert_eq!(outcome.metrics.successes("area2", "authenticate"), 2);
    assert_eq!(outcome.metrics.successes("area3", "authenticate"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_grace_expiry_cancels_in_flight_iterations() {
    let script = Script {
        hang_on_dispatch: true,
        ..Default::default()
    };
    let (registry, executor, browser, telemetry) = harness(script);

    let mut spec = PhaseConfig::new("areaX", 2, 5, Duration::ZERO);
    spec.max_duration = Duration::from_secs(5);
    spec.graceful_stop = Duration::from_secs(5);

    let started = Instant::now();
    let report = PhaseScheduler::new(spec, executor, browser)
        .run(&CancellationToken::new())
        .await;

    // Both workers stall on their first dispatch wait; the deadline then
    // the grace period elapse before cancellation
    assert!(started.elapsed() >= Duration::from_secs(10));
    assert_eq!(report.final_state, PhaseState::Done);
    assert!(report.forced_cancellation);
    assert_eq!(report.iterations_started, 2);
    assert_eq!(report.iterations_completed, 0);

    // Steps up to the stalled dispatch were recorded; nothing after
    let snapshot = registry.snapshot();
    assert_eq!(snapshot.successes("areaX", "authenticate"), 2);
    assert_eq!(snapshot.successes("areaX", "find_nearest_resource"), 2);
    assert_eq!(snapshot.successes("areaX", "dispatch_resource"), 0);
    assert_eq!(snapshot.successes("areaX", "sign_out"), 0);

    // Cancelled iterations still released their pages, and the registry
    // is quiescent once the phase is done
    assert_eq!(telemetry.pages_opened.load(std::sync::atomic::Ordering::SeqCst), 2);
    assert_eq!(telemetry.pages_closed.load(std::sync::atomic::Ordering::SeqCst), 2);
    assert_eq!(registry.snapshot(), snapshot);
}
