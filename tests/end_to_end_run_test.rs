//! End-to-end runs: the full phase table against the simulated driver,
//! and report delivery of the frozen outcome.


use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use scripted_driver::{Script, ScriptedBrowser};
use towline_config::{OutputConfig, PhaseConfig, TowlineConfig};
use towline_driver::{SimulatedBrowser, SimulationConfig};
use towline_engine::{PhaseState, RunCoordinator, RunOutcome, Step};
use towline_report::{render_summary, FilesystemDestination, ReportDestination};

#[tokio::test(start_paused = true)]
async fn test_full_phase_table_against_simulated_driver() {
    let mut config = TowlineConfig::default();
    // Production marker keeps the full staggered schedule; no settle wait
    // so every budget drains well inside its deadline
    config.target.base_url = "https://app-load.example.com".to_string();
    config.workflow.settle_after_queue_view = Duration::ZERO;

    let browser = Arc::new(SimulatedBrowser::new(SimulationConfig::default()));
    let coordinator = RunCoordinator::new(&config, browser).unwrap();
    let outcome = coordinator.run(CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.phases.len(), 6);
    assert!(outcome.finished_at >= outcome.started_at);

    let budgets = [("area2", 4), ("area3", 30), ("area4", 30), ("area5", 15), ("area6", 15), ("area7", 15)];
    for (name, budget) in budgets {
        let report = outcome.phases.iter().find(|p| p.name == name).unwrap();
        assert_eq!(report.final_state, PhaseState::Done, "phase {}", name);
        assert!(!report.forced_cancellation, "phase {}", name);
        assert_eq!(report.iterations_started, budget, "phase {}", name);
        assert_eq!(report.iterations_completed, budget, "phase {}", name);

        for step in Step::ALL {
            assert_eq!(outcome.metrics.successes(name, step.name()), budget, "phase {} step {}", name, step.name());
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_outcome_is_delivered_and_round_trips() {
    let mut config = TowlineConfig::default();
    config.phases.phases = vec![PhaseConfig::new("area2", 1, 2, Duration::ZERO)];
    // localhost target: compressed timings, which this tiny budget ignores

    let browser = Arc::new(ScriptedBrowser::new(Script::default()));
    let coordinator = RunCoordinator::new(&config, browser).unwrap();
    let outcome = coordinator.run(CancellationToken::new()).await.unwrap();

    // Human summary names the phase and its steps
    let summary = render_summary(&outcome);
    assert!(summary.contains("phase area2"));
    assert!(summary.contains("authenticate"));
    assert!(summary.contains("2/2 succeeded"));

    // JSON artifact round-trips through the filesystem destination
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("summary.json");
    FilesystemDestination::new(path.clone(), OutputConfig::default().pretty)
        .deliver(&outcome)
        .await
        .unwrap();

    let body = std::fs::read_to_string(&path).unwrap();
    let parsed: RunOutcome = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed.metrics, outcome.metrics);
    assert_eq!(parsed.phases.len(), 1);
    assert_eq!(parsed.phases[0].iterations_started, 2);
}
