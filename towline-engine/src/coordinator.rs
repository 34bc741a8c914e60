//! Run coordinator
//!
//! Owns the phase set for one run: validates configuration before any
//! phase starts, runs all phases concurrently against the shared metric
//! registry, and freezes the final snapshot into a [`RunOutcome`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::info;

use towline_config::{PhaseConfig, TowlineConfig};
use towline_driver::Browser;
use towline_metrics::{MetricRegistry, RegistrySnapshot};

use crate::error::{EngineError, EngineResult};
use crate::scheduler::{PhaseReport, PhaseScheduler};
use crate::workflow::WorkflowExecutor;

/// Frozen result of one run, handed to the reporting layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub phases: Vec<PhaseReport>,
    pub metrics: RegistrySnapshot,
}

/// Coordinates all phases of one run
pub struct RunCoordinator {
    phases: Vec<PhaseConfig>,
    executor: Arc<WorkflowExecutor>,
    browser: Arc<dyn Browser>,
    registry: Arc<MetricRegistry>,
}

impl RunCoordinator {
    /// Build a coordinator from validated configuration.
    ///
    /// Configuration problems (non-positive concurrency or duration,
    /// duplicate phase names) surface here, before any phase starts.
    pub fn new(config: &TowlineConfig, browser: Arc<dyn Browser>) -> EngineResult<Self> {
        config.validate_all()?;

        let phases = config.phases.effective_phases(config.target.is_production());
        let registry = Arc::new(MetricRegistry::new());
        let executor = Arc::new(WorkflowExecutor::new(
            config.target.clone(),
            config.workflow.clone(),
            Arc::clone(&registry),
        ));

        Ok(Self {
            phases,
            executor,
            browser,
            registry,
        })
    }

    /// Phases this run will schedule (after environment timing adjustments)
    pub fn phases(&self) -> &[PhaseConfig] {
        &self.phases
    }

    /// Run every phase to completion and freeze the outcome.
    ///
    /// Phases are unaware of each other; they share only the metric
    /// registry and the run-wide cancellation token.
    pub async fn run(&self, cancel: CancellationToken) -> EngineResult<RunOutcome> {
        let started_at = Utc::now();
        info!(phases = self.phases.len(), "run starting");

        let mut set = JoinSet::new();
        for spec in self.phases.iter().cloned() {
            let scheduler = PhaseScheduler::new(spec, Arc::clone(&self.executor), Arc::clone(&self.browser));
            let cancel = cancel.clone();
            set.spawn(async move { scheduler.run(&cancel).await });
        }

        let mut reports = Vec::with_capacity(self.phases.len());
        while let Some(joined) = set.join_next().await {
            let report = joined.map_err(|err| EngineError::PhaseTask(err.to_string()))?;
            reports.push(report);
        }
        reports.sort_by(|a, b| a.name.cmp(&b.name));

        let finished_at = Utc::now();
        info!("run complete");

        Ok(RunOutcome {
            started_at,
            finished_at,
            phases: reports,
            metrics: self.registry.snapshot(),
        })
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use towline_driver::{SimulatedBrowser, SimulationConfig};

    fn config_with_phases(phases: Vec<PhaseConfig>) -> TowlineConfig {
        let mut config = TowlineConfig::default();
        config.phases.phases = phases;
        config
    }

    #[test]
    fn test_invalid_config_rejected_before_run() {
        let mut phase = PhaseConfig::new("area2", 1, 1, std::time::Duration::ZERO);
        phase.concurrency = 0;
        let config = config_with_phases(vec![phase]);

        let browser = Arc::new(SimulatedBrowser::new(SimulationConfig::default()));
        let result = RunCoordinator::new(&config, browser);
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_completes_all_phases() {
        let config = config_with_phases(vec![
            PhaseConfig::new("area2", 1, 2, std::time::Duration::ZERO),
            PhaseConfig::new("area3", 2, 3, std::time::Duration::from_secs(5)),
        ]);

        let browser = Arc::new(SimulatedBrowser::new(SimulationConfig::default()));
        let coordinator = RunCoordinator::new(&config, browser).unwrap();
        let outcome = coordinator.run(CancellationToken::new()).await.unwrap();

        assert_eq!(outcome.phases.len(), 2);
        assert_eq!(outcome.phases[0].name, "area2");
        assert_eq!(outcome.phases[0].iterations_started, 2);
        assert_eq!(outcome.phases[1].name, "area3");
        assert_eq!(outcome.phases[1].iterations_started, 3);
        assert!(outcome.finished_at >= outcome.started_at);

        assert_eq!(outcome.metrics.successes("area2", "authenticate"), 2);
        assert_eq!(outcome.metrics.successes("area3", "authenticate"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_production_compresses_schedule() {
        let mut config = config_with_phases(vec![PhaseConfig::new(
            "area3",
            1,
            1,
            std::time::Duration::from_secs(40),
        )]);
        config.target.base_url = "http://staging.internal:8080".to_string();

        let browser = Arc::new(SimulatedBrowser::new(SimulationConfig::default()));
        let coordinator = RunCoordinator::new(&config, browser).unwrap();
        assert_eq!(coordinator.phases()[0].start_delay, std::time::Duration::from_secs(20));
    }
}
