//! Scheduled phase configuration
//!
//! Each phase models one deployment region's worth of simulated operators:
//! a worker cohort with its own start delay, shared iteration budget, hard
//! deadline, and graceful-stop grace period.

use crate::error::ConfigResult;
use crate::validation::{validate_nonzero_duration, validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Configuration for one scheduled phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseConfig {
    /// Unique phase identifier (region tag)
    pub name: String,

    /// Number of workers running in parallel
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Total iterations shared across all workers of this phase
    #[serde(default = "default_iteration_budget")]
    pub iteration_budget: u64,

    /// Delay after run start before this phase's workers begin
    #[serde(with = "crate::domains::utils::serde_duration", default = "default_start_delay")]
    pub start_delay: Duration,

    /// Hard deadline after which no new iterations are admitted
    #[serde(with = "crate::domains::utils::serde_duration", default = "default_max_duration")]
    pub max_duration: Duration,

    /// Extra time for in-flight iterations once the deadline elapses
    #[serde(with = "crate::domains::utils::serde_duration", default = "default_graceful_stop")]
    pub graceful_stop: Duration,
}

impl PhaseConfig {
    /// Create a phase with default timings
    pub fn new(name: impl Into<String>, concurrency: usize, iteration_budget: u64, start_delay: Duration) -> Self {
        Self {
            name: name.into(),
            concurrency,
            iteration_budget,
            start_delay,
            max_duration: default_max_duration(),
            graceful_stop: default_graceful_stop(),
        }
    }
}

impl Validatable for PhaseConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.name, "name", self.domain_name())?;
        validate_positive(self.concurrency, "concurrency", self.domain_name())?;
        validate_nonzero_duration(self.max_duration, "max_duration", self.domain_name())?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "phases.phase"
    }
}

/// The full phase schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhasesConfig {
    /// Phase definitions, started concurrently after their delays
    pub phases: Vec<PhaseConfig>,
}

impl PhasesConfig {
    /// Phases with timings adjusted for the target environment.
    ///
    /// Non-production targets run a compressed schedule: start delays and
    /// deadlines are halved, matching the shortened timings the harness has
    /// always used against staging deployments.
    pub fn effective_phases(&self, production: bool) -> Vec<PhaseConfig> {
        if production {
            return self.phases.clone();
        }

        self.phases
            .iter()
            .map(|phase| {
                let mut phase = phase.clone();
                phase.start_delay /= 2;
                phase.max_duration /= 2;
                phase
            })
            .collect()
    }
}

impl Default for PhasesConfig {
    fn default() -> Self {
        Self {
            phases: vec![
                PhaseConfig::new("area2", 1, 4, Duration::ZERO),
                PhaseConfig::new("area3", 2, 30, Duration::from_secs(40)),
                PhaseConfig::new("area4", 2, 30, Duration::from_secs(60)),
                PhaseConfig::new("area5", 2, 15, Duration::from_secs(80)),
                PhaseConfig::new("area6", 2, 15, Duration::from_secs(100)),
                PhaseConfig::new("area7", 2, 15, Duration::from_secs(120)),
            ],
        }
    }
}

impl Validatable for PhasesConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.phases.is_empty() {
            return Err(self.validation_error("at least one phase must be defined"));
        }

        let mut names = HashSet::new();
        for phase in &self.phases {
            phase.validate()?;
            if !names.insert(phase.name.as_str()) {
                return Err(self.validation_error(format!("duplicate phase name '{}'", phase.name)));
            }
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "phases"
    }
}

// Default value functions
fn default_concurrency() -> usize {
    1
}

fn default_iteration_budget() -> u64 {
    1
}

fn default_start_delay() -> Duration {
    Duration::ZERO
}

fn default_max_duration() -> Duration {
    Duration::from_secs(60)
}

fn default_graceful_stop() -> Duration {
    Duration::from_secs(30)
}
