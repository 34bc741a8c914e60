//! Shared metric registry keyed by (phase, step)

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::trend::TrendSummary;

/// Aggregates for one (phase, step) pair
#[derive(Debug, Default)]
struct StepMetrics {
    attempts: AtomicU64,
    successes: AtomicU64,
    /// Durations of successful steps, in milliseconds
    samples: Mutex<Vec<u64>>,
}

/// Process-wide metric aggregation state, one instance per run.
///
/// Entries are created on first use and append-only for the duration of a
/// run. All methods are safe to call from many workers concurrently.
#[derive(Debug, Default)]
pub struct MetricRegistry {
    steps: RwLock<HashMap<(String, String), Arc<StepMetrics>>>,
    scalars: RwLock<HashMap<(String, String), Arc<AtomicU64>>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful step: the duration joins the (phase, step)
    /// trend and the success counter is incremented.
    pub fn record_success(&self, phase: &str, step: &str, duration: Duration) {
        let entry = self.step_entry(phase, step);
        entry.attempts.fetch_add(1, Ordering::Relaxed);
        entry.successes.fetch_add(1, Ordering::Relaxed);

        let millis = duration.as_millis() as u64;
        let mut samples = entry.samples.lock().expect("samples lock poisoned");
        samples.push(millis);
    }

    /// Record a failed step. Failures contribute neither duration nor
    /// success count; they are observable only as attempts without a
    /// matching success.
    pub fn record_failure(&self, phase: &str, step: &str) {
        let entry = self.step_entry(phase, step);
        entry.attempts.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment an auxiliary scalar counter for a phase
    pub fn increment_scalar(&self, phase: &str, name: &str, amount: u64) {
        let counter = self.scalar_entry(phase, name);
        counter.fetch_add(amount, Ordering::Relaxed);
    }

    /// Take an immutable snapshot of all aggregates.
    ///
    /// Holds each entry's sample lock only long enough to clone it, so
    /// writers are never blocked for the full snapshot.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let mut steps: Vec<StepSnapshot> = {
            let map = self.steps.read().expect("steps lock poisoned");
            map.iter()
                .map(|((phase, step), metrics)| {
                    let samples = metrics.samples.lock().expect("samples lock poisoned").clone();
                    StepSnapshot {
                        phase: phase.clone(),
                        step: step.clone(),
                        attempts: metrics.attempts.load(Ordering::Relaxed),
                        successes: metrics.successes.load(Ordering::Relaxed),
                        trend: TrendSummary::from_samples(&samples),
                    }
                })
                .collect()
        };
        steps.sort_by(|a, b| (&a.phase, &a.step).cmp(&(&b.phase, &b.step)));

        let mut scalars: Vec<ScalarSnapshot> = {
            let map = self.scalars.read().expect("scalars lock poisoned");
            map.iter()
                .map(|((phase, name), counter)| ScalarSnapshot {
                    phase: phase.clone(),
                    name: name.clone(),
                    value: counter.load(Ordering::Relaxed),
                })
                .collect()
        };
        scalars.sort_by(|a, b| (&a.phase, &a.name).cmp(&(&b.phase, &b.name)));

        RegistrySnapshot { steps, scalars }
    }

    fn step_entry(&self, phase: &str, step: &str) -> Arc<StepMetrics> {
        let key = (phase.to_string(), step.to_string());
        {
            let map = self.steps.read().expect("steps lock poisoned");
            if let Some(entry) = map.get(&key) {
                return Arc::clone(entry);
            }
        }
        let mut map = self.steps.write().expect("steps lock poisoned");
        Arc::clone(map.entry(key).or_default())
    }

    fn scalar_entry(&self, phase: &str, name: &str) -> Arc<AtomicU64> {
        let key = (phase.to_string(), name.to_string());
        {
            let map = self.scalars.read().expect("scalars lock poisoned");
            if let Some(entry) = map.get(&key) {
                return Arc::clone(entry);
            }
        }
        let mut map = self.scalars.write().expect("scalars lock poisoned");
        Arc::clone(map.entry(key).or_default())
    }
}

/// Immutable snapshot of the registry, safe to serialize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub steps: Vec<StepSnapshot>,
    pub scalars: Vec<ScalarSnapshot>,
}

impl RegistrySnapshot {
    /// Look up the aggregates for a (phase, step) pair
    pub fn step(&self, phase: &str, step: &str) -> Option<&StepSnapshot> {
        self.steps.iter().find(|s| s.phase == phase && s.step == step)
    }

    /// Successes recorded for a (phase, step) pair, zero if never seen
    pub fn successes(&self, phase: &str, step: &str) -> u64 {
        self.step(phase, step).map(|s| s.successes).unwrap_or(0)
    }

    /// Value of a scalar counter, zero if never incremented
    pub fn scalar(&self, phase: &str, name: &str) -> u64 {
        self.scalars
            .iter()
            .find(|s| s.phase == phase && s.name == name)
            .map(|s| s.value)
            .unwrap_or(0)
    }
}

/// Aggregates for one (phase, step) pair at snapshot time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSnapshot {
    pub phase: String,
    pub step: String,
    pub attempts: u64,
    pub successes: u64,
    pub trend: TrendSummary,
}

impl StepSnapshot {
    /// Successes over attempts, in [0, 1]
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.successes as f64 / self.attempts as f64
    }
}

/// One auxiliary scalar counter at snapshot time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarSnapshot {
    pub phase: String,
    pub name: String,
    pub value: u64,
}
