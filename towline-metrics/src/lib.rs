//! # Towline Metric Registry
//!
//! Process-wide aggregation state for one load-harness run. Workers across
//! all phases record per-step outcomes concurrently; the registry keys
//! duration trends and success counters by `(phase, step)`, discovered
//! dynamically on first use. At the end of a run the registry is frozen
//! into an immutable, serializable snapshot.
//!
//! Only successful steps contribute to the duration trend and the success
//! counter. Failed steps are visible as the gap between attempts and
//! successes, never as an explicit failure record.

pub mod registry;
pub mod trend;

pub use registry::{MetricRegistry, RegistrySnapshot, ScalarSnapshot, StepSnapshot};
pub use trend::TrendSummary;
