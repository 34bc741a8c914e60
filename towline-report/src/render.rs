//! Human-readable summary rendering

use std::fmt::Write;

use towline_engine::{RunOutcome, Step};
use towline_metrics::StepSnapshot;

/// Render the console summary for a run outcome
pub fn render_summary(outcome: &RunOutcome) -> String {
    let mut out = String::new();

    let wall_clock = outcome
        .finished_at
        .signed_duration_since(outcome.started_at)
        .num_seconds();
    writeln!(out, "towline run summary").ok();
    writeln!(out, "  started:  {}", outcome.started_at.to_rfc3339()).ok();
    writeln!(out, "  finished: {} ({}s)", outcome.finished_at.to_rfc3339(), wall_clock).ok();

    for phase in &outcome.phases {
        writeln!(out).ok();
        writeln!(
            out,
            "phase {}: {} started / {} completed{}",
            phase.name,
            phase.iterations_started,
            phase.iterations_completed,
            if phase.forced_cancellation {
                ", in-flight work cancelled"
            } else {
                ""
            }
        )
        .ok();

        for step in Step::ALL {
            if let Some(snapshot) = outcome.metrics.step(&phase.name, step.name()) {
                writeln!(out, "  {}", render_step(snapshot)).ok();
            }
        }

        for scalar in outcome.metrics.scalars.iter().filter(|s| s.phase == phase.name) {
            writeln!(out, "  {}: {}", scalar.name, scalar.value).ok();
        }
    }

    out
}

fn render_step(snapshot: &StepSnapshot) -> String {
    if snapshot.successes == 0 {
        return format!(
            "{:<24} {}/{} succeeded",
            snapshot.step, snapshot.successes, snapshot.attempts
        );
    }

    format!(
        "{:<24} {}/{} succeeded ({:.1}%)  mean {:.1}ms  p90 {}ms  p95 {}ms  min {}ms  max {}ms",
        snapshot.step,
        snapshot.successes,
        snapshot.attempts,
        snapshot.success_rate() * 100.0,
        snapshot.trend.mean,
        snapshot.trend.p90,
        snapshot.trend.p95,
        snapshot.trend.min,
        snapshot.trend.max,
    )
}
