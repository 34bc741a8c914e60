use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use towline_config::{ConfigLoader, TowlineConfig};
use towline_driver::{Browser, SimulatedBrowser, SimulationConfig};
use towline_engine::RunCoordinator;
use towline_report::Reporter;

mod cli;
use cli::{Cli, Commands, Driver};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::GenerateConfig) {
        print!("{}", TowlineConfig::generate_sample());
        return Ok(());
    }

    let mut config = ConfigLoader::new()
        .load(cli.config.as_ref())
        .context("failed to load configuration")?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config)?;

    match cli.command {
        Commands::Run {
            driver,
            sim_latency_ms,
            sim_failure_rate,
        } => {
            let browser = build_browser(driver, sim_latency_ms, sim_failure_rate);
            run(&config, browser).await
        }
        Commands::Validate => validate(&config),
        Commands::GenerateConfig => unreachable!("handled above"),
    }
}

/// Initialize console tracing from the logging configuration
fn init_tracing(config: &TowlineConfig) -> Result<()> {
    let env_filter = EnvFilter::try_new(&config.logging.level)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(config.logging.with_target)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))?;

    Ok(())
}

fn build_browser(driver: Driver, sim_latency_ms: u64, sim_failure_rate: f64) -> Arc<dyn Browser> {
    match driver {
        Driver::Simulated => Arc::new(SimulatedBrowser::new(SimulationConfig {
            base_latency: Duration::from_millis(sim_latency_ms),
            failure_rate: sim_failure_rate,
            ..Default::default()
        })),
    }
}

async fn run(config: &TowlineConfig, browser: Arc<dyn Browser>) -> Result<()> {
    let coordinator = RunCoordinator::new(config, browser).context("invalid run configuration")?;
    info!(
        target_url = %config.target.base_url,
        production = config.target.is_production(),
        phases = coordinator.phases().len(),
        "starting load run"
    );

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, draining run");
            ctrl_c_cancel.cancel();
        }
    });

    let outcome = coordinator.run(cancel).await?;

    Reporter::from_config(&config.output)
        .deliver_all(&outcome)
        .await
        .context("failed to deliver run report")?;

    Ok(())
}

fn validate(config: &TowlineConfig) -> Result<()> {
    config.validate_all().context("configuration is invalid")?;

    let production = config.target.is_production();
    println!("configuration OK");
    println!(
        "target: {} ({})",
        config.target.base_url,
        if production { "production timings" } else { "compressed timings" }
    );
    for phase in config.phases.effective_phases(production) {
        println!(
            "  {}: {} workers, {} iterations, start +{}s, deadline {}s, grace {}s",
            phase.name,
            phase.concurrency,
            phase.iteration_budget,
            phase.start_delay.as_secs(),
            phase.max_duration.as_secs(),
            phase.graceful_stop.as_secs(),
        );
    }

    Ok(())
}
