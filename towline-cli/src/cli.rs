//! CLI argument parsing definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Load-generation harness for the dispatch application", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the configured load scenario
    Run {
        /// Driver backing the virtual operators
        #[arg(long, value_enum, value_name = "DRIVER", default_value = "simulated")]
        driver: Driver,

        /// Base latency of the simulated driver, in milliseconds
        #[arg(long, value_name = "MILLIS", default_value = "40")]
        sim_latency_ms: u64,

        /// Fault-injection probability of the simulated driver, in [0, 1]
        #[arg(long, value_name = "RATE", default_value = "0.0")]
        sim_failure_rate: f64,
    },

    /// Validate the configuration and print the effective phase schedule
    Validate,

    /// Print a sample configuration file
    GenerateConfig,
}

/// Available driver backends.
///
/// Real-browser drivers are integration concerns: implement the
/// `towline_driver::Browser` trait and wire it in here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Driver {
    /// In-memory simulation of the dispatch application
    Simulated,
}
