//! Report destination contract and fan-out

use async_trait::async_trait;
use tracing::info;

use towline_config::OutputConfig;
use towline_engine::RunOutcome;

use crate::destinations::{ConsoleDestination, FilesystemDestination};
use crate::error::ReportResult;

/// A target that can persist or display a run outcome
#[async_trait]
pub trait ReportDestination: Send + Sync {
    /// Destination name for logging
    fn name(&self) -> &'static str;

    /// Deliver the outcome
    async fn deliver(&self, outcome: &RunOutcome) -> ReportResult<()>;
}

/// Fans one run outcome out to every configured destination
pub struct Reporter {
    destinations: Vec<Box<dyn ReportDestination>>,
}

impl Reporter {
    pub fn new(destinations: Vec<Box<dyn ReportDestination>>) -> Self {
        Self { destinations }
    }

    /// Build the default destination set from output configuration
    pub fn from_config(config: &OutputConfig) -> Self {
        let mut destinations: Vec<Box<dyn ReportDestination>> = Vec::new();
        if config.console_summary {
            destinations.push(Box::new(ConsoleDestination::new()));
        }
        destinations.push(Box::new(FilesystemDestination::new(
            config.artifact_path.clone(),
            config.pretty,
        )));
        Self::new(destinations)
    }

    /// Deliver the outcome to all destinations, failing on the first error
    pub async fn deliver_all(&self, outcome: &RunOutcome) -> ReportResult<()> {
        for destination in &self.destinations {
            destination.deliver(outcome).await?;
            info!(destination = destination.name(), "report delivered");
        }
        Ok(())
    }
}
