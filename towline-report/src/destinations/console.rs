//! Console summary destination

use async_trait::async_trait;

use towline_engine::RunOutcome;

use crate::destination::ReportDestination;
use crate::error::ReportResult;
use crate::render::render_summary;

/// Prints the human-readable run summary to stdout
#[derive(Debug, Default)]
pub struct ConsoleDestination;

impl ConsoleDestination {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReportDestination for ConsoleDestination {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn deliver(&self, outcome: &RunOutcome) -> ReportResult<()> {
        println!("{}", render_summary(outcome));
        Ok(())
    }
}
