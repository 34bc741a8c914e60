//! Filesystem artifact destination

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use towline_engine::RunOutcome;

use crate::destination::ReportDestination;
use crate::error::ReportResult;

/// Writes the run outcome as a JSON artifact
#[derive(Debug)]
pub struct FilesystemDestination {
    path: PathBuf,
    pretty: bool,
}

impl FilesystemDestination {
    pub fn new(path: PathBuf, pretty: bool) -> Self {
        Self { path, pretty }
    }
}

#[async_trait]
impl ReportDestination for FilesystemDestination {
    fn name(&self) -> &'static str {
        "filesystem"
    }

    async fn deliver(&self, outcome: &RunOutcome) -> ReportResult<()> {
        let body = if self.pretty {
            serde_json::to_vec_pretty(outcome)?
        } else {
            serde_json::to_vec(outcome)?
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, body).await?;
        debug!(path = %self.path.display(), "artifact written");
        Ok(())
    }
}
