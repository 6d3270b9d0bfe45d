//! Running the external publish tool.

use crate::error::{Error, Result};
use crate::paths::{find_tool, WorkDir};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::info;

/// Default publish tool.
pub const DEFAULT_TOOL: &str = "npm";

/// A located publish tool, run as `<tool> publish --registry <url>`.
#[derive(Debug, Clone)]
pub struct PublishTool {
    name: String,
    program: PathBuf,
}

impl PublishTool {
    /// Locate `name` on `PATH`, or at `name` itself if it is a path.
    pub fn locate(name: &str) -> Result<Self> {
        let program = find_tool(name)?;
        Ok(PublishTool {
            name: name.to_string(),
            program,
        })
    }

    /// Resolved executable path.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Publish the package in `workdir` to `registry`.
    ///
    /// Stdout and stderr are inherited so the tool's own output reaches the user.
    pub async fn publish(&self, workdir: &WorkDir, registry: &str) -> Result<()> {
        info!(tool = %self.program.display(), registry, "running publish");

        let status = tokio::process::Command::new(&self.program)
            .arg("publish")
            .arg("--registry")
            .arg(registry)
            .current_dir(workdir.root())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| Error::SpawnPublish {
                tool: self.name.clone(),
                source: e,
            })?;

        if !status.success() {
            return Err(Error::PublishFailed {
                tool: self.name.clone(),
                status,
            });
        }
        Ok(())
    }
}
