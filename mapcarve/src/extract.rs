//! External extraction tool wrapper
//!
//! The engine never touches the planet dataset itself; it shells out to an
//! extraction executable with a fixed command contract:
//!
//! ```text
//! <exe> extract <database> <output> --jsonOutput --region <region-file>
//! <exe> query <database> timestamp
//! ```
//!
//! In `--jsonOutput` mode the tool streams one JSON progress object per
//! stdout line; the worker parses those into [`ProgressSnapshot`]s. The
//! timestamp query prints the dataset's last-modified instant on stdout.
//!
//! [`ProgressSnapshot`]: crate::job::ProgressSnapshot

use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::{Child, Command};

/// Errors raised while invoking the extraction tool.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to run extraction tool: {0}")]
    Io(#[from] std::io::Error),

    #[error("timestamp query exited with {status}: {stderr}")]
    QueryFailed {
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Handle to the external extraction executable and its dataset.
#[derive(Debug, Clone)]
pub struct ExtractTool {
    executable: PathBuf,
    database: PathBuf,
}

impl ExtractTool {
    pub fn new(executable: impl Into<PathBuf>, database: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            database: database.into(),
        }
    }

    /// The extraction executable path.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// The planet dataset path.
    pub fn database(&self) -> &Path {
        &self.database
    }

    /// Spawns an extraction with piped stdout for progress streaming.
    ///
    /// The tool's stderr is discarded. The child is killed if its handle is
    /// dropped before it exits, so an abandoned runtime does not leak
    /// extractions.
    pub fn spawn_extract(&self, output: &Path, region_file: &Path) -> Result<Child, ExtractError> {
        let child = Command::new(&self.executable)
            .arg("extract")
            .arg(&self.database)
            .arg(output)
            .arg("--jsonOutput")
            .arg("--region")
            .arg(region_file)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        Ok(child)
    }

    /// Queries the dataset's timestamp, returning trimmed stdout.
    pub async fn query_timestamp(&self) -> Result<String, ExtractError> {
        let output = Command::new(&self.executable)
            .arg("query")
            .arg(&self.database)
            .arg("timestamp")
            .output()
            .await?;

        if !output.status.success() {
            return Err(ExtractError::QueryFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
