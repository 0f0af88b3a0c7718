//! Run namespacing: where a capture writes and what its files are called.
//!
//! Two runs must never share an output directory, so each run lives under
//! `{root}/{timestamp}/{project}/` and its files carry the
//! `{YYYYMMDD}_{project}_job-card` prefix. Batch drivers pass one shared
//! timestamp so every sheet of a batch lands side by side.

use crate::error::JobCardError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `strftime` pattern for run timestamps, e.g. `20261019_143005`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Output directory and filename prefix for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLayout {
    pub output_dir: PathBuf,
    pub prefix: String,
}

/// Build the namespaced layout for `project` under `root`.
///
/// The date part of the prefix is the first eight characters of
/// `timestamp`, so a timestamp in [`TIMESTAMP_FORMAT`] yields `YYYYMMDD`.
pub fn run_layout(root: &Path, timestamp: &str, project: &str) -> Result<RunLayout, JobCardError> {
    validate_component(timestamp, "timestamp")?;
    validate_component(project, "project")?;

    let date: String = timestamp.chars().take(8).collect();
    Ok(RunLayout {
        output_dir: root.join(timestamp).join(project),
        prefix: format!("{date}_{project}_job-card"),
    })
}

/// Reject values that would escape their directory when used in a path.
pub fn validate_component(value: &str, label: &str) -> Result<(), JobCardError> {
    if value.is_empty() {
        return Err(JobCardError::InvalidConfig(format!("{label} must not be empty")));
    }
    if value.contains(['/', '\\']) || value.contains("..") {
        return Err(JobCardError::InvalidConfig(format!(
            "{label} must not contain '/', '\\' or '..' (got '{value}')"
        )));
    }
    Ok(())
}
