use std::fs;
use std::path::Path;

use log::info;

use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupOutcome {
    Removed,
    Kept,
    Absent,
}

/// Deletes the temporary extraction directory when `enabled`.
pub fn cleanup(dir: &Path, enabled: bool) -> Result<CleanupOutcome, PipelineError> {
    if !enabled {
        let shown = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        info!("Temporary folder was NOT deleted at: {}", shown.display());
        return Ok(CleanupOutcome::Kept);
    }
    if !dir.exists() {
        return Ok(CleanupOutcome::Absent);
    }

    info!("Deleting temporary folder...");
    fs::remove_dir_all(dir)?;
    info!("Cleanup successful.");
    Ok(CleanupOutcome::Removed)
}
