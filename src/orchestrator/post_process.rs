//! Post-job processing utilities.
//!
//! Builds the deliverables summary and writes the snapshot export once a job finishes.

use crate::model::Job;
use crate::text_summary;
use anyhow::{Context, Result};
use std::path::Path;

/// Result of post-job processing, ready for presentation layers.
pub(crate) struct ProcessedJob {
    pub summary: Vec<String>,
    pub export_messages: Vec<String>,
}

/// Summarise a finished job and export its final snapshot when requested.
pub(crate) fn process_job_completion(
    job: &Job,
    export_json: Option<&Path>,
    resolve_link: impl Fn(&str) -> String,
) -> ProcessedJob {
    let summary = text_summary::build_result_summary(job, resolve_link).lines;

    let mut export_messages = Vec::new();
    if let Some(path) = export_json {
        match export_job_json(path, job) {
            Ok(()) => export_messages.push(format!("Exported JSON: {}", path.display())),
            Err(e) => export_messages.push(format!("Export JSON failed: {e:#}")),
        }
    }

    ProcessedJob {
        summary,
        export_messages,
    }
}

/// Write the job snapshot as pretty JSON, creating parent directories as needed.
pub(crate) fn export_job_json(path: &Path, job: &Job) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    let body = serde_json::to_string_pretty(job)?;
    std::fs::write(path, body).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
