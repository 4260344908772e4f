//! Text summary builder for CLI output.
//!
//! Formats human-readable lines for pipeline progress and job deliverables.

use crate::model::{Job, JobStatus, PipelineStep, ScriptData, StepStatus};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// `"{m}m {s}s"`; missing or zero durations are omitted.
pub(crate) fn format_duration(seconds: Option<f64>) -> Option<String> {
    let seconds = seconds.filter(|s| *s > 0.0 && s.is_finite())?;
    let m = (seconds / 60.0).floor() as u64;
    let mut s = (seconds % 60.0).round() as u64;
    let m = if s == 60 {
        s = 0;
        m + 1
    } else {
        m
    };
    Some(format!("{m}m {s}s"))
}

/// One line per step, e.g. `[✓] 2. Script Writing: Script ready (1,512 words)`.
pub(crate) fn step_line(step: &PipelineStep) -> String {
    let marker = match step.status {
        StepStatus::Completed => "✓",
        StepStatus::Running => "…",
        StepStatus::Failed => "✗",
        StepStatus::Skipped => "-",
        StepStatus::Pending => " ",
    };
    match step.message.as_deref().filter(|m| !m.is_empty()) {
        Some(msg) => format!("[{marker}] {}. {}: {}", step.step, step.name, msg),
        None => format!("[{marker}] {}. {}", step.step, step.name),
    }
}

/// Overall progress, e.g. `3/7 steps (43%)`.
pub(crate) fn progress_line(job: &Job) -> String {
    let done = job
        .steps
        .iter()
        .filter(|s| s.status == StepStatus::Completed)
        .count();
    format!(
        "{}/{} steps ({:.0}%)",
        done,
        job.steps.len(),
        job.progress() * 100.0
    )
}

/// Script header plus body for review in text mode.
pub(crate) fn script_lines(script: &ScriptData) -> Vec<String> {
    let mut lines = vec![format!(
        "Script: {} words, {} scenes",
        script.total_word_count, script.scenes
    )];
    lines.push(String::new());
    lines.extend(script.text.lines().map(str::to_string));
    lines
}

/// Build the deliverables summary for a finished job.
pub(crate) fn build_result_summary(job: &Job, resolve_link: impl Fn(&str) -> String) -> TextSummary {
    let mut lines = vec![format!("Job {}: {}", job.job_id, job.status.as_str())];

    if job.status == JobStatus::Failed {
        lines.push(format!(
            "Error: {}",
            job.error.as_deref().unwrap_or("pipeline failed")
        ));
        for step in job.steps.iter().filter(|s| s.status == StepStatus::Failed) {
            lines.push(step_line(step));
        }
        return TextSummary { lines };
    }

    match job.result.as_ref() {
        Some(result) => {
            if let Some(d) = format_duration(result.duration_seconds) {
                lines.push(format!("Total duration: {d}"));
            }
            for (label, href) in result.deliverables() {
                lines.push(format!("{label}: {}", resolve_link(href)));
            }
        }
        None => lines.push("Loading results…".to_string()),
    }

    TextSummary { lines }
}
