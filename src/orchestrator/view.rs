//! Content view derivation.

use crate::model::{ContentView, Job, JobStatus, SCRIPT_STEP, VOICE_STEP};

/// Pick the content panel for the current state.
///
/// Order matters: an approved script advances to the voice view as soon as voice
/// synthesis is done, even if script data is also present.
pub fn derive_view(job: Option<&Job>, script_approved: bool, has_script: bool) -> ContentView {
    let Some(job) = job else {
        return ContentView::Loading;
    };
    if job.status == JobStatus::Completed {
        return ContentView::Result;
    }
    if script_approved && job.step_completed(VOICE_STEP) {
        return ContentView::Voice;
    }
    if job.step_completed(SCRIPT_STEP) && has_script {
        return ContentView::Script;
    }
    ContentView::Loading
}
