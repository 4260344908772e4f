//! Client-visible lifecycle of one generation job.
//!
//! `JobSession` is a plain state machine: it never performs I/O. The controller asks it
//! what to request next, performs the request, and feeds the outcome back together with
//! the [`Ticket`] it was issued. Outcomes carrying an outdated ticket are dropped, which
//! keeps late completions from a reset or superseded job from touching current state.

use super::view::derive_view;
use crate::model::{
    ContentView, Job, PipelineStep, ScriptData, StepStatus, ValidationError, SCRIPT_STEP,
};

/// Identity of the state a request was issued against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    /// Bumped whenever the active job is replaced or discarded.
    pub epoch: u64,
    /// Bumped whenever cached script data is discarded.
    pub script_rev: u64,
}

/// What the controller should do after a job snapshot was applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollOutcome {
    pub fetch_script: bool,
    /// The job just reached `completed` or `failed`.
    pub finished: bool,
}

/// Read-only copy of session state handed to presentation layers.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub job: Option<Job>,
    pub view: ContentView,
    pub loading: bool,
    pub submit_error: Option<String>,
    pub notice: Option<String>,
    pub script: Option<ScriptData>,
    pub script_approved: bool,
    pub voice_approved: bool,
    pub editing: bool,
    pub regenerating: bool,
    pub polling: bool,
}

#[derive(Debug, Default)]
pub struct JobSession {
    job: Option<Job>,
    loading: bool,
    submit_error: Option<String>,
    notice: Option<String>,
    script: Option<ScriptData>,
    script_in_flight: bool,
    script_approved: bool,
    voice_approved: bool,
    editing: bool,
    regenerating: bool,
    epoch: u64,
    script_rev: u64,
}

impl JobSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket(&self) -> Ticket {
        Ticket {
            epoch: self.epoch,
            script_rev: self.script_rev,
        }
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        ticket.epoch == self.epoch
    }

    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job.as_ref().map(|j| j.job_id.as_str())
    }

    /// A job is tracked and has not reached a terminal status.
    pub fn is_polling(&self) -> bool {
        self.job
            .as_ref()
            .map(|j| !j.status.is_terminal())
            .unwrap_or(false)
    }

    pub fn view(&self) -> ContentView {
        derive_view(self.job.as_ref(), self.script_approved, self.script.is_some())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            job: self.job.clone(),
            view: self.view(),
            loading: self.loading,
            submit_error: self.submit_error.clone(),
            notice: self.notice.clone(),
            script: self.script.clone(),
            script_approved: self.script_approved,
            voice_approved: self.voice_approved,
            editing: self.editing,
            regenerating: self.regenerating,
            polling: self.is_polling(),
        }
    }

    fn clear_script(&mut self) {
        self.script = None;
        self.script_in_flight = false;
        self.script_rev += 1;
        self.script_approved = false;
        self.voice_approved = false;
    }

    /// Forget everything and invalidate all outstanding requests.
    pub fn reset(&mut self) {
        let epoch = self.epoch + 1;
        let script_rev = self.script_rev + 1;
        *self = Self {
            epoch,
            script_rev,
            ..Self::default()
        };
    }

    /// Start a submission (or resume): drop the previous job entirely and mark loading.
    pub fn begin_submit(&mut self) -> Ticket {
        self.reset();
        self.loading = true;
        self.ticket()
    }

    /// Submission or its initial snapshot fetch failed; no job stays active.
    pub fn submit_failed(&mut self, ticket: Ticket, message: impl Into<String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.job = None;
        self.loading = false;
        self.submit_error = Some(message.into());
        true
    }

    /// Apply a freshly received job snapshot. Returns `None` if the ticket is stale.
    pub fn apply_job(&mut self, ticket: Ticket, job: Job) -> Option<PollOutcome> {
        if !self.is_current(ticket) {
            return None;
        }
        if let Some(current) = self.job.as_ref() {
            if current.job_id != job.job_id {
                return None;
            }
        }

        let was_terminal = self
            .job
            .as_ref()
            .map(|j| j.status.is_terminal())
            .unwrap_or(false);
        let script_status = job.step_status(SCRIPT_STEP);
        let terminal = job.status.is_terminal();
        self.job = Some(job);

        let mut outcome = PollOutcome::default();
        if script_status == Some(StepStatus::Completed) && self.script.is_none() {
            outcome.fetch_script = true;
        }
        // Script generation running again means an edit is being applied.
        if script_status == Some(StepStatus::Running) {
            self.clear_script();
        }
        if terminal {
            self.loading = false;
            outcome.finished = !was_terminal;
            if self.script.is_none() {
                outcome.fetch_script = true;
            }
        }

        if outcome.fetch_script {
            if self.script_in_flight {
                outcome.fetch_script = false;
            } else {
                self.script_in_flight = true;
            }
        }
        Some(outcome)
    }

    /// Apply a script fetch result. Stale or empty results are ignored.
    pub fn apply_script(&mut self, ticket: Ticket, script: Option<ScriptData>) -> bool {
        if !self.is_current(ticket) || ticket.script_rev != self.script_rev {
            return false;
        }
        self.script_in_flight = false;
        match script {
            Some(s) => {
                self.script = Some(s);
                true
            }
            None => false,
        }
    }

    /// A script fetch failed; allow the next poll to try again.
    pub fn script_fetch_failed(&mut self, ticket: Ticket) {
        if self.is_current(ticket) && ticket.script_rev == self.script_rev {
            self.script_in_flight = false;
        }
    }

    /// Optimistically approve the script. Returns the job to notify, if any.
    pub fn approve_script(&mut self) -> Option<(Ticket, String)> {
        let job_id = self.job_id()?.to_string();
        self.script_approved = true;
        Some((self.ticket(), job_id))
    }

    /// Optimistically approve the voiceover. Returns the job to notify, if any.
    pub fn approve_voice(&mut self) -> Option<(Ticket, String)> {
        let job_id = self.job_id()?.to_string();
        self.voice_approved = true;
        Some((self.ticket(), job_id))
    }

    /// An approval call failed. The local flag stays set; the failure is only reported.
    pub fn approval_failed(&mut self, ticket: Ticket, what: &str, message: &str) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.notice = Some(format!("{what} approval failed: {message}"));
        true
    }

    /// Validate an edit instruction and mark the edit in flight.
    ///
    /// `Ok(None)` means there is nothing to edit (no job, or an edit already running).
    pub fn begin_edit(
        &mut self,
        instruction: &str,
    ) -> Result<Option<(Ticket, String, String)>, ValidationError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(ValidationError::EmptyInstruction);
        }
        if self.editing {
            return Ok(None);
        }
        let Some(job_id) = self.job_id().map(str::to_string) else {
            return Ok(None);
        };
        self.editing = true;
        Ok(Some((self.ticket(), job_id, instruction.to_string())))
    }

    /// Edit request finished. Script and approvals are dropped whatever the outcome.
    pub fn finish_edit(&mut self, ticket: Ticket, result: Result<(), String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.clear_script();
        self.editing = false;
        if let Err(message) = result {
            self.notice = Some(format!("Script edit failed: {message}"));
        }
        true
    }

    /// Mark voice regeneration in flight. `None` when there is no job or one is running.
    pub fn begin_regenerate(&mut self) -> Option<(Ticket, String)> {
        if self.regenerating {
            return None;
        }
        let job_id = self.job_id()?.to_string();
        self.regenerating = true;
        Some((self.ticket(), job_id))
    }

    pub fn finish_regenerate(&mut self, ticket: Ticket, result: Result<(), String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        match result {
            Ok(()) => self.voice_approved = false,
            Err(message) => self.notice = Some(format!("Voice regeneration failed: {message}")),
        }
        self.regenerating = false;
        true
    }

    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    pub fn dismiss_errors(&mut self) {
        self.submit_error = None;
        self.notice = None;
    }
}

/// Steps whose status differs between two snapshots of the same job.
pub fn changed_steps<'a>(prev: Option<&Job>, next: &'a Job) -> Vec<&'a PipelineStep> {
    next.steps
        .iter()
        .filter(|step| {
            prev.and_then(|p| p.step_status(step.step)) != Some(step.status)
        })
        .collect()
}

#[cfg(test)]
impl JobSession {
    pub fn script(&self) -> Option<&ScriptData> {
        self.script.as_ref()
    }

    pub fn script_approved(&self) -> bool {
        self.script_approved
    }

    pub fn voice_approved(&self) -> bool {
        self.voice_approved
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn is_regenerating(&self) -> bool {
        self.regenerating
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}
