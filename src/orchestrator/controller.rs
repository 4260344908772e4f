//! Job lifecycle controller.
//!
//! Owns the job session, the poll timer and every backend request, and emits events for
//! presentation layers. All state is mutated on this task only; requests run as spawned
//! tasks and report back through a completion channel, tagged with the ticket they were
//! issued under.

use super::session::{changed_steps, JobSession, SessionSnapshot, Ticket};
use crate::api::{ApiError, Backend};
use crate::model::{GenerateRequest, InfoEvent, Job, JobEvent, ScriptData, Voice};
use anyhow::{Context, Result};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{Duration, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Commands emitted by UI layers to drive the active job.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Submit(GenerateRequest),
    /// Start tracking an existing job without submitting.
    Track(String),
    ApproveScript,
    ApproveVoice,
    EditScript(String),
    RegenerateVoice,
    SaveVoiceover(PathBuf),
    LoadVoices,
    DismissErrors,
    Reset,
    Quit,
}

/// Outcome of a spawned backend request.
enum Completion {
    Submitted {
        ticket: Ticket,
        result: Result<String, ApiError>,
    },
    Snapshot {
        ticket: Ticket,
        initial: bool,
        result: Result<Job, ApiError>,
    },
    Script {
        ticket: Ticket,
        result: Result<Option<ScriptData>, ApiError>,
    },
    Approved {
        ticket: Ticket,
        what: &'static str,
        result: Result<(), ApiError>,
    },
    Edited {
        ticket: Ticket,
        result: Result<(), ApiError>,
    },
    Regenerated {
        ticket: Ticket,
        result: Result<(), ApiError>,
    },
    Voices(Result<Vec<Voice>, ApiError>),
    VoiceoverSaved {
        ticket: Ticket,
        result: Result<PathBuf>,
    },
}

/// The repeating poll, bound to the epoch of the job it was started for.
struct PollTimer {
    epoch: u64,
    interval: Interval,
}

struct Controller {
    backend: Arc<dyn Backend>,
    poll_interval: Duration,
    session: JobSession,
    done_tx: UnboundedSender<Completion>,
    event_tx: UnboundedSender<JobEvent>,
    last_snapshot: Option<SessionSnapshot>,
}

impl Controller {
    fn emit(&self, ev: JobEvent) {
        let _ = self.event_tx.send(ev);
    }

    fn info(&self, ev: InfoEvent) {
        self.emit(JobEvent::Info(ev));
    }

    /// Run a request off the controller task and route its outcome back.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let _ = done_tx.send(fut.await);
        });
    }

    fn fetch_job(&self, ticket: Ticket, job_id: String, initial: bool) {
        let backend = self.backend.clone();
        self.spawn(async move {
            let result = backend.get_job(&job_id).await;
            Completion::Snapshot {
                ticket,
                initial,
                result,
            }
        });
    }

    fn fetch_script(&self) {
        let Some(job_id) = self.session.job_id().map(str::to_string) else {
            return;
        };
        let ticket = self.session.ticket();
        let backend = self.backend.clone();
        debug!(%job_id, "fetching script");
        self.spawn(async move {
            let result = backend.get_script(&job_id).await;
            Completion::Script { ticket, result }
        });
    }

    fn poll_tick(&self) {
        if let Some(job_id) = self.session.job_id() {
            debug!(%job_id, "poll");
            self.fetch_job(self.session.ticket(), job_id.to_string(), false);
        }
    }

    fn handle_command(&mut self, cmd: UiCommand) {
        match cmd {
            UiCommand::Submit(req) => {
                let req = match req.validated() {
                    Ok(r) => r,
                    Err(e) => {
                        warn!(error = %e, "submission rejected");
                        self.info(InfoEvent::Message(format!("Cannot submit: {e}")));
                        return;
                    }
                };
                let ticket = self.session.begin_submit();
                info!(title = %req.title, "submitting generation request");
                self.info(InfoEvent::Submitting {
                    title: req.title.clone(),
                });
                let backend = self.backend.clone();
                self.spawn(async move {
                    let result = backend.generate(&req).await;
                    Completion::Submitted { ticket, result }
                });
            }
            UiCommand::Track(job_id) => {
                let ticket = self.session.begin_submit();
                info!(%job_id, "tracking existing job");
                self.info(InfoEvent::Tracking {
                    job_id: job_id.clone(),
                });
                self.fetch_job(ticket, job_id, true);
            }
            UiCommand::ApproveScript => {
                if let Some((ticket, job_id)) = self.session.approve_script() {
                    info!(%job_id, "script approved");
                    let backend = self.backend.clone();
                    self.spawn(async move {
                        let result = backend.approve_script(&job_id).await;
                        Completion::Approved {
                            ticket,
                            what: "Script",
                            result,
                        }
                    });
                }
            }
            UiCommand::ApproveVoice => {
                if let Some((ticket, job_id)) = self.session.approve_voice() {
                    info!(%job_id, "voiceover approved");
                    let backend = self.backend.clone();
                    self.spawn(async move {
                        let result = backend.approve_voice(&job_id).await;
                        Completion::Approved {
                            ticket,
                            what: "Voice",
                            result,
                        }
                    });
                }
            }
            UiCommand::EditScript(instruction) => match self.session.begin_edit(&instruction) {
                Ok(Some((ticket, job_id, instruction))) => {
                    info!(%job_id, %instruction, "requesting script edit");
                    let backend = self.backend.clone();
                    self.spawn(async move {
                        let result = backend.edit_script(&job_id, &instruction).await;
                        Completion::Edited { ticket, result }
                    });
                }
                Ok(None) => debug!("edit ignored: no job or edit already running"),
                Err(e) => self.session.set_notice(e.to_string()),
            },
            UiCommand::RegenerateVoice => {
                if let Some((ticket, job_id)) = self.session.begin_regenerate() {
                    info!(%job_id, "requesting voice regeneration");
                    let backend = self.backend.clone();
                    self.spawn(async move {
                        let result = backend.regenerate_voice(&job_id).await;
                        Completion::Regenerated { ticket, result }
                    });
                }
            }
            UiCommand::SaveVoiceover(path) => {
                let Some(job_id) = self.session.job_id().map(str::to_string) else {
                    return;
                };
                let ticket = self.session.ticket();
                let backend = self.backend.clone();
                self.spawn(async move {
                    let result = save_voiceover(backend.as_ref(), &job_id, path).await;
                    Completion::VoiceoverSaved { ticket, result }
                });
            }
            UiCommand::LoadVoices => {
                let backend = self.backend.clone();
                self.spawn(async move { Completion::Voices(backend.list_voices().await) });
            }
            UiCommand::DismissErrors => self.session.dismiss_errors(),
            UiCommand::Reset => {
                info!("session reset");
                self.session.reset();
            }
            // Handled by the run loop.
            UiCommand::Quit => {}
        }
    }

    fn handle_completion(&mut self, done: Completion) {
        match done {
            Completion::Submitted { ticket, result } => match result {
                Ok(job_id) => {
                    if ticket.epoch != self.session.ticket().epoch {
                        debug!(%job_id, "submission superseded");
                        return;
                    }
                    info!(%job_id, "job created");
                    self.info(InfoEvent::Tracking {
                        job_id: job_id.clone(),
                    });
                    self.fetch_job(ticket, job_id, true);
                }
                Err(e) => {
                    warn!(error = %e, "submission failed");
                    self.session.submit_failed(ticket, e.to_string());
                }
            },
            Completion::Snapshot {
                ticket,
                initial,
                result,
            } => match result {
                Ok(job) => self.apply_snapshot(ticket, job),
                Err(e) if initial => {
                    warn!(error = %e, "could not load job");
                    self.session.submit_failed(ticket, e.to_string());
                }
                // Transient: the next tick retries.
                Err(e) => debug!(error = %e, "poll failed"),
            },
            Completion::Script { ticket, result } => match result {
                Ok(script) => {
                    if self.session.apply_script(ticket, script) {
                        info!("script received");
                    }
                }
                Err(e) => {
                    debug!(error = %e, "script fetch failed");
                    self.session.script_fetch_failed(ticket);
                }
            },
            Completion::Approved {
                ticket,
                what,
                result,
            } => {
                if let Err(e) = result {
                    warn!(error = %e, "{what} approval failed");
                    self.session.approval_failed(ticket, what, &e.to_string());
                }
            }
            Completion::Edited { ticket, result } => {
                if let Err(e) = &result {
                    warn!(error = %e, "script edit failed");
                }
                self.session
                    .finish_edit(ticket, result.map_err(|e| e.to_string()));
            }
            Completion::Regenerated { ticket, result } => {
                if let Err(e) = &result {
                    warn!(error = %e, "voice regeneration failed");
                }
                self.session
                    .finish_regenerate(ticket, result.map_err(|e| e.to_string()));
            }
            Completion::Voices(result) => {
                let voices = result.unwrap_or_else(|e| {
                    warn!(error = %e, "could not load voices");
                    Vec::new()
                });
                debug!(count = voices.len(), "voices loaded");
                self.emit(JobEvent::VoicesLoaded(voices));
            }
            Completion::VoiceoverSaved { ticket, result } => {
                if ticket.epoch != self.session.ticket().epoch {
                    return;
                }
                match result {
                    Ok(path) => {
                        info!(path = %path.display(), "voiceover saved");
                        self.emit(JobEvent::VoiceoverSaved(path));
                    }
                    Err(e) => self.session.set_notice(format!("Save voiceover failed: {e:#}")),
                }
            }
        }
    }

    fn apply_snapshot(&mut self, ticket: Ticket, job: Job) {
        let prev = self.session.job().cloned();
        let Some(outcome) = self.session.apply_job(ticket, job) else {
            debug!("stale snapshot dropped");
            return;
        };
        if let Some(current) = self.session.job() {
            for step in changed_steps(prev.as_ref(), current) {
                let _ = self.event_tx.send(JobEvent::Info(InfoEvent::StepChanged {
                    step: step.step,
                    name: step.name.clone(),
                    status: step.status,
                }));
            }
        }
        if outcome.fetch_script {
            self.fetch_script();
        }
        if outcome.finished {
            if let Some(job) = self.session.job() {
                info!(job_id = %job.job_id, status = job.status.as_str(), "job finished");
                self.emit(JobEvent::JobFinished {
                    job: Box::new(job.clone()),
                });
            }
        }
    }

    /// Send a snapshot if anything changed since the last one.
    fn publish(&mut self) {
        let snap = self.session.snapshot();
        if self.last_snapshot.as_ref() == Some(&snap) {
            return;
        }
        let prev_view = self.last_snapshot.as_ref().map(|s| s.view);
        if prev_view != Some(snap.view) && snap.job.is_some() {
            self.info(InfoEvent::ViewChanged { view: snap.view });
        }
        self.emit(JobEvent::Snapshot(Box::new(snap.clone())));
        self.last_snapshot = Some(snap);
    }
}

async fn save_voiceover(backend: &dyn Backend, job_id: &str, path: PathBuf) -> Result<PathBuf> {
    let audio = backend
        .fetch_voice_audio(job_id)
        .await
        .context("fetch voiceover audio")?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    tokio::fs::write(&path, &audio)
        .await
        .with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Keep exactly one timer, bound to the active job; drop it once nothing needs polling.
fn sync_poll(timer: &mut Option<PollTimer>, session: &JobSession, period: Duration) {
    if !session.is_polling() {
        if timer.take().is_some() {
            debug!("polling stopped");
        }
        return;
    }
    let epoch = session.ticket().epoch;
    if timer.as_ref().map(|t| t.epoch) != Some(epoch) {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        *timer = Some(PollTimer { epoch, interval });
        debug!(?period, "polling started");
    }
}

/// Drive the job session from UI commands until quit, emitting events back to presentation layers.
pub(crate) async fn run_controller(
    backend: Arc<dyn Backend>,
    poll_interval: Duration,
    event_tx: UnboundedSender<JobEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();
    let mut ctl = Controller {
        backend,
        poll_interval,
        session: JobSession::new(),
        done_tx,
        event_tx,
        last_snapshot: None,
    };
    let mut timer: Option<PollTimer> = None;
    ctl.publish();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(UiCommand::Quit) | None => break,
                Some(cmd) => ctl.handle_command(cmd),
            },
            Some(done) = done_rx.recv() => ctl.handle_completion(done),
            _ = async {
                match timer.as_mut() {
                    Some(t) => {
                        t.interval.tick().await;
                    }
                    None => futures::future::pending::<()>().await,
                }
            } => ctl.poll_tick(),
        }
        sync_poll(&mut timer, &ctl.session, ctl.poll_interval);
        ctl.publish();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_POLL_INTERVAL;
    use crate::model::{ContentView, JobResult, JobStatus, StepStatus::*};
    use crate::orchestrator::tests_support::{job_with, script, steps, FakeBackend};
    use tokio::task::JoinHandle;

    struct Harness {
        backend: Arc<FakeBackend>,
        cmd_tx: UnboundedSender<UiCommand>,
        event_rx: UnboundedReceiver<JobEvent>,
        handle: JoinHandle<Result<()>>,
        last: Option<SessionSnapshot>,
        events: Vec<JobEvent>,
    }

    impl Harness {
        fn start() -> Self {
            let backend = Arc::new(FakeBackend::default());
            let (event_tx, event_rx) = mpsc::unbounded_channel();
            let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
            let handle = tokio::spawn(run_controller(
                backend.clone(),
                DEFAULT_POLL_INTERVAL,
                event_tx,
                cmd_rx,
            ));
            Self {
                backend,
                cmd_tx,
                event_rx,
                handle,
                last: None,
                events: Vec::new(),
            }
        }

        fn drain(&mut self) {
            while let Ok(ev) = self.event_rx.try_recv() {
                if let JobEvent::Snapshot(s) = &ev {
                    self.last = Some((**s).clone());
                }
                self.events.push(ev);
            }
        }

        async fn send(&mut self, cmd: UiCommand) {
            self.cmd_tx.send(cmd).unwrap();
            self.wait(Duration::from_millis(10)).await;
        }

        async fn wait(&mut self, d: Duration) {
            tokio::time::sleep(d).await;
            self.drain();
        }

        async fn next_poll(&mut self) {
            self.wait(DEFAULT_POLL_INTERVAL + Duration::from_millis(100)).await;
        }

        fn snap(&self) -> &SessionSnapshot {
            self.last.as_ref().unwrap()
        }

        async fn quit(self) {
            self.cmd_tx.send(UiCommand::Quit).unwrap();
            self.handle.await.unwrap().unwrap();
        }
    }

    fn request() -> GenerateRequest {
        GenerateRequest {
            title: "Dam".into(),
            prompt: "A documentary about the dam".into(),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn full_review_flow_reaches_result() {
        let mut h = Harness::start();
        h.backend
            .set_job(job_with(JobStatus::Running, steps(&[Completed, Running])));

        h.send(UiCommand::Submit(request())).await;
        assert_eq!(h.backend.calls(), vec!["generate Dam"]);
        assert_eq!(h.snap().job.as_ref().unwrap().job_id, "J1");
        assert_eq!(h.snap().view, ContentView::Loading);
        assert!(h.snap().polling);

        h.backend
            .set_job(job_with(JobStatus::Running, steps(&[Completed, Completed])));
        *h.backend.script.lock().unwrap() = Some(script());
        h.next_poll().await;
        assert_eq!(h.snap().view, ContentView::Script);
        assert_eq!(h.snap().script.as_ref().unwrap().text, "Hello world");

        h.send(UiCommand::ApproveScript).await;
        assert!(h.snap().script_approved);
        assert!(h.backend.calls().contains(&"approve-script J1".to_string()));

        h.backend.set_job(job_with(
            JobStatus::Running,
            steps(&[Completed, Completed, Completed]),
        ));
        h.next_poll().await;
        assert_eq!(h.snap().view, ContentView::Voice);

        h.send(UiCommand::ApproveVoice).await;
        assert!(h.snap().voice_approved);

        let mut done = job_with(JobStatus::Completed, steps(&[Completed; 7]));
        done.result = Some(JobResult {
            final_video: Some("/api/download/J1/final.mp4".into()),
            ..Default::default()
        });
        h.backend.set_job(done);
        h.next_poll().await;
        assert_eq!(h.snap().view, ContentView::Result);
        assert!(!h.snap().polling);
        assert!(h
            .events
            .iter()
            .any(|e| matches!(e, JobEvent::JobFinished { .. })));

        let fetches = h.backend.job_fetches();
        h.wait(DEFAULT_POLL_INTERVAL * 10).await;
        assert_eq!(h.backend.job_fetches(), fetches);
        h.quit().await;
    }

    #[tokio::test(start_paused = true)]
    async fn edit_falls_back_to_loading_until_script_returns() {
        let mut h = Harness::start();
        h.backend
            .set_job(job_with(JobStatus::Running, steps(&[Completed, Completed])));
        *h.backend.script.lock().unwrap() = Some(script());
        h.send(UiCommand::Submit(request())).await;
        assert_eq!(h.snap().view, ContentView::Script);

        *h.backend.action_error.lock().unwrap() = Some("Script not found".into());
        h.send(UiCommand::ApproveScript).await;
        h.send(UiCommand::EditScript("make it shorter".into())).await;
        assert!(h
            .backend
            .calls()
            .contains(&"edit J1 make it shorter".to_string()));
        let snap = h.snap();
        assert!(snap.script.is_none());
        assert!(!snap.script_approved);
        assert!(!snap.editing);
        assert_eq!(snap.view, ContentView::Loading);
        assert_eq!(
            snap.notice.as_deref(),
            Some("Script edit failed: Script not found")
        );

        h.next_poll().await;
        assert_eq!(h.snap().view, ContentView::Script);
        h.quit().await;
    }

    #[tokio::test(start_paused = true)]
    async fn late_edit_after_reset_does_not_touch_the_new_job() {
        let mut h = Harness::start();
        h.backend
            .set_job(job_with(JobStatus::Running, steps(&[Completed, Completed])));
        *h.backend.script.lock().unwrap() = Some(script());
        h.send(UiCommand::Submit(request())).await;
        assert_eq!(h.snap().view, ContentView::Script);

        *h.backend.action_delay.lock().unwrap() = Some(Duration::from_secs(5));
        h.send(UiCommand::EditScript("make it shorter".into())).await;
        assert!(h.snap().editing);

        h.send(UiCommand::Reset).await;
        assert!(h.snap().job.is_none());
        assert!(!h.snap().editing);

        h.send(UiCommand::Submit(request())).await;
        assert_eq!(h.snap().view, ContentView::Script);
        let script_fetches = h.backend.script_fetches();

        h.wait(Duration::from_secs(6)).await;
        assert!(h
            .backend
            .calls()
            .contains(&"edit J1 make it shorter".to_string()));
        let snap = h.snap();
        assert_eq!(snap.view, ContentView::Script);
        assert!(snap.script.is_some());
        assert!(!snap.editing);
        assert!(snap.notice.is_none());
        assert_eq!(h.backend.script_fetches(), script_fetches);
        h.quit().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_job_gets_one_final_script_fetch() {
        let mut h = Harness::start();
        h.backend
            .set_job(job_with(JobStatus::Running, steps(&[Completed, Running])));
        h.send(UiCommand::Track("J1".into())).await;
        h.next_poll().await;
        assert_eq!(h.backend.script_fetches(), 0);

        h.backend
            .set_job(job_with(JobStatus::Failed, steps(&[Completed, Failed])));
        h.next_poll().await;
        assert!(!h.snap().polling);
        assert_eq!(h.backend.script_fetches(), 1);

        h.wait(DEFAULT_POLL_INTERVAL * 4).await;
        assert_eq!(h.backend.script_fetches(), 1);
        h.quit().await;
    }

    #[tokio::test(start_paused = true)]
    async fn reset_stops_polling() {
        let mut h = Harness::start();
        h.backend
            .set_job(job_with(JobStatus::Running, steps(&[Completed, Running])));
        h.send(UiCommand::Submit(request())).await;
        h.wait(DEFAULT_POLL_INTERVAL * 4).await;
        assert!(h.backend.job_fetches() >= 4);

        h.send(UiCommand::Reset).await;
        assert!(h.snap().job.is_none());
        assert!(!h.snap().polling);
        let fetches = h.backend.job_fetches();
        h.wait(DEFAULT_POLL_INTERVAL * 20).await;
        assert_eq!(h.backend.job_fetches(), fetches);
        h.quit().await;
    }

    #[tokio::test(start_paused = true)]
    async fn resubmit_keeps_a_single_poll_stream() {
        let mut h = Harness::start();
        h.backend
            .set_job(job_with(JobStatus::Running, steps(&[Completed, Running])));
        h.send(UiCommand::Submit(request())).await;
        h.send(UiCommand::Submit(request())).await;
        let before = h.backend.job_fetches();
        h.wait(DEFAULT_POLL_INTERVAL * 4 + Duration::from_millis(100)).await;
        assert_eq!(h.backend.job_fetches() - before, 4);
        h.quit().await;
    }

    #[tokio::test(start_paused = true)]
    async fn submission_failure_leaves_no_job() {
        let mut h = Harness::start();
        *h.backend.generate_error.lock().unwrap() = Some("PEXELS_API_KEY not configured".into());
        h.send(UiCommand::Submit(request())).await;
        assert_eq!(
            h.snap().submit_error.as_deref(),
            Some("PEXELS_API_KEY not configured")
        );
        assert!(h.snap().job.is_none());
        assert!(!h.snap().loading);
        h.wait(DEFAULT_POLL_INTERVAL * 3).await;
        assert_eq!(h.backend.job_fetches(), 0);

        h.send(UiCommand::DismissErrors).await;
        assert!(h.snap().submit_error.is_none());
        h.quit().await;
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_request_never_reaches_backend() {
        let mut h = Harness::start();
        let req = GenerateRequest {
            title: "   ".into(),
            ..request()
        };
        h.send(UiCommand::Submit(req)).await;
        assert!(h.backend.calls().is_empty());
        assert!(h.events.iter().any(|e| matches!(
            e,
            JobEvent::Info(InfoEvent::Message(m)) if m.contains("title is required")
        )));
        h.quit().await;
    }

    #[tokio::test(start_paused = true)]
    async fn transient_poll_failures_are_silent() {
        let mut h = Harness::start();
        h.backend
            .set_job(job_with(JobStatus::Running, steps(&[Completed, Running])));
        h.send(UiCommand::Track("J1".into())).await;
        assert!(h.snap().polling);

        *h.backend.job.lock().unwrap() = None;
        h.next_poll().await;
        h.next_poll().await;
        assert!(h.snap().job.is_some());
        assert!(h.snap().submit_error.is_none());

        h.backend
            .set_job(job_with(JobStatus::Running, steps(&[Completed, Completed])));
        h.next_poll().await;
        assert!(h.snap().job.as_ref().unwrap().step_completed(2));
        h.quit().await;
    }

    #[tokio::test(start_paused = true)]
    async fn regenerate_and_save_voiceover() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = Harness::start();
        h.backend.set_job(job_with(
            JobStatus::Running,
            steps(&[Completed, Completed, Completed]),
        ));
        h.send(UiCommand::Track("J1".into())).await;
        h.send(UiCommand::ApproveVoice).await;
        h.send(UiCommand::RegenerateVoice).await;
        assert!(h.backend.calls().contains(&"regenerate J1".to_string()));
        assert!(!h.snap().voice_approved);
        assert!(!h.snap().regenerating);

        let out = dir.path().join("voice").join("J1.mp3");
        h.send(UiCommand::SaveVoiceover(out.clone())).await;
        // File I/O runs on the blocking pool; give it real time to land.
        for _ in 0..50 {
            if h.events.iter().any(|e| matches!(e, JobEvent::VoiceoverSaved(_))) {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
            h.wait(Duration::from_millis(10)).await;
        }
        assert_eq!(std::fs::read(&out).unwrap(), b"ID3");
        h.quit().await;
    }
}
