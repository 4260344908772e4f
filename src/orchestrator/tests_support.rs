//! Shared fixtures for controller tests.

use crate::api::{ApiError, ApiResult, Backend};
use crate::model::{GenerateRequest, Job, JobStatus, PipelineStep, ScriptData, StepStatus, Voice};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn steps(statuses: &[StepStatus]) -> Vec<PipelineStep> {
    statuses
        .iter()
        .enumerate()
        .map(|(i, status)| PipelineStep {
            step: i as u32 + 1,
            name: format!("Step {}", i + 1),
            description: String::new(),
            status: *status,
            message: None,
            started_at: None,
            completed_at: None,
        })
        .collect()
}

pub fn job_with(status: JobStatus, steps: Vec<PipelineStep>) -> Job {
    Job {
        job_id: "J1".into(),
        status,
        config: serde_json::Value::Null,
        current_step: steps.len() as u32,
        steps,
        result: None,
        error: None,
        created_at: None,
        completed_at: None,
    }
}

pub fn script() -> ScriptData {
    ScriptData {
        text: "Hello world".into(),
        total_word_count: 2,
        scenes: 1,
    }
}

fn status_error(detail: &str) -> ApiError {
    ApiError::Status {
        status: StatusCode::BAD_REQUEST,
        detail: detail.to_string(),
    }
}

/// In-memory backend whose job snapshot is set by the test.
#[derive(Default)]
pub struct FakeBackend {
    pub job: Mutex<Option<Job>>,
    pub script: Mutex<Option<ScriptData>>,
    pub generate_error: Mutex<Option<String>>,
    pub action_error: Mutex<Option<String>>,
    /// Hold review actions (edit, regenerate, approvals) this long before answering.
    pub action_delay: Mutex<Option<Duration>>,
    pub voices: Mutex<Vec<Voice>>,
    pub job_fetches: AtomicUsize,
    pub script_fetches: AtomicUsize,
    pub calls: Mutex<VecDeque<String>>,
}

impl FakeBackend {
    pub fn set_job(&self, job: Job) {
        *self.job.lock().unwrap() = Some(job);
    }

    pub fn job_fetches(&self) -> usize {
        self.job_fetches.load(Ordering::SeqCst)
    }

    pub fn script_fetches(&self) -> usize {
        self.script_fetches.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().cloned().collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push_back(call);
    }

    async fn action(&self, call: String) -> ApiResult<()> {
        self.record(call);
        let delay = *self.action_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.action_error.lock().unwrap().as_deref() {
            Some(detail) => Err(status_error(detail)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn generate(&self, req: &GenerateRequest) -> ApiResult<String> {
        self.record(format!("generate {}", req.title));
        if let Some(detail) = self.generate_error.lock().unwrap().as_deref() {
            return Err(status_error(detail));
        }
        Ok("J1".into())
    }

    async fn get_job(&self, job_id: &str) -> ApiResult<Job> {
        self.job_fetches.fetch_add(1, Ordering::SeqCst);
        self.job
            .lock()
            .unwrap()
            .clone()
            .filter(|j| j.job_id == job_id)
            .ok_or_else(|| ApiError::Status {
                status: StatusCode::NOT_FOUND,
                detail: "Job not found".into(),
            })
    }

    async fn get_script(&self, _job_id: &str) -> ApiResult<Option<ScriptData>> {
        self.script_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.script.lock().unwrap().clone())
    }

    async fn edit_script(&self, job_id: &str, instruction: &str) -> ApiResult<()> {
        self.action(format!("edit {job_id} {instruction}")).await
    }

    async fn regenerate_voice(&self, job_id: &str) -> ApiResult<()> {
        self.action(format!("regenerate {job_id}")).await
    }

    async fn approve_script(&self, job_id: &str) -> ApiResult<()> {
        self.action(format!("approve-script {job_id}")).await
    }

    async fn approve_voice(&self, job_id: &str) -> ApiResult<()> {
        self.action(format!("approve-voice {job_id}")).await
    }

    async fn list_voices(&self) -> ApiResult<Vec<Voice>> {
        Ok(self.voices.lock().unwrap().clone())
    }

    async fn fetch_voice_audio(&self, _job_id: &str) -> ApiResult<Bytes> {
        Ok(Bytes::from_static(b"ID3"))
    }
}
