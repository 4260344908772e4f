//! REST collaborator for the generation backend.
//!
//! The controller only talks to the backend through [`Backend`], so tests can swap in
//! an in-memory fake while the binary uses [`ApiClient`].

mod error;

pub use error::ApiError;

use crate::config::ClientConfig;
use crate::model::{GenerateRequest, Job, ScriptData, Voice};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use url::Url;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[async_trait]
pub trait Backend: Send + Sync {
    /// POST `/generate`; returns the new job id.
    async fn generate(&self, req: &GenerateRequest) -> ApiResult<String>;
    /// GET `/jobs/{id}`.
    async fn get_job(&self, job_id: &str) -> ApiResult<Job>;
    /// GET `/jobs/{id}/script`; `None` while no script exists.
    async fn get_script(&self, job_id: &str) -> ApiResult<Option<ScriptData>>;
    /// POST `/jobs/{id}/script/edit`.
    async fn edit_script(&self, job_id: &str, instruction: &str) -> ApiResult<()>;
    /// POST `/jobs/{id}/voice/regenerate`.
    async fn regenerate_voice(&self, job_id: &str) -> ApiResult<()>;
    /// POST `/jobs/{id}/approve-script`.
    async fn approve_script(&self, job_id: &str) -> ApiResult<()>;
    /// POST `/jobs/{id}/approve-voice`.
    async fn approve_voice(&self, job_id: &str) -> ApiResult<()>;
    /// GET `/voices`; an error status yields an empty catalogue.
    async fn list_voices(&self) -> ApiResult<Vec<Voice>>;
    /// GET `/jobs/{id}/voice`.
    async fn fetch_voice_audio(&self, job_id: &str) -> ApiResult<Bytes>;
}

#[derive(Deserialize)]
struct GenerateResponse {
    job_id: String,
}

#[derive(Serialize)]
struct EditScriptBody<'a> {
    instruction: &'a str,
}

#[derive(Deserialize)]
struct VoicesResponse {
    #[serde(default)]
    voices: Vec<Voice>,
}

/// HTTP client bound to one API base (for example `http://localhost:8000/api`).
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(cfg: &ClientConfig) -> anyhow::Result<Self> {
        let mut base = Url::parse(&cfg.base_url)
            .map_err(|e| anyhow::anyhow!("invalid --base-url {:?}: {e}", cfg.base_url))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("--base-url must be an http(s) URL, got {:?}", cfg.base_url);
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.request_timeout)
            .build()?;

        Ok(Self { http, base })
    }

    /// Resolve a deliverable link (usually origin-relative) to an absolute URL.
    pub fn resolve_link(&self, href: &str) -> String {
        self.base
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string())
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn check(resp: Response) -> ApiResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.bytes().await.unwrap_or_default();
        Err(ApiError::from_body(status, &body))
    }

    async fn post_empty(&self, segments: &[&str]) -> ApiResult<()> {
        let resp = self.http.post(self.endpoint(segments)).send().await?;
        Self::check(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn generate(&self, req: &GenerateRequest) -> ApiResult<String> {
        let resp = self
            .http
            .post(self.endpoint(&["generate"]))
            .json(req)
            .send()
            .await?;
        let body = Self::check(resp).await?.bytes().await?;
        let parsed: GenerateResponse = serde_json::from_slice(&body)?;
        Ok(parsed.job_id)
    }

    async fn get_job(&self, job_id: &str) -> ApiResult<Job> {
        let resp = self.http.get(self.endpoint(&["jobs", job_id])).send().await?;
        let body = Self::check(resp).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_script(&self, job_id: &str) -> ApiResult<Option<ScriptData>> {
        let resp = self
            .http
            .get(self.endpoint(&["jobs", job_id, "script"]))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Ok(None);
        }
        let body = resp.bytes().await?;
        Ok(Some(serde_json::from_slice(&body)?))
    }

    async fn edit_script(&self, job_id: &str, instruction: &str) -> ApiResult<()> {
        let resp = self
            .http
            .post(self.endpoint(&["jobs", job_id, "script", "edit"]))
            .json(&EditScriptBody { instruction })
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn regenerate_voice(&self, job_id: &str) -> ApiResult<()> {
        self.post_empty(&["jobs", job_id, "voice", "regenerate"]).await
    }

    async fn approve_script(&self, job_id: &str) -> ApiResult<()> {
        self.post_empty(&["jobs", job_id, "approve-script"]).await
    }

    async fn approve_voice(&self, job_id: &str) -> ApiResult<()> {
        self.post_empty(&["jobs", job_id, "approve-voice"]).await
    }

    async fn list_voices(&self) -> ApiResult<Vec<Voice>> {
        let resp = self.http.get(self.endpoint(&["voices"])).send().await?;
        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "voice catalogue unavailable");
            return Ok(Vec::new());
        }
        let body = resp.bytes().await?;
        let parsed: VoicesResponse = serde_json::from_slice(&body)?;
        Ok(parsed.voices)
    }

    async fn fetch_voice_audio(&self, job_id: &str) -> ApiResult<Bytes> {
        let resp = self
            .http
            .get(self.endpoint(&["jobs", job_id, "voice"]))
            .send()
            .await?;
        Ok(Self::check(resp).await?.bytes().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{JobStatus, VideoType};
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        let cfg = ClientConfig {
            base_url: format!("{}/api", server.uri()),
            request_timeout: Duration::from_secs(5),
            ..ClientConfig::default()
        };
        ApiClient::new(&cfg).unwrap()
    }

    #[test]
    fn rejects_non_http_base() {
        let cfg = ClientConfig {
            base_url: "mailto:someone@example.com".into(),
            ..ClientConfig::default()
        };
        assert!(ApiClient::new(&cfg).is_err());
    }

    #[test]
    fn resolves_relative_download_links() {
        let cfg = ClientConfig {
            base_url: "http://localhost:8000/api".into(),
            ..ClientConfig::default()
        };
        let client = ApiClient::new(&cfg).unwrap();
        assert_eq!(
            client.resolve_link("/api/download/J1/final.mp4"),
            "http://localhost:8000/api/download/J1/final.mp4"
        );
        assert_eq!(
            client.resolve_link("https://cdn.example.com/v.mp4"),
            "https://cdn.example.com/v.mp4"
        );
    }

    #[tokio::test]
    async fn generate_posts_request_and_returns_job_id() {
        let server = MockServer::start().await;
        let req = GenerateRequest {
            title: "Dam".into(),
            prompt: "About the dam".into(),
            video_type: VideoType::News,
            ..Default::default()
        };
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_json(serde_json::to_value(&req).unwrap()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"job_id": "J1"})))
            .expect(1)
            .mount(&server)
            .await;

        let id = client_for(&server).generate(&req).await.unwrap();
        assert_eq!(id, "J1");
    }

    #[tokio::test]
    async fn generate_surfaces_backend_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(serde_json::json!({"detail": "ANTHROPIC_API_KEY not configured"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&GenerateRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "ANTHROPIC_API_KEY not configured");
    }

    #[tokio::test]
    async fn get_job_decodes_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jobs/J1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "job_id": "J1",
                "status": "completed",
                "config": {},
                "steps": [],
                "current_step": 7,
                "result": {"final_video": "/api/download/J1/final.mp4", "duration_seconds": 125.0},
                "error": null,
                "created_at": "2024-05-01T10:00:00",
                "completed_at": "2024-05-01T10:20:00"
            })))
            .mount(&server)
            .await;

        let job = client_for(&server).get_job("J1").await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.result.unwrap().duration_seconds, Some(125.0));
    }

    #[tokio::test]
    async fn missing_script_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jobs/J1/script"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"detail": "Script not ready"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/jobs/J2/script"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "text": "Hello world", "total_word_count": 2, "scenes": 1
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.get_script("J1").await.unwrap(), None);
        let script = client.get_script("J2").await.unwrap().unwrap();
        assert_eq!(script.text, "Hello world");
        assert_eq!(script.total_word_count, 2);
    }

    #[tokio::test]
    async fn edit_sends_instruction_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/jobs/J1/script/edit"))
            .and(body_json(serde_json::json!({"instruction": "make it shorter"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "editing"})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .edit_script("J1", "make it shorter")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn action_endpoints_map_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/jobs/J1/approve-script"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/jobs/J1/approve-voice"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({"detail": "Voice not ready"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/jobs/J1/voice/regenerate"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.approve_script("J1").await.unwrap();
        let err = client.approve_voice("J1").await.unwrap_err();
        assert_eq!(err.to_string(), "Voice not ready");
        let err = client.regenerate_voice("J1").await.unwrap_err();
        assert_eq!(err.to_string(), "Internal Server Error");
    }

    #[tokio::test]
    async fn voices_fall_back_to_empty_on_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/voices"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        assert!(client_for(&server).list_voices().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn voices_and_audio_are_fetched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/voices"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "voices": [{"id": "v1", "name": "Rachel", "accent": "american"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/jobs/J1/voice"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let voices = client.list_voices().await.unwrap();
        assert_eq!(voices.len(), 1);
        assert_eq!(voices[0].accent, "american");
        let audio = client.fetch_voice_audio("J1").await.unwrap();
        assert_eq!(&audio[..], &[1, 2, 3]);
    }
}
