use serde::{Deserialize, Serialize};
use std::fmt;

/// Step number of script generation in the backend pipeline.
pub const SCRIPT_STEP: u32 = 2;
/// Step number of voice synthesis in the backend pipeline.
pub const VOICE_STEP: u32 = 3;

/// Voice used when the catalogue cannot be loaded or does not contain a better match.
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl StepStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
            StepStatus::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStep {
    pub step: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: StepStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    #[serde(default)]
    pub final_video: Option<String>,
    #[serde(default)]
    pub script_file: Option<String>,
    #[serde(default)]
    pub voiceover_file: Option<String>,
    #[serde(default)]
    pub asset_list_file: Option<String>,
    #[serde(default)]
    pub timeline_file: Option<String>,
    #[serde(default)]
    pub subtitles_file: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
}

impl JobResult {
    /// Labelled deliverables that are present, in display order.
    pub fn deliverables(&self) -> Vec<(&'static str, &str)> {
        [
            ("Final Video", self.final_video.as_deref()),
            ("Narration Script", self.script_file.as_deref()),
            ("Voiceover Audio", self.voiceover_file.as_deref()),
            ("Asset List", self.asset_list_file.as_deref()),
            ("Edit Timeline", self.timeline_file.as_deref()),
            ("Subtitles", self.subtitles_file.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, url)| url.filter(|u| !u.is_empty()).map(|u| (label, u)))
        .collect()
    }
}

/// Backend job snapshot. The client only ever holds a read-only copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default)]
    pub steps: Vec<PipelineStep>,
    #[serde(default)]
    pub current_step: u32,
    #[serde(default)]
    pub result: Option<JobResult>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl Job {
    pub fn step(&self, number: u32) -> Option<&PipelineStep> {
        self.steps.iter().find(|s| s.step == number)
    }

    pub fn step_status(&self, number: u32) -> Option<StepStatus> {
        self.step(number).map(|s| s.status)
    }

    pub fn step_completed(&self, number: u32) -> bool {
        self.step_status(number) == Some(StepStatus::Completed)
    }

    /// Fraction of completed steps in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        let done = self
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .count();
        done as f64 / self.steps.len().max(1) as f64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptData {
    pub text: String,
    pub total_word_count: u32,
    pub scenes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum VideoFormat {
    #[serde(rename = "16:9")]
    #[value(name = "16:9", alias = "landscape")]
    Landscape,
    #[serde(rename = "9:16")]
    #[value(name = "9:16", alias = "portrait")]
    Portrait,
}

impl VideoFormat {
    pub fn label(self) -> &'static str {
        match self {
            VideoFormat::Landscape => "16:9 YouTube",
            VideoFormat::Portrait => "9:16 Shorts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VideoType {
    Documentary,
    Top10,
    Mystery,
    News,
    Educational,
}

impl VideoType {
    pub const ALL: [VideoType; 5] = [
        VideoType::Documentary,
        VideoType::Top10,
        VideoType::Mystery,
        VideoType::News,
        VideoType::Educational,
    ];

    pub fn label(self) -> &'static str {
        match self {
            VideoType::Documentary => "Documentary",
            VideoType::Top10 => "Top 10",
            VideoType::Mystery => "Mystery",
            VideoType::News => "News",
            VideoType::Educational => "Educational",
        }
    }
}

/// Languages offered by the submission form.
pub const LANGUAGES: [(&str, &str); 5] = [
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("pt", "Portuguese"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub title: String,
    pub prompt: String,
    pub voice_id: String,
    /// Minutes.
    pub target_duration: u32,
    pub video_format: VideoFormat,
    pub video_type: VideoType,
    pub language: String,
    pub add_background_music: bool,
    pub add_captions: bool,
}

impl Default for GenerateRequest {
    fn default() -> Self {
        Self {
            title: String::new(),
            prompt: String::new(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            target_duration: 10,
            video_format: VideoFormat::Landscape,
            video_type: VideoType::Documentary,
            language: "en".to_string(),
            add_background_music: true,
            add_captions: false,
        }
    }
}

/// Client-side validation failures; these never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title is required")]
    MissingTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("prompt is required")]
    MissingPrompt,
    #[error("a voice must be selected")]
    MissingVoice,
    #[error("target duration must be between {min} and {max} minutes")]
    DurationOutOfRange { min: u32, max: u32 },
    #[error("edit instruction is required")]
    EmptyInstruction,
}

impl GenerateRequest {
    pub const MAX_TITLE_CHARS: usize = 200;
    pub const MIN_DURATION: u32 = 1;
    pub const MAX_DURATION: u32 = 60;

    /// Check required fields and return the request with title and prompt trimmed.
    pub fn validated(&self) -> Result<GenerateRequest, ValidationError> {
        let title = self.title.trim();
        let prompt = self.prompt.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if title.chars().count() > Self::MAX_TITLE_CHARS {
            return Err(ValidationError::TitleTooLong {
                max: Self::MAX_TITLE_CHARS,
            });
        }
        if prompt.is_empty() {
            return Err(ValidationError::MissingPrompt);
        }
        if self.voice_id.trim().is_empty() {
            return Err(ValidationError::MissingVoice);
        }
        if !(Self::MIN_DURATION..=Self::MAX_DURATION).contains(&self.target_duration) {
            return Err(ValidationError::DurationOutOfRange {
                min: Self::MIN_DURATION,
                max: Self::MAX_DURATION,
            });
        }
        Ok(GenerateRequest {
            title: title.to_string(),
            prompt: prompt.to_string(),
            ..self.clone()
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub accent: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub use_case: String,
    #[serde(default)]
    pub preview_url: String,
}

impl Voice {
    /// Non-empty descriptive tags in display order.
    pub fn tags(&self) -> Vec<&str> {
        [
            self.gender.as_str(),
            self.accent.as_str(),
            self.age.as_str(),
            self.description.as_str(),
            self.use_case.as_str(),
        ]
        .into_iter()
        .filter(|t| !t.is_empty())
        .collect()
    }
}

/// The content panel shown for the active job. Always derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentView {
    Loading,
    Script,
    Voice,
    Result,
}

impl fmt::Display for ContentView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContentView::Loading => "loading",
            ContentView::Script => "script",
            ContentView::Voice => "voice",
            ContentView::Result => "result",
        };
        f.write_str(s)
    }
}

/// Events emitted by the controller and consumed by UI/CLI layers.
#[derive(Debug, Clone)]
pub enum JobEvent {
    /// Full view of controller state after any change.
    Snapshot(Box<crate::orchestrator::SessionSnapshot>),
    /// Voice catalogue finished loading.
    VoicesLoaded(Vec<Voice>),
    /// Voiceover audio was written to disk.
    VoiceoverSaved(std::path::PathBuf),
    Info(InfoEvent),
    /// The tracked job reached a terminal status.
    JobFinished { job: Box<Job> },
}

/// Structured info events emitted by the controller and consumed by UI/CLI layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InfoEvent {
    Message(String),
    Submitting { title: String },
    Tracking { job_id: String },
    StepChanged { step: u32, name: String, status: StepStatus },
    ViewChanged { view: ContentView },
}

impl InfoEvent {
    /// Render a human-readable message for UI/CLI layers.
    pub fn to_message(&self) -> String {
        match self {
            InfoEvent::Message(msg) => msg.clone(),
            InfoEvent::Submitting { title } => format!("Submitting \"{}\"…", title),
            InfoEvent::Tracking { job_id } => format!("Tracking job {}", job_id),
            InfoEvent::StepChanged { step, name, status } => {
                format!("Step {} ({}): {}", step, name, status.as_str())
            }
            InfoEvent::ViewChanged { view } => format!("View: {}", view),
        }
    }
}
