use crate::favorites::VoiceFavorites;
use crate::model::{
    ContentView, GenerateRequest, Job, JobEvent, VideoFormat, VideoType, Voice, LANGUAGES,
};
use crate::orchestrator::SessionSnapshot;
use crate::voices::{self, VoiceFilter};
use std::path::PathBuf;

const MAX_LOG_LINES: usize = 200;

/// Fields of the submission form, in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Prompt,
    Voice,
    Duration,
    Format,
    VideoType,
    Language,
    Music,
    Captions,
    Submit,
}

impl FormField {
    pub const ALL: [FormField; 10] = [
        FormField::Title,
        FormField::Prompt,
        FormField::Voice,
        FormField::Duration,
        FormField::Format,
        FormField::VideoType,
        FormField::Language,
        FormField::Music,
        FormField::Captions,
        FormField::Submit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Prompt => "Prompt",
            FormField::Voice => "Voice",
            FormField::Duration => "Duration",
            FormField::Format => "Format",
            FormField::VideoType => "Type",
            FormField::Language => "Language",
            FormField::Music => "Background music",
            FormField::Captions => "Captions",
            FormField::Submit => "Generate video",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Free-text fields swallow printable keys.
    pub fn is_text(self) -> bool {
        matches!(self, FormField::Title | FormField::Prompt)
    }
}

#[derive(Debug, Clone, Default)]
pub struct VoicePicker {
    pub filter: VoiceFilter,
    pub selected: usize,
    /// Typing goes into the search box.
    pub searching: bool,
}

#[derive(Debug, Clone)]
pub enum Modal {
    VoicePicker(VoicePicker),
    EditInstruction(String),
    Help,
}

pub struct UiState {
    pub form: GenerateRequest,
    pub focus: FormField,
    pub form_error: Option<String>,
    /// Latest controller snapshot.
    pub session: Option<SessionSnapshot>,
    pub voices: Vec<Voice>,
    pub voices_loaded: bool,
    pub favorites: VoiceFavorites,
    pub modal: Option<Modal>,
    pub info: String,
    pub log: Vec<String>,
    /// Result summary lines once the job has finished.
    pub summary: Vec<String>,
    /// Deliverables of the finished job with absolute URLs.
    pub links: Vec<(&'static str, String)>,
    pub result_selected: usize,
    pub script_scroll: u16,
    pub voiceover_out: Option<PathBuf>,
}

impl UiState {
    pub fn new(form: GenerateRequest, favorites: VoiceFavorites) -> Self {
        Self {
            form,
            focus: FormField::Title,
            form_error: None,
            session: None,
            voices: Vec::new(),
            voices_loaded: false,
            favorites,
            modal: None,
            info: String::new(),
            log: Vec::new(),
            summary: Vec::new(),
            links: Vec::new(),
            result_selected: 0,
            script_scroll: 0,
            voiceover_out: None,
        }
    }

    /// The content panel to show, or `None` while the submission form is up.
    pub fn view(&self) -> Option<ContentView> {
        let s = self.session.as_ref()?;
        (s.job.is_some() || s.loading).then_some(s.view)
    }

    pub fn job(&self) -> Option<&Job> {
        self.session.as_ref().and_then(|s| s.job.as_ref())
    }

    pub fn push_info(&mut self, msg: String) {
        self.log.push(msg.clone());
        if self.log.len() > MAX_LOG_LINES {
            let excess = self.log.len() - MAX_LOG_LINES;
            self.log.drain(..excess);
        }
        self.info = msg;
    }

    /// Fold a controller event into UI state. `JobFinished` is handled by [`Self::finish_job`].
    pub fn apply_event(&mut self, ev: JobEvent) {
        match ev {
            JobEvent::Snapshot(snap) => {
                let prev_view = self.view();
                self.session = Some(*snap);
                if self.view() != prev_view {
                    self.result_selected = 0;
                    self.script_scroll = 0;
                }
                if self.view().is_none() {
                    self.summary.clear();
                    self.links.clear();
                }
            }
            JobEvent::VoicesLoaded(list) => {
                self.voices = list;
                self.voices_loaded = true;
                if !self.voices.iter().any(|v| v.id == self.form.voice_id) {
                    if let Some(v) = voices::default_voice(&self.voices) {
                        self.form.voice_id = v.id.clone();
                    }
                }
            }
            JobEvent::VoiceoverSaved(path) => {
                self.push_info(format!("Saved voiceover to {}", path.display()));
            }
            JobEvent::Info(info) => self.push_info(info.to_message()),
            JobEvent::JobFinished { .. } => {}
        }
    }

    pub fn finish_job(&mut self, summary: Vec<String>, links: Vec<(&'static str, String)>) {
        self.summary = summary;
        self.links = links;
        self.result_selected = 0;
    }

    pub fn type_char(&mut self, c: char) {
        match self.focus {
            FormField::Title => {
                if self.form.title.chars().count() < GenerateRequest::MAX_TITLE_CHARS {
                    self.form.title.push(c);
                }
            }
            FormField::Prompt => self.form.prompt.push(c),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            FormField::Title => {
                self.form.title.pop();
            }
            FormField::Prompt => {
                self.form.prompt.pop();
            }
            _ => {}
        }
    }

    /// Step the focused choice field forward or back.
    pub fn adjust(&mut self, delta: i32) {
        match self.focus {
            FormField::Duration => {
                let d = self.form.target_duration as i64 + delta as i64;
                self.form.target_duration = d.clamp(
                    GenerateRequest::MIN_DURATION as i64,
                    GenerateRequest::MAX_DURATION as i64,
                ) as u32;
            }
            FormField::Format => {
                self.form.video_format = match self.form.video_format {
                    VideoFormat::Landscape => VideoFormat::Portrait,
                    VideoFormat::Portrait => VideoFormat::Landscape,
                };
            }
            FormField::VideoType => {
                let i = VideoType::ALL
                    .iter()
                    .position(|t| *t == self.form.video_type)
                    .unwrap_or(0);
                self.form.video_type = VideoType::ALL[wrap(i, delta, VideoType::ALL.len())];
            }
            FormField::Language => {
                let i = LANGUAGES
                    .iter()
                    .position(|(code, _)| *code == self.form.language)
                    .unwrap_or(0);
                self.form.language = LANGUAGES[wrap(i, delta, LANGUAGES.len())].0.to_string();
            }
            FormField::Music => self.form.add_background_music = !self.form.add_background_music,
            FormField::Captions => self.form.add_captions = !self.form.add_captions,
            _ => {}
        }
    }

    pub fn selected_voice(&self) -> Option<&Voice> {
        self.voices.iter().find(|v| v.id == self.form.voice_id)
    }

    pub fn language_label(&self) -> &str {
        LANGUAGES
            .iter()
            .find(|(code, _)| *code == self.form.language)
            .map(|(_, name)| *name)
            .unwrap_or(self.form.language.as_str())
    }

    pub fn open_voice_picker(&mut self) {
        let filter = VoiceFilter::default();
        let selected = filter
            .apply(&self.voices, self.favorites.ids())
            .iter()
            .position(|v| v.id == self.form.voice_id)
            .unwrap_or(0);
        self.modal = Some(Modal::VoicePicker(VoicePicker {
            filter,
            selected,
            searching: false,
        }));
    }

    /// Voices visible under a picker filter.
    pub fn filtered_voices(&self, filter: &VoiceFilter) -> Vec<&Voice> {
        filter.apply(&self.voices, self.favorites.ids())
    }
}

fn wrap(i: usize, delta: i32, len: usize) -> usize {
    (i as i64 + delta as i64).rem_euclid(len as i64) as usize
}
