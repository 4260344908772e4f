use crate::api::{ApiClient, Backend};
use crate::config::ClientConfig;
use crate::favorites::{FileStore, MemoryStore, PreferenceStore, VoiceFavorites};
use crate::logging::{self, LogTarget};
use crate::model::{
    ContentView, GenerateRequest, JobEvent, JobStatus, VideoFormat, VideoType, DEFAULT_VOICE_ID,
};
use crate::orchestrator::{self, SessionSnapshot, UiCommand};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "autovideo",
    version,
    about = "AI video generation client with optional TUI"
)]
pub struct Cli {
    /// Base URL of the generation API
    #[arg(long, default_value = "http://localhost:8000/api")]
    pub base_url: String,

    /// Print the final job as JSON and exit (no TUI); approves script and voice automatically
    #[arg(long)]
    pub json: bool,

    /// Print progress as text and exit when the job finishes (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Run silently: suppress all output except errors (for cron usage)
    #[arg(long)]
    pub silent: bool,

    /// Interval between job status polls
    #[arg(long, default_value = "2500ms")]
    pub poll_interval: humantime::Duration,

    /// Timeout for a single API request
    #[arg(long, default_value = "30s")]
    pub request_timeout: humantime::Duration,

    /// Video title
    #[arg(long)]
    pub title: Option<String>,

    /// Prompt describing the video
    #[arg(long, conflicts_with = "prompt_file")]
    pub prompt: Option<String>,

    /// Read the prompt from a file
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,

    /// Narration voice id
    #[arg(long, default_value = DEFAULT_VOICE_ID)]
    pub voice_id: String,

    /// Target duration in minutes
    #[arg(long, default_value_t = 10)]
    pub duration: u32,

    /// Aspect format
    #[arg(long, value_enum, default_value = "16:9")]
    pub format: VideoFormat,

    /// Content type
    #[arg(long, value_enum, default_value = "documentary")]
    pub video_type: VideoType,

    /// Narration language code
    #[arg(long, default_value = "en")]
    pub language: String,

    /// Leave out background music
    #[arg(long)]
    pub no_background_music: bool,

    /// Generate captions (SRT)
    #[arg(long)]
    pub captions: bool,

    /// Track an existing job instead of submitting a new one
    #[arg(long)]
    pub job: Option<String>,

    /// Approve the script and voiceover without prompting (text mode)
    #[arg(long)]
    pub auto_approve: bool,

    /// Save the voiceover audio here when it is ready for review
    #[arg(long)]
    pub voiceover_out: Option<PathBuf>,

    /// Export the final job snapshot as JSON
    #[arg(long)]
    pub export_json: Option<PathBuf>,

    /// List available voices and exit
    #[arg(long)]
    pub list_voices: bool,

    /// Add or remove a voice from favourites and exit
    #[arg(long)]
    pub toggle_favorite: Option<String>,

    /// File holding voice favourites (defaults to the user data dir)
    #[arg(long)]
    pub favorites_file: Option<PathBuf>,

    /// Log file used while the TUI is active (defaults to the user cache dir)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

pub async fn run(args: Cli) -> Result<()> {
    // Validate that --silent can only be used with --json
    if args.silent && !args.json {
        return Err(anyhow::anyhow!(
            "--silent can only be used with --json. Use --silent --json together."
        ));
    }

    if let Some(voice_id) = args.toggle_favorite.as_deref() {
        return run_toggle_favorite(&args, voice_id);
    }
    if args.list_voices {
        return run_list_voices(&args).await;
    }

    if is_interactive(&args) {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_headless(args).await;
        }
    }

    run_headless(args).await
}

/// Whether this invocation runs the interactive front end.
fn is_interactive(args: &Cli) -> bool {
    !args.json && !args.text && !args.list_voices && args.toggle_favorite.is_none()
}

/// Install logging for the selected mode. The TUI logs to a file so the screen stays clean.
pub fn init_logging(args: &Cli) {
    let target = if args.silent {
        LogTarget::Silent
    } else if is_interactive(args) && cfg!(feature = "tui") {
        LogTarget::File
    } else {
        LogTarget::Stderr
    };
    let log_path = args
        .log_file
        .clone()
        .or_else(crate::config::default_log_path);
    logging::init(target, log_path.as_deref());
}

/// Build a `ClientConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> Result<ClientConfig> {
    let poll_interval = Duration::from(args.poll_interval);
    let request_timeout = Duration::from(args.request_timeout);
    anyhow::ensure!(!poll_interval.is_zero(), "--poll-interval must be greater than zero");
    anyhow::ensure!(!request_timeout.is_zero(), "--request-timeout must be greater than zero");
    Ok(ClientConfig {
        base_url: args.base_url.clone(),
        poll_interval,
        request_timeout,
        user_agent: format!("autovideo-cli/{}", env!("CARGO_PKG_VERSION")),
        favorites_path: args
            .favorites_file
            .clone()
            .or_else(crate::config::default_favorites_path),
    })
}

/// Build a validated generation request from CLI arguments. Fails before any network call.
pub fn build_request(args: &Cli) -> Result<GenerateRequest> {
    Ok(request_from_args(args)?.validated()?)
}

/// Collect request fields from CLI arguments without validating them.
pub fn request_from_args(args: &Cli) -> Result<GenerateRequest> {
    let prompt = match (&args.prompt, &args.prompt_file) {
        (Some(p), _) => p.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("read prompt file {}", path.display()))?,
        (None, None) => String::new(),
    };
    Ok(GenerateRequest {
        title: args.title.clone().unwrap_or_default(),
        prompt,
        voice_id: args.voice_id.clone(),
        target_duration: args.duration,
        video_format: args.format,
        video_type: args.video_type,
        language: args.language.clone(),
        add_background_music: !args.no_background_music,
        add_captions: args.captions,
    })
}

/// Open voice favourites from the configured file, or in memory if there is no data dir.
pub fn open_favorites(cfg: &ClientConfig) -> VoiceFavorites {
    let store: Box<dyn PreferenceStore> = match cfg.favorites_path.as_ref() {
        Some(path) => Box::new(FileStore::new(path)),
        None => Box::new(MemoryStore::default()),
    };
    VoiceFavorites::open(store)
}

/// Local wall-clock time for progress lines.
fn timestamp() -> String {
    let now = time::OffsetDateTime::now_local().unwrap_or_else(|_| time::OffsetDateTime::now_utc());
    now.format(time::macros::format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_default()
}

/// Default file name for a saved voiceover, e.g. `voiceover-J1-20240501-101500.mp3`.
pub(crate) fn default_voiceover_path(job_id: &str) -> PathBuf {
    let now = time::OffsetDateTime::now_local().unwrap_or_else(|_| time::OffsetDateTime::now_utc());
    let stamp = now
        .format(time::macros::format_description!(
            "[year][month][day]-[hour][minute][second]"
        ))
        .unwrap_or_else(|_| "now".into());
    PathBuf::from(format!("voiceover-{job_id}-{stamp}.mp3"))
}

fn run_toggle_favorite(args: &Cli, voice_id: &str) -> Result<()> {
    let cfg = build_config(args)?;
    let mut favs = open_favorites(&cfg);
    let now = favs.toggle(voice_id)?;
    if !args.silent {
        println!(
            "{} {}",
            voice_id,
            if now { "added to favourites" } else { "removed from favourites" }
        );
    }
    Ok(())
}

async fn run_list_voices(args: &Cli) -> Result<()> {
    let cfg = build_config(args)?;
    let client = ApiClient::new(&cfg)?;
    let favs = open_favorites(&cfg);
    let voices = client.list_voices().await.context("list voices")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&voices)?);
        return Ok(());
    }
    for v in &voices {
        let star = if favs.contains(&v.id) { "♥" } else { " " };
        println!("{star} {} ({}) {}", v.name, v.id, v.tags().join(", "));
    }
    Ok(())
}

/// A review command typed at the text-mode prompt.
pub(crate) fn review_command(line: &str, view: ContentView) -> Result<UiCommand, String> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(w, r)| (w, r.trim()))
        .unwrap_or((line, ""));
    match (word, view) {
        ("q" | "quit", _) => Ok(UiCommand::Quit),
        ("a" | "approve", ContentView::Script) => Ok(UiCommand::ApproveScript),
        ("a" | "approve", ContentView::Voice) => Ok(UiCommand::ApproveVoice),
        ("e" | "edit", ContentView::Script) if !rest.is_empty() => {
            Ok(UiCommand::EditScript(rest.to_string()))
        }
        ("e" | "edit", ContentView::Script) => Err("usage: edit <instruction>".into()),
        ("r" | "regenerate", ContentView::Voice) => Ok(UiCommand::RegenerateVoice),
        ("s" | "save", ContentView::Voice) if !rest.is_empty() => {
            Ok(UiCommand::SaveVoiceover(PathBuf::from(rest)))
        }
        ("s" | "save", ContentView::Voice) => Err("usage: save <path>".into()),
        ("", _) => Err(String::new()),
        (_, view) => Err(format!("'{word}' is not available in the {view} view")),
    }
}

fn prompt_hint(view: ContentView) -> Option<&'static str> {
    match view {
        ContentView::Script => Some("Commands: approve | edit <instruction> | quit"),
        ContentView::Voice => Some("Commands: approve | regenerate | save <path> | quit"),
        _ => None,
    }
}

/// Spawn a task forwarding stdin lines.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Run a job to completion without the TUI, in text or JSON mode.
async fn run_headless(args: Cli) -> Result<()> {
    let cfg = build_config(&args)?;
    let client = ApiClient::new(&cfg)?;
    let first = match args.job.clone() {
        Some(job_id) => UiCommand::Track(job_id),
        None => UiCommand::Submit(build_request(&args)?),
    };

    let text = !args.json;
    let auto_approve = args.auto_approve || args.json;
    let (out_tx, out_handle) = spawn_output_writer();
    let say = |msg: String| {
        if text {
            let _ = out_tx.send(OutputLine::Stderr(format!("[{}] {}", timestamp(), msg)));
        }
    };

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<JobEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();
    let backend: Arc<dyn Backend> = Arc::new(client.clone());
    let controller = tokio::spawn(orchestrator::run_controller(
        backend,
        cfg.poll_interval,
        event_tx,
        cmd_rx,
    ));
    let _ = cmd_tx.send(first);

    let mut stdin_rx = if text && !auto_approve {
        Some(spawn_stdin_reader())
    } else {
        None
    };

    let mut last: Option<SessionSnapshot> = None;
    let mut voiceover_saved = false;
    let mut outcome: Result<()> = Ok(());

    loop {
        tokio::select! {
            ev = event_rx.recv() => {
                let Some(ev) = ev else { break };
                match ev {
                    JobEvent::Info(info) => say(info.to_message()),
                    JobEvent::VoiceoverSaved(path) => say(format!("Saved voiceover: {}", path.display())),
                    JobEvent::VoicesLoaded(_) => {}
                    JobEvent::Snapshot(snap) => {
                        if let Some(err) = snap.submit_error.as_deref() {
                            outcome = Err(anyhow::anyhow!("{err}"));
                            let _ = cmd_tx.send(UiCommand::Quit);
                            continue;
                        }
                        let prev = last.as_ref();
                        if snap.notice.is_some() && snap.notice != prev.and_then(|p| p.notice.clone()) {
                            say(format!("Notice: {}", snap.notice.as_deref().unwrap_or_default()));
                        }
                        let entered = prev.map(|p| p.view) != Some(snap.view);
                        let regenerated = prev.map(|p| p.regenerating).unwrap_or(false) && !snap.regenerating;
                        if entered && snap.view == ContentView::Script {
                            if let Some(script) = snap.script.as_ref() {
                                for line in crate::text_summary::script_lines(script) {
                                    let _ = out_tx.send(OutputLine::Stderr(line));
                                }
                            }
                            if auto_approve {
                                let _ = cmd_tx.send(UiCommand::ApproveScript);
                            }
                        }
                        if entered && snap.view == ContentView::Voice {
                            if let (Some(path), false) = (args.voiceover_out.clone(), voiceover_saved) {
                                voiceover_saved = true;
                                let _ = cmd_tx.send(UiCommand::SaveVoiceover(path));
                            }
                            if auto_approve {
                                let _ = cmd_tx.send(UiCommand::ApproveVoice);
                            }
                        }
                        if !auto_approve && (entered || regenerated) {
                            if let Some(hint) = prompt_hint(snap.view) {
                                say(hint.to_string());
                            }
                        }
                        last = Some(*snap);
                    }
                    JobEvent::JobFinished { job } => {
                        let processed = orchestrator::process_job_completion(
                            &job,
                            args.export_json.as_deref(),
                            |href| client.resolve_link(href),
                        );
                        for msg in processed.export_messages {
                            say(msg);
                        }
                        if args.json {
                            if !args.silent {
                                let _ = out_tx.send(OutputLine::Stdout(serde_json::to_string_pretty(&*job)?));
                            }
                        } else {
                            for line in processed.summary {
                                let _ = out_tx.send(OutputLine::Stdout(line));
                            }
                        }
                        if job.status == JobStatus::Failed {
                            outcome = Err(anyhow::anyhow!(
                                "job {} failed: {}",
                                job.job_id,
                                job.error.as_deref().unwrap_or("unknown error")
                            ));
                        }
                        let _ = cmd_tx.send(UiCommand::Quit);
                    }
                }
            }
            line = async {
                match stdin_rx.as_mut() {
                    Some(rx) => rx.recv().await,
                    None => futures::future::pending().await,
                }
            } => {
                let Some(line) = line else {
                    // stdin closed; keep following the job without interaction.
                    stdin_rx = None;
                    continue;
                };
                let view = last.as_ref().map(|s| s.view).unwrap_or(ContentView::Loading);
                match review_command(&line, view) {
                    Ok(cmd) => {
                        let _ = cmd_tx.send(cmd);
                    }
                    Err(msg) if msg.is_empty() => {}
                    Err(msg) => say(msg),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                say("Interrupted".to_string());
                let _ = cmd_tx.send(UiCommand::Quit);
            }
        }
    }

    controller
        .await
        .context("controller task failed")??;
    drop(out_tx);
    let _ = out_handle.await;
    outcome
}
