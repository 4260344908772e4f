mod help;
mod input;
mod state;

use crate::api::{ApiClient, Backend};
use crate::cli::{self, Cli};
use crate::model::{ContentView, Job, JobEvent, JobStatus, StepStatus};
use crate::orchestrator::{self, UiCommand};
use crate::text_summary;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use input::Action;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Terminal,
};
use state::{FormField, Modal, UiState, VoicePicker};
use std::path::PathBuf;
use std::sync::Arc;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub async fn run(args: Cli) -> Result<()> {
    let cfg = cli::build_config(&args)?;
    let client = ApiClient::new(&cfg)?;
    let form = cli::request_from_args(&args)?;
    let favorites = cli::open_favorites(&cfg);

    // Unbounded channels keep the UI thread from ever blocking on the controller.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<JobEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();
    let _ = cmd_tx.send(UiCommand::LoadVoices);
    if let Some(job_id) = args.job.clone() {
        let _ = cmd_tx.send(UiCommand::Track(job_id));
    }

    let mut state = UiState::new(form, favorites);
    state.voiceover_out = args.voiceover_out.clone();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_client = client.clone();
    let export_json = args.export_json.clone();
    let ui_handle = std::thread::spawn(move || {
        run_threaded(state, ui_client, export_json, event_rx, cmd_tx)
    });

    let backend: Arc<dyn Backend> = Arc::new(client);
    let res = orchestrator::run_controller(backend, cfg.poll_interval, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(
    mut state: UiState,
    client: ApiClient,
    export_json: Option<PathBuf>,
    mut event_rx: UnboundedReceiver<JobEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    let res = 'ui: loop {
        // Drain events without blocking to keep the UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            match ev {
                JobEvent::JobFinished { job } => {
                    handle_job_finished(&mut state, &client, export_json.as_deref(), &job);
                }
                other => state.apply_event(other),
            }
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                for action in input::handle_key(&mut state, k) {
                    match action {
                        Action::Send(cmd) => {
                            let _ = cmd_tx.send(cmd);
                        }
                        Action::Copy(text) => match copy_to_clipboard(&text) {
                            Ok(()) => state.info = format!("✓ Copied to clipboard: {text}"),
                            Err(e) => state.info = format!("Clipboard copy failed: {e:#}"),
                        },
                        Action::Quit => {
                            let _ = cmd_tx.send(UiCommand::Quit);
                            break 'ui Ok(());
                        }
                    }
                }
                // Redraw right away so typing feels immediate.
                last_tick = Instant::now() - tick_rate;
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn handle_job_finished(state: &mut UiState, client: &ApiClient, export_json: Option<&std::path::Path>, job: &Job) {
    let processed =
        orchestrator::process_job_completion(job, export_json, |href| client.resolve_link(href));
    for msg in processed.export_messages {
        state.push_info(msg);
    }
    let links = job
        .result
        .as_ref()
        .map(|r| {
            r.deliverables()
                .into_iter()
                .map(|(label, href)| (label, client.resolve_link(href)))
                .collect()
        })
        .unwrap_or_default();
    state.finish_job(processed.summary, links);
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    draw_header(chunks[0], f, state);
    match state.view() {
        None => draw_form(chunks[1], f, state),
        Some(view) => draw_job(chunks[1], f, state, view),
    }
    draw_status(chunks[2], f, state);

    match &state.modal {
        Some(Modal::Help) => help::draw_help(centered_rect(70, 85, area), f),
        Some(Modal::EditInstruction(text)) => draw_edit_modal(centered_rect(60, 30, area), f, text),
        Some(Modal::VoicePicker(p)) => draw_voice_picker(centered_rect(85, 85, area), f, state, p),
        None => {}
    }
}

fn draw_header(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let line = match state.job() {
        Some(job) => Line::from(vec![
            Span::styled("Job ", Style::default().fg(Color::Gray)),
            Span::raw(job.job_id.clone()),
            Span::raw("  "),
            Span::styled(job.status.as_str(), status_style(job.status)),
            Span::raw("  "),
            Span::styled(text_summary::progress_line(job), Style::default().fg(Color::Gray)),
        ]),
        None if state.view().is_some() => Line::from("Submitting…"),
        None => Line::from(Span::styled(
            "New video  (? for help)",
            Style::default().fg(Color::Gray),
        )),
    };
    let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("autovideo"));
    f.render_widget(p, area);
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let session = state.session.as_ref();
    let line = if let Some(err) = session.and_then(|s| s.submit_error.as_deref()) {
        Line::from(Span::styled(err.to_string(), Style::default().fg(Color::Red)))
    } else if let Some(err) = state.form_error.as_deref().filter(|_| state.view().is_none()) {
        Line::from(Span::styled(err.to_string(), Style::default().fg(Color::Red)))
    } else if let Some(notice) = session.and_then(|s| s.notice.as_deref()) {
        Line::from(vec![
            Span::styled(notice.to_string(), Style::default().fg(Color::Yellow)),
            Span::styled("  (x to dismiss)", Style::default().fg(Color::Gray)),
        ])
    } else {
        Line::from(Span::styled(state.info.clone(), Style::default().fg(Color::Gray)))
    };
    let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(p, area);
}

fn status_style(status: JobStatus) -> Style {
    match status {
        JobStatus::Completed => Style::default().fg(Color::Green),
        JobStatus::Failed => Style::default().fg(Color::Red),
        JobStatus::Running => Style::default().fg(Color::Yellow),
        JobStatus::Pending => Style::default().fg(Color::Gray),
    }
}

fn step_style(status: StepStatus) -> Style {
    match status {
        StepStatus::Completed => Style::default().fg(Color::Green),
        StepStatus::Running => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        StepStatus::Failed => Style::default().fg(Color::Red),
        StepStatus::Skipped | StepStatus::Pending => Style::default().fg(Color::DarkGray),
    }
}

fn on_off(v: bool) -> &'static str {
    if v {
        "On"
    } else {
        "Off"
    }
}

fn draw_form(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    let form = &state.form;
    let loading = state.session.as_ref().is_some_and(|s| s.loading);
    let mut lines: Vec<Line> = Vec::new();
    for field in FormField::ALL {
        let focused = state.focus == field;
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if focused { "› " } else { "  " };
        let cursor = if focused && field.is_text() { "▏" } else { "" };

        let value = match field {
            FormField::Title => format!(
                "{}{cursor}  ({}/{})",
                form.title,
                form.title.chars().count(),
                crate::model::GenerateRequest::MAX_TITLE_CHARS
            ),
            FormField::Prompt => String::new(),
            FormField::Voice => match state.selected_voice() {
                Some(v) => format!("{} ({})", v.name, v.id),
                None if !state.voices_loaded => format!("{}  (loading voices…)", form.voice_id),
                None => form.voice_id.clone(),
            },
            FormField::Duration => format!("‹ {} min ›", form.target_duration),
            FormField::Format => format!("‹ {} ›", form.video_format.label()),
            FormField::VideoType => format!("‹ {} ›", form.video_type.label()),
            FormField::Language => format!("‹ {} ›", state.language_label()),
            FormField::Music => on_off(form.add_background_music).to_string(),
            FormField::Captions => format!("{} (SRT)", on_off(form.add_captions)),
            FormField::Submit => String::new(),
        };

        match field {
            FormField::Submit => {
                lines.push(Line::from(""));
                let text = if loading { "[ Submitting… ]" } else { "[ Generate video ]" };
                lines.push(Line::from(vec![
                    Span::raw(marker),
                    Span::styled(text, label_style),
                ]));
            }
            FormField::Prompt => {
                lines.push(Line::from(vec![
                    Span::raw(marker),
                    Span::styled(format!("{}:", field.label()), label_style),
                ]));
                let mut prompt_lines: Vec<&str> = form.prompt.split('\n').collect();
                if prompt_lines.len() > 8 {
                    prompt_lines = prompt_lines.split_off(prompt_lines.len() - 8);
                }
                let last = prompt_lines.len().saturating_sub(1);
                for (i, l) in prompt_lines.iter().enumerate() {
                    let c = if i == last { cursor } else { "" };
                    lines.push(Line::from(format!("    {l}{c}")));
                }
            }
            _ => lines.push(Line::from(vec![
                Span::raw(marker),
                Span::styled(format!("{:<18}", format!("{}:", field.label())), label_style),
                Span::raw(value),
            ])),
        }
    }

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Create video"));
    f.render_widget(p, cols[0]);

    let mut side: Vec<Line> = Vec::new();
    match state.selected_voice() {
        Some(v) => {
            side.push(Line::from(Span::styled(
                v.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            let tags = v.tags().join(" · ");
            if !tags.is_empty() {
                side.push(Line::from(Span::styled(tags, Style::default().fg(Color::Cyan))));
            }
            if !v.description.is_empty() {
                side.push(Line::from(""));
                side.push(Line::from(v.description.clone()));
            }
            if state.favorites.contains(&v.id) {
                side.push(Line::from(Span::styled("♥ favourite", Style::default().fg(Color::Magenta))));
            }
        }
        None => side.push(Line::from("No voice selected")),
    }
    side.push(Line::from(""));
    side.push(Line::from(Span::styled(
        "enter on Voice opens the picker",
        Style::default().fg(Color::Gray),
    )));
    let p = Paragraph::new(side)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Voice"));
    f.render_widget(p, cols[1]);
}

fn draw_job(area: Rect, f: &mut ratatui::Frame, state: &UiState, view: ContentView) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(40), Constraint::Min(0)])
        .split(area);
    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3), Constraint::Length(8)])
        .split(cols[0]);

    let steps: Vec<Line> = match state.job() {
        Some(job) => job
            .steps
            .iter()
            .map(|s| Line::from(Span::styled(text_summary::step_line(s), step_style(s.status))))
            .collect(),
        None => vec![Line::from("Submitting…")],
    };
    let p = Paragraph::new(steps)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Pipeline"));
    f.render_widget(p, side[0]);

    let progress = state.job().map(|j| j.progress()).unwrap_or(0.0);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(progress.clamp(0.0, 1.0));
    f.render_widget(gauge, side[1]);

    let recent: Vec<Line> = state
        .log
        .iter()
        .rev()
        .take(6)
        .rev()
        .map(|l| Line::from(Span::styled(l.clone(), Style::default().fg(Color::Gray))))
        .collect();
    let p = Paragraph::new(recent).block(Block::default().borders(Borders::ALL).title("Activity"));
    f.render_widget(p, side[2]);

    match view {
        ContentView::Loading => draw_loading(cols[1], f, state),
        ContentView::Script => draw_script(cols[1], f, state),
        ContentView::Voice => draw_voice(cols[1], f, state),
        ContentView::Result => draw_result(cols[1], f, state),
    }
}

fn hint(text: &str) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), Style::default().fg(Color::Magenta)))
}

fn draw_loading(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    if let Some(job) = state.job().filter(|j| j.status == JobStatus::Failed) {
        draw_failed(area, f, job);
        return;
    }
    let mut lines = vec![Line::from(Span::styled(
        "Working on your video…",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    match state.job() {
        Some(job) => {
            lines.push(Line::from(text_summary::progress_line(job)));
            if let Some(step) = job.step(job.current_step) {
                lines.push(Line::from(""));
                lines.push(Line::from(format!("{}: {}", step.name, step.description)));
                if let Some(msg) = step.message.as_deref().filter(|m| !m.is_empty()) {
                    lines.push(Line::from(Span::styled(msg.to_string(), Style::default().fg(Color::Gray))));
                }
            }
        }
        None => lines.push(Line::from("Submitting request…")),
    }
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("In progress"));
    f.render_widget(p, area);
}

/// A failed pipeline stays in the loading view; show why instead of progress.
fn draw_failed(area: Rect, f: &mut ratatui::Frame, job: &Job) {
    let mut lines = vec![
        Line::from(Span::styled(
            "Pipeline failed",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(job.error.clone().unwrap_or_else(|| "pipeline failed".into())),
    ];
    let failed: Vec<Line> = job
        .steps
        .iter()
        .filter(|s| s.status == StepStatus::Failed)
        .map(|s| Line::from(Span::styled(text_summary::step_line(s), step_style(s.status))))
        .collect();
    if !failed.is_empty() {
        lines.push(Line::from(""));
        lines.extend(failed);
    }
    lines.push(Line::from(""));
    lines.push(hint("n new video"));
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Failed"));
    f.render_widget(p, area);
}

fn draw_script(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let Some(session) = state.session.as_ref() else {
        return;
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let (title, body): (String, Vec<Line>) = match (&session.script, session.editing) {
        (_, true) => ("Script".into(), vec![Line::from("Rewriting script…")]),
        (Some(script), false) => (
            format!(
                "Script · {} words · {} scenes",
                script.total_word_count, script.scenes
            ),
            script.text.lines().map(|l| Line::from(l.to_string())).collect(),
        ),
        (None, false) => ("Script".into(), vec![Line::from("Loading script…")]),
    };
    let p = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .scroll((state.script_scroll, 0))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(p, rows[0]);

    let keys = if session.script_approved {
        hint("Approved. Waiting for the voiceover…")
    } else if session.editing {
        hint("Please wait…")
    } else {
        hint("a approve   e edit   ↑/↓ scroll   n new video")
    };
    f.render_widget(Paragraph::new(keys).block(Block::default().borders(Borders::ALL)), rows[1]);
}

fn draw_voice(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let Some(session) = state.session.as_ref() else {
        return;
    };
    let voice_id = state
        .job()
        .and_then(|j| j.config.get("voice_id"))
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let voice_name = state
        .voices
        .iter()
        .find(|v| v.id == voice_id)
        .map(|v| v.name.clone())
        .unwrap_or_else(|| voice_id.to_string());

    let mut lines = vec![];
    if session.regenerating {
        lines.push(Line::from("Regenerating voiceover…"));
    } else {
        lines.push(Line::from(Span::styled(
            "Voiceover ready for review",
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }
    if !voice_name.is_empty() {
        lines.push(Line::from(format!("Voice: {voice_name}")));
    }
    if let Some(step) = state.job().and_then(|j| j.step(crate::model::VOICE_STEP)) {
        if let Some(msg) = step.message.as_deref().filter(|m| !m.is_empty()) {
            lines.push(Line::from(Span::styled(msg.to_string(), Style::default().fg(Color::Gray))));
        }
    }
    lines.push(Line::from(""));
    lines.push(if session.voice_approved {
        hint("Approved. Assembling the video…")
    } else if session.regenerating {
        hint("Please wait…")
    } else {
        hint("a approve   g regenerate   s save audio   n new video")
    });

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Voiceover"));
    f.render_widget(p, area);
}

fn draw_result(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let Some(job) = state.job() else {
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let duration = job
        .result
        .as_ref()
        .and_then(|r| text_summary::format_duration(r.duration_seconds))
        .map(|d| format!("Total duration: {d}"))
        .unwrap_or_else(|| "Video ready".into());
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(duration, Style::default().fg(Color::Green))))
            .block(Block::default().borders(Borders::ALL).title("Result")),
        rows[0],
    );

    if state.links.is_empty() {
        let body: Vec<Line> = if state.summary.is_empty() {
            vec![Line::from("Loading results…")]
        } else {
            state.summary.iter().map(|l| Line::from(l.clone())).collect()
        };
        f.render_widget(
            Paragraph::new(body).block(Block::default().borders(Borders::ALL).title("Deliverables")),
            rows[1],
        );
    } else {
        let items: Vec<ListItem> = state
            .links
            .iter()
            .map(|(label, url)| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{label:<18}"), Style::default().fg(Color::Cyan)),
                    Span::raw(url.clone()),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Deliverables"))
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .highlight_symbol("› ");
        let mut ls = ListState::default().with_selected(Some(state.result_selected));
        f.render_stateful_widget(list, rows[1], &mut ls);
    }

    f.render_widget(
        Paragraph::new(hint("↑/↓ select   y copy URL   n new video"))
            .block(Block::default().borders(Borders::ALL)),
        rows[2],
    );
}

fn draw_edit_modal(area: Rect, f: &mut ratatui::Frame, text: &str) {
    let lines = vec![
        Line::from("How should the script change?"),
        Line::from(""),
        Line::from(format!("{text}▏")),
        Line::from(""),
        hint("enter submit   esc cancel"),
    ];
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Edit script"));
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}

fn draw_voice_picker(area: Rect, f: &mut ratatui::Frame, state: &UiState, picker: &VoicePicker) {
    f.render_widget(Clear, area);
    let block = Block::default().borders(Borders::ALL).title("Choose a voice");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(5),
        ])
        .split(inner);

    let filt = &picker.filter;
    let cursor = if picker.searching { "▏" } else { "" };
    let filters = Line::from(vec![
        Span::styled("Search: ", Style::default().fg(Color::Gray)),
        Span::raw(format!("{}{cursor}", filt.search)),
        Span::styled("  Gender: ", Style::default().fg(Color::Gray)),
        Span::raw(filt.gender.clone().unwrap_or_else(|| "all".into())),
        Span::styled("  Category: ", Style::default().fg(Color::Gray)),
        Span::raw(filt.category.clone().unwrap_or_else(|| "all".into())),
        Span::styled("  Accent: ", Style::default().fg(Color::Gray)),
        Span::raw(filt.accent.clone().unwrap_or_else(|| "all".into())),
        Span::styled("  Favourites only: ", Style::default().fg(Color::Gray)),
        Span::raw(if filt.favorites_only { "yes" } else { "no" }),
    ]);
    f.render_widget(Paragraph::new(filters), rows[0]);

    let visible = state.filtered_voices(filt);
    if visible.is_empty() {
        let msg = if !state.voices_loaded {
            "Loading voices…"
        } else if state.voices.is_empty() {
            "No voices available (r to reload)"
        } else {
            "No voices match the filters"
        };
        f.render_widget(Paragraph::new(msg), rows[1]);
    } else {
        let items: Vec<ListItem> = visible
            .iter()
            .map(|v| {
                let fav = if state.favorites.contains(&v.id) { "♥ " } else { "  " };
                let current = if v.id == state.form.voice_id { " ✓" } else { "" };
                ListItem::new(Line::from(vec![
                    Span::styled(fav, Style::default().fg(Color::Magenta)),
                    Span::raw(format!("{:<22}", v.name)),
                    Span::styled(v.tags().join(" · "), Style::default().fg(Color::Cyan)),
                    Span::styled(current, Style::default().fg(Color::Green)),
                ]))
            })
            .collect();
        let list = List::new(items)
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .highlight_symbol("› ");
        let mut ls = ListState::default().with_selected(Some(picker.selected));
        f.render_stateful_widget(list, rows[1], &mut ls);
    }

    let mut details: Vec<Line> = Vec::new();
    if let Some(v) = visible.get(picker.selected) {
        if !v.description.is_empty() {
            details.push(Line::from(v.description.clone()));
        }
        if !v.use_case.is_empty() {
            details.push(Line::from(Span::styled(
                format!("Use case: {}", v.use_case),
                Style::default().fg(Color::Gray),
            )));
        }
        if !v.preview_url.is_empty() {
            details.push(Line::from(Span::styled(
                format!("Preview: {}", v.preview_url),
                Style::default().fg(Color::Gray),
            )));
        }
    }
    details.push(hint(
        "enter select  / search  g c a filters  v favourites  f ♥  y copy preview  esc close",
    ));
    f.render_widget(Paragraph::new(details).wrap(Wrap { trim: true }), rows[2]);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

// Global clipboard manager channel - initialized once on first use
use std::sync::mpsc as std_mpsc;
use std::sync::OnceLock;

static CLIPBOARD_SENDER: OnceLock<std_mpsc::Sender<String>> = OnceLock::new();

/// Initialize the clipboard manager thread if not already initialized.
/// Each copy keeps its clipboard instance alive for a while so that Linux clipboard
/// managers get a chance to read the contents.
fn init_clipboard_manager() -> Result<&'static std_mpsc::Sender<String>> {
    CLIPBOARD_SENDER.get_or_init(|| {
        let (tx, rx) = std_mpsc::channel::<String>();

        std::thread::spawn(move || {
            use arboard::Clipboard;

            for text in rx {
                if let Ok(mut clipboard) = Clipboard::new() {
                    if clipboard.set_text(&text).is_ok() {
                        std::thread::sleep(Duration::from_secs(2));
                    }
                }
            }
        });

        tx
    });

    CLIPBOARD_SENDER
        .get()
        .ok_or_else(|| anyhow::anyhow!("Failed to initialize clipboard manager"))
}

/// Queue text for the clipboard without blocking the UI thread.
fn copy_to_clipboard(text: &str) -> Result<()> {
    let sender = init_clipboard_manager()?;
    sender
        .send(text.to_string())
        .map_err(|_| anyhow::anyhow!("Clipboard manager channel closed"))?;
    Ok(())
}
