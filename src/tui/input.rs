//! Key handling. Keys mutate UI-local state directly and turn into actions for the run loop.

use super::state::{FormField, Modal, UiState, VoicePicker};
use crate::model::{ContentView, ValidationError};
use crate::orchestrator::UiCommand;
use crate::voices::{self, cycle_option};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug)]
pub enum Action {
    Send(UiCommand),
    Copy(String),
    Quit,
}

pub fn handle_key(state: &mut UiState, key: KeyEvent) -> Vec<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return vec![Action::Quit];
    }
    if let Some(modal) = state.modal.take() {
        return handle_modal_key(state, modal, key);
    }
    match state.view() {
        None => handle_form_key(state, key),
        Some(view) => handle_job_key(state, view, key),
    }
}

fn submit(state: &mut UiState) -> Vec<Action> {
    if state.session.as_ref().is_some_and(|s| s.loading) {
        return Vec::new();
    }
    match state.form.validated() {
        Ok(req) => {
            state.form_error = None;
            vec![Action::Send(UiCommand::Submit(req))]
        }
        Err(e) => {
            state.form_error = Some(e.to_string());
            Vec::new()
        }
    }
}

fn handle_form_key(state: &mut UiState, key: KeyEvent) -> Vec<Action> {
    let text = state.focus.is_text();
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => submit(state),
        (_, KeyCode::Tab) | (_, KeyCode::Down) => {
            state.focus = state.focus.next();
            Vec::new()
        }
        (_, KeyCode::BackTab) | (_, KeyCode::Up) => {
            state.focus = state.focus.prev();
            Vec::new()
        }
        (_, KeyCode::Esc) => {
            state.form_error = None;
            vec![Action::Send(UiCommand::DismissErrors)]
        }
        (_, KeyCode::Enter) => match state.focus {
            FormField::Prompt => {
                state.type_char('\n');
                Vec::new()
            }
            FormField::Voice => {
                state.open_voice_picker();
                if state.voices.is_empty() {
                    vec![Action::Send(UiCommand::LoadVoices)]
                } else {
                    Vec::new()
                }
            }
            FormField::Submit => submit(state),
            _ => {
                state.focus = state.focus.next();
                Vec::new()
            }
        },
        (_, KeyCode::Backspace) if text => {
            state.backspace();
            Vec::new()
        }
        (_, KeyCode::Char(c)) if text => {
            state.type_char(c);
            Vec::new()
        }
        (_, KeyCode::Left) | (_, KeyCode::Char('-')) => {
            state.adjust(-1);
            Vec::new()
        }
        (_, KeyCode::Right) | (_, KeyCode::Char('+')) | (_, KeyCode::Char(' ')) => {
            state.adjust(1);
            Vec::new()
        }
        (_, KeyCode::Char('q')) => vec![Action::Quit],
        (_, KeyCode::Char('?')) => {
            state.modal = Some(Modal::Help);
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn handle_job_key(state: &mut UiState, view: ContentView, key: KeyEvent) -> Vec<Action> {
    let (script_approved, voice_approved, editing, regenerating) = state
        .session
        .as_ref()
        .map(|s| (s.script_approved, s.voice_approved, s.editing, s.regenerating))
        .unwrap_or_default();

    match (view, key.code) {
        (_, KeyCode::Char('q')) => vec![Action::Quit],
        (_, KeyCode::Char('?')) => {
            state.modal = Some(Modal::Help);
            Vec::new()
        }
        (_, KeyCode::Char('x')) | (_, KeyCode::Esc) => {
            vec![Action::Send(UiCommand::DismissErrors)]
        }
        (_, KeyCode::Char('n')) => {
            state.focus = FormField::Title;
            state.summary.clear();
            state.links.clear();
            vec![Action::Send(UiCommand::Reset)]
        }

        (ContentView::Script, KeyCode::Char('a')) if !script_approved && !editing => {
            vec![Action::Send(UiCommand::ApproveScript)]
        }
        (ContentView::Script, KeyCode::Char('e')) if !editing => {
            state.modal = Some(Modal::EditInstruction(String::new()));
            Vec::new()
        }
        (ContentView::Script, KeyCode::Down) | (ContentView::Script, KeyCode::Char('j')) => {
            state.script_scroll = state.script_scroll.saturating_add(1);
            Vec::new()
        }
        (ContentView::Script, KeyCode::Up) | (ContentView::Script, KeyCode::Char('k')) => {
            state.script_scroll = state.script_scroll.saturating_sub(1);
            Vec::new()
        }
        (ContentView::Script, KeyCode::PageDown) => {
            state.script_scroll = state.script_scroll.saturating_add(10);
            Vec::new()
        }
        (ContentView::Script, KeyCode::PageUp) => {
            state.script_scroll = state.script_scroll.saturating_sub(10);
            Vec::new()
        }

        (ContentView::Voice, KeyCode::Char('a')) if !voice_approved && !regenerating => {
            vec![Action::Send(UiCommand::ApproveVoice)]
        }
        (ContentView::Voice, KeyCode::Char('g')) if !regenerating => {
            vec![Action::Send(UiCommand::RegenerateVoice)]
        }
        (ContentView::Voice, KeyCode::Char('s')) => {
            let Some(job_id) = state.job().map(|j| j.job_id.clone()) else {
                return Vec::new();
            };
            let path = state
                .voiceover_out
                .clone()
                .unwrap_or_else(|| crate::cli::default_voiceover_path(&job_id));
            state.push_info(format!("Saving voiceover to {}…", path.display()));
            vec![Action::Send(UiCommand::SaveVoiceover(path))]
        }

        (ContentView::Result, KeyCode::Down) | (ContentView::Result, KeyCode::Char('j')) => {
            if state.result_selected + 1 < state.links.len() {
                state.result_selected += 1;
            }
            Vec::new()
        }
        (ContentView::Result, KeyCode::Up) | (ContentView::Result, KeyCode::Char('k')) => {
            state.result_selected = state.result_selected.saturating_sub(1);
            Vec::new()
        }
        (ContentView::Result, KeyCode::Char('y')) | (ContentView::Result, KeyCode::Enter) => {
            match state.links.get(state.result_selected) {
                Some((_, url)) => vec![Action::Copy(url.clone())],
                None => {
                    state.info = "No deliverable to copy".into();
                    Vec::new()
                }
            }
        }
        _ => Vec::new(),
    }
}

fn handle_modal_key(state: &mut UiState, modal: Modal, key: KeyEvent) -> Vec<Action> {
    match modal {
        Modal::Help => Vec::new(),
        Modal::EditInstruction(mut text) => match key.code {
            KeyCode::Esc => Vec::new(),
            KeyCode::Enter => {
                let instruction = text.trim();
                if instruction.is_empty() {
                    state.info = ValidationError::EmptyInstruction.to_string();
                    state.modal = Some(Modal::EditInstruction(text));
                    Vec::new()
                } else {
                    vec![Action::Send(UiCommand::EditScript(instruction.to_string()))]
                }
            }
            KeyCode::Backspace => {
                text.pop();
                state.modal = Some(Modal::EditInstruction(text));
                Vec::new()
            }
            KeyCode::Char(c) => {
                text.push(c);
                state.modal = Some(Modal::EditInstruction(text));
                Vec::new()
            }
            _ => {
                state.modal = Some(Modal::EditInstruction(text));
                Vec::new()
            }
        },
        Modal::VoicePicker(picker) => handle_picker_key(state, picker, key),
    }
}

fn handle_picker_key(state: &mut UiState, mut picker: VoicePicker, key: KeyEvent) -> Vec<Action> {
    let mut actions = Vec::new();

    if picker.searching {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => picker.searching = false,
            KeyCode::Backspace => {
                picker.filter.search.pop();
            }
            KeyCode::Char(c) => picker.filter.search.push(c),
            _ => {}
        }
    } else {
        let visible: Vec<(String, String)> = state
            .filtered_voices(&picker.filter)
            .iter()
            .map(|v| (v.id.clone(), v.preview_url.clone()))
            .collect();
        match key.code {
            KeyCode::Esc => return actions,
            KeyCode::Enter => {
                if let Some((id, _)) = visible.get(picker.selected) {
                    state.form.voice_id = id.clone();
                    return actions;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if picker.selected + 1 < visible.len() {
                    picker.selected += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                picker.selected = picker.selected.saturating_sub(1);
            }
            KeyCode::Char('/') => picker.searching = true,
            KeyCode::Char('g') => {
                let genders: Vec<String> = voices::GENDERS.iter().map(|s| s.to_string()).collect();
                picker.filter.gender = cycle_option(&picker.filter.gender, &genders);
            }
            KeyCode::Char('c') => {
                let categories: Vec<String> =
                    voices::CATEGORIES.iter().map(|s| s.to_string()).collect();
                picker.filter.category = cycle_option(&picker.filter.category, &categories);
            }
            KeyCode::Char('a') => {
                let accents = voices::accent_options(&state.voices);
                picker.filter.accent = cycle_option(&picker.filter.accent, &accents);
            }
            KeyCode::Char('v') => picker.filter.favorites_only = !picker.filter.favorites_only,
            KeyCode::Char('f') => {
                if let Some((id, _)) = visible.get(picker.selected) {
                    match state.favorites.toggle(id) {
                        Ok(true) => state.info = "Added to favourites".into(),
                        Ok(false) => state.info = "Removed from favourites".into(),
                        Err(e) => state.info = format!("Saving favourites failed: {e:#}"),
                    }
                }
            }
            KeyCode::Char('y') => match visible.get(picker.selected) {
                Some((_, url)) if !url.is_empty() => actions.push(Action::Copy(url.clone())),
                _ => state.info = "No preview available for this voice".into(),
            },
            KeyCode::Char('r') => actions.push(Action::Send(UiCommand::LoadVoices)),
            _ => {}
        }
    }

    let count = state.filtered_voices(&picker.filter).len();
    picker.selected = picker.selected.min(count.saturating_sub(1));
    state.modal = Some(Modal::VoicePicker(picker));
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{JobEvent, JobStatus, StepStatus::*, Voice};
    use crate::orchestrator::tests_support::{job_with, steps};
    use crate::tui::state::tests::{snapshot, state};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn typed(state: &mut UiState, text: &str) {
        for c in text.chars() {
            handle_key(state, key(KeyCode::Char(c)));
        }
    }

    fn commands(actions: Vec<Action>) -> Vec<UiCommand> {
        actions
            .into_iter()
            .filter_map(|a| match a {
                Action::Send(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    fn in_view(view: ContentView) -> UiState {
        let mut s = state();
        let job = job_with(JobStatus::Running, steps(&[Completed, Completed, Completed]));
        s.apply_event(JobEvent::Snapshot(Box::new(snapshot(Some(job), view))));
        s
    }

    #[test]
    fn typing_q_into_title_does_not_quit() {
        let mut s = state();
        typed(&mut s, "quiz");
        assert_eq!(s.form.title, "quiz");
        s.focus = FormField::Duration;
        assert!(matches!(handle_key(&mut s, key(KeyCode::Char('q')))[..], [Action::Quit]));
    }

    #[test]
    fn submit_validates_before_sending() {
        let mut s = state();
        s.focus = FormField::Submit;
        let cmds = commands(handle_key(&mut s, key(KeyCode::Enter)));
        assert!(cmds.is_empty());
        assert_eq!(s.form_error.as_deref(), Some("title is required"));

        s.focus = FormField::Title;
        typed(&mut s, "  Dam ");
        s.focus = FormField::Prompt;
        typed(&mut s, "History");
        let cmds = commands(handle_key(
            &mut s,
            KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL),
        ));
        match &cmds[..] {
            [UiCommand::Submit(req)] => assert_eq!(req.title, "Dam"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(s.form_error, None);
    }

    #[test]
    fn script_keys_respect_flags() {
        let mut s = in_view(ContentView::Script);
        assert!(matches!(
            commands(handle_key(&mut s, key(KeyCode::Char('a'))))[..],
            [UiCommand::ApproveScript]
        ));
        if let Some(snap) = s.session.as_mut() {
            snap.editing = true;
        }
        assert!(commands(handle_key(&mut s, key(KeyCode::Char('a')))).is_empty());
        assert!(handle_key(&mut s, key(KeyCode::Char('e'))).is_empty());
        assert!(s.modal.is_none());
    }

    #[test]
    fn edit_modal_requires_instruction() {
        let mut s = in_view(ContentView::Script);
        handle_key(&mut s, key(KeyCode::Char('e')));
        assert!(matches!(s.modal, Some(Modal::EditInstruction(_))));
        typed(&mut s, "   ");
        assert!(commands(handle_key(&mut s, key(KeyCode::Enter))).is_empty());
        assert_eq!(s.info, "edit instruction is required");

        for _ in 0..3 {
            handle_key(&mut s, key(KeyCode::Backspace));
        }
        typed(&mut s, "make it shorter ");
        match &commands(handle_key(&mut s, key(KeyCode::Enter)))[..] {
            [UiCommand::EditScript(i)] => assert_eq!(i, "make it shorter"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(s.modal.is_none());
    }

    #[test]
    fn voice_view_actions() {
        let mut s = in_view(ContentView::Voice);
        assert!(matches!(
            commands(handle_key(&mut s, key(KeyCode::Char('g'))))[..],
            [UiCommand::RegenerateVoice]
        ));
        s.voiceover_out = Some("out.mp3".into());
        match &commands(handle_key(&mut s, key(KeyCode::Char('s'))))[..] {
            [UiCommand::SaveVoiceover(p)] => assert_eq!(p, std::path::Path::new("out.mp3")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            commands(handle_key(&mut s, key(KeyCode::Char('a'))))[..],
            [UiCommand::ApproveVoice]
        ));
    }

    #[test]
    fn result_copies_selected_link() {
        let mut s = in_view(ContentView::Result);
        s.finish_job(
            vec![],
            vec![
                ("Final Video", "http://h/a.mp4".into()),
                ("Subtitles", "http://h/a.srt".into()),
            ],
        );
        handle_key(&mut s, key(KeyCode::Down));
        handle_key(&mut s, key(KeyCode::Down));
        match &handle_key(&mut s, key(KeyCode::Char('y')))[..] {
            [Action::Copy(url)] => assert_eq!(url, "http://h/a.srt"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn new_video_resets() {
        let mut s = in_view(ContentView::Result);
        s.focus = FormField::Submit;
        assert!(matches!(
            commands(handle_key(&mut s, key(KeyCode::Char('n'))))[..],
            [UiCommand::Reset]
        ));
        assert_eq!(s.focus, FormField::Title);
    }

    #[test]
    fn picker_filters_favourites_and_selects() {
        let mut s = state();
        let voices = vec![
            Voice { id: "v1".into(), name: "Ann".into(), gender: "female".into(), ..Voice::default() },
            Voice { id: "v2".into(), name: "Bob".into(), gender: "male".into(), ..Voice::default() },
            Voice { id: "v3".into(), name: "Cy".into(), gender: "male".into(), ..Voice::default() },
        ];
        s.apply_event(JobEvent::VoicesLoaded(voices));
        s.focus = FormField::Voice;
        handle_key(&mut s, key(KeyCode::Enter));
        assert!(matches!(s.modal, Some(Modal::VoicePicker(_))));

        // gender: all -> male
        handle_key(&mut s, key(KeyCode::Char('g')));
        handle_key(&mut s, key(KeyCode::Down));
        handle_key(&mut s, key(KeyCode::Char('f')));
        assert!(s.favorites.contains("v3"));

        handle_key(&mut s, key(KeyCode::Char('v')));
        match &s.modal {
            Some(Modal::VoicePicker(p)) => {
                assert_eq!(s.filtered_voices(&p.filter).len(), 1);
                assert_eq!(p.selected, 0);
            }
            other => panic!("unexpected {other:?}"),
        }
        handle_key(&mut s, key(KeyCode::Enter));
        assert!(s.modal.is_none());
        assert_eq!(s.form.voice_id, "v3");
    }

    #[test]
    fn picker_search_captures_letters() {
        let mut s = state();
        s.apply_event(JobEvent::VoicesLoaded(vec![Voice {
            id: "v1".into(),
            name: "Ann".into(),
            ..Voice::default()
        }]));
        s.open_voice_picker();
        handle_key(&mut s, key(KeyCode::Char('/')));
        typed(&mut s, "zzq");
        match &s.modal {
            Some(Modal::VoicePicker(p)) => {
                assert_eq!(p.filter.search, "zzq");
                assert!(s.filtered_voices(&p.filter).is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
