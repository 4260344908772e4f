use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn keybind(key: &'static str, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{key:<12}"), Style::default().fg(Color::Magenta)),
        Span::raw(what),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        keybind("Ctrl-C", "Quit"),
        keybind("q", "Quit (outside text fields)"),
        keybind("?", "Show this help"),
        Line::from(""),
        Line::from("Form:"),
        keybind("tab/↑/↓", "Move between fields"),
        keybind("←/→ space", "Change value"),
        keybind("enter", "Open voice picker / submit"),
        keybind("Ctrl-S", "Submit"),
        keybind("esc", "Dismiss error"),
        Line::from(""),
        Line::from("Job:"),
        keybind("a", "Approve script or voiceover"),
        keybind("e", "Edit script with an instruction"),
        keybind("g", "Regenerate voiceover"),
        keybind("s", "Save voiceover audio"),
        keybind("y", "Copy selected deliverable URL"),
        keybind("x", "Dismiss notice"),
        keybind("n", "New video"),
        Line::from(""),
        Line::from("Voice picker:"),
        keybind("/", "Search"),
        keybind("g c a", "Cycle gender, category, accent filters"),
        keybind("v", "Favourites only"),
        keybind("f", "Toggle favourite"),
        keybind("y", "Copy preview URL"),
        keybind("r", "Reload voices"),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to close",
            Style::default().fg(Color::Gray),
        )),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}
