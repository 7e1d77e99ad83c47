use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::App;
use crate::view::centered_rect;

/// Work that quitting would throw away or cut short.
pub(crate) fn unfinished_work(app: &App) -> Vec<String> {
    let mut lost = Vec::new();
    if let Some(action) = app.session.bulk_in_flight() {
        lost.push(format!("{} request still running", action.label()));
    }
    match app.session.selection().len() {
        0 => {}
        1 => lost.push("1 selected folder".to_string()),
        n => lost.push(format!("{n} selected folders")),
    }
    if app.bridge.is_listening() {
        lost.push("dictation in progress".to_string());
    }
    lost
}

/// Ask before leaving; lists anything the operator would lose.
pub fn render(f: &mut Frame, app: &App) {
    let theme = &app.theme;
    let lost = unfinished_work(app);
    let height = 5 + if lost.is_empty() { 0 } else { lost.len() as u16 + 1 };
    let popup = centered_rect(46, height, f.area());

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Leave foldertrack?",
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
    ];
    if !lost.is_empty() {
        lines.push(Line::from(Span::styled(
            "  Discards:",
            Style::default().fg(theme.warning),
        )));
        lines.extend(
            lost.into_iter()
                .map(|item| Line::from(Span::styled(format!("    {item}"), Style::default().fg(theme.dim)))),
        );
    }
    lines.push(Line::from(vec![
        Span::styled("  q", Style::default().fg(theme.error).add_modifier(Modifier::BOLD)),
        Span::styled(" leave   ", Style::default().fg(theme.dim)),
        Span::styled("Esc", Style::default().fg(theme.active).add_modifier(Modifier::BOLD)),
        Span::styled(" stay", Style::default().fg(theme.dim)),
    ]));

    let border = if app.session.bulk_in_flight().is_some() {
        theme.warning
    } else {
        theme.border
    };
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Quit "),
    );

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}
