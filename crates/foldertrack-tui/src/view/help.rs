use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::theme::Theme;
use crate::view::centered_rect;

/// Render the help overlay as a centered popup.
pub fn render(f: &mut Frame, theme: &Theme) {
    let popup = centered_rect(64, 38, f.area());

    let lines = vec![
        Line::from(Span::styled(" Keyboard Shortcuts ", theme.header_style())),
        Line::from(""),
        section_header("Navigation", theme),
        key_line("j / \u{2193}", "Move down", theme),
        key_line("k / \u{2191}", "Move up", theme),
        key_line("n / \u{2192}", "Next page", theme),
        key_line("p / \u{2190}", "Previous page", theme),
        key_line("g / G", "First / last page", theme),
        Line::from(""),
        section_header("Search", theme),
        key_line("/", "Edit search (Esc restores)", theme),
        key_line("m", "Start/stop dictation", theme),
        Line::from(""),
        section_header("Selection", theme),
        key_line("Space", "Select/deselect row", theme),
        key_line("A", "Select/deselect all matches", theme),
        Line::from(""),
        section_header("Folder Actions", theme),
        key_line("c / C", "Next / previous case manager", theme),
        key_line("u / U", "Next / previous purpose", theme),
        key_line("d", "Set date (YYYY-MM-DD)", theme),
        key_line("a", "Assign selected folders", theme),
        key_line("r", "Mark selected folders returned", theme),
        Line::from(""),
        section_header("Reports", theme),
        key_line("o", "Download overdue folders", theme),
        key_line("x", "Download collected folders", theme),
        Line::from(""),
        section_header("Global", theme),
        key_line("R", "Reload data", theme),
        key_line("Enter / Esc", "Dismiss message", theme),
        key_line("?", "Toggle this help", theme),
        key_line("q", "Quit", theme),
        key_line("Ctrl+c", "Force quit", theme),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.active))
                .title(" Help "),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn section_header<'a>(title: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default()
            .fg(theme.active)
            .add_modifier(Modifier::BOLD),
    ))
}

fn key_line<'a>(key: &'a str, desc: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("    {key:<16}"), Style::default().fg(theme.text)),
        Span::styled(desc, Style::default().fg(theme.dim)),
    ])
}
