use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use foldertrack_core::Notice;

use crate::theme::Theme;
use crate::view::centered_rect;

/// Render the front notice as a modal; `queued` counts it and those behind it.
pub fn render(f: &mut Frame, notice: &Notice, queued: usize, theme: &Theme) {
    let color = theme.notice_color(notice.level);
    let width = (notice.message.chars().count() as u16 + 6).clamp(36, 70);
    let popup = centered_rect(width, 7, f.area());

    let mut hint = vec![
        Span::styled(
            "  Enter",
            Style::default()
                .fg(theme.active)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(": dismiss", Style::default().fg(theme.dim)),
    ];
    if queued > 1 {
        hint.push(Span::styled(
            format!("   ({} more)", queued - 1),
            Style::default().fg(theme.dim),
        ));
    }

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", notice.message),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(hint),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(Span::styled(
                    format!(" {} ", notice.title()),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}
