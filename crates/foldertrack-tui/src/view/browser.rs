use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use foldertrack_core::Record;
use foldertrack_core::bulk::DATE_FORMAT;

use crate::app::{App, InputMode};
use crate::theme::Theme;
use crate::view::{spinner_char, truncate};

/// Render the folder browser into the given area.
/// `footer_area` is a full-width row below it.
pub fn render_in(f: &mut Frame, app: &mut App, area: Rect, footer_area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // header
        Constraint::Length(1), // search bar
        Constraint::Length(1), // action fields
        Constraint::Min(5),    // table
    ])
    .split(area);

    render_header(f, chunks[0], app);
    render_search_bar(f, chunks[1], app);
    render_action_fields(f, chunks[2], app);
    render_table(f, chunks[3], app);
    app.last_table_area = Some(chunks[3]);

    render_footer(f, footer_area, app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let session = &app.session;

    let mut spans = vec![
        Span::styled(" foldertrack ", theme.header_style()),
        Span::styled(
            format!(
                " {} folders \u{00B7} {} shown \u{00B7} {} selected",
                session.records().len(),
                session.view_len(),
                session.selection().len()
            ),
            Style::default().fg(theme.text),
        ),
    ];

    if app.loading > 0 {
        spans.push(Span::styled(
            format!("  {} Loading...", spinner_char(app.tick)),
            Style::default().fg(theme.spinner),
        ));
    }

    if let Some(action) = session.bulk_in_flight() {
        spans.push(Span::styled(
            format!("  {} Submitting {}...", spinner_char(app.tick), action.label()),
            Style::default()
                .fg(theme.active)
                .add_modifier(Modifier::BOLD),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_search_bar(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let editing = app.input_mode == InputMode::Query;
    let query = app.session.query();

    let mut spans = vec![Span::styled(
        " /",
        Style::default()
            .fg(theme.active)
            .add_modifier(Modifier::BOLD),
    )];
    if query.is_empty() && !editing {
        spans.push(Span::styled(
            "search hospital no., status, collector or date",
            Style::default().fg(theme.dim),
        ));
    } else {
        spans.push(Span::styled(query.to_string(), Style::default().fg(theme.text)));
    }
    if editing {
        spans.push(Span::styled("\u{2588}", Style::default().fg(theme.active)));
    }
    if app.bridge.is_listening() {
        spans.push(Span::styled(
            format!("   {} Listening...", spinner_char(app.tick)),
            Style::default()
                .fg(theme.error)
                .add_modifier(Modifier::BOLD),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_action_fields(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let session = &app.session;

    let case_manager = session
        .selected_case_manager()
        .map(|c| c.display_name())
        .unwrap_or_else(|| "\u{2014}".to_string());
    let purpose = session
        .selected_purpose()
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "\u{2014}".to_string());

    let mut spans = vec![
        field_label(" Case manager ", theme),
        Span::styled(truncate(&case_manager, 28), Style::default().fg(theme.text)),
        field_label("  Purpose ", theme),
        Span::styled(truncate(&purpose, 24), Style::default().fg(theme.text)),
        field_label("  Date ", theme),
    ];

    if app.input_mode == InputMode::Date {
        spans.push(Span::styled(
            app.date_buffer.clone(),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled("\u{2588}", Style::default().fg(theme.active)));
        spans.push(Span::styled(
            "  YYYY-MM-DD, Enter to set, Esc to cancel",
            Style::default().fg(theme.dim),
        ));
    } else {
        let date = session
            .pending()
            .date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "\u{2014}".to_string());
        spans.push(Span::styled(date, Style::default().fg(theme.text)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn field_label<'a>(label: &'a str, theme: &Theme) -> Span<'a> {
    Span::styled(label, Style::default().fg(theme.dim))
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

/// Out-of-store rows are tinted as a whole; selection bolds them instead of
/// recoloring so the tint survives.
fn row_style(record: &Record, selected: bool, theme: &Theme) -> Style {
    match (record.is_out_store(), selected) {
        (true, true) => Style::default()
            .fg(theme.out_store)
            .add_modifier(Modifier::BOLD),
        (true, false) => Style::default().fg(theme.out_store),
        (false, true) => Style::default().fg(theme.selected),
        (false, false) => Style::default(),
    }
}

fn render_table(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let session = &app.session;

    let header_style = Style::default().fg(theme.text).add_modifier(Modifier::BOLD);
    // Checked state is the derived flag, which holds vacuously for an empty
    // view; an empty view only dims the box.
    let select_all_style = if session.view_len() == 0 {
        Style::default().fg(theme.dim)
    } else {
        header_style
    };
    let header = Row::new(vec![
        Cell::from(checkbox(session.all_selected())).style(select_all_style),
        Cell::from("Hospital No.").style(header_style),
        Cell::from("Enrolled").style(header_style),
        Cell::from("Status").style(header_style),
        Cell::from("Collected By").style(header_style),
    ])
    .height(1);

    let visible = session.visible_records();
    let collector_width = (area.width as usize).saturating_sub(60).max(12);

    let rows: Vec<Row> = if visible.is_empty() {
        let message = if app.loading > 0 {
            "Loading folders..."
        } else if session.records().is_empty() {
            "No folders loaded (R to reload)"
        } else {
            "No matching records found"
        };
        vec![Row::new(vec![
            Cell::from(""),
            Cell::from(message).style(Style::default().fg(theme.dim)),
        ])]
    } else {
        visible
            .iter()
            .map(|record| {
                let selected = session.is_selected(record.id);
                let status_style = if record.is_out_store() {
                    Style::default().fg(theme.out_store)
                } else if record.status.is_empty() {
                    Style::default().fg(theme.dim)
                } else {
                    Style::default().fg(theme.text)
                };
                let row_style = row_style(record, selected, theme);
                Row::new(vec![
                    Cell::from(checkbox(selected)),
                    Cell::from(record.hospital_number.clone()),
                    Cell::from(record.date_enrollment.clone()),
                    Cell::from(record.status_display().to_string()).style(status_style),
                    Cell::from(truncate(record.collected_by_display(), collector_width)),
                ])
                .style(row_style)
            })
            .collect()
    };

    let widths = [
        Constraint::Length(4),  // checkbox
        Constraint::Length(16), // hospital number
        Constraint::Length(12), // enrolled
        Constraint::Length(12), // status
        Constraint::Min(12),    // collected by
    ];

    let title = format!(
        " Page {} of {} ",
        session.current_page(),
        session.total_pages()
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style())
                .title(title),
        )
        .row_highlight_style(theme.highlight_style());

    let mut state = TableState::default();
    if !visible.is_empty() {
        state.select(Some(session.cursor()));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;

    let line = if let Some(status) = &app.status {
        Line::from(Span::styled(
            format!(" {}", status.message),
            Style::default().fg(theme.active),
        ))
    } else {
        let hints = match app.input_mode {
            InputMode::Query => " Enter:keep  Esc:restore  Backspace:delete",
            InputMode::Date => " Enter:set date  Esc:cancel  empty:clear",
            InputMode::Normal => {
                " Space:select  A:all  /:search  m:dictate  c/u/d:fields  a:assign  r:return  o/x:reports  ?:help  q:quit"
            }
        };
        Line::from(Span::styled(hints, theme.footer_style()))
    };

    f.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use foldertrack_core::RecordId;

    use super::*;

    fn record(status: &str) -> Record {
        Record {
            id: RecordId(1),
            hospital_number: "HN-001".into(),
            date_enrollment: String::new(),
            status: status.into(),
            collected_by: String::new(),
        }
    }

    #[test]
    fn out_store_tint_covers_the_whole_row() {
        let theme = Theme::standard();
        let out = record("Out Store");

        assert_eq!(row_style(&out, false, &theme).fg, Some(theme.out_store));
        let picked = row_style(&out, true, &theme);
        assert_eq!(picked.fg, Some(theme.out_store));
        assert!(picked.add_modifier.contains(Modifier::BOLD));

        let inside = record("In Store");
        assert_eq!(row_style(&inside, false, &theme), Style::default());
        assert_eq!(row_style(&inside, true, &theme).fg, Some(theme.selected));
    }
}
