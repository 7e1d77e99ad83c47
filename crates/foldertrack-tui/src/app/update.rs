use chrono::Local;

use foldertrack_core::bulk::DATE_FORMAT;
use foldertrack_core::speech::ToggleOutcome;
use foldertrack_core::{BulkAction, Notice, ReportKind, ServiceError};

use super::{App, InputMode};
use crate::action::Action;
use crate::input::BACKSPACE;
use crate::tui_event::BackendCommand;

impl App {
    /// Process a user action and update state. Returns true if the app should quit.
    pub fn update(&mut self, action: Action) -> bool {
        match action {
            Action::ForceQuit => {
                self.should_quit = true;
                return true;
            }
            Action::Tick => {
                self.tick = self.tick.wrapping_add(1);
                self.expire_status();
                return false;
            }
            Action::Resize(..) | Action::None => return false,
            _ => {}
        }

        // Quit confirmation modal: q confirms, Esc cancels
        if self.confirm_quit {
            match action {
                Action::Quit => {
                    self.should_quit = true;
                    return true;
                }
                Action::NavigateBack | Action::TextCancel => {
                    self.confirm_quit = false;
                }
                _ => {}
            }
            return false;
        }

        // Notices block everything until dismissed
        if !self.notices.is_empty() {
            if matches!(
                action,
                Action::Confirm | Action::NavigateBack | Action::TextConfirm | Action::TextCancel
            ) {
                self.notices.pop_front();
            }
            return false;
        }

        if self.show_help {
            match action {
                Action::ToggleHelp | Action::NavigateBack => self.show_help = false,
                Action::Quit => self.confirm_quit = true,
                _ => {}
            }
            return false;
        }

        match self.input_mode {
            InputMode::Query => self.update_query_edit(action),
            InputMode::Date => self.update_date_edit(action),
            InputMode::Normal => self.update_normal(action),
        }
        false
    }

    fn update_normal(&mut self, action: Action) {
        match action {
            Action::Quit => self.confirm_quit = true,
            Action::CursorDown => self.session.cursor_down(),
            Action::CursorUp => self.session.cursor_up(),
            Action::NextPage => {
                self.session.next_page();
            }
            Action::PrevPage => {
                self.session.prev_page();
            }
            Action::FirstPage => self.session.first_page(),
            Action::LastPage => self.session.last_page(),
            Action::ToggleRow => {
                self.session.toggle_cursor();
            }
            Action::ToggleSelectAll => self.session.toggle_select_all(),
            Action::StartQueryEdit => {
                self.query_before_edit = Some(self.session.query().to_string());
                self.input_mode = InputMode::Query;
            }
            Action::ToggleDictation => self.toggle_dictation(),
            Action::NextCaseManager => self.session.cycle_case_manager(true),
            Action::PrevCaseManager => self.session.cycle_case_manager(false),
            Action::NextPurpose => self.session.cycle_purpose(true),
            Action::PrevPurpose => self.session.cycle_purpose(false),
            Action::StartDateEdit => {
                let date = self
                    .session
                    .pending()
                    .date
                    .unwrap_or_else(|| Local::now().date_naive());
                self.date_buffer = date.format(DATE_FORMAT).to_string();
                self.input_mode = InputMode::Date;
            }
            Action::Assign => self.start_bulk(BulkAction::Assign),
            Action::Return => self.start_bulk(BulkAction::Return),
            Action::Export(kind) => self.start_export(kind),
            Action::Reload => {
                self.request_load();
                if self.loading > 0 {
                    self.set_status("Reloading...");
                }
            }
            Action::ToggleHelp => self.show_help = true,
            _ => {}
        }
    }

    fn update_query_edit(&mut self, action: Action) {
        match action {
            Action::TextInput(ch) => {
                let mut query = self.session.query().to_string();
                if ch == BACKSPACE {
                    query.pop();
                } else {
                    query.push(ch);
                }
                self.session.set_query(query);
            }
            Action::TextConfirm => {
                self.query_before_edit = None;
                self.input_mode = InputMode::Normal;
            }
            Action::TextCancel => {
                if let Some(previous) = self.query_before_edit.take() {
                    self.session.set_query(previous);
                }
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    fn update_date_edit(&mut self, action: Action) {
        match action {
            Action::TextInput(ch) => {
                if ch == BACKSPACE {
                    self.date_buffer.pop();
                } else if ch.is_ascii_digit() || ch == '-' {
                    self.date_buffer.push(ch);
                }
            }
            Action::TextConfirm => {
                self.input_mode = InputMode::Normal;
                let input = std::mem::take(&mut self.date_buffer);
                if input.trim().is_empty() {
                    self.session.clear_date();
                    return;
                }
                match self.session.set_date(&input) {
                    Ok(date) => self.set_status(format!("Date set to {}", date.format(DATE_FORMAT))),
                    Err(e) => self.push_notice(Notice::warning(e.to_string())),
                }
            }
            Action::TextCancel => {
                self.date_buffer.clear();
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    fn toggle_dictation(&mut self) {
        match self.bridge.toggle() {
            Ok(ToggleOutcome::Started(_)) => self.status = None,
            Ok(ToggleOutcome::Stopped(_)) => self.set_status("Dictation stopped"),
            Err(e) => {
                tracing::warn!(error = %e, "cannot start dictation");
                self.push_notice(e.notice());
            }
        }
    }

    fn start_bulk(&mut self, action: BulkAction) {
        let request = match self.session.begin_bulk(action) {
            Ok(r) => r,
            Err(e) => {
                self.push_notice(Notice::warning(e.to_string()));
                return;
            }
        };
        let count = request.record_ids().len();
        if self.send(BackendCommand::Submit(request)) {
            let verb = match action {
                BulkAction::Assign => "Assigning",
                BulkAction::Return => "Returning",
            };
            self.set_status(format!("{verb} {count} folder(s)..."));
        } else {
            let outcome = Err(ServiceError::Transport("backend unavailable".into()));
            let notice = self.session.finish_bulk(action, &outcome);
            self.push_notice(notice);
        }
    }

    fn start_export(&mut self, kind: ReportKind) {
        if self.send(BackendCommand::Export(kind)) {
            self.set_status(format!("Downloading {}...", kind.label().to_lowercase()));
        } else {
            tracing::error!(report = kind.label(), "backend unavailable; report not requested");
        }
    }
}
