mod backend;
mod update;

use std::collections::VecDeque;

use ratatui::layout::Rect;
use tokio::sync::mpsc;

use foldertrack_core::speech::TranscriptionEvent;
use foldertrack_core::{BrowserSession, Notice, TranscriptionBridge};

use crate::theme::Theme;
use crate::tui_event::BackendCommand;

/// How long a status line stays up, in ticks.
const STATUS_TICKS: usize = 50;

/// Input mode determines how keyboard input is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the query; the filter re-runs on every keystroke.
    Query,
    /// Typing the action date.
    Date,
}

/// A transient informational message shown in the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub message: String,
    pub set_at: usize,
}

pub struct App {
    pub session: BrowserSession,
    pub bridge: TranscriptionBridge,
    pub theme: Theme,
    pub tick: usize,
    pub should_quit: bool,
    pub confirm_quit: bool,
    pub show_help: bool,
    pub input_mode: InputMode,
    /// Query as it was when query editing started; restored on Esc.
    pub query_before_edit: Option<String>,
    pub date_buffer: String,
    /// Modal notices, oldest first.
    pub notices: VecDeque<Notice>,
    pub status: Option<StatusLine>,
    /// Outstanding list fetches.
    pub loading: usize,
    pub backend_cmd_tx: Option<mpsc::UnboundedSender<BackendCommand>>,
    pub last_table_area: Option<Rect>,
}

impl App {
    pub fn new(theme: Theme, bridge: TranscriptionBridge) -> Self {
        Self {
            session: BrowserSession::new(),
            bridge,
            theme,
            tick: 0,
            should_quit: false,
            confirm_quit: false,
            show_help: false,
            input_mode: InputMode::Normal,
            query_before_edit: None,
            date_buffer: String::new(),
            notices: VecDeque::new(),
            status: None,
            loading: 0,
            backend_cmd_tx: None,
            last_table_area: None,
        }
    }

    /// The notice currently shown, if any.
    pub fn current_notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(StatusLine {
            message: message.into(),
            set_at: self.tick,
        });
    }

    fn expire_status(&mut self) {
        if let Some(status) = &self.status
            && self.tick.wrapping_sub(status.set_at) >= STATUS_TICKS
        {
            self.status = None;
        }
    }

    /// Queue a command for the backend. Returns false when no backend is
    /// attached or it has shut down.
    fn send(&self, cmd: BackendCommand) -> bool {
        match &self.backend_cmd_tx {
            Some(tx) => tx.send(cmd).is_ok(),
            None => false,
        }
    }

    /// Fetch all three lists.
    pub fn request_load(&mut self) {
        if self.send(BackendCommand::LoadAll) {
            self.loading += 3;
        }
    }

    /// Settle a dictation session result.
    pub fn handle_transcription(&mut self, event: TranscriptionEvent) {
        match self.bridge.accept(event) {
            Some(Ok(text)) => {
                self.set_status(format!("Heard \"{text}\""));
                self.session.set_query(text);
            }
            Some(Err(e)) => self.push_notice(e.notice()),
            None => {}
        }
    }

    /// Render the whole screen.
    pub fn view(&mut self, f: &mut ratatui::Frame) {
        let area = f.area();

        let footer_area = Rect {
            x: area.x,
            y: area.y + area.height.saturating_sub(1),
            width: area.width,
            height: 1.min(area.height),
        };
        let body_area = Rect {
            height: area.height.saturating_sub(1),
            ..area
        };

        crate::view::browser::render_in(f, self, body_area, footer_area);

        if self.show_help {
            crate::view::help::render(f, &self.theme);
        }

        if let Some(notice) = self.current_notice() {
            crate::view::notice::render(f, notice, self.notices.len(), &self.theme);
        }

        if self.confirm_quit {
            crate::view::quit_confirm::render(f, self);
        }
    }
}
