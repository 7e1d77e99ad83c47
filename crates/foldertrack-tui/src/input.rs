use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use foldertrack_core::ReportKind;

use crate::action::Action;
use crate::app::InputMode;

/// Backspace travels through [`Action::TextInput`] as this sentinel.
pub const BACKSPACE: char = '\x08';

/// Map a crossterm terminal event to a TUI action, respecting input mode.
pub fn map_event(event: &Event, input_mode: &InputMode) -> Action {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            // Ctrl+C always quits regardless of mode
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Action::ForceQuit;
            }

            match input_mode {
                InputMode::Normal => map_key_normal(key),
                InputMode::Query | InputMode::Date => map_key_text_input(key),
            }
        }
        Event::Resize(w, h) => Action::Resize(*w, *h),
        _ => Action::None,
    }
}

fn map_key_normal(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => Action::CursorDown,
        KeyCode::Char('k') | KeyCode::Up => Action::CursorUp,
        KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => Action::NextPage,
        KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => Action::PrevPage,
        KeyCode::Char('g') | KeyCode::Home => Action::FirstPage,
        KeyCode::Char('G') | KeyCode::End => Action::LastPage,
        KeyCode::Char(' ') => Action::ToggleRow,
        KeyCode::Char('A') => Action::ToggleSelectAll,
        KeyCode::Char('/') => Action::StartQueryEdit,
        KeyCode::Char('m') => Action::ToggleDictation,
        KeyCode::Char('c') => Action::NextCaseManager,
        KeyCode::Char('C') => Action::PrevCaseManager,
        KeyCode::Char('u') => Action::NextPurpose,
        KeyCode::Char('U') => Action::PrevPurpose,
        KeyCode::Char('d') => Action::StartDateEdit,
        KeyCode::Char('a') => Action::Assign,
        KeyCode::Char('r') => Action::Return,
        KeyCode::Char('o') => Action::Export(ReportKind::Overdue),
        KeyCode::Char('x') => Action::Export(ReportKind::Collected),
        KeyCode::Char('R') => Action::Reload,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Enter => Action::Confirm,
        KeyCode::Esc => Action::NavigateBack,
        _ => Action::None,
    }
}

fn map_key_text_input(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc => Action::TextCancel,
        KeyCode::Enter => Action::TextConfirm,
        KeyCode::Char(c) => Action::TextInput(c),
        KeyCode::Backspace => Action::TextInput(BACKSPACE),
        _ => Action::None,
    }
}
