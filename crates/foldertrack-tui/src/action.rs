use foldertrack_core::ReportKind;

/// Everything the operator (or the clock) can ask the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ForceQuit,
    Tick,
    Resize(u16, u16),

    // Table navigation
    CursorDown,
    CursorUp,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,

    // Selection
    ToggleRow,
    ToggleSelectAll,

    // Query
    StartQueryEdit,
    ToggleDictation,

    // Bulk action fields
    NextCaseManager,
    PrevCaseManager,
    NextPurpose,
    PrevPurpose,
    StartDateEdit,

    Assign,
    Return,
    Export(ReportKind),
    Reload,

    ToggleHelp,
    /// Enter in normal mode.
    Confirm,
    /// Esc in normal mode.
    NavigateBack,

    // Text entry (query and date editors)
    TextInput(char),
    TextConfirm,
    TextCancel,

    None,
}
