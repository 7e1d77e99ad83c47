use std::path::PathBuf;

use foldertrack_core::{BulkAction, BulkRequest, CaseManager, Purpose, Record, ReportKind, ServiceError};

/// Commands sent from the TUI to the backend.
#[derive(Debug, Clone)]
pub enum BackendCommand {
    /// Fetch records, case managers and purposes concurrently.
    LoadAll,
    /// Re-fetch only the record list.
    LoadRecords,
    /// Submit a validated bulk request.
    Submit(BulkRequest),
    /// Download a report and save it.
    Export(ReportKind),
}

/// Events flowing from the backend tasks to the TUI.
#[derive(Debug)]
pub enum BackendEvent {
    RecordsLoaded(Result<Vec<Record>, ServiceError>),
    CaseManagersLoaded(Result<Vec<CaseManager>, ServiceError>),
    PurposesLoaded(Result<Vec<Purpose>, ServiceError>),
    /// The remote call for a bulk action settled.
    BulkFinished {
        action: BulkAction,
        result: Result<(), ServiceError>,
    },
    /// A report download ended; `path` is `None` when it failed.
    ExportFinished {
        kind: ReportKind,
        path: Option<PathBuf>,
    },
}
