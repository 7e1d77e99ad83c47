use foldertrack_core::Notice;

use super::App;
use crate::tui_event::{BackendCommand, BackendEvent};

const RECORDS_FAILED: &str = "Failed to fetch data. Please try again later.";
const CASE_MANAGERS_FAILED: &str = "Failed to fetch case managers. Please try again later.";
const PURPOSES_FAILED: &str = "Failed to fetch purposes. Please try again later.";

impl App {
    /// Process a backend event and update model state.
    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::RecordsLoaded(result) => {
                self.loading = self.loading.saturating_sub(1);
                match result {
                    Ok(records) => {
                        let count = records.len();
                        let purged = self.session.replace_records(records);
                        tracing::debug!(count, purged, "records loaded");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "error fetching records");
                        self.push_notice(Notice::error(RECORDS_FAILED));
                    }
                }
            }
            BackendEvent::CaseManagersLoaded(result) => {
                self.loading = self.loading.saturating_sub(1);
                match result {
                    Ok(list) => self.session.set_case_managers(list),
                    Err(e) => {
                        tracing::error!(error = %e, "error fetching case managers");
                        self.push_notice(Notice::error(CASE_MANAGERS_FAILED));
                    }
                }
            }
            BackendEvent::PurposesLoaded(result) => {
                self.loading = self.loading.saturating_sub(1);
                match result {
                    Ok(list) => self.session.set_purposes(list),
                    Err(e) => {
                        tracing::error!(error = %e, "error fetching purposes");
                        self.push_notice(Notice::error(PURPOSES_FAILED));
                    }
                }
            }
            BackendEvent::BulkFinished { action, result } => {
                let succeeded = result.is_ok();
                let notice = self.session.finish_bulk(action, &result);
                self.status = None;
                self.push_notice(notice);
                // Statuses changed remotely; pull the new list.
                if succeeded && self.send(BackendCommand::LoadRecords) {
                    self.loading += 1;
                }
            }
            BackendEvent::ExportFinished { kind, path } => match path {
                Some(path) => self.set_status(format!("Saved {} to {}", kind.label(), path.display())),
                None => self.status = None,
            },
        }
    }
}
