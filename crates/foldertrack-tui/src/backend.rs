use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use foldertrack_core::{FileSink, FolderService, bulk, export, load_startup};

use crate::tui_event::{BackendCommand, BackendEvent};

/// Receive commands until the channel closes or `cancel` fires.
///
/// Each command runs on its own task so a slow report download never holds
/// up a record reload.
pub async fn run(
    service: Arc<dyn FolderService>,
    sink: Arc<dyn FileSink>,
    mut cmd_rx: mpsc::UnboundedReceiver<BackendCommand>,
    tx: mpsc::UnboundedSender<BackendEvent>,
    cancel: CancellationToken,
) {
    loop {
        let cmd = tokio::select! {
            _ = cancel.cancelled() => break,
            cmd = cmd_rx.recv() => match cmd {
                Some(cmd) => cmd,
                None => break,
            },
        };
        tracing::debug!(?cmd, "backend command");
        let service = service.clone();
        let sink = sink.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            execute(service.as_ref(), sink.as_ref(), cmd, &tx).await;
        });
    }
}

/// Run one command to completion and report back.
pub async fn execute(
    service: &dyn FolderService,
    sink: &dyn FileSink,
    cmd: BackendCommand,
    tx: &mpsc::UnboundedSender<BackendEvent>,
) {
    match cmd {
        BackendCommand::LoadAll => {
            let data = load_startup(service).await;
            let _ = tx.send(BackendEvent::RecordsLoaded(data.records));
            let _ = tx.send(BackendEvent::CaseManagersLoaded(data.case_managers));
            let _ = tx.send(BackendEvent::PurposesLoaded(data.purposes));
        }
        BackendCommand::LoadRecords => {
            let records = service.list_records().await;
            if let Err(e) = &records {
                tracing::warn!(error = %e, "record reload failed");
            }
            let _ = tx.send(BackendEvent::RecordsLoaded(records));
        }
        BackendCommand::Submit(request) => {
            let action = request.action();
            let result = bulk::submit(service, &request).await;
            let _ = tx.send(BackendEvent::BulkFinished { action, result });
        }
        BackendCommand::Export(kind) => {
            let path = export::run_export(service, sink, kind).await;
            let _ = tx.send(BackendEvent::ExportFinished { kind, path });
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use foldertrack_core::service::mock::{MockCall, MockFailure, MockFolderService};
    use foldertrack_core::{
        BulkAction, BulkRequest, DirectorySink, Record, RecordId, ReportKind, ReturnRequest,
    };

    use super::*;

    fn record(id: i64) -> Record {
        Record {
            id: RecordId(id),
            hospital_number: format!("HN-{id}"),
            date_enrollment: String::new(),
            status: String::new(),
            collected_by: String::new(),
        }
    }

    #[tokio::test]
    async fn load_all_reports_each_list_separately() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let service = MockFolderService::new()
            .with_records(vec![record(1)])
            .failing_purposes(MockFailure::Transport("refused".into()));
        let (tx, mut rx) = mpsc::unbounded_channel();

        execute(&service, &sink, BackendCommand::LoadAll, &tx).await;

        assert!(matches!(rx.recv().await, Some(BackendEvent::RecordsLoaded(Ok(r))) if r.len() == 1));
        assert!(matches!(rx.recv().await, Some(BackendEvent::CaseManagersLoaded(Ok(_)))));
        assert!(matches!(rx.recv().await, Some(BackendEvent::PurposesLoaded(Err(_)))));
    }

    #[tokio::test]
    async fn submit_reports_the_action_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let service = MockFolderService::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let request = ReturnRequest {
            record_ids: vec![RecordId(4)],
            date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
        };

        execute(
            &service,
            &sink,
            BackendCommand::Submit(BulkRequest::Return(request.clone())),
            &tx,
        )
        .await;

        match rx.recv().await {
            Some(BackendEvent::BulkFinished { action, result }) => {
                assert_eq!(action, BulkAction::Return);
                assert!(result.is_ok());
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(service.calls(), vec![MockCall::Return(request)]);
    }

    #[tokio::test]
    async fn failed_export_still_reports_completion() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let service = MockFolderService::new().failing_exports(MockFailure::Status {
            status: 500,
            message: None,
        });
        let (tx, mut rx) = mpsc::unbounded_channel();

        execute(&service, &sink, BackendCommand::Export(ReportKind::Collected), &tx).await;

        assert!(matches!(
            rx.recv().await,
            Some(BackendEvent::ExportFinished {
                kind: ReportKind::Collected,
                path: None
            })
        ));
    }

    #[tokio::test]
    async fn run_stops_when_cancelled() {
        let service: Arc<dyn FolderService> = Arc::new(MockFolderService::new());
        let sink: Arc<dyn FileSink> = Arc::new(DirectorySink::new("."));
        let (_cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (tx, _rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        cancel.cancel();

        run(service, sink, cmd_rx, tx, cancel).await;
    }
}
