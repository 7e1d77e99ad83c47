//! Remote folder service: trait, HTTP implementation and a mock for tests.

pub mod http;
pub mod mock;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::bulk::{AssignRequest, ReturnRequest};
use crate::export::ReportKind;
use crate::{CaseManager, Purpose, Record};

pub use http::HttpFolderService;

/// Boxed future returned by [`FolderService`] methods.
pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ServiceError>> + Send + 'a>>;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status { status: u16, message: Option<String> },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Message supplied by the remote service in a rejection body, if any.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Status {
                message: Some(m), ..
            } if !m.trim().is_empty() => Some(m),
            _ => None,
        }
    }
}

/// The remote service this browser reads from and mutates.
///
/// Mutations apply to every listed id or fail as a whole.
pub trait FolderService: Send + Sync {
    fn list_records(&self) -> ServiceFuture<'_, Vec<Record>>;

    fn list_case_managers(&self) -> ServiceFuture<'_, Vec<CaseManager>>;

    fn list_purposes(&self) -> ServiceFuture<'_, Vec<Purpose>>;

    fn submit_assignment<'a>(&'a self, request: &'a AssignRequest) -> ServiceFuture<'a, ()>;

    fn submit_return<'a>(&'a self, request: &'a ReturnRequest) -> ServiceFuture<'a, ()>;

    /// Fetch a generated report as raw bytes.
    fn export_report(&self, kind: ReportKind) -> ServiceFuture<'_, Vec<u8>>;
}

/// Results of the three independent startup reads.
#[derive(Debug)]
pub struct StartupData {
    pub records: Result<Vec<Record>, ServiceError>,
    pub case_managers: Result<Vec<CaseManager>, ServiceError>,
    pub purposes: Result<Vec<Purpose>, ServiceError>,
}

/// Run the three startup reads concurrently. A failure in one does not
/// affect the others.
pub async fn load_startup(service: &dyn FolderService) -> StartupData {
    let (records, case_managers, purposes) = tokio::join!(
        service.list_records(),
        service.list_case_managers(),
        service.list_purposes(),
    );
    for (list, err) in [
        ("records", records.as_ref().err()),
        ("case managers", case_managers.as_ref().err()),
        ("purposes", purposes.as_ref().err()),
    ] {
        if let Some(e) = err {
            tracing::warn!(list, error = %e, "startup fetch failed");
        }
    }
    StartupData {
        records,
        case_managers,
        purposes,
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockCall, MockFailure, MockFolderService};
    use super::*;
    use crate::RecordId;

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
    async fn one_failing_read_does_not_block_the_others() {
        let service = MockFolderService::new()
            .with_records(vec![record(1), record(2)])
            .with_purposes(vec![Purpose {
                id: 1,
                name: "Clinic".into(),
            }])
            .failing_case_managers(MockFailure::Status {
                status: 503,
                message: None,
            });

        let data = load_startup(&service).await;

        assert_eq!(data.records.unwrap().len(), 2);
        assert!(data.case_managers.is_err());
        assert_eq!(data.purposes.unwrap().len(), 1);

        let calls = service.calls();
        assert!(calls.contains(&MockCall::ListRecords));
        assert!(calls.contains(&MockCall::ListCaseManagers));
        assert!(calls.contains(&MockCall::ListPurposes));
    }

    #[test]
    fn remote_message_only_from_non_blank_rejection_body() {
        let with = ServiceError::Status {
            status: 400,
            message: Some("bad folder".into()),
        };
        let blank = ServiceError::Status {
            status: 400,
            message: Some("  ".into()),
        };
        let transport = ServiceError::Transport("reset".into());
        assert_eq!(with.remote_message(), Some("bad folder"));
        assert_eq!(blank.remote_message(), None);
        assert_eq!(transport.remote_message(), None);
        assert_eq!(with.to_string(), "HTTP 400: bad folder");
    }
}
