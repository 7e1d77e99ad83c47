//! Mock folder service for testing.

use std::sync::Mutex;
use std::time::Duration;

use super::{FolderService, ServiceError, ServiceFuture};
use crate::bulk::{AssignRequest, ReturnRequest};
use crate::export::ReportKind;
use crate::{CaseManager, Purpose, Record};

/// A scripted failure for [`MockFolderService`].
#[derive(Clone, Debug)]
pub enum MockFailure {
    /// Simulate a non-success HTTP status, optionally with a rejection message.
    Status { status: u16, message: Option<String> },
    /// Simulate a connection-level failure.
    Transport(String),
}

impl MockFailure {
    fn to_error(&self) -> ServiceError {
        match self {
            Self::Status { status, message } => ServiceError::Status {
                status: *status,
                message: message.clone(),
            },
            Self::Transport(msg) => ServiceError::Transport(msg.clone()),
        }
    }
}

/// One recorded call against the mock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockCall {
    ListRecords,
    ListCaseManagers,
    ListPurposes,
    Assign(AssignRequest),
    Return(ReturnRequest),
    Export(ReportKind),
}

/// A hand-rolled mock implementing [`FolderService`] for tests.
///
/// Every read returns the configured list unless a failure was scripted for
/// it; mutations and exports succeed unless scripted to fail. All calls are
/// recorded in order.
#[derive(Default)]
pub struct MockFolderService {
    records: Vec<Record>,
    case_managers: Vec<CaseManager>,
    purposes: Vec<Purpose>,
    report: Vec<u8>,
    fail_records: Option<MockFailure>,
    fail_case_managers: Option<MockFailure>,
    fail_purposes: Option<MockFailure>,
    fail_mutations: Option<MockFailure>,
    fail_exports: Option<MockFailure>,
    delay: Option<Duration>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockFolderService {
    pub fn new() -> Self {
        Self {
            report: b"PK\x03\x04 mock report".to_vec(),
            ..Self::default()
        }
    }

    pub fn with_records(mut self, records: Vec<Record>) -> Self {
        self.records = records;
        self
    }

    pub fn with_case_managers(mut self, case_managers: Vec<CaseManager>) -> Self {
        self.case_managers = case_managers;
        self
    }

    pub fn with_purposes(mut self, purposes: Vec<Purpose>) -> Self {
        self.purposes = purposes;
        self
    }

    pub fn with_report(mut self, bytes: Vec<u8>) -> Self {
        self.report = bytes;
        self
    }

    pub fn failing_records(mut self, failure: MockFailure) -> Self {
        self.fail_records = Some(failure);
        self
    }

    pub fn failing_case_managers(mut self, failure: MockFailure) -> Self {
        self.fail_case_managers = Some(failure);
        self
    }

    pub fn failing_purposes(mut self, failure: MockFailure) -> Self {
        self.fail_purposes = Some(failure);
        self
    }

    pub fn failing_mutations(mut self, failure: MockFailure) -> Self {
        self.fail_mutations = Some(failure);
        self
    }

    pub fn failing_exports(mut self, failure: MockFailure) -> Self {
        self.fail_exports = Some(failure);
        self
    }

    /// Set simulated network latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// How many assignment/return requests were issued.
    pub fn mutation_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MockCall::Assign(_) | MockCall::Return(_)))
            .count()
    }

    fn record(&self, call: MockCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn respond<'a, T: Clone + Send + Sync + 'a>(
        &'a self,
        call: MockCall,
        failure: &'a Option<MockFailure>,
        value: &'a T,
    ) -> ServiceFuture<'a, T> {
        self.record(call);
        let delay = self.delay;
        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            match failure {
                Some(f) => Err(f.to_error()),
                None => Ok(value.clone()),
            }
        })
    }
}

impl FolderService for MockFolderService {
    fn list_records(&self) -> ServiceFuture<'_, Vec<Record>> {
        self.respond(MockCall::ListRecords, &self.fail_records, &self.records)
    }

    fn list_case_managers(&self) -> ServiceFuture<'_, Vec<CaseManager>> {
        self.respond(
            MockCall::ListCaseManagers,
            &self.fail_case_managers,
            &self.case_managers,
        )
    }

    fn list_purposes(&self) -> ServiceFuture<'_, Vec<Purpose>> {
        self.respond(MockCall::ListPurposes, &self.fail_purposes, &self.purposes)
    }

    fn submit_assignment<'a>(&'a self, request: &'a AssignRequest) -> ServiceFuture<'a, ()> {
        self.respond(MockCall::Assign(request.clone()), &self.fail_mutations, &())
    }

    fn submit_return<'a>(&'a self, request: &'a ReturnRequest) -> ServiceFuture<'a, ()> {
        self.respond(MockCall::Return(request.clone()), &self.fail_mutations, &())
    }

    fn export_report(&self, kind: ReportKind) -> ServiceFuture<'_, Vec<u8>> {
        self.respond(MockCall::Export(kind), &self.fail_exports, &self.report)
    }
}
