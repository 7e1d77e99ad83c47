//! Bulk state transitions (assign to a case manager, mark as returned).
//!
//! Each action is a synchronous precondition check that produces a request,
//! followed by one remote call for the whole selection. The session only
//! resets its transient fields once the remote call succeeded.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::service::{FolderService, ServiceError};
use crate::session::BrowserSession;
use crate::{Notice, RecordId};

/// Accepted date input format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Assign,
    Return,
}

impl BulkAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Assign => "assign",
            Self::Return => "return",
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            Self::Assign => "Folders assigned successfully.",
            Self::Return => "Folders returned successfully.",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Self::Assign => "Failed to assign folders. Please try again.",
            Self::Return => "Failed to return folders. Please try again.",
        }
    }
}

/// Inputs collected across independent fields before a bulk submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingAction {
    pub case_manager: Option<i64>,
    pub purpose: Option<i64>,
    pub date: Option<NaiveDate>,
}

/// Body of the assignment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignRequest {
    #[serde(rename = "folder_id")]
    pub record_ids: Vec<RecordId>,
    pub purpose_id: i64,
    #[serde(rename = "collectedby")]
    pub case_manager_id: i64,
    #[serde(rename = "date_collected")]
    pub date: NaiveDate,
}

/// Body of the return request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnRequest {
    #[serde(rename = "ftId")]
    pub record_ids: Vec<RecordId>,
    #[serde(rename = "returnDate")]
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkRequest {
    Assign(AssignRequest),
    Return(ReturnRequest),
}

impl BulkRequest {
    pub fn action(&self) -> BulkAction {
        match self {
            Self::Assign(_) => BulkAction::Assign,
            Self::Return(_) => BulkAction::Return,
        }
    }

    pub fn record_ids(&self) -> &[RecordId] {
        match self {
            Self::Assign(r) => &r.record_ids,
            Self::Return(r) => &r.record_ids,
        }
    }
}

/// A bulk action was refused before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select rows, a case manager, a purpose, and a date.")]
    AssignIncomplete,
    #[error("Please select rows and a date.")]
    ReturnIncomplete,
    #[error("Invalid date {0:?}; expected YYYY-MM-DD.")]
    InvalidDate(String),
    #[error("A bulk action is already in progress.")]
    Busy,
}

pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(input.to_string()))
}

impl BrowserSession {
    /// Set the action date from operator input. An invalid date keeps the
    /// previous value.
    pub fn set_date(&mut self, input: &str) -> Result<NaiveDate, ValidationError> {
        let date = parse_date(input)?;
        self.pending.date = Some(date);
        Ok(date)
    }

    pub fn clear_date(&mut self) {
        self.pending.date = None;
    }

    pub fn bulk_in_flight(&self) -> Option<BulkAction> {
        self.in_flight
    }

    /// Check preconditions and build the request for `action`.
    ///
    /// On success the action is marked in flight until [`finish_bulk`]
    /// is called; nothing else changes.
    ///
    /// [`finish_bulk`]: BrowserSession::finish_bulk
    pub fn begin_bulk(&mut self, action: BulkAction) -> Result<BulkRequest, ValidationError> {
        if self.in_flight.is_some() {
            return Err(ValidationError::Busy);
        }
        let record_ids = self.selection.ids();
        let request = match action {
            BulkAction::Assign => match (
                record_ids.is_empty(),
                self.pending.case_manager,
                self.pending.purpose,
                self.pending.date,
            ) {
                (false, Some(case_manager_id), Some(purpose_id), Some(date)) => {
                    BulkRequest::Assign(AssignRequest {
                        record_ids,
                        purpose_id,
                        case_manager_id,
                        date,
                    })
                }
                _ => return Err(ValidationError::AssignIncomplete),
            },
            BulkAction::Return => match (record_ids.is_empty(), self.pending.date) {
                (false, Some(date)) => BulkRequest::Return(ReturnRequest { record_ids, date }),
                _ => return Err(ValidationError::ReturnIncomplete),
            },
        };
        self.in_flight = Some(action);
        tracing::info!(
            action = action.label(),
            count = request.record_ids().len(),
            "submitting bulk action"
        );
        Ok(request)
    }

    /// Apply the outcome of the remote call started by [`begin_bulk`].
    ///
    /// Success clears the selection and the fields the action consumed;
    /// failure leaves everything as the operator left it.
    ///
    /// [`begin_bulk`]: BrowserSession::begin_bulk
    pub fn finish_bulk(&mut self, action: BulkAction, outcome: &Result<(), ServiceError>) -> Notice {
        self.in_flight = None;
        match outcome {
            Ok(()) => {
                self.selection.clear();
                self.pending.date = None;
                if action == BulkAction::Assign {
                    self.pending.case_manager = None;
                    self.pending.purpose = None;
                }
                Notice::success(action.success_message())
            }
            Err(e) => {
                tracing::warn!(action = action.label(), error = %e, "bulk action failed");
                // Only the return endpoint explains its rejections.
                let remote = match action {
                    BulkAction::Return => e.remote_message(),
                    BulkAction::Assign => None,
                };
                Notice::error(remote.unwrap_or(action.failure_message()).to_string())
            }
        }
    }
}

/// Validate, submit and settle a bulk action in one go.
pub async fn run_bulk_action(
    session: &mut BrowserSession,
    service: &dyn FolderService,
    action: BulkAction,
) -> Notice {
    let request = match session.begin_bulk(action) {
        Ok(r) => r,
        Err(e) => return Notice::warning(e.to_string()),
    };
    let outcome = submit(service, &request).await;
    session.finish_bulk(action, &outcome)
}

/// Issue the remote call for a prepared request.
pub async fn submit(service: &dyn FolderService, request: &BulkRequest) -> Result<(), ServiceError> {
    match request {
        BulkRequest::Assign(r) => service.submit_assignment(r).await,
        BulkRequest::Return(r) => service.submit_return(r).await,
    }
}
