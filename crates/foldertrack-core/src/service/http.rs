use std::time::Duration;

use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;

use super::{FolderService, ServiceError, ServiceFuture};
use crate::bulk::{AssignRequest, ReturnRequest};
use crate::export::ReportKind;
use crate::{CaseManager, Purpose, Record};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// [`FolderService`] over the folder store's JSON HTTP API.
pub struct HttpFolderService {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpFolderService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, timeout)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let resp = self
            .client
            .get(self.url(path))
            .timeout(self.timeout)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }

    /// Fetch a JSON array, dropping rows that do not decode as `T`.
    async fn get_rows<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ServiceError> {
        let rows: Vec<serde_json::Value> = self.get_json(path).await?;
        Ok(decode_rows(path, rows))
    }

    async fn post_json<B: serde::Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ServiceError> {
        let resp = self
            .client
            .post(self.url(path))
            .timeout(self.timeout)
            .json(body)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }
}

/// Turn a non-success response into [`ServiceError::Status`], keeping the
/// `message` field of a JSON rejection body when there is one.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));
    Err(ServiceError::Status {
        status: status.as_u16(),
        message,
    })
}

/// One malformed row must not hide the rest of the list.
pub(crate) fn decode_rows<T: DeserializeOwned>(path: &str, rows: Vec<serde_json::Value>) -> Vec<T> {
    let total = rows.len();
    let decoded: Vec<T> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(path, index, error = %e, "skipping undecodable row");
                None
            }
        })
        .collect();
    if decoded.len() < total {
        tracing::warn!(path, total, kept = decoded.len(), "list decoded with skipped rows");
    }
    decoded
}

impl FolderService for HttpFolderService {
    fn list_records(&self) -> ServiceFuture<'_, Vec<Record>> {
        Box::pin(self.get_rows("/folders"))
    }

    fn list_case_managers(&self) -> ServiceFuture<'_, Vec<CaseManager>> {
        Box::pin(self.get_rows("/CogetData"))
    }

    fn list_purposes(&self) -> ServiceFuture<'_, Vec<Purpose>> {
        Box::pin(self.get_rows("/purpose"))
    }

    fn submit_assignment<'a>(&'a self, request: &'a AssignRequest) -> ServiceFuture<'a, ()> {
        Box::pin(self.post_json("/assign", request))
    }

    fn submit_return<'a>(&'a self, request: &'a ReturnRequest) -> ServiceFuture<'a, ()> {
        Box::pin(self.post_json("/return-folder", request))
    }

    fn export_report(&self, kind: ReportKind) -> ServiceFuture<'_, Vec<u8>> {
        Box::pin(async move {
            let resp = self
                .client
                .get(self.url(kind.endpoint()))
                .header(ACCEPT, XLSX_MIME)
                .timeout(self.timeout)
                .send()
                .await?;
            let resp = check_status(resp).await?;
            Ok(resp.bytes().await?.to_vec())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> reqwest::Response {
        http::Response::builder()
            .status(status)
            .body(body.to_string())
            .unwrap()
            .into()
    }

    #[tokio::test]
    async fn success_status_passes_through() {
        let resp = check_status(response(200, "[]")).await.unwrap();
        assert_eq!(resp.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn rejection_body_message_is_kept() {
        let err = check_status(response(422, r#"{"message": "Folder not found"}"#))
            .await
            .unwrap_err();
        match err {
            ServiceError::Status { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message.as_deref(), Some("Folder not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_rejection_has_no_message() {
        let err = check_status(response(500, "Internal Server Error"))
            .await
            .unwrap_err();
        assert!(err.remote_message().is_none());
    }

    #[test]
    fn rows_without_a_usable_id_are_skipped() {
        let rows = vec![
            serde_json::json!({"id": 1, "hospital_number": "HN-001"}),
            serde_json::json!({"id": null, "hospital_number": "HN-002"}),
            serde_json::json!({"id": "abc", "hospital_number": "HN-003"}),
            serde_json::json!({"id": "4", "hospital_number": "HN-004"}),
        ];

        let records: Vec<crate::Record> = decode_rows("/folders", rows);

        let numbers: Vec<&str> = records.iter().map(|r| r.hospital_number.as_str()).collect();
        assert_eq!(numbers, vec!["HN-001", "HN-004"]);
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let svc = HttpFolderService::new("http://example.test:5000/", DEFAULT_TIMEOUT);
        assert_eq!(svc.base_url(), "http://example.test:5000");
        assert_eq!(svc.url("/folders"), "http://example.test:5000/folders");
    }
}
