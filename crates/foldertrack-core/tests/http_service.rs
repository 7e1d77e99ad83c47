//! Wire-level tests for [`HttpFolderService`] against a throwaway local
//! HTTP/1.1 listener.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use foldertrack_core::bulk::{AssignRequest, ReturnRequest};
use foldertrack_core::export::export_report;
use foldertrack_core::service::HttpFolderService;
use foldertrack_core::{DirectorySink, FolderService, RecordId, ReportKind, ServiceError, load_startup};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
struct Captured {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

type Reply = (u16, &'static str, Vec<u8>);

/// Serve every connection with `route`; returns the base URL and the log of
/// received requests.
async fn spawn_server<F>(route: F) -> (String, Arc<Mutex<Vec<Captured>>>)
where
    F: Fn(&str, &str) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));
    let route = Arc::new(route);

    let server_log = log.clone();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let log = server_log.clone();
            let route = route.clone();
            tokio::spawn(async move {
                let req = read_request(&mut stream).await;
                let (status, content_type, body) = route(&req.method, &req.path);
                let head = format!(
                    "HTTP/1.1 {status} Reply\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                    body.len()
                );
                log.lock().unwrap().push(req);
                stream.write_all(head.as_bytes()).await.unwrap();
                stream.write_all(&body).await.unwrap();
                let _ = stream.shutdown().await;
            });
        }
    });

    (format!("http://{addr}"), log)
}

async fn read_request(stream: &mut TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 2048];
    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before headers ended");
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split(' ');
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before body ended");
        buf.extend_from_slice(&chunk[..n]);
    }

    Captured {
        method,
        path,
        headers,
        body: buf[header_end..header_end + content_length].to_vec(),
    }
}

fn json(status: u16, body: &str) -> Reply {
    (status, "application/json", body.as_bytes().to_vec())
}

fn client(base_url: &str) -> HttpFolderService {
    HttpFolderService::new(base_url, Duration::from_secs(5))
}

#[tokio::test]
async fn startup_lists_decode_from_remote_shapes() {
    let (url, log) = spawn_server(|_, path| match path {
        "/folders" => json(
            200,
            r#"[
                {"id": 1, "hospital_number": "HN-001", "date_enrollment": "2023-02-01",
                 "folder_status": "Out Store", "collected_by": "Ada Obi"},
                {"id": "2", "hospital_number": 4471, "date_enrollment": null,
                 "folder_status": null, "collected_by": null}
            ]"#,
        ),
        "/CogetData" => json(200, r#"[{"foco_id": 7, "first_name": "Ada", "other_name": "Obi"}]"#),
        "/purpose" => json(200, r#"[{"purpose_id": "4", "purpose_name": "Clinic"}]"#),
        _ => json(404, "{}"),
    })
    .await;

    let data = load_startup(&client(&url)).await;

    let records = data.records.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].collected_by_display(), "Ada Obi");
    assert_eq!(records[1].id, RecordId(2));
    assert_eq!(records[1].hospital_number, "4471");
    assert_eq!(records[1].status_display(), "Not Set");
    assert_eq!(data.case_managers.unwrap()[0].display_name(), "Ada Obi");
    assert_eq!(data.purposes.unwrap()[0].id, 4);

    let mut paths: Vec<String> = log.lock().unwrap().iter().map(|c| c.path.clone()).collect();
    paths.sort();
    assert_eq!(paths, vec!["/CogetData", "/folders", "/purpose"]);
}

#[tokio::test]
async fn one_bad_record_does_not_hide_the_others() {
    let (url, _log) = spawn_server(|_, path| match path {
        "/folders" => json(
            200,
            r#"[
                {"id": 1, "hospital_number": "HN-001"},
                {"id": null, "hospital_number": "HN-002"},
                {"id": 3, "hospital_number": "HN-003"}
            ]"#,
        ),
        _ => json(200, "[]"),
    })
    .await;

    let records = client(&url).list_records().await.unwrap();

    let ids: Vec<RecordId> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![RecordId(1), RecordId(3)]);
}

#[tokio::test]
async fn assignment_posts_json_body() {
    let (url, log) = spawn_server(|_, _| json(200, r#"{"message": "ok"}"#)).await;
    let request = AssignRequest {
        record_ids: vec![RecordId(3), RecordId(8)],
        purpose_id: 4,
        case_manager_id: 7,
        date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
    };

    client(&url).submit_assignment(&request).await.unwrap();

    let captured = log.lock().unwrap()[0].clone();
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.path, "/assign");
    assert_eq!(captured.header("content-type"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_slice(&captured.body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "folder_id": [3, 8],
            "purpose_id": 4,
            "collectedby": 7,
            "date_collected": "2024-05-01",
        })
    );
}

#[tokio::test]
async fn return_rejection_carries_remote_message() {
    let (url, _log) = spawn_server(|_, _| {
        json(400, r#"{"message": "Folder HN-003 is not checked out"}"#)
    })
    .await;
    let request = ReturnRequest {
        record_ids: vec![RecordId(3)],
        date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
    };

    let err = client(&url).submit_return(&request).await.unwrap_err();

    assert_eq!(err.remote_message(), Some("Folder HN-003 is not checked out"));
    assert!(matches!(err, ServiceError::Status { status: 400, .. }));
}

#[tokio::test]
async fn report_download_requests_spreadsheet_and_saves_it() {
    let payload = b"PK\x03\x04 spreadsheet".to_vec();
    let served = payload.clone();
    let (url, log) = spawn_server(move |_, _| {
        (
            200,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            served.clone(),
        )
    })
    .await;
    let dir = tempfile::tempdir().unwrap();
    let sink = DirectorySink::new(dir.path());

    let path = export_report(&client(&url), &sink, ReportKind::Collected)
        .await
        .unwrap();

    assert_eq!(path.file_name().unwrap(), "Collected_folders.xlsx");
    assert_eq!(std::fs::read(&path).unwrap(), payload);
    let captured = log.lock().unwrap()[0].clone();
    assert_eq!(captured.path, "/allcollectedfolders");
    assert!(
        captured
            .header("accept")
            .is_some_and(|a| a.contains("spreadsheetml"))
    );
}

#[tokio::test]
async fn unreachable_service_is_a_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = client(&url).list_records().await.unwrap_err();

    assert!(matches!(err, ServiceError::Http(_)));
    assert_eq!(err.remote_message(), None);
}
