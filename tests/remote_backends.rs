//! Wire-level tests for the HTTP-backed adapter variants against a
//! canned-response server: list parsing, write acks, and the mapping of
//! bad statuses and malformed bodies onto the remote error kinds.

use std::net::SocketAddr;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use studiodesk::backend::cloud::CloudBackend;
use studiodesk::backend::rest::RestBackend;
use studiodesk::backend::{ClientStore, ProfileStore};
use studiodesk::error::RemoteError;
use studiodesk::ledger::LineItem;
use studiodesk::model::ClientRecord;

/// Serve exactly one HTTP exchange: read a full request, write `status` and
/// `body`, close. Reads until the headers are complete and any declared
/// content length has arrived, so POST bodies are consumed before replying.
async fn serve_once(status: &'static str, body: String) -> (SocketAddr, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).await.expect("read");
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if let Some(header_end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&request[..header_end]).to_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|raw| raw.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.expect("write");
        stream.shutdown().await.ok();
        request
    });
    (addr, handle)
}

fn booking() -> ClientRecord {
    let mut record = ClientRecord::new(
        "Anika Rahman",
        "0171",
        "Wedding",
        NaiveDate::from_ymd_opt(2026, 11, 20).unwrap(),
    );
    record.items.push(LineItem {
        id: "i1".to_string(),
        description: "Full day coverage".to_string(),
        amount: dec!(800),
    });
    record.recompute_totals();
    record
}

#[tokio::test]
async fn rest_list_parses_the_collection() {
    let record = booking();
    let body = serde_json::to_string(&vec![record.clone()]).expect("encode");
    let (addr, server) = serve_once("200 OK", body).await;

    let backend = RestBackend::new(format!("http://{addr}"));
    let listed = backend.list_clients().await.expect("list");
    assert_eq!(listed, vec![record]);

    let request = String::from_utf8_lossy(&server.await.expect("server")).to_string();
    assert!(request.starts_with("GET /?type=clients"), "request: {request}");
}

#[tokio::test]
async fn rest_upsert_sends_the_record_and_accepts_the_ack() {
    let record = booking();
    let (addr, server) = serve_once(
        "200 OK",
        r#"{"status":"success","message":"Client saved successfully"}"#.to_string(),
    )
    .await;

    let backend = RestBackend::new(format!("http://{addr}"));
    backend.upsert_client(&record).await.expect("upsert");

    let request = String::from_utf8_lossy(&server.await.expect("server")).to_string();
    assert!(request.starts_with("POST /?type=clients"), "request: {request}");
    assert!(request.contains(&record.id), "body must carry the id");
}

#[tokio::test]
async fn rest_error_status_maps_onto_the_remote_error_kind() {
    let (addr, _server) = serve_once("500 Internal Server Error", "{}".to_string()).await;

    let backend = RestBackend::new(format!("http://{addr}"));
    let err = backend.list_clients().await.expect_err("must fail");
    assert!(matches!(err.source, RemoteError::Status { status: 500 }));
}

#[tokio::test]
async fn rest_malformed_body_is_a_read_error() {
    let (addr, _server) = serve_once("200 OK", "<html>maintenance</html>".to_string()).await;

    let backend = RestBackend::new(format!("http://{addr}"));
    let err = backend.list_clients().await.expect_err("must fail");
    assert!(matches!(err.source, RemoteError::Malformed(_)));
}

#[tokio::test]
async fn rest_provider_refusal_surfaces_as_a_write_error() {
    let (addr, _server) = serve_once(
        "200 OK",
        r#"{"status":"error","message":"No data provided"}"#.to_string(),
    )
    .await;

    let backend = RestBackend::new(format!("http://{addr}"));
    let err = backend
        .upsert_client(&booking())
        .await
        .expect_err("must fail");
    assert!(matches!(err.source, RemoteError::Provider(_)));
}

#[tokio::test]
async fn cloud_list_addresses_the_collection() {
    let record = booking();
    let body = serde_json::to_string(&vec![record.clone()]).expect("encode");
    let (addr, server) = serve_once("200 OK", body).await;

    let backend = CloudBackend::new(format!("http://{addr}"), Some("test-key".to_string()));
    let listed = backend.list_clients().await.expect("list");
    assert_eq!(listed, vec![record]);

    let request = String::from_utf8_lossy(&server.await.expect("server")).to_string();
    assert!(request.starts_with("GET /clients"), "request: {request}");
    assert!(
        request.to_lowercase().contains("authorization: bearer test-key"),
        "request: {request}"
    );
}

#[tokio::test]
async fn cloud_missing_profile_document_reads_as_absent() {
    let (addr, _server) = serve_once("404 Not Found", "{}".to_string()).await;

    let backend = CloudBackend::new(format!("http://{addr}"), None);
    let profile = backend.fetch_profile().await.expect("fetch");
    assert_eq!(profile, None);
}

#[tokio::test]
async fn cloud_delete_of_missing_document_is_success() {
    let (addr, _server) = serve_once("404 Not Found", "".to_string()).await;

    let backend = CloudBackend::new(format!("http://{addr}"), None);
    backend.remove_client("gone-already").await.expect("no-op");
}
