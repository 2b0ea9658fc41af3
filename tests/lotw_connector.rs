//! LoTW connector tests against a local HTTP listener with canned responses.

use std::time::Duration;

use qsolog::config::LotwConfig;
use qsolog::connector_lotw::{LotwConnector, LotwCredentials};
use qsolog::import::import_from_source;
use qsolog_core::adif::Decoder;
use qsolog_core::models::ImportPolicy;
use qsolog_core::progress::NoProgress;
use qsolog_core::source::{RecordSource, SourceError};
use qsolog_core::store::memory::InMemoryStore;
use qsolog_core::store::ContactStore;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const REPORT: &str = "ARRL Logbook of the World Status Report\n\
Generated at 2025-09-21 10:00:00\n\
<PROGRAMID:4>LoTW\n\
<APP_LoTW_LASTQSL:19>2025-09-20 15:00:00\n\
<eoh>\n\
<CALL:5>K1ABC<BAND:3>20M<FREQ:8>14.07400<MODE:3>FT8<QSO_DATE:8>20250920<TIME_ON:6>143000<QSL_RCVD:1>Y<eor>\n\
<CALL:4>W1AW<BAND:3>40M<MODE:2>CW<QSO_DATE:8>20250921<TIME_ON:4>0100<eor>\n";

/// Serve one canned HTTP response; the handle yields the raw request.
async fn serve_once(status_line: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });
    (format!("http://{}", addr), handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
        if request.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    String::from_utf8_lossy(&request).to_string()
}

fn config(base_url: &str, timeout_secs: u64) -> LotwConfig {
    LotwConfig {
        base_url: base_url.to_string(),
        username: None,
        timeout_secs,
        default_start_date: "1945-01-01".to_string(),
    }
}

fn credentials() -> LotwCredentials {
    LotwCredentials {
        username: "W1AW".to_string(),
        password: "s3cret".to_string(),
    }
}

#[tokio::test]
async fn test_fetch_sends_report_query() {
    let (base, server) = serve_once("200 OK", REPORT.to_string()).await;
    let connector = LotwConnector::new(
        &config(&base, 5),
        credentials(),
        Some("2024-01-01"),
        Some("2025-12-31"),
    )
    .unwrap();

    let body = connector.fetch().await.unwrap();
    assert_eq!(body, REPORT);

    let request = server.await.unwrap();
    let request_line = request.lines().next().unwrap();
    assert!(request_line.starts_with("GET /lotwuser/lotwreport.adi?"));
    for param in [
        "login=W1AW",
        "password=s3cret",
        "qso_query=1",
        "qso_qsl=yes",
        "qso_qsldetail=yes",
        "qso_withown=yes",
        "qso_qslsince=2024-01-01",
        "qso_enddate=2025-12-31",
    ] {
        assert!(request_line.contains(param), "missing {} in {}", param, request_line);
    }
}

#[tokio::test]
async fn test_import_normalizes_lotw_records() {
    let (base, _server) = serve_once("200 OK", REPORT.to_string()).await;
    let connector = LotwConnector::new(&config(&base, 5), credentials(), None, None).unwrap();
    let store = InMemoryStore::new();

    let outcome = import_from_source(
        &store,
        &connector,
        ImportPolicy::default(),
        &Decoder::new(),
        &NoProgress,
    )
    .await;

    assert!(outcome.success);
    assert_eq!(outcome.imported, 2);
    assert_eq!(outcome.message, "Successfully imported 2 contacts from LoTW for W1AW");

    let all = store.list_all().await.unwrap();
    assert!(all.iter().all(|c| c.record.confirmed));
    assert!(all.iter().all(|c| c.record.comment == "Imported from LoTW"));
    let k1abc = all.iter().find(|c| c.record.callsign == "K1ABC").unwrap();
    assert_eq!(k1abc.record.band, "20m");
    assert_eq!(k1abc.record.frequency_mhz, 14.074);
    assert_eq!(k1abc.record.time_on, "14:30:00");
}

#[tokio::test]
async fn test_login_page_aborts_import() {
    let page = "<html><body>Username/Callsign: <input name=login> Password: <input></body></html>";
    let (base, _server) = serve_once("200 OK", page.to_string()).await;
    let connector = LotwConnector::new(&config(&base, 5), credentials(), None, None).unwrap();
    let store = InMemoryStore::new();

    let outcome = import_from_source(
        &store,
        &connector,
        ImportPolicy::default(),
        &Decoder::new(),
        &NoProgress,
    )
    .await;

    assert!(!outcome.success);
    assert_eq!(outcome.imported, 0);
    assert_eq!(outcome.errored, 1);
    assert!(outcome.errors[0].contains("authentication failed"));
    assert_eq!(outcome.message, "LoTW for W1AW import failed");
    assert!(outcome.errors[0].starts_with("Failed to retrieve data from LoTW for W1AW"));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_header_is_malformed() {
    let body = "<CALL:4>W1AW<QSO_DATE:8>20250920<EOR>\n";
    let (base, _server) = serve_once("200 OK", body.to_string()).await;
    let connector = LotwConnector::new(&config(&base, 5), credentials(), None, None).unwrap();

    assert!(matches!(
        connector.fetch().await,
        Err(SourceError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_error_page_and_status_codes() {
    let (base, _server) = serve_once(
        "200 OK",
        "Page Request Error: database unavailable".to_string(),
    )
    .await;
    let connector = LotwConnector::new(&config(&base, 5), credentials(), None, None).unwrap();
    assert!(matches!(
        connector.fetch().await,
        Err(SourceError::ServiceError(_))
    ));

    let (base, _server) = serve_once("403 Forbidden", String::new()).await;
    let connector = LotwConnector::new(&config(&base, 5), credentials(), None, None).unwrap();
    assert_eq!(
        connector.fetch().await,
        Err(SourceError::AuthenticationFailed)
    );

    let (base, _server) = serve_once("500 Internal Server Error", String::new()).await;
    let connector = LotwConnector::new(&config(&base, 5), credentials(), None, None).unwrap();
    assert_eq!(
        connector.fetch().await,
        Err(SourceError::ServiceError("HTTP 500".to_string()))
    );
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let _server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let _ = read_request(&mut socket).await;
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let connector =
        LotwConnector::new(&config(&format!("http://{}", addr), 1), credentials(), None, None)
            .unwrap();
    assert_eq!(
        connector.fetch().await,
        Err(SourceError::Timeout(Duration::from_secs(1)))
    );
}

#[tokio::test]
async fn test_connection_refused_hides_password() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let connector =
        LotwConnector::new(&config(&format!("http://{}", addr), 2), credentials(), None, None)
            .unwrap();
    match connector.fetch().await {
        Err(SourceError::Network(msg)) => assert!(!msg.contains("s3cret"), "leaked: {}", msg),
        other => panic!("expected network error, got {:?}", other),
    }
}
