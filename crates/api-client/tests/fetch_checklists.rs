use opchecklist_api_client::{ApiClient, RetryConfig};
use opchecklist_core::FetchOptions;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const TWO_CHECKLISTS: &str = r#"[
  {"id":"c1","name":"Safety Briefing","eventId":"e1","operationalPeriodId":"P1",
   "progressPercentage":0,"completedItems":0,"totalItems":3,"assignedPositions":"",
   "isArchived":false,"createdAt":"2026-01-01T00:00:00Z","createdBy":"jo"},
  {"id":"c2","name":"Objectives","eventId":"e1","operationalPeriodId":null,
   "progressPercentage":100,"completedItems":2,"totalItems":2,"assignedPositions":"IC",
   "isArchived":false,"createdAt":"2026-01-01T01:00:00Z","createdBy":"al"}
]"#;

/// Serve canned `(status, body)` responses, one per connection, and return
/// the request heads that were received.
fn serve(listener: TcpListener, responses: Vec<(u16, String)>) -> JoinHandle<Vec<String>> {
    tokio::spawn(async move {
        let mut heads = Vec::new();
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.expect("read request");
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            heads.push(String::from_utf8_lossy(&buf).to_string());

            let reply = format!(
                "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.expect("write");
            socket.shutdown().await.ok();
        }
        heads
    })
}

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    (listener, format!("http://{addr}"))
}

fn fast_retry(max_retries: usize) -> RetryConfig {
    RetryConfig {
        max_retries,
        delays: vec![0; max_retries],
    }
}

#[tokio::test]
async fn fetch_sends_flags_and_bearer_token() {
    let (listener, base) = bind().await;
    let server = serve(listener, vec![(200, TWO_CHECKLISTS.to_string())]);

    let mut client = ApiClient::with_client(reqwest::Client::new(), &base);
    client.set_auth("secret-key".to_string());
    let items = client
        .fetch_checklists(
            "e1",
            FetchOptions {
                include_archived: false,
                all_positions: true,
            },
        )
        .await
        .expect("fetch");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].operational_period_id.as_deref(), Some("P1"));
    assert!(items[1].is_incident_level());

    let heads = server.await.expect("server task");
    let head = heads[0].to_ascii_lowercase();
    assert!(
        head.starts_with("get /api/events/e1/checklists?include_archived=false&all_positions=true"),
        "{head}"
    );
    assert!(head.contains("authorization: bearer secret-key"), "{head}");
}

#[tokio::test]
async fn wrapped_response_body_is_accepted() {
    let (listener, base) = bind().await;
    let body = format!(r#"{{"checklists":{TWO_CHECKLISTS}}}"#);
    let server = serve(listener, vec![(200, body)]);

    let client = ApiClient::with_client(reqwest::Client::new(), &base);
    let items = client
        .fetch_checklists("e1", FetchOptions::default())
        .await
        .expect("fetch");
    assert_eq!(items.len(), 2);
    server.await.expect("server task");
}

#[tokio::test]
async fn server_errors_are_retried() {
    let (listener, base) = bind().await;
    let server = serve(
        listener,
        vec![
            (503, r#"{"error":"busy"}"#.to_string()),
            (200, "[]".to_string()),
        ],
    );

    let mut client = ApiClient::with_client(reqwest::Client::new(), &base);
    client.set_retry(fast_retry(1));
    let items = client
        .fetch_checklists("e1", FetchOptions::default())
        .await
        .expect("fetch after retry");
    assert!(items.is_empty());
    assert_eq!(server.await.expect("server task").len(), 2);
}

#[tokio::test]
async fn client_errors_surface_status_and_body() {
    let (listener, base) = bind().await;
    let server = serve(listener, vec![(404, r#"{"error":"no such event"}"#.to_string())]);

    let mut client = ApiClient::with_client(reqwest::Client::new(), &base);
    client.set_retry(fast_retry(2));
    let err = client
        .fetch_checklists("missing", FetchOptions::default())
        .await
        .expect_err("404 must fail");
    let msg = err.to_string();
    assert!(msg.contains("404"), "{msg}");
    assert!(msg.contains("no such event"), "{msg}");
    assert_eq!(server.await.expect("server task").len(), 1);
}

#[tokio::test]
async fn empty_event_id_is_rejected_without_a_request() {
    let client = ApiClient::with_client(reqwest::Client::new(), "http://127.0.0.1:9");
    let err = client
        .fetch_checklists("  ", FetchOptions::default())
        .await
        .expect_err("blank event id");
    assert!(err.to_string().contains("event id"));
}
