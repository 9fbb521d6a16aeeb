//! Exercises the retry policy against a throwaway local HTTP responder.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use marquee_lib::ThrottleConfig;

use super::*;

/// Serve one canned response per connection, in order, then stop.
/// Returns the base URL and a counter of connections served.
async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let served = Arc::new(AtomicUsize::new(0));
    let counter = served.clone();

    tokio::spawn(async move {
        for (status, body) in responses {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            counter.fetch_add(1, Ordering::SeqCst);
            let reply = format!(
                "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\n\
                 content-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{addr}"), served)
}

fn unlimited() -> Throttle {
    Throttle::unlimited()
}

/// Display text of an error and every source below it.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        text.push_str(" | ");
        text.push_str(&e.to_string());
        source = e.source();
    }
    text
}

fn client() -> TmdbClient {
    TmdbClient::new(Duration::from_secs(5), Duration::from_millis(10)).unwrap()
}

#[tokio::test]
async fn test_success_needs_one_request() {
    let (base, served) = serve(vec![(200, r#"{"results":[]}"#)]).await;
    let body = client()
        .fetch(&format!("{base}/discover/movie"), &unlimited())
        .await
        .unwrap();
    assert_eq!(body, r#"{"results":[]}"#);
    assert_eq!(served.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_single_failure_is_retried() {
    let (base, served) = serve(vec![(503, "busy"), (200, r#"{"id":1}"#)]).await;
    let body = client()
        .fetch(&format!("{base}/movie/1"), &unlimited())
        .await
        .unwrap();
    assert_eq!(body, r#"{"id":1}"#);
    assert_eq!(served.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_second_failure_is_transport_error_with_redacted_url() {
    let (base, _served) = serve(vec![
        (500, "down"),
        (
            401,
            r#"{"success":false,"status_code":7,"status_message":"Invalid API key"}"#,
        ),
    ])
    .await;

    let err = client()
        .fetch(&format!("{base}/movie/1?api_key=secret"), &unlimited())
        .await
        .unwrap_err();

    match err {
        FetchError::Transport { url, cause } => {
            assert!(url.ends_with("/movie/1?api_key=***"));
            match cause {
                TransportCause::Status { status, message } => {
                    assert_eq!(status, 401);
                    assert_eq!(message.as_deref(), Some("Invalid API key"));
                }
                other => panic!("expected status cause, got {other:?}"),
            }
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_payload_with_ok_status_is_not_retried() {
    let payload = r#"{"success":false,"status_code":25,"status_message":"Too many"}"#;
    let (base, served) = serve(vec![(200, payload)]).await;
    let body = client()
        .fetch(&format!("{base}/movie/1"), &unlimited())
        .await
        .unwrap();
    assert_eq!(body, payload);
    assert_eq!(served.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client()
        .fetch(&format!("http://{addr}/configuration"), &unlimited())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FetchError::Transport {
            cause: TransportCause::Http(_),
            ..
        }
    ));
}

#[tokio::test]
async fn test_connection_error_text_hides_api_key() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client()
        .fetch(
            &format!("http://{addr}/3/movie/1?api_key=SUPERSECRET&language=en"),
            &unlimited(),
        )
        .await
        .unwrap_err();

    let text = error_chain(&err);
    assert!(!text.contains("SUPERSECRET"), "key leaked: {text}");
    assert!(text.contains("api_key=***"));
    assert!(!format!("{err:?}").contains("SUPERSECRET"));
}

#[tokio::test]
async fn test_retry_waits_for_a_token() {
    let (base, served) = serve(vec![(503, "busy"), (200, r#"{"id":1}"#)]).await;
    let throttle = Throttle::new(ThrottleConfig {
        requests_per_second: std::num::NonZeroU32::new(1),
        ..ThrottleConfig::disabled()
    });

    let start = std::time::Instant::now();
    client()
        .fetch(&format!("{base}/movie/1"), &throttle)
        .await
        .unwrap();

    assert_eq!(served.load(Ordering::SeqCst), 2);
    // One token per second: the retry cannot go out before the bucket refills
    assert!(start.elapsed() >= Duration::from_millis(900));
}
