//! Log output of the forwarding, blocking and observer paths.

mod common;

use common::{client, start_proxy, start_recording_backend, CapturedLogs};
use tracing_subscriber::fmt;

fn capture() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

// The default runtime is single-threaded, so spawned server tasks log into
// the thread-local subscriber installed here.

#[tokio::test]
async fn test_request_and_response_dumps_are_logged() {
    let (logs, _guard) = capture();
    let (backend, _recorder) = start_recording_backend("hello").await;
    let proxy = start_proxy(backend, |c| c.logging.log_all = true).await;

    client()
        .post(proxy.url("/cell/value?sid=abc"))
        .body(r#"{"a":1}"#)
        .send()
        .await
        .unwrap();

    let out = logs.contents();
    assert!(out.contains(r#"kind="forward""#), "{out}");
    assert!(out.contains(r#"kind="request""#), "{out}");
    assert!(out.contains(r#"kind="response""#), "{out}");
    assert!(out.contains("POST /cell/value?sid=abc"), "{out}");
    assert!(out.contains(r#"{"a":1}"#), "{out}");
    assert!(out.contains("hello"), "{out}");
    assert!(out.contains("session=abc"), "{out}");
}

#[tokio::test]
async fn test_get_request_logs_url_only() {
    let (logs, _guard) = capture();
    let (backend, _recorder) = start_recording_backend("ok").await;
    let proxy = start_proxy(backend, |c| c.logging.log_request = true).await;

    client()
        .get(proxy.url("/cube/info?sid=s2"))
        .send()
        .await
        .unwrap();

    let out = logs.contents();
    assert!(out.contains(r#"kind="request""#), "{out}");
    assert!(out.contains("url=/cube/info?sid=s2"), "{out}");
    assert!(!out.contains("dump="), "{out}");
    assert!(!out.contains(r#"kind="response""#), "{out}");
}

#[tokio::test]
async fn test_blocked_request_is_logged() {
    let (logs, _guard) = capture();
    let (backend, _recorder) = start_recording_backend("ok").await;
    let proxy = start_proxy(backend, |_| {}).await;

    client()
        .get(proxy.url("/cell/replace"))
        .send()
        .await
        .unwrap();

    let out = logs.contents();
    assert!(out.contains(r#"kind="block""#), "{out}");
    assert!(out.contains("path=/cell/replace"), "{out}");
    assert!(!out.contains(r#"kind="forward""#), "{out}");
}
