//! Shutdown and startup behavior through a real listener.

mod common;

use common::{client, start_proxy, start_recording_backend, start_slow_backend};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use xdjprox::lifecycle::startup;
use xdjprox::{LifecycleState, ProxyConfig, ProxyError};

#[tokio::test]
async fn test_in_flight_request_completes_after_interrupt() {
    let (backend, _recorder) = start_slow_backend("slow", Duration::from_millis(500)).await;
    let proxy = start_proxy(backend, |_| {}).await;

    let url = proxy.url("/cell/values");
    let in_flight = tokio::spawn(async move { client().get(url).send().await });

    // Let the request reach the backend before interrupting.
    tokio::time::sleep(Duration::from_millis(150)).await;
    proxy.shutdown.trigger();

    timeout(
        Duration::from_secs(2),
        proxy.lifecycle.wait_for(LifecycleState::Draining),
    )
    .await
    .expect("server never started draining");

    let resp = in_flight.await.unwrap().unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "slow");

    timeout(
        Duration::from_secs(5),
        proxy.lifecycle.wait_for(LifecycleState::Stopped),
    )
    .await
    .expect("server never stopped");

    let result = proxy.handle.await.unwrap();
    assert!(result.is_ok());

    assert!(TcpStream::connect(proxy.addr).await.is_err());
}

#[tokio::test]
async fn test_idle_server_stops_promptly() {
    let (backend, _recorder) = start_recording_backend("ok").await;
    let proxy = start_proxy(backend, |_| {}).await;
    assert_eq!(proxy.lifecycle.current(), LifecycleState::Listening);

    proxy.shutdown.trigger();

    let result = timeout(Duration::from_secs(2), proxy.handle)
        .await
        .expect("idle server did not stop");
    assert!(result.unwrap().is_ok());
    assert_eq!(proxy.lifecycle.current(), LifecycleState::Stopped);
}

#[tokio::test]
async fn test_requests_served_until_interrupt() {
    let (backend, recorder) = start_recording_backend("ok").await;
    let proxy = start_proxy(backend, |_| {}).await;
    let client = client();

    for _ in 0..5 {
        let resp = client.get(proxy.url("/server/info")).send().await.unwrap();
        assert_eq!(resp.status(), 200);
    }
    assert_eq!(proxy.lifecycle.current(), LifecycleState::Listening);
    assert_eq!(recorder.lock().unwrap().len(), 5);

    proxy.shutdown.trigger();
    proxy.lifecycle.wait_for(LifecycleState::Stopped).await;
}

#[tokio::test]
async fn test_bind_conflict_is_reported() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = taken.local_addr().unwrap().to_string();

    let mut config = ProxyConfig::default();
    config.listener.bind_address = address.clone();

    match startup::bind(&config).await {
        Err(ProxyError::Bind { address: reported, .. }) => assert_eq!(reported, address),
        other => panic!("expected bind error, got {:?}", other.map(|_| ())),
    }
}
