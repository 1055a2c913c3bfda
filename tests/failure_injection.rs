//! Failure injection tests for upstream faults.

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use axum::http::StatusCode;

mod common;

#[tokio::test]
async fn slow_upstream_yields_504_and_connection_is_closed() {
    let (upstream_addr, closed) = common::spawn_hanging_upstream().await;
    let mut config = common::config_for(upstream_addr);
    config.security.timeout_ms = 200;
    let (proxy, _shutdown) = common::spawn_proxy(config).await;

    let started = Instant::now();
    let res = common::client()
        .get(format!("http://{proxy}/slow"))
        .send()
        .await
        .expect("proxy unreachable");

    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(res.headers()["content-type"], "text/plain");
    assert_eq!(res.text().await.unwrap(), "Gateway Timeout");

    assert!(
        common::eventually(&closed, Duration::from_secs(2)).await,
        "upstream connection should be closed after the deadline"
    );
}

#[tokio::test]
async fn refused_connection_yields_502() {
    let config = common::config_for(common::unused_addr().await);
    let (proxy, _shutdown) = common::spawn_proxy(config).await;

    let res = common::client()
        .get(format!("http://{proxy}/"))
        .send()
        .await
        .expect("proxy unreachable");

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert_eq!(res.text().await.unwrap(), "Bad Gateway");
}

#[tokio::test]
async fn error_responses_omit_cors_when_disabled() {
    let mut config = common::config_for(common::unused_addr().await);
    config.security.cors_enabled = false;
    let (proxy, _shutdown) = common::spawn_proxy(config).await;

    let res = common::client()
        .post(format!("http://{proxy}/"))
        .body("x")
        .send()
        .await
        .expect("proxy unreachable");

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert!(res.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn deadline_does_not_cut_a_streaming_response_body() {
    let upstream_addr =
        common::spawn_slow_body_upstream("late body", Duration::from_millis(500)).await;
    let mut config = common::config_for(upstream_addr);
    config.security.timeout_ms = 200;
    let (proxy, _shutdown) = common::spawn_proxy(config).await;

    let res = common::client()
        .get(format!("http://{proxy}/"))
        .send()
        .await
        .expect("proxy unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "late body");
}

#[tokio::test]
async fn failure_does_not_poison_later_requests() {
    let (hanging_addr, closed) = common::spawn_hanging_upstream().await;
    let mut config = common::config_for(hanging_addr);
    config.security.timeout_ms = 150;
    let (proxy, _shutdown) = common::spawn_proxy(config).await;
    let client = common::client();

    let first = client.get(format!("http://{proxy}/a")).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::GATEWAY_TIMEOUT);
    assert!(common::eventually(&closed, Duration::from_secs(2)).await);

    // The hanging upstream accepts once; the next attempt is refused.
    let second = client.get(format!("http://{proxy}/b")).send().await.unwrap();
    assert!(
        second.status() == StatusCode::BAD_GATEWAY
            || second.status() == StatusCode::GATEWAY_TIMEOUT,
        "unexpected status {}",
        second.status()
    );
    assert!(closed.load(Ordering::SeqCst));
}
