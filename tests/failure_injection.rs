//! Failure injection tests for the balancer.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::Value;

mod common;

#[tokio::test]
async fn test_retry_on_failure() {
    let b1_calls = Arc::new(AtomicU32::new(0));
    let calls = b1_calls.clone();
    let b1 = common::start_programmable_backend(move |_| {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            (503, "Service Unavailable".to_string())
        }
    })
    .await;
    let b2 = common::start_mock_backend("from b2").await;

    let (proxy, shutdown) = common::start_balancer(common::config_for(&[b1, b2])).await;
    let client = common::client();

    let res = client.get(format!("http://{}/", proxy)).send().await.expect("Proxy unreachable");
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "from b2");
    assert_eq!(b1_calls.load(Ordering::SeqCst), 1);

    let health: Value = client
        .get(format!("http://{}/health", proxy))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["endpoints"][format!("http://{}", b1)]["consecutiveFailures"], 1);
    assert_eq!(health["endpoints"][format!("http://{}", b2)]["consecutiveFailures"], 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_client_error_passthrough() {
    let backend = common::start_programmable_backend(|_| async { (404, "no such order".to_string()) }).await;

    let (proxy, shutdown) = common::start_balancer(common::config_for(&[backend])).await;
    let client = common::client();

    let res = client.get(format!("http://{}/orders/77", proxy)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "no such order");

    let health: Value = client
        .get(format!("http://{}/health", proxy))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entry = &health["endpoints"][format!("http://{}", backend)];
    assert_eq!(entry["consecutiveFailures"], 0);
    assert_eq!(entry["healthy"], true);

    shutdown.trigger();
}

#[tokio::test]
async fn test_all_backends_down_returns_bad_gateway() {
    let b1 = common::start_programmable_backend(|_| async { (500, "err".to_string()) }).await;
    let b2 = common::start_programmable_backend(|_| async { (502, "err".to_string()) }).await;

    let mut config = common::config_for(&[b1, b2]);
    config.max_retries = 3;
    let (proxy, shutdown) = common::start_balancer(config).await;

    let res = common::client().get(format!("http://{}/", proxy)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Bad Gateway");
    assert!(body["message"].as_str().unwrap().starts_with("all 3 attempts failed"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_refused_endpoint_fails_over() {
    let dead = common::closed_port().await;
    let alive = common::start_mock_backend("alive").await;

    let (proxy, shutdown) = common::start_balancer(common::config_for(&[dead, alive])).await;
    let client = common::client();

    for _ in 0..4 {
        let res = client.get(format!("http://{}/", proxy)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.text().await.unwrap(), "alive");
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_failing_backend_is_evicted() {
    let b1_hits = Arc::new(AtomicU32::new(0));
    let b2_hits = Arc::new(AtomicU32::new(0));

    let hits = b1_hits.clone();
    let b1 = common::start_programmable_backend(move |_| {
        let hits = hits.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            (200, "b1".to_string())
        }
    })
    .await;
    let hits = b2_hits.clone();
    let b2 = common::start_programmable_backend(move |_| {
        let hits = hits.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            (500, "dead".to_string())
        }
    })
    .await;

    let mut config = common::config_for(&[b1, b2]);
    config.health_check.fail_threshold = 2;
    config.health_check.recovery_time_ms = 60_000;
    let (proxy, shutdown) = common::start_balancer(config).await;
    let client = common::client();

    // Every request succeeds, b2 failures are absorbed by retries
    for _ in 0..4 {
        let res = client.get(format!("http://{}/", proxy)).send().await.unwrap();
        assert_eq!(res.text().await.unwrap(), "b1");
    }
    assert_eq!(b2_hits.load(Ordering::SeqCst), 2, "b2 evicted after reaching the threshold");

    let before = b2_hits.load(Ordering::SeqCst);
    for _ in 0..10 {
        let res = client.get(format!("http://{}/", proxy)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
    assert_eq!(b2_hits.load(Ordering::SeqCst), before, "b2 should get no traffic while unhealthy");

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_is_rewritten_for_backend() {
    let backend = common::start_programmable_backend(|seen| async move {
        let echo = format!(
            "{} {} host={} body={}",
            seen.method,
            seen.target,
            seen.host.unwrap_or_default(),
            seen.body
        );
        (200, echo)
    })
    .await;

    let (proxy, shutdown) = common::start_balancer(common::config_for(&[backend])).await;

    let res = common::client()
        .post(format!("http://{}/submit?tag=a&tag=b", proxy))
        .body("payload")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.text().await.unwrap(),
        format!("POST /submit?tag=a&tag=b host={} body=payload", backend)
    );

    shutdown.trigger();
}
