use std::sync::Arc;
use std::time::Duration;

use edge_stress::client::HttpConnector;
use edge_stress::domain::Phase;
use edge_stress::driver::LoadDriver;
use reqwest::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn driver_for(base: &str, targets: &[&str]) -> LoadDriver {
    let url = Url::parse(base).expect("valid base url");
    LoadDriver::new(
        Arc::new(HttpConnector::new(&url)),
        targets.iter().map(|t| t.to_string()).collect(),
    )
    .expect("driver")
}

async fn mount_body(server: &MockServer, route: &str, size: usize) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'x'; size]))
        .mount(server)
        .await;
}

#[tokio::test]
async fn two_workers_receive_fixed_body() {
    let server = MockServer::start().await;
    mount_body(&server, "/1mb.img", 100).await;
    let driver = driver_for(&server.uri(), &["/1mb.img"]);

    let stats = driver.run_phase(&Phase::new(2, 1)).await.unwrap();

    assert!(stats.requests() > 0);
    assert_eq!(stats.bytes(), 100 * stats.requests());
    assert_eq!(stats.errors(), 0);
    assert!(stats.elapsed >= Duration::from_secs(1));

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len() as u64, stats.requests());
}

#[tokio::test]
async fn bytes_follow_the_chosen_targets() {
    let server = MockServer::start().await;
    mount_body(&server, "/small.img", 10).await;
    mount_body(&server, "/large.img", 1000).await;
    let driver = driver_for(&server.uri(), &["/small.img", "/large.img"]);

    let stats = driver
        .run_phase(&Phase::with_duration(3, Duration::from_millis(300)))
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    let small = received.iter().filter(|r| r.url.path() == "/small.img").count() as u64;
    let large = received.iter().filter(|r| r.url.path() == "/large.img").count() as u64;

    assert_eq!(small + large, stats.requests());
    assert_eq!(stats.bytes(), 10 * small + 1000 * large);
    assert_eq!(stats.errors(), 0);
}

#[tokio::test]
async fn error_status_still_counts_as_received() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.img"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;
    let driver = driver_for(&server.uri(), &["/gone.img"]);

    let stats = driver
        .run_phase(&Phase::with_duration(1, Duration::from_millis(200)))
        .await
        .unwrap();

    assert!(stats.requests() > 0);
    assert_eq!(stats.errors(), 0);
    assert_eq!(stats.bytes(), 9 * stats.requests());
}

#[tokio::test]
async fn unreachable_target_counts_only_errors() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let driver = driver_for(&format!("http://127.0.0.1:{port}"), &["/1mb.img"]);

    let stats = driver
        .run_phase(&Phase::with_duration(2, Duration::from_millis(200)))
        .await
        .unwrap();

    assert!(stats.requests() > 0);
    assert_eq!(stats.errors(), stats.requests());
    assert_eq!(stats.bytes(), 0);
}

#[tokio::test]
async fn schedule_runs_pause_between_bursts() {
    let server = MockServer::start().await;
    mount_body(&server, "/1mb.img", 64).await;
    let driver = driver_for(&server.uri(), &["/1mb.img"]);
    let phases = [
        Phase::with_duration(5, Duration::from_millis(150)),
        Phase::with_duration(0, Duration::from_millis(100)),
        Phase::with_duration(5, Duration::from_millis(150)),
    ];

    let mut out = Vec::new();
    let results = driver.run_schedule(&phases, &mut out).await.unwrap();

    assert_eq!(results.len(), 3);
    assert!(results[1].is_empty());
    assert!(results[1].elapsed >= Duration::from_millis(100));
    for stats in [&results[0], &results[2]] {
        assert!(stats.requests() > 0);
        assert_eq!(stats.bytes(), 64 * stats.requests());
    }

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("Running ").count(), 3);
    assert!(text.contains("Results: 0 requests, 0 bytes received, 0 errors"));
}
