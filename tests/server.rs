//! The service over a real socket.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dlstats::{AqlClient, Server, StatsError, api};
use tokio::sync::oneshot;

struct Static;

#[async_trait]
impl AqlClient for Static {
    async fn execute(&self, _query: &str) -> Result<Bytes, StatsError> {
        Ok(Bytes::from_static(
            br#"{"results":[{"name":"a.jar","stats":[{"downloads":4}]},{"name":"b.jar","stats":[{"downloads":9}]}]}"#,
        ))
    }
}

/// Answers after a delay, to observe draining.
struct Slow;

#[async_trait]
impl AqlClient for Slow {
    async fn execute(&self, _query: &str) -> Result<Bytes, StatsError> {
        tokio::time::sleep(Duration::from_millis(300)).await;
        Ok(Bytes::from_static(br#"{"results":[]}"#))
    }
}

#[tokio::test]
async fn serves_downloads_and_health_over_http() {
    let server = Server::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let base = format!("http://{}", server.local_addr());
    let (stop, stopped) = oneshot::channel::<()>();

    let running = tokio::spawn(server.serve_with_shutdown(api::router(Static), async {
        let _ = stopped.await;
    }));

    let http = reqwest::Client::new();

    let res = http.get(format!("{base}/v1/stats/downloads/libs")).send().await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(
        res.text().await.unwrap(),
        r#"[{"repoName":"libs","artifactName":"b.jar","downloads":9},{"repoName":"libs","artifactName":"a.jar","downloads":4}]"#
    );

    let res = http.get(format!("{base}/v1/stats/downloads/libs?limit=x")).send().await.unwrap();
    assert_eq!(res.status().as_u16(), 400);

    let res = http.get(format!("{base}/healthz")).send().await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert!(res.bytes().await.unwrap().is_empty());

    stop.send(()).unwrap();
    running.await.unwrap().unwrap();
}

#[tokio::test]
async fn shutdown_drains_in_flight_requests() {
    let server = Server::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let url = format!("http://{}/v1/stats/downloads/libs", server.local_addr());
    let (stop, stopped) = oneshot::channel::<()>();

    let running = tokio::spawn(server.serve_with_shutdown(api::router(Slow), async {
        let _ = stopped.await;
    }));

    let in_flight = tokio::spawn(async move { reqwest::get(url).await });

    // let the request reach the handler before signalling
    tokio::time::sleep(Duration::from_millis(100)).await;
    stop.send(()).unwrap();

    let res = in_flight.await.unwrap().unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.text().await.unwrap(), "[]");

    running.await.unwrap().unwrap();
}
