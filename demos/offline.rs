//! Runs the statistics service against an in-memory Artifactory.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example offline
//!
//! Try:
//!   curl http://localhost:9000/v1/stats/downloads/jcenter-cache
//!   curl 'http://localhost:9000/v1/stats/downloads/jcenter-cache?limit=3'
//!   curl 'http://localhost:9000/v1/stats/downloads/jcenter-cache?limit=abc'
//!   curl http://localhost:9000/healthz

use async_trait::async_trait;
use bytes::Bytes;
use dlstats::{AqlClient, Server, StatsError, api};

/// Ignores the query and always answers with the same four items.
struct Canned;

#[async_trait]
impl AqlClient for Canned {
    async fn execute(&self, query: &str) -> Result<Bytes, StatsError> {
        tracing::info!(%query, "canned AQL answer");
        Ok(Bytes::from_static(
            br#"{
              "results": [
                { "name": "struts2-core-2.3.14.pom", "stats": [ { "downloads": 27 } ] },
                { "name": "struts-master-9.pom",     "stats": [ { "downloads": 27 } ] },
                { "name": "commons-io-2.4.jar",      "stats": [ { "downloads": 112 } ] },
                { "name": "junit-4.12.jar",          "stats": [ { "downloads": 3 } ] }
              ]
            }"#,
        ))
    }
}

#[tokio::main]
async fn main() -> Result<(), dlstats::Error> {
    tracing_subscriber::fmt::init();

    Server::bind("0.0.0.0:9000".parse().unwrap())
        .await?
        .serve(api::router(Canned))
        .await
}
