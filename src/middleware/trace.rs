//! Per-request access log.
//!
//! Every request runs inside a `request` span carrying the method and path.
//! When the response is ready one event is emitted with the status and the
//! latency in milliseconds, at `info` for 1xx-3xx, `warn` for 4xx and
//! `error` for 5xx.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Instant;

use tracing::{Instrument, error, info, info_span, warn};

use crate::response::Response;

/// Runs `fut` inside a request span and logs the outcome.
pub async fn traced<F>(method: &http::Method, path: &str, peer: SocketAddr, fut: F) -> Response
where
    F: Future<Output = Response>,
{
    let span = info_span!("request", %method, path, %peer);
    let started = Instant::now();

    let res = fut.instrument(span.clone()).await;

    let status = res.status_code();
    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
    span.in_scope(|| match status {
        500.. => error!(status, latency_ms, "request failed"),
        400..=499 => warn!(status, latency_ms, "request rejected"),
        _ => info!(status, latency_ms, "request served"),
    });
    res
}
