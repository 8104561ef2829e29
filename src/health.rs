//! Health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Both answer `200 OK` with an empty body. Readiness does not probe
//! Artifactory: the client connects lazily and a remote outage is reported
//! per request as a 500, not by draining the pod.

use std::sync::Arc;

use crate::{Request, Response, Status};

/// Liveness probe. Always `200 OK`, empty body.
pub async fn liveness<S>(_req: Request, _state: Arc<S>) -> Response {
    Response::status(Status::Ok)
}

/// Readiness probe. Always `200 OK`, empty body.
pub async fn readiness<S>(_req: Request, _state: Arc<S>) -> Response {
    Response::status(Status::Ok)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use crate::Router;

    use super::*;

    #[tokio::test]
    async fn probes_answer_200_with_empty_body() {
        let app = Router::new()
            .get("/healthz", liveness)
            .get("/readyz", readiness);

        for path in ["/healthz", "/readyz"] {
            let req = http::Request::get(path).body(Bytes::new()).unwrap();
            let res = app.oneshot(req).await;
            assert_eq!(res.status_code(), 200);
            assert!(res.body().is_empty());
        }
    }
}
