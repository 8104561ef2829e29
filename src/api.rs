//! HTTP surface of the service.
//!
//! | Method | Path | Answer |
//! |---|---|---|
//! | GET | `/v1/stats/downloads/{repo}` | top downloaded artifacts of `repo`, JSON |
//! | GET | `/healthz` | liveness, 200 with empty body |
//! | GET | `/readyz` | readiness, 200 with empty body |
//!
//! The downloads route takes an optional `limit` query parameter (positive
//! integer, default 2). Failures are answered in plain text: 400 for a bad
//! `limit`, 500 for anything that went wrong talking to Artifactory or
//! decoding its answer.

use std::sync::Arc;

use tracing::{error, warn};

use crate::artifactory::AqlClient;
use crate::error::StatsError;
use crate::health;
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::router::Router;
use crate::stats::{self, DownloadRecord};
use crate::status::Status;

/// Route of the top-downloads endpoint.
pub const DOWNLOADS_ROUTE: &str = "/v1/stats/downloads/{repo}";

/// Shared by every request: the client used to reach Artifactory.
pub struct AppState {
    client: Box<dyn AqlClient>,
}

impl AppState {
    pub fn new(client: impl AqlClient + 'static) -> Self {
        Self { client: Box::new(client) }
    }

    pub fn client(&self) -> &dyn AqlClient {
        self.client.as_ref()
    }
}

/// The service's routing table, serving statistics from `client`.
pub fn router(client: impl AqlClient + 'static) -> Router<AppState> {
    Router::with_state(AppState::new(client))
        .get(DOWNLOADS_ROUTE, get_downloads)
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness)
}

/// `GET /v1/stats/downloads/{repo}[?limit=N]`
pub async fn get_downloads(req: Request, state: Arc<AppState>) -> Response {
    let Some(repo) = req.param("repo") else {
        return Response::status(Status::NotFound);
    };

    match downloads(&req, repo, state.client()).await {
        Ok(records) => Json(records).into_response(),
        Err(e) => {
            if e.status() == Status::BadRequest {
                warn!(repo, error = %e, "rejected downloads request");
            } else {
                error!(repo, error = %e, "downloads request failed");
            }
            e.into_response()
        }
    }
}

async fn downloads(
    req: &Request,
    repo: &str,
    client: &dyn AqlClient,
) -> Result<Vec<DownloadRecord>, StatsError> {
    let limit = stats::parse_limit(req.query("limit"))?;
    stats::top_downloads(client, repo, limit).await
}
