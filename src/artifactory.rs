//! Artifactory client.
//!
//! The statistics pipeline only needs one capability from the server: run an
//! AQL query and hand back the raw JSON. [`AqlClient`] names that capability
//! so tests can substitute a canned implementation.
//!
//! - [`ArtifactoryClient`] posts the query to `{base}/api/search/aql`.
//! - [`LazyClient`] builds an `ArtifactoryClient` on first use, once, and
//!   shares it for the rest of the process.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use url::Url;

use crate::error::{ClientError, StatsError};

/// Executes AQL queries against an artifact repository.
///
/// Implementations report failures to reach or build the client as
/// [`StatsError::Connection`] and failures of the query itself as
/// [`StatsError::Query`].
#[async_trait]
pub trait AqlClient: Send + Sync {
    async fn execute(&self, query: &str) -> Result<Bytes, StatsError>;
}

/// Where Artifactory lives and who to authenticate as.
#[derive(Clone, Default)]
pub struct ArtifactorySettings {
    /// Base URL, e.g. `http://localhost:8081/artifactory`.
    pub url: String,
    /// Empty means anonymous access.
    pub user: String,
    pub password: String,
}

impl fmt::Debug for ArtifactorySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactorySettings")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// HTTP client for the Artifactory AQL search endpoint.
#[derive(Debug, Clone)]
pub struct ArtifactoryClient {
    http: reqwest::Client,
    endpoint: Url,
    settings: ArtifactorySettings,
}

impl ArtifactoryClient {
    /// Validates the base URL and builds the HTTP client. Nothing is sent.
    pub fn new(settings: ArtifactorySettings) -> Result<Self, ClientError> {
        let endpoint = aql_endpoint(&settings.url)?;
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, endpoint, settings })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AqlClient for ArtifactoryClient {
    async fn execute(&self, query: &str) -> Result<Bytes, StatsError> {
        debug!(endpoint = %self.endpoint, %query, "executing AQL query");

        let mut req = self.http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "text/plain")
            .body(query.to_owned());
        if !self.settings.user.is_empty() {
            req = req.basic_auth(&self.settings.user, Some(&self.settings.password));
        }

        let res = req.send().await.map_err(|e| StatsError::Query(e.into()))?;
        let status = res.status();
        let body = res.bytes().await.map_err(|e| StatsError::Query(e.into()))?;

        if !status.is_success() {
            return Err(StatsError::Query(ClientError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).trim().to_owned(),
            }));
        }
        Ok(body)
    }
}

/// An [`ArtifactoryClient`] built on first use.
///
/// Construction runs at most once at a time: concurrent first requests wait
/// for the same initialisation. A failed construction is not cached, so the
/// next request tries again.
#[derive(Debug)]
pub struct LazyClient {
    settings: ArtifactorySettings,
    client: OnceCell<ArtifactoryClient>,
}

impl LazyClient {
    pub fn new(settings: ArtifactorySettings) -> Self {
        Self { settings, client: OnceCell::new() }
    }

    /// The shared client, building it if needed.
    pub async fn get(&self) -> Result<&ArtifactoryClient, StatsError> {
        self.client
            .get_or_try_init(|| async {
                let client = ArtifactoryClient::new(self.settings.clone())?;
                info!(endpoint = %client.endpoint(), "Artifactory client initialised");
                Ok::<_, ClientError>(client)
            })
            .await
            .map_err(StatsError::Connection)
    }

    pub fn is_initialised(&self) -> bool {
        self.client.initialized()
    }
}

#[async_trait]
impl AqlClient for LazyClient {
    async fn execute(&self, query: &str) -> Result<Bytes, StatsError> {
        self.get().await?.execute(query).await
    }
}

/// `{base}/api/search/aql`, keeping any context path on `base`.
fn aql_endpoint(base: &str) -> Result<Url, ClientError> {
    let invalid = |source| ClientError::Url { url: base.to_owned(), source };

    let mut url = Url::parse(base).map_err(invalid)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.join("api/search/aql").map_err(invalid)
}
