//! # dlstats
//!
//! A small HTTP service answering one question about an Artifactory
//! repository: which artifacts are downloaded the most?
//!
//! ```text
//! GET /v1/stats/downloads/jcenter-cache?limit=2
//!
//! [{"repoName":"jcenter-cache","artifactName":"struts2-core-2.3.14.pom","downloads":27},
//!  {"repoName":"jcenter-cache","artifactName":"struts-master-9.pom","downloads":27}]
//! ```
//!
//! Each request builds an AQL query, runs it through an [`AqlClient`],
//! decodes the answer, ranks it by download count and returns JSON.
//!
//! ## Deployment contract
//!
//! dlstats runs behind a reverse proxy. The proxy owns TLS termination,
//! rate limiting, slow-client protection and body-size limits; the service
//! owns routing, the Artifactory round-trip and graceful shutdown on SIGTERM.
//!
//! ## Embedding
//!
//! ```rust,no_run
//! use dlstats::{api, ArtifactorySettings, LazyClient, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), dlstats::Error> {
//!     let client = LazyClient::new(ArtifactorySettings {
//!         url: "http://localhost:8081/artifactory".into(),
//!         ..Default::default()
//!     });
//!
//!     Server::bind("0.0.0.0:9000".parse().unwrap())
//!         .await?
//!         .serve(api::router(client))
//!         .await
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod api;
pub mod aql;
pub mod artifactory;
pub mod config;
pub mod health;
pub mod middleware;
pub mod stats;

pub use artifactory::{AqlClient, ArtifactoryClient, ArtifactorySettings, LazyClient};
pub use config::Config;
pub use error::{ClientError, DecodeError, Error, Result, StatsError};
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use stats::DownloadRecord;
pub use status::Status;
