//! `dlstats` binary.
//!
//! ```text
//! RUST_LOG=info dlstats
//! DLSTATS_CONFIG=/etc/dlstats/config.json dlstats
//! ```

use dlstats::{Config, LazyClient, Server, api};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), dlstats::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load_or_default(&Config::path_from_env());

    if config.tls_files_present() {
        warn!(
            cert = %config.server_cert.display(),
            "TLS certificates found; TLS is terminated by the reverse proxy, serving plain HTTP"
        );
    }

    let addr = config.listen_addr()?;
    let app = api::router(LazyClient::new(config.artifactory()));

    Server::bind(addr).await?.serve(app).await
}
