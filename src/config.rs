//! Service configuration.
//!
//! Read once at startup from a JSON file (`config.json`, or the path in
//! `DLSTATS_CONFIG`). Every key is optional and falls back to its default:
//!
//! ```json
//! {
//!   "caFile": "ca.cert",
//!   "serverCert": "server.cert",
//!   "serverKey": "server.key",
//!   "servicePort": "9000",
//!   "artifactoryURL": "http://localhost:8081/artifactory",
//!   "user": "",
//!   "password": ""
//! }
//! ```

use std::fmt;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use crate::artifactory::ArtifactorySettings;
use crate::error::{Error, Result};

/// Config file used when `DLSTATS_CONFIG` is not set.
pub const DEFAULT_PATH: &str = "config.json";

/// Environment variable overriding the config file path.
pub const PATH_ENV: &str = "DLSTATS_CONFIG";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CA bundle for the TLS-terminating proxy. Informational.
    #[serde(rename = "caFile")]
    pub ca_file: PathBuf,

    #[serde(rename = "serverCert")]
    pub server_cert: PathBuf,

    #[serde(rename = "serverKey")]
    pub server_key: PathBuf,

    /// Port to listen on. Accepted as a JSON string or number.
    #[serde(rename = "servicePort", deserialize_with = "port_string")]
    pub service_port: String,

    #[serde(rename = "artifactoryURL")]
    pub artifactory_url: String,

    pub user: String,
    pub password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ca_file: PathBuf::from("ca.cert"),
            server_cert: PathBuf::from("server.cert"),
            server_key: PathBuf::from("server.key"),
            service_port: "9000".to_owned(),
            artifactory_url: "http://localhost:8081/artifactory".to_owned(),
            user: String::new(),
            password: String::new(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("ca_file", &self.ca_file)
            .field("server_cert", &self.server_cert)
            .field("server_key", &self.server_key)
            .field("service_port", &self.service_port)
            .field("artifactory_url", &self.artifactory_url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// `$DLSTATS_CONFIG`, or [`DEFAULT_PATH`].
    pub fn path_from_env() -> PathBuf {
        std::env::var_os(PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PATH))
    }

    /// Reads and parses `path`. Keys missing from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path)?;
        serde_json::from_slice(&raw).map_err(|source| Error::Config {
            path: path.to_owned(),
            source,
        })
    }

    /// Like [`load`](Config::load), but any failure falls back to the
    /// defaults so the service can still start.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                info!(path = %path.display(), "configuration loaded");
                config
            }
            Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    /// `0.0.0.0:<servicePort>`.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let port: u16 = self.service_port.trim()
            .parse()
            .map_err(|_| Error::Addr(self.service_port.clone()))?;
        Ok(SocketAddr::from(([0, 0, 0, 0], port)))
    }

    pub fn artifactory(&self) -> ArtifactorySettings {
        ArtifactorySettings {
            url: self.artifactory_url.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
        }
    }

    /// Whether the server certificate and key both exist on disk.
    pub fn tls_files_present(&self) -> bool {
        self.server_cert.is_file() && self.server_key.is_file()
    }
}

fn port_string<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    Ok(match Port::deserialize(d)? {
        Port::Number(n) => n.to_string(),
        Port::Text(s) => s,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let file = write_config(r#"{"artifactoryURL":"https://art.example.com/artifactory","user":"ci"}"#);
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.artifactory_url, "https://art.example.com/artifactory");
        assert_eq!(config.user, "ci");
        assert_eq!(config.service_port, "9000");
        assert_eq!(config.server_key, PathBuf::from("server.key"));
    }

    #[test]
    fn port_accepts_string_or_number() {
        let file = write_config(r#"{"servicePort":8080}"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.listen_addr().unwrap(), "0.0.0.0:8080".parse().unwrap());

        let file = write_config(r#"{"servicePort":"9100"}"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.listen_addr().unwrap().port(), 9100);
    }

    #[test]
    fn bad_port_is_an_addr_error() {
        let config = Config { service_port: "http".into(), ..Config::default() };
        assert!(matches!(config.listen_addr(), Err(Error::Addr(p)) if p == "http"));
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let file = write_config("{ not json");
        assert!(matches!(Config::load(file.path()), Err(Error::Config { .. })));
        assert_eq!(Config::load_or_default(file.path()), Config::default());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert!(matches!(Config::load(&path), Err(Error::Io(_))));
        assert_eq!(Config::load_or_default(&path), Config::default());
    }

    #[test]
    fn tls_files_present_requires_both() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("server.cert");
        std::fs::write(&cert, "cert").unwrap();

        let mut config = Config {
            server_cert: cert,
            server_key: dir.path().join("server.key"),
            ..Config::default()
        };
        assert!(!config.tls_files_present());

        std::fs::write(&config.server_key, "key").unwrap();
        assert!(config.tls_files_present());

        config.server_cert = dir.path().join("missing.cert");
        assert!(!config.tls_files_present());
    }

    #[test]
    fn debug_redacts_password() {
        let config = Config { password: "s3cret".into(), ..Config::default() };
        assert!(!format!("{config:?}").contains("s3cret"));
        assert_eq!(config.artifactory().password, "s3cret");
    }
}
