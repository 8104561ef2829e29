//! Error types.
//!
//! Two layers:
//!
//! - [`Error`] surfaces infrastructure failures: binding the listener,
//!   reading the configuration file. These end the process.
//! - [`StatsError`] is a request-level failure of the statistics pipeline.
//!   It never ends the process; it becomes a plain-text HTTP response with
//!   the status from [`StatsError::status`].

use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

use crate::response::{IntoResponse, Response};
use crate::status::Status;

/// Result alias for infrastructure operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type returned by dlstats' fallible startup and serving operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// The config file exists but is not valid JSON of the expected shape.
    #[error("config `{}`: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid listen address `{0}`")]
    Addr(String),
}

/// Failure while talking to the Artifactory server.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid Artifactory URL `{url}`: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The server answered, but not with a 2xx.
    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },

    /// Free-form failure, used by alternative [`AqlClient`](crate::AqlClient)
    /// implementations.
    #[error("{0}")]
    Backend(String),
}

/// The AQL payload could not be turned into download records.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("artifact `{0}` has no download stats")]
    MissingStats(String),
}

/// Request-level failure of the top-downloads pipeline.
#[derive(Debug, Error)]
pub enum StatsError {
    /// The `limit` query parameter is not a positive integer. The message is
    /// the parser's, passed through verbatim.
    #[error("{0}")]
    InvalidLimit(#[from] ParseIntError),

    #[error("Connecting to Artifactory: {0}")]
    Connection(#[source] ClientError),

    #[error("Executing AQL query: {0}")]
    Query(#[source] ClientError),

    #[error("Unmarshaling AQL Results: {0}")]
    Decode(#[from] DecodeError),
}

impl StatsError {
    /// Status code the error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::InvalidLimit(_) => Status::BadRequest,
            Self::Connection(_) | Self::Query(_) | Self::Decode(_) => {
                Status::InternalServerError
            }
        }
    }
}

impl IntoResponse for StatsError {
    fn into_response(self) -> Response {
        Response::builder()
            .status(self.status())
            .text(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_limit_is_a_client_error_with_verbatim_message() {
        let parse = "abc".parse::<u32>().unwrap_err();
        let expected = parse.to_string();
        let err = StatsError::from(parse);

        assert_eq!(err.status(), Status::BadRequest);
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn remote_errors_carry_their_context() {
        let err = StatsError::Query(ClientError::Backend("Error processing request".into()));
        assert_eq!(err.status(), Status::InternalServerError);
        assert_eq!(err.to_string(), "Executing AQL query: Error processing request");

        let err = StatsError::Connection(ClientError::Backend("refused".into()));
        assert_eq!(err.to_string(), "Connecting to Artifactory: refused");

        let err = StatsError::from(DecodeError::MissingStats("a.pom".into()));
        assert_eq!(
            err.to_string(),
            "Unmarshaling AQL Results: artifact `a.pom` has no download stats"
        );
    }

    #[test]
    fn renders_as_plain_text_response() {
        let res = StatsError::Query(ClientError::Status { status: 502, body: "down".into() })
            .into_response();

        assert_eq!(res.status_code(), 500);
        assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
        assert_eq!(res.body(), b"Executing AQL query: server answered 502: down");
    }
}
