//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use url::form_urlencoded;

use crate::method::Method;

/// An incoming HTTP request with its body fully read, the path parameters
/// captured by the router, and the query string decoded.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: http::HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) query: Vec<(String, String)>,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        parts: http::request::Parts,
        body: Bytes,
        params: HashMap<String, String>,
    ) -> Self {
        let query = parts.uri.query()
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        Self {
            method,
            path: parts.uri.path().to_owned(),
            headers: parts.headers,
            body,
            params,
            query,
        }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Values that are not visible ASCII are
    /// treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/v1/stats/downloads/{repo}`, `req.param("repo")` on
    /// `/v1/stats/downloads/jcenter-cache` returns `Some("jcenter-cache")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns the first value of a query-string parameter, percent-decoded.
    ///
    /// `?limit=5&limit=7` yields `Some("5")` for `"limit"`.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
