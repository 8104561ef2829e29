//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. You register a path, you
//! get a handler, and every handler sees the same shared state.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use matchit::Router as MatchitRouter;
use percent_encoding::percent_decode_str;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup with the shared state handlers need (clients,
/// settings) and pass it to [`Server::serve`](crate::Server::serve).
pub struct Router<S = ()> {
    routes: HashMap<Method, MatchitRouter<BoxedHandler<S>>>,
    state: Arc<S>,
}

/// Result of matching a method + path pair against the routing table.
pub(crate) enum Lookup<S> {
    Found(BoxedHandler<S>, HashMap<String, String>),
    /// The path exists, but not for this method. Carries the methods it does
    /// exist for, sorted.
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

impl Router<()> {
    /// A router without shared state.
    pub fn new() -> Self {
        Self::with_state(())
    }
}

impl Default for Router<()> {
    fn default() -> Self { Self::new() }
}

impl<S: Send + Sync + 'static> Router<S> {
    /// A router whose handlers all receive `Arc<S>`.
    pub fn with_state(state: S) -> Self {
        Self { routes: HashMap::new(), state: Arc::new(state) }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup.
    pub fn on(self, method: Method, path: &str, handler: impl Handler<S>) -> Self {
        self.add(method, path, handler)
    }

    /// Shorthand for `on(Method::Get, ..)`.
    pub fn get(self, path: &str, handler: impl Handler<S>) -> Self {
        self.add(Method::Get, path, handler)
    }

    fn add(mut self, method: Method, path: &str, handler: impl Handler<S>) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub(crate) fn lookup(&self, method: Method, path: &str) -> Lookup<S> {
        if let Some(matched) = self.routes.get(&method).and_then(|tree| tree.at(path).ok()) {
            let handler = Arc::clone(matched.value);
            let params = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            return Lookup::Found(handler, params);
        }

        let mut allowed: Vec<Method> = self.routes.iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(m, _)| *m)
            .collect();

        if allowed.is_empty() {
            Lookup::NotFound
        } else {
            allowed.sort();
            Lookup::MethodNotAllowed(allowed)
        }
    }

    /// Routes one fully-read request and produces its response.
    ///
    /// This is what the server calls per request; tests call it directly.
    pub async fn oneshot(&self, req: http::Request<Bytes>) -> Response {
        let (parts, body) = req.into_parts();

        let Ok(method) = Method::try_from(&parts.method) else {
            return Response::status(Status::MethodNotAllowed);
        };

        match self.lookup(method, parts.uri.path()) {
            Lookup::Found(handler, raw) => {
                let Some(params) = decode_params(raw) else {
                    return Response::builder()
                        .status(Status::BadRequest)
                        .text("path parameter is not valid UTF-8");
                };
                let req = Request::new(method, parts, body, params);
                handler.call(req, Arc::clone(&self.state)).await
            }
            Lookup::MethodNotAllowed(allowed) => {
                let allow = allowed.iter()
                    .map(|m| m.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                Response::builder()
                    .status(Status::MethodNotAllowed)
                    .header("allow", &allow)
                    .no_body()
            }
            Lookup::NotFound => Response::status(Status::NotFound),
        }
    }
}

/// Percent-decodes matched path parameters. `None` if one of them does not
/// decode to UTF-8.
fn decode_params(raw: HashMap<String, String>) -> Option<HashMap<String, String>> {
    raw.into_iter()
        .map(|(k, v)| {
            let v = percent_decode_str(&v).decode_utf8().ok()?.into_owned();
            Some((k, v))
        })
        .collect()
}
