//! Middleware layer.
//!
//! Cross-cutting concerns wrapped around every dispatched request. The server
//! applies them in order; handlers never see them.
//!
//! - [`trace`]: access log, one event per request with method, path, status
//!   and latency.

pub mod trace;
