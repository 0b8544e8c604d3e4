//! server::context
//!
//! Typed per-request metadata.
//!
//! The pipeline's identity stages attach [`RequestId`] and [`RouteKey`] as
//! typed request extensions; [`RequestContext`] is the immutable view the
//! envelope writer reads. Nothing here is string-keyed and nothing outlives
//! the request.

use axum::extract::Request;

/// Opaque random token identifying one request.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Canonical route signature, e.g. `repositories.commits.get`.
#[derive(Debug, Clone)]
pub struct RouteKey(pub String);

/// The per-request metadata read by the envelope writer.
///
/// Built once from whatever identity stages have run; a stage that did not
/// run leaves its field empty rather than failing the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Request id, empty if the id stage did not run
    pub id: String,
    /// Route signature, empty if the route-key stage did not run
    pub method: String,
}

impl RequestContext {
    /// Assemble the context from a request's extensions.
    pub fn extract(request: &Request) -> Self {
        let id = request
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_default();
        let method = request
            .extensions()
            .get::<RouteKey>()
            .map(|key| key.0.clone())
            .unwrap_or_default();

        Self { id, method }
    }
}
