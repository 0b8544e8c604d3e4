//! server::middleware
//!
//! The request-processing pipeline stages.
//!
//! Each stage either forwards the request (possibly attaching typed
//! context) or short-circuits with a terminal response; the chain is
//! strictly linear. Assembly order lives in [`crate::server::routes`]:
//!
//! 1. [`content_type`] — outbound content type, never short-circuits
//! 2. [`request_id`] — random request identity
//! 3. [`method_context`] — canonical route signature
//! 4. [`write_envelope`] — rewraps every body produced further in
//! 5. [`authenticate`] — shared-secret check, 401 on mismatch
//! 6. [`sanitize_directory`] — decodes the pipe-separated directory segment
//! 7. [`require_repository`] — 404 gate for unknown repositories

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use regex::Regex;
use uuid::Uuid;

use crate::git::GitError;
use crate::server::context::{RequestContext, RequestId, RouteKey};
use crate::server::envelope::{self, Payload};
use crate::server::state::AppState;

static VERSION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("/v[0-9]+/").expect("version prefix pattern is valid"));

/// Unconditionally set `application/json` as the outbound content type.
pub async fn content_type(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

/// Attach a freshly generated request id to the request.
pub async fn request_id(mut request: Request, next: Next) -> Response {
    request
        .extensions_mut()
        .insert(RequestId(Uuid::new_v4().to_string()));
    next.run(request).await
}

/// Compute the canonical route signature for a request.
///
/// The version path-prefix is stripped, remaining separators become dots,
/// and the lowercased HTTP method is appended:
/// `/v1/repositories/a|b/commits` + GET → `repositories.a|b.commits.get`.
/// Runs before directory sanitization, so encoded pipes stay verbatim.
pub fn route_key(path: &str, method: &Method) -> String {
    let stripped = VERSION_PREFIX.replace_all(path, "");
    format!(
        "{}.{}",
        stripped.replace('/', "."),
        method.as_str().to_lowercase()
    )
}

/// Attach the canonical route signature to the request.
pub async fn method_context(mut request: Request, next: Next) -> Response {
    let key = route_key(request.uri().path(), request.method());
    request.extensions_mut().insert(RouteKey(key));
    next.run(request).await
}

/// Rewrap the downstream response body into the uniform envelope.
///
/// Handlers (and short-circuiting stages below this one) emit exactly one
/// complete payload; that body is decoded into the envelope's payload slot
/// and re-encoded with `apiVersion`, `id` and `method` attached. Bodies the
/// framework produced without a handler write (routing fallbacks) pass
/// through untouched. A body that fails to decode as a payload is an
/// internal bug and becomes a bare 500.
pub async fn write_envelope(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let ctx = RequestContext::extract(&request);
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(error = %err, "failed to collect response body");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if bytes.is_empty() {
        return Response::from_parts(parts, Body::empty());
    }

    match envelope::wrap(&bytes, &state.api_version, &ctx) {
        Ok(enveloped) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(enveloped))
        }
        Err(err) => {
            tracing::error!(error = %err, "response body is not a valid payload");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Compiled shared-secret check.
///
/// The secret is turned into an escaped exact-match pattern once at
/// startup; request handling only ever runs the match.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pattern: Regex,
}

impl AuthConfig {
    /// Compile the matcher for a shared secret.
    pub fn new(api_key: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!("^{}$", regex::escape(api_key)))?;
        Ok(Self { pattern })
    }

    /// Whether the presented credential matches the secret.
    pub fn allows(&self, authorization: Option<&str>) -> bool {
        authorization.is_some_and(|value| self.pattern.is_match(value))
    }
}

/// Compare the `Authorization` header against the configured secret.
///
/// On mismatch the chain stops here with a 401 and
/// `errors.error = "Unauthorized"`; downstream stages never run.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if state.auth.allows(authorization) {
        return next.run(request).await;
    }

    tracing::warn!("rejected request with missing or invalid credentials");
    (StatusCode::UNAUTHORIZED, Json(Payload::error("Unauthorized"))).into_response()
}

/// The repository directory a request targets, decoded to a real path.
#[derive(Debug, Clone)]
pub struct RepoDir(pub PathBuf);

/// Decode a routed directory segment into a filesystem path.
///
/// Path separators cannot appear raw in a URL segment, so directories
/// arrive pipe-separated. Idempotent: input without pipes is returned
/// unchanged.
pub fn sanitize(directory: &str) -> String {
    directory.replace('|', "/")
}

/// Rewrite the `{directory}` path variable into a real filesystem path
/// before any later stage or handler sees it.
pub async fn sanitize_directory(
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Response {
    let directory = params.get("directory").map(String::as_str).unwrap_or("");
    request
        .extensions_mut()
        .insert(RepoDir(PathBuf::from(sanitize(directory))));
    next.run(request).await
}

/// Gate requests on the repository actually existing.
///
/// Opens the store once and discards the handle. Not-found short-circuits
/// with a 404 error payload. Any other open failure indicates a broken
/// store rather than bad user input; it panics into the process-level
/// recovery layer, which turns it into a generic 500.
pub async fn require_repository(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(RepoDir(dir)) = request.extensions().get::<RepoDir>().cloned() else {
        panic!("repository gate ran without the directory sanitizer");
    };

    match state.reader.open(&dir) {
        Ok(_) => next.run(request).await,
        Err(err @ GitError::RepositoryNotFound { .. }) => {
            tracing::debug!(directory = %dir.display(), "repository not found");
            (StatusCode::NOT_FOUND, Json(Payload::error(err.to_string()))).into_response()
        }
        Err(err) => {
            tracing::error!(directory = %dir.display(), error = %err, "repository open failed");
            panic!("failed to open repository {}: {err}", dir.display());
        }
    }
}
