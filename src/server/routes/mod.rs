//! Router assembly.
//!
//! Routes are grouped per resource and wired to the middleware pipeline in
//! its contractual order. Layer composition reads inside-out: the last
//! layer added to a router runs first.
//!
//! ```text
//! catch-panic                      process-level recovery backstop
//! └ trace
//!   └ content-type                 stage 1
//!     └ request-id                 stage 2
//!       └ method-context           stage 3
//!         └ /v1
//!           └ envelope writer      stage 4
//!             └ auth               stage 5
//!               └ /repositories/{directory}
//!                 └ sanitizer      stage 6
//!                   └ repo gate    stage 7
//!                     └ handlers
//! ```

pub mod commits;
pub mod references;

use std::sync::Arc;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::server::middleware;
use crate::server::state::AppState;

/// Build the complete router over the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let repositories = Router::new()
        .route("/commits", get(commits::list))
        .route("/commits/{hash}", get(commits::get))
        .route("/commits/{hash}/diff", get(commits::diff))
        .route("/references", get(references::list))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::require_repository,
        ))
        .layer(from_fn(middleware::sanitize_directory));

    let v1 = Router::new()
        .nest("/repositories/{directory}", repositories)
        .layer(from_fn_with_state(state.clone(), middleware::authenticate))
        .layer(from_fn_with_state(state.clone(), middleware::write_envelope));

    Router::new()
        .nest("/v1", v1)
        .layer(from_fn(middleware::method_context))
        .layer(from_fn(middleware::request_id))
        .layer(from_fn(middleware::content_type))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
