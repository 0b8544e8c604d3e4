//! server
//!
//! The HTTP surface: pipeline stages, envelope, routes, and the listener.
//!
//! One task per inbound request; requests share nothing mutable — every
//! request re-opens its repository and rebuilds its reference index, and
//! per-request context lives in typed extensions.

pub mod context;
pub mod envelope;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, Result};
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;

/// The configured HTTP server.
pub struct Server {
    config: ServerConfig,
    router: Router,
}

impl Server {
    /// Build the server: state, pipeline, and routes.
    pub fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let state = Arc::new(AppState::new(&config)?);
        let router = routes::build_router(state);

        Ok(Self { config, router })
    }

    /// Bind the listener and serve until the process is stopped.
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.config.listen_addr).await?;
        tracing::info!(addr = %self.config.listen_addr, "listening");

        axum::serve(listener, self.router).await?;
        Ok(())
    }
}
