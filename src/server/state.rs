//! Shared application state.
//!
//! Everything a stage or handler needs is constructed once at startup and
//! passed down explicitly; there is no global mutable state.

use crate::config::ServerConfig;
use crate::git::Reader;
use crate::server::middleware::AuthConfig;

/// State shared by the pipeline and the handlers.
#[derive(Debug)]
pub struct AppState {
    /// Opens history stores below the configured root
    pub reader: Reader,
    /// Compiled credential check
    pub auth: AuthConfig,
    /// Envelope `apiVersion` value, fixed at build time
    pub api_version: String,
}

impl AppState {
    /// Build the state from startup configuration.
    ///
    /// # Errors
    ///
    /// Fails if the shared secret cannot be compiled into a matcher.
    pub fn new(config: &ServerConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            reader: Reader::new(config.repo_root.clone()),
            auth: AuthConfig::new(&config.api_key)?,
            api_version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}
