//! Server configuration.
//!
//! Parsed once at startup from flags with environment-variable fallbacks;
//! passed into the pipeline and handler constructors explicitly.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Startup configuration for `githistd`.
#[derive(Debug, Clone, Parser)]
#[command(name = "githistd", version, about = "Read-only Git history over HTTP")]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, env = "GITHIST_LISTEN_ADDR", default_value = "127.0.0.1:8000")]
    pub listen_addr: SocketAddr,

    /// Shared secret every request must present in the Authorization header.
    #[arg(long, env = "GITHIST_API_KEY")]
    pub api_key: String,

    /// Base directory that relative repository paths resolve against.
    #[arg(long, env = "GITHIST_REPO_ROOT", default_value = "/")]
    pub repo_root: PathBuf,
}
