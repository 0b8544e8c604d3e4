//! githistd - serves read-only Git history over HTTP.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use githist::config::ServerConfig;
use githist::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.listen_addr,
        root = %config.repo_root.display(),
        "starting githistd"
    );

    Server::new(config)?.run().await
}
