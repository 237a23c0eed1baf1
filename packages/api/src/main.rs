//! UnionAll API server
//!
//! # Environment Variables
//!
//! - `UNIONALL_PORT`: Server port (default: 5000)
//! - `UNIONALL_BIND`: Bind address (default: 127.0.0.1)
//! - `UNIONALL_DB_PATH`: Database file (default: ~/.unionall/database/unionall.db)
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use unionall_api::{start_server, ApiConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("UnionAll API {}", env!("CARGO_PKG_VERSION"));

    let config = ApiConfig::from_env()?;
    start_server(config).await
}
