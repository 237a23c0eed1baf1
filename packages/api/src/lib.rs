//! UnionAll HTTP API
//!
//! Plain JSON REST endpoints over the node and vector repositories.
//!
//! # Endpoints
//!
//! - `node_endpoints`: `/nodes...` collections and `/node/:id` records
//! - `vector_endpoints`: vectors owned by a node under `/node/:id/...`
//! - `GET /` reports the service name and version
//!
//! # Usage
//!
//! ```bash
//! UNIONALL_PORT=5000 RUST_LOG=debug cargo run --bin unionall-api
//! ```

use std::sync::Arc;

use axum::{response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use unionall_core::db::{
    DatabaseService, NodeRepository, SqlNodeRepository, SqlVectorRepository, VectorRepository,
};

pub mod config;
pub mod dto;
pub mod http_error;
pub mod ids;
pub mod json_patch;
pub mod paging;

mod node_endpoints;
mod vector_endpoints;

pub use config::ApiConfig;
pub use http_error::HttpError;

/// Repositories shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub nodes: Arc<dyn NodeRepository>,
    pub vectors: Arc<dyn VectorRepository>,
}

impl AppState {
    /// State backed by the libsql repositories over `db`
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self {
            nodes: Arc::new(SqlNodeRepository::new(db.clone())),
            vectors: Arc::new(SqlVectorRepository::new(db)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
}

async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .merge(node_endpoints::routes(state.clone()))
        .merge(vector_endpoints::routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Open the database named by `config` and serve until the process stops
///
/// # Errors
///
/// Returns error if the database cannot be opened or the listener fails to bind.
pub async fn start_server(config: ApiConfig) -> anyhow::Result<()> {
    let db = Arc::new(DatabaseService::new(config.db_path.clone()).await?);
    let app = create_router(AppState::new(db));

    let addr = config.socket_addr();
    tracing::info!("UnionAll API listening on http://{}", addr);
    tracing::info!("Database: {}", config.db_path.display());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
