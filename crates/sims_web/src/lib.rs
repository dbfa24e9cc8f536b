use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub mod error;
pub mod handlers;
pub mod query;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/news", get(handlers::list_news))
        .route("/api/news/keywords", get(handlers::keywords))
        .route("/api/news/categories", get(handlers::categories))
        .route("/api/news/tone", get(handlers::tone))
        .route("/api/articles/:id", get(handlers::get_article))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let source = state.source.name().to_string();
    let listener = TcpListener::bind(addr).await?;
    info!("Serving on http://{} (source: {})", listener.local_addr()?, source);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, ApiError, AppState};
    pub use sims_core::{DashboardSource, Error, Result};
}
