//! HTTP gateway: route wiring and server startup.

pub mod handlers;
pub mod state;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::service::PointService;
use state::AppState;

/// Build the application router. Split out of `run_server` so tests can
/// drive the routes without binding a socket.
pub fn build_router(service: Arc<PointService>) -> Router {
    let state = Arc::new(AppState::new(service));

    let point_routes = Router::new()
        .route("/point/{user_id}", get(handlers::get_point))
        .route("/point/{user_id}/histories", get(handlers::get_histories))
        .route("/point/{user_id}/charge", post(handlers::charge))
        .route("/point/{user_id}/use", post(handlers::use_points));

    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .nest("/api/v1", point_routes)
        .with_state(state)
}

/// Start the HTTP gateway server.
pub async fn run_server(host: &str, port: u16, service: Arc<PointService>) -> anyhow::Result<()> {
    let app = build_router(service);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("gateway listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
