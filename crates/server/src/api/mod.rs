use crate::config::{AppState, ServerConfig};
use anyhow::{Context, Result};
use axum::{
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

mod handlers;

/// Start the MCP transport
pub async fn serve(config: ServerConfig) -> Result<()> {
    let state = AppState::new(&config)?;

    let app = create_router(state, &config.server.path);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("MCP endpoint listening on http://{}{}", addr, config.server.path);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the router: the MCP endpoint at `path` plus a health check
fn create_router(state: AppState, path: &str) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(path, post(handlers::mcp_post).get(handlers::mcp_get))
        // Middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "mdbridge",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
