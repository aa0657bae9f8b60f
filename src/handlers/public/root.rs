// handlers/public/root.rs - Service banner and health check

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::Store;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Blog API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/auth/register, /auth/login, /auth/logout, /auth/refresh (public)",
            "users": "/users[/:id] (public)",
            "posts": "/posts[/:id] (reads public, writes require bearer token)",
            "comments": "/comments/post/:postId, /comments/:id (reads public, writes require bearer token)",
            "health": "/health",
        }
    }))
}

/// GET /health - 503 when the store does not answer a ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ApiError::service_unavailable("Database unavailable").into_response()
        }
    }
}
