// handlers/public/health.rs - GET / and GET /health handlers

use axum::extract::State;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET / - service banner
pub async fn root() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/api/auth", "/api/users", "/api/convocatorias", "/api/applications", "/api/catalogo",
            "/api/stats", "/api/filters", "/api/visitor-logs", "/api/visitantes-info"
        ]
    })))
}

/// GET /health - liveness plus a `SELECT 1` against the pool
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    state.db.health_check().await.map_err(|e| {
        tracing::error!("Health check failed: {}", e);
        ApiError::service_unavailable("database unavailable")
    })?;

    Ok(ApiResponse::success(json!({
        "status": "ok",
        "database": "connected",
        "environment": state.config.environment,
    })))
}
