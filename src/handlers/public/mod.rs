// handlers/public - service info, liveness and the 404 fallback

use axum::{extract::State, http::Uri};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

pub async fn root() -> ApiResponse<Value> {
    let version = env!("CARGO_PKG_VERSION");

    ApiResponse::success(json!({
        "name": "Likha API (Rust)",
        "version": version,
        "description": "Tenant isolation schema health service",
        "endpoints": {
            "home": "/",
            "liveness": "/health",
            "detailed": "/health/detailed, /api/v1/contracts/health/detailed",
            "status": "/health/status, /api/v1/contracts/health/status",
        }
    }))
}

/// Database ping only; the schema checks live under /health/detailed
pub async fn liveness(State(state): State<AppState>) -> ApiResult<Value> {
    state.database.health_check().await?;

    Ok(ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "database": "ok"
    })))
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Route not found: {}", uri.path()))
}
