use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::cohort::DimensionCatalog;
use crate::middleware::{ApiResponse, ApiResult};
use crate::query::Dataset;
use crate::types::AppState;

/// GET / - service information
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");
    let datasets: Vec<&str> = Dataset::all().iter().map(|d| d.name).collect();

    Json(json!({
        "success": true,
        "data": {
            "name": "Cohort Access API",
            "version": version,
            "description": "Row-level access and cohort filtering over population datasets",
            "catalog_version": DimensionCatalog::standard().version(),
            "datasets": datasets,
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "data": "/api/data/:dataset?cohort=&limit= (protected)",
                "find": "/api/find/:dataset (protected)",
                "preview": "/api/preview/:dataset (protected, compile only)",
            }
        }
    }))
}

/// GET /health - liveness plus storage status
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    let now = chrono::Utc::now();

    let Some(executor) = state.executor.as_ref() else {
        return Ok(ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "database": "not_configured"
        })));
    };

    match executor.health_check().await {
        Ok(()) => Ok(ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "database": "ok"
        }))),
        Err(e) => {
            tracing::warn!("health check failed: {}", e);
            Ok(ApiResponse::success(json!({
                "status": "degraded",
                "timestamp": now,
                "database": "unavailable"
            }))
            .with_status(StatusCode::SERVICE_UNAVAILABLE))
        }
    }
}
