use axum::extract::{Extension, Path, Query, State};
use serde::Deserialize;
use serde_json::Value;

use super::utils;
use crate::middleware::{ApiResult, AuthUser};
use crate::types::AppState;

#[derive(Debug, Deserialize)]
pub struct DataQuery {
    /// Cohort specification as JSON text
    pub cohort: Option<String>,
    pub limit: Option<String>,
}

/// GET /api/data/:dataset - rows the caller may see, optionally narrowed to a cohort
pub async fn dataset_get(
    State(state): State<AppState>,
    Path(dataset): Path<String>,
    Query(query): Query<DataQuery>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<Value>> {
    let cohort = query.cohort.map(Value::String);
    let assembled = state
        .assembler
        .build_for(&dataset, &auth_user.roles, cohort.as_ref(), query.limit.as_deref())?;

    utils::fetch(&state, assembled).await
}
