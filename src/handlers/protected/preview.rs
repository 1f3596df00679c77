use axum::extract::{Extension, Json, Path, State};
use serde_json::{json, Value};

use super::{utils, CohortRequest};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::types::AppState;

/// POST /api/preview/:dataset - compile only
///
/// Returns the statement that the find route would run, with its bound
/// parameters and an inline rendering. Storage is never touched.
pub async fn preview_post(
    State(state): State<AppState>,
    Path(dataset): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
    Json(request): Json<CohortRequest>,
) -> ApiResult<Value> {
    let limit = utils::limit_text(request.limit.as_ref());
    let assembled = state
        .assembler
        .build_for(&dataset, &auth_user.roles, request.cohort.as_ref(), limit.as_deref())?;

    Ok(ApiResponse::success(json!({
        "dataset": assembled.dataset,
        "query": assembled.sql.query,
        "params": assembled.sql.params,
        "inline": assembled.sql.inline(),
        "limit": assembled.limit,
        "catalog_version": state.assembler.catalog().version(),
    })))
}
