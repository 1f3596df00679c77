use axum::extract::{Extension, Json, Path, State};
use serde_json::Value;

use super::{utils, CohortRequest};
use crate::middleware::{ApiResult, AuthUser};
use crate::types::AppState;

/// POST /api/find/:dataset - same as the data route with the cohort in the body
pub async fn find_post(
    State(state): State<AppState>,
    Path(dataset): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
    Json(request): Json<CohortRequest>,
) -> ApiResult<Vec<Value>> {
    let limit = utils::limit_text(request.limit.as_ref());
    let assembled = state
        .assembler
        .build_for(&dataset, &auth_user.roles, request.cohort.as_ref(), limit.as_deref())?;

    utils::fetch(&state, assembled).await
}
