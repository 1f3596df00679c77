use serde_json::Value;

use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::query::AssembledQuery;
use crate::types::AppState;

/// Limit as the assembler expects it: the raw text the caller sent.
///
/// Anything other than a string or a number is dropped, so the default
/// ceiling applies.
pub fn limit_text(limit: Option<&Value>) -> Option<String> {
    match limit? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Run an assembled statement against the configured storage and wrap the
/// rows with what was applied to them.
pub async fn fetch(state: &AppState, assembled: AssembledQuery) -> Result<ApiResponse<Vec<Value>>, ApiError> {
    let executor = state
        .executor
        .as_ref()
        .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

    let rows = executor.fetch_rows(&assembled.sql).await?;
    let count = rows.len();

    Ok(ApiResponse::success(rows)
        .with_meta("dataset", assembled.dataset)
        .with_meta("limit", assembled.limit)
        .with_meta("count", count))
}
