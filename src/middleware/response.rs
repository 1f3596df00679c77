use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::ApiError;

/// Success envelope: `{ "success": true, "data": …, "meta": … }`.
///
/// `meta` is only present when set. Row-returning routes put what the access
/// layer applied there (dataset, clamped limit, row count) so `data` stays the
/// bare row list.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    data: T,
    meta: Map<String, Value>,
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data,
            meta: Map::new(),
            status: StatusCode::OK,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }

    fn envelope(self) -> Result<(StatusCode, Value), serde_json::Error> {
        let mut envelope = json!({
            "success": true,
            "data": serde_json::to_value(self.data)?,
        });
        if !self.meta.is_empty() {
            envelope["meta"] = Value::Object(self.meta);
        }
        Ok((self.status, envelope))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self.envelope() {
            Ok((status, envelope)) => (status, Json(envelope)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                ApiError::internal_server_error("Failed to serialize response data").into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_is_omitted_until_set() {
        let (status, body) = ApiResponse::success(json!([1, 2])).envelope().unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "data": [1, 2] }));
    }

    #[test]
    fn meta_and_status_are_carried() {
        let (status, body) = ApiResponse::success(Vec::<Value>::new())
            .with_meta("dataset", "population")
            .with_meta("limit", 50)
            .with_status(StatusCode::SERVICE_UNAVAILABLE)
            .envelope()
            .unwrap();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["meta"], json!({ "dataset": "population", "limit": 50 }));
        assert_eq!(body["data"], json!([]));
    }
}
