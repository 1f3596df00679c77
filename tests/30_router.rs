use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use cohort_access_api::auth::{generate_jwt, Claims};
use cohort_access_api::database::{DatabaseError, QueryExecutor};
use cohort_access_api::predicate::SqlResult;
use cohort_access_api::query::QueryAssembler;
use cohort_access_api::server::app;
use cohort_access_api::types::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "router-test-secret";

/// Records every statement it is asked to run and returns one fixed row.
#[derive(Default)]
struct RecordingExecutor {
    seen: Mutex<Vec<SqlResult>>,
}

#[async_trait]
impl QueryExecutor for RecordingExecutor {
    async fn fetch_rows(&self, sql: &SqlResult) -> Result<Vec<Value>, DatabaseError> {
        self.seen.lock().unwrap().push(sql.clone());
        Ok(vec![json!({ "nhs_number": "9990000001", "gpp_code": "A1" })])
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

fn state_with(executor: Option<Arc<RecordingExecutor>>) -> AppState {
    let executor = executor.map(|e| e as Arc<dyn QueryExecutor>);
    AppState::new(QueryAssembler::default(), executor, SECRET)
}

fn bearer(roles: Value) -> String {
    let roles = roles.as_array().cloned().unwrap_or_default();
    let token = generate_jwt(&Claims::new("router-test", roles, 1), SECRET).unwrap();
    format!("Bearer {}", token)
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = app(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn data_route_runs_the_assembled_statement() {
    let executor = Arc::new(RecordingExecutor::default());
    let cohort = "%7B%22SexDimension%22%3A%5B%22Female%22%5D%7D"; // {"SexDimension":["Female"]}
    let request = Request::builder()
        .uri(format!("/api/data/population?cohort={}&limit=25", cohort))
        .header(header::AUTHORIZATION, bearer(json!([{ "population_gpp_code": "A1" }])))
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(state_with(Some(executor.clone())), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"], json!({ "dataset": "population", "limit": 25, "count": 1 }));
    assert_eq!(body["data"][0]["gpp_code"], "A1");

    let seen = executor.seen.lock().unwrap();
    assert_eq!(
        seen[0].query,
        "SELECT * FROM public.population_master WHERE gpp_code LIKE $1 AND sex = $2 LIMIT 25"
    );
    assert_eq!(seen[0].params, vec![json!("A1"), json!("Female")]);
}

#[tokio::test]
async fn denied_requests_never_reach_storage() {
    let executor = Arc::new(RecordingExecutor::default());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/find/population")
        .header(header::AUTHORIZATION, bearer(json!([{ "populationshielding_gpp_code": "A1" }])))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "cohort": { "AgeDimension": [[18, 65]] } }).to_string()))
        .unwrap();

    let (status, body) = send(state_with(Some(executor.clone())), request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    assert!(executor.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_cohort_is_forbidden() {
    let executor = Arc::new(RecordingExecutor::default());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/find/population")
        .header(header::AUTHORIZATION, bearer(json!([{ "population_gpp_code": "A1" }])))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "cohort": "{\"AgeDimension\": [[18" }).to_string()))
        .unwrap();

    let (status, _) = send(state_with(Some(executor.clone())), request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(executor.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn preview_compiles_without_storage() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/preview/populationshielding")
        .header(header::AUTHORIZATION, bearer(json!([{ "populationshielding_pcn_code": "U1" }])))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "limit": "9000" }).to_string()))
        .unwrap();

    let (status, body) = send(state_with(None), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["inline"],
        "SELECT * FROM public.population_shielding WHERE pcn_code LIKE 'U1' LIMIT 5000"
    );
    assert_eq!(body["data"]["params"], json!(["U1"]));
}

#[tokio::test]
async fn data_route_without_storage_is_unavailable() {
    let request = Request::builder()
        .uri("/api/data/population")
        .header(header::AUTHORIZATION, bearer(json!([{ "population_gpp_code": "A1" }])))
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(state_with(None), request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let request = Request::builder()
        .uri("/api/data/population")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(state_with(None), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn unknown_dataset_is_not_found() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/preview/users")
        .header(header::AUTHORIZATION, bearer(json!([{ "users_id": "1" }])))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let (status, _) = send(state_with(None), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
