mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn health_reports_storage_not_configured() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "not_configured");
    Ok(())
}

#[tokio::test]
async fn root_lists_datasets() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let body = client.get(server.url("/")).send().await?.json::<Value>().await?;
    let datasets = body["data"]["datasets"].as_array().cloned().unwrap_or_default();
    assert!(datasets.contains(&Value::from("population")));
    assert_eq!(body["data"]["catalog_version"], "2021.2");
    Ok(())
}
