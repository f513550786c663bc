//! Router tests driven through `tower::ServiceExt::oneshot`
//!
//! Tests cover:
//! - Create, rename, move, fetch and delete over HTTP
//! - Query string depth ranges
//! - Error bodies and status codes

use anyhow::Result;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use hierarchy_core::api::SequentialIdGenerator;
use hierarchy_core::db::MemoryStore;
use hierarchy_core::models::HierarchyRecord;
use hierarchy_core::{HierarchyRepository, NodeHandlers};
use hierarchy_server::{
    build_handlers, create_router, AppState, ServerConfig, StoreBackend,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn create_test_router() -> Router {
    let repository = Arc::new(HierarchyRepository::new(Arc::new(MemoryStore::new())));
    let handlers =
        NodeHandlers::with_id_generator(repository, Arc::new(SequentialIdGenerator::new("n")));
    create_router(AppState::new(handlers), None)
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<&str>,
) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))?;

    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

fn ids(value: &Value) -> Vec<String> {
    let records: Vec<HierarchyRecord> = serde_json::from_value(value.clone()).unwrap();
    records.into_iter().map(|r| r.id).collect()
}

/// Creates `n-1` (root) -> `n-2` -> `n-3`, plus `n-4` under the root
async fn seed(router: &Router) -> Result<()> {
    for body in [
        r#"{"name":"root"}"#,
        r#"{"name":"child","parentId":"n-1"}"#,
        r#"{"name":"grandchild","parentId":"n-2"}"#,
        r#"{"name":"sibling","parentId":"n-1"}"#,
    ] {
        let (status, _) = send(router, Method::POST, "/nodes", Some(body)).await?;
        assert_eq!(status, StatusCode::OK);
    }
    Ok(())
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let router = create_test_router();
    let (status, body) = send(&router, Method::GET, "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn test_create_and_get() -> Result<()> {
    let router = create_test_router();

    let (status, body) = send(&router, Method::POST, "/nodes", Some(r#"{"name":"root"}"#)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("n-1".to_string()));

    let (status, body) = send(&router, Method::GET, "/nodes/n-1", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "id": "n-1", "name": "root" }));
    Ok(())
}

#[tokio::test]
async fn test_listings() -> Result<()> {
    let router = create_test_router();
    seed(&router).await?;

    let (status, body) = send(&router, Method::GET, "/nodes/n-1/list", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["n-1", "n-2", "n-4", "n-3"]);

    let (_, body) = send(
        &router,
        Method::GET,
        "/nodes/n-1/list?minRelativeDepth=1&maxRelativeDepth=1",
        None,
    )
    .await?;
    assert_eq!(ids(&body), vec!["n-2", "n-4"]);

    let (_, body) = send(&router, Method::GET, "/nodes/n-3/ancestors", None).await?;
    let ancestors: Vec<HierarchyRecord> = serde_json::from_value(body)?;
    let ancestor_ids: Vec<&str> = ancestors.iter().map(|r| r.ancestor_id.as_str()).collect();
    assert_eq!(ancestor_ids, vec!["n-3", "n-2", "n-1"]);

    let (_, body) = send(&router, Method::GET, "/nodes/n-1/children", None).await?;
    assert_eq!(ids(&body), vec!["n-2", "n-4"]);
    Ok(())
}

#[tokio::test]
async fn test_rename_and_move() -> Result<()> {
    let router = create_test_router();
    seed(&router).await?;

    let (status, body) = send(
        &router,
        Method::PUT,
        "/nodes/n-3/update-name",
        Some(r#"{"name":"renamed"}"#),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "n-3");

    let (status, _) = send(
        &router,
        Method::PUT,
        "/nodes/n-3/move",
        Some(r#"{"parentId":"n-4"}"#),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&router, Method::GET, "/nodes/n-3", None).await?;
    assert_eq!(
        body,
        serde_json::json!({ "id": "n-3", "parentId": "n-4", "name": "renamed" })
    );

    let (_, body) = send(&router, Method::GET, "/nodes/n-4/children", None).await?;
    assert_eq!(ids(&body), vec!["n-3"]);
    Ok(())
}

#[tokio::test]
async fn test_delete() -> Result<()> {
    let router = create_test_router();
    seed(&router).await?;

    let (status, _) = send(&router, Method::DELETE, "/nodes/n-3", None).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&router, Method::GET, "/nodes/n-3", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Unable to locate node.");
    assert_eq!(body["code"], "RESOURCE_NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn test_error_responses() -> Result<()> {
    let router = create_test_router();
    seed(&router).await?;

    let (status, body) = send(&router, Method::POST, "/nodes", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing request body.");

    let (status, body) = send(
        &router,
        Method::PUT,
        "/nodes/n-2",
        Some(r#"{"name":"x"}"#),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Path not found.");

    let (status, body) = send(
        &router,
        Method::PUT,
        "/nodes/n-1/move",
        Some(r#"{"parentId":"n-3"}"#),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CIRCULAR_REFERENCE");

    let (status, _) = send(
        &router,
        Method::GET,
        "/nodes/n-1/list?minRelativeDepth=-2",
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_build_handlers_opens_libsql() -> Result<()> {
    let temp_dir = tempfile::TempDir::new()?;
    let config = ServerConfig {
        store: StoreBackend::Libsql,
        db_path: Some(temp_dir.path().join("server.db")),
        page_size: Some(2),
        ..Default::default()
    };

    let router = create_router(AppState::new(build_handlers(&config).await?), None);
    let (status, body) = send(&router, Method::POST, "/nodes", Some(r#"{"name":"root"}"#)).await?;
    assert_eq!(status, StatusCode::OK);

    let id = body.as_str().unwrap_or_default().to_string();
    let (status, body) = send(&router, Method::GET, &format!("/nodes/{}", id), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "root");
    Ok(())
}
