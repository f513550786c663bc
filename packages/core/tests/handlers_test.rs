//! Integration tests for the request handlers
//!
//! Tests cover:
//! - Create, rename and move through `save_node`
//! - Fetch, delete and listings
//! - Status codes and messages for missing or malformed input

mod common;

use anyhow::Result;
use common::{moved_record, record, seed_test_data};
use hierarchy_core::api::{
    ApiError, ApiRequest, CreateNodeRequest, MoveNodeRequest, NodeHandlers,
    SequentialIdGenerator, UpdateNameRequest, MAX_RELATIVE_DEPTH_PARAM, MIN_RELATIVE_DEPTH_PARAM,
};
use hierarchy_core::db::MemoryStore;
use hierarchy_core::models::{DepthRange, HierarchyRecord, Node};
use hierarchy_core::services::HierarchyRepository;
use std::sync::Arc;

async fn create_test_handlers() -> Result<NodeHandlers> {
    let repository = Arc::new(HierarchyRepository::new(Arc::new(MemoryStore::new())));
    seed_test_data(&repository).await?;
    Ok(NodeHandlers::with_id_generator(
        repository,
        Arc::new(SequentialIdGenerator::new("node")),
    ))
}

// =========================================================================
// save_node
// =========================================================================

#[tokio::test]
async fn test_create_node_generates_id() -> Result<()> {
    let handlers = create_test_handlers().await?;

    let request = ApiRequest::new("POST /nodes").with_json(&CreateNodeRequest {
        parent_id: Some("B".to_string()),
        name: "New item".to_string(),
    })?;
    let id = handlers.save_node(&request).await?;
    assert_eq!(id, "node-1");

    let created = handlers.repository().get(&id).await?;
    assert_eq!(
        created,
        Some(Node::new("node-1", "New item").with_parent("B"))
    );

    let chain = handlers
        .repository()
        .list_all_ancestors(&id, DepthRange::all())
        .await?;
    let ancestors: Vec<&str> = chain.iter().map(|r| r.ancestor_id.as_str()).collect();
    assert_eq!(ancestors, vec!["node-1", "B", "A"]);
    Ok(())
}

#[tokio::test]
async fn test_create_root_from_base64_body() -> Result<()> {
    let handlers = create_test_handlers().await?;

    let request = ApiRequest::new("POST /nodes").with_base64_body(r#"{"name":"Root"}"#);
    let id = handlers.save_node(&request).await?;

    let created = handlers.repository().get(&id).await?;
    assert_eq!(created, Some(Node::new(id, "Root")));
    Ok(())
}

#[tokio::test]
async fn test_update_name_route() -> Result<()> {
    let handlers = create_test_handlers().await?;

    let request = ApiRequest::new("PUT /nodes/{id}/update-name")
        .with_id("I")
        .with_json(&UpdateNameRequest {
            name: "Updated I".to_string(),
        })?;
    assert_eq!(handlers.save_node(&request).await?, "I");

    let under_d = handlers
        .list_nodes(&ApiRequest::new("GET /nodes/{id}/list").with_id("D"))
        .await?;
    let i_from_d = under_d.into_iter().find(|r| r.id == "I");
    assert_eq!(i_from_d, Some(record("I", "D", 2).with_name("Updated I")));
    Ok(())
}

#[tokio::test]
async fn test_move_route() -> Result<()> {
    let handlers = create_test_handlers().await?;

    let request = ApiRequest::new("PUT /nodes/{id}/move")
        .with_id("D")
        .with_json(&MoveNodeRequest {
            parent_id: "E".to_string(),
        })?;
    assert_eq!(handlers.save_node(&request).await?, "D");

    let under_b = handlers
        .list_nodes(&ApiRequest::new("GET /nodes/{id}/list").with_id("B"))
        .await?;
    assert_eq!(
        under_b,
        vec![
            record("B", "B", 0),
            record("E", "B", 1),
            moved_record("D", "E", "B", 2),
            record("G", "B", 3),
            record("I", "B", 4),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_move_into_own_subtree_is_conflict() -> Result<()> {
    let handlers = create_test_handlers().await?;

    let request = ApiRequest::new("PUT /nodes/{id}/move")
        .with_id("B")
        .with_body(r#"{"parentId":"I"}"#);
    let err = handlers.save_node(&request).await.unwrap_err();
    assert_eq!(err.status_code, 409);
    assert_eq!(err.code, "CIRCULAR_REFERENCE");
    Ok(())
}

#[tokio::test]
async fn test_save_node_without_body() -> Result<()> {
    let handlers = create_test_handlers().await?;

    let request = ApiRequest::new("PUT /nodes/{id}/update-name");
    let err = handlers.save_node(&request).await.unwrap_err();
    assert_eq!(err, ApiError::missing_body());
    assert_eq!(err.status_code, 400);
    assert_eq!(err.message, "Missing request body.");
    Ok(())
}

#[tokio::test]
async fn test_save_node_put_without_id() -> Result<()> {
    let handlers = create_test_handlers().await?;

    let request =
        ApiRequest::new("PUT /nodes/{id}/update-name").with_body(r#"{"name":"Updated I"}"#);
    let err = handlers.save_node(&request).await.unwrap_err();
    assert_eq!(err.status_code, 404);
    assert_eq!(err.message, "Missing required id in path.");
    Ok(())
}

#[tokio::test]
async fn test_save_node_unknown_put_path() -> Result<()> {
    let handlers = create_test_handlers().await?;

    let request = ApiRequest::new("PUT /nodes/{id}")
        .with_id("I")
        .with_body(r#"{"name":"Updated I"}"#);
    let err = handlers.save_node(&request).await.unwrap_err();
    assert_eq!(err.status_code, 404);
    assert_eq!(err.message, "Path not found.");

    // Nothing changed
    let i = handlers.repository().get("I").await?;
    assert_eq!(i.map(|n| n.name), Some("Item I".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_save_node_malformed_json() -> Result<()> {
    let handlers = create_test_handlers().await?;

    let request = ApiRequest::new("POST /nodes").with_body("{not json");
    let err = handlers.save_node(&request).await.unwrap_err();
    assert_eq!(err.status_code, 400);

    // Well-formed JSON without the required field
    let request = ApiRequest::new("PUT /nodes/{id}/move")
        .with_id("D")
        .with_body(r#"{"name":"wrong body"}"#);
    let err = handlers.save_node(&request).await.unwrap_err();
    assert_eq!(err.status_code, 400);
    Ok(())
}

// =========================================================================
// get_node / delete_node
// =========================================================================

#[tokio::test]
async fn test_get_node() -> Result<()> {
    let handlers = create_test_handlers().await?;

    let b = handlers
        .get_node(&ApiRequest::new("GET /nodes/{id}").with_id("B"))
        .await?;
    assert_eq!(b, common::node("B"));
    Ok(())
}

#[tokio::test]
async fn test_get_node_errors() -> Result<()> {
    let handlers = create_test_handlers().await?;

    let err = handlers
        .get_node(&ApiRequest::new("GET /nodes/{id}"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code, 404);
    assert_eq!(err.message, "Missing required id path parameter.");

    let err = handlers
        .get_node(&ApiRequest::new("GET /nodes/{id}").with_id("b9374857-3fcf-4cfa-b184-1ee875cae434"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code, 404);
    assert_eq!(err.message, "Unable to locate node.");
    Ok(())
}

#[tokio::test]
async fn test_delete_node() -> Result<()> {
    let handlers = create_test_handlers().await?;

    handlers
        .delete_node(&ApiRequest::new("DELETE /nodes/{id}").with_id("I"))
        .await?;
    assert!(handlers.repository().get("I").await?.is_none());

    // Deleting a missing node succeeds
    handlers
        .delete_node(&ApiRequest::new("DELETE /nodes/{id}").with_id("I"))
        .await?;

    let err = handlers
        .delete_node(&ApiRequest::new("DELETE /nodes/{id}"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code, 404);
    assert_eq!(err.message, "Missing required id path parameter.");
    Ok(())
}

// =========================================================================
// Listings
// =========================================================================

#[tokio::test]
async fn test_list_nodes_with_depth_range() -> Result<()> {
    let handlers = create_test_handlers().await?;

    let request = ApiRequest::new("GET /nodes/{id}/list")
        .with_id("A")
        .with_query(MIN_RELATIVE_DEPTH_PARAM, "2")
        .with_query(MAX_RELATIVE_DEPTH_PARAM, "3");
    let ids: Vec<String> = handlers
        .list_nodes(&request)
        .await?
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec!["D", "E", "F", "G", "H"]);
    Ok(())
}

#[tokio::test]
async fn test_list_nodes_rejects_bad_depth() -> Result<()> {
    let handlers = create_test_handlers().await?;

    let request = ApiRequest::new("GET /nodes/{id}/list")
        .with_id("A")
        .with_query(MIN_RELATIVE_DEPTH_PARAM, "abc");
    let err = handlers.list_nodes(&request).await.unwrap_err();
    assert_eq!(err.status_code, 400);

    let err = handlers
        .list_nodes(&ApiRequest::new("GET /nodes/{id}/list"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code, 404);
    Ok(())
}

#[tokio::test]
async fn test_list_ancestors_and_children() -> Result<()> {
    let handlers = create_test_handlers().await?;

    let request = ApiRequest::new("GET /nodes/{id}/ancestors")
        .with_id("I")
        .with_query(MIN_RELATIVE_DEPTH_PARAM, "1")
        .with_query(MAX_RELATIVE_DEPTH_PARAM, "3");
    let ancestors = handlers.list_ancestors(&request).await?;
    assert_eq!(
        ancestors,
        vec![record("I", "G", 1), record("I", "D", 2), record("I", "B", 3)]
    );

    let children: Vec<HierarchyRecord> = handlers
        .list_children(&ApiRequest::new("GET /nodes/{id}/children").with_id("B"))
        .await?;
    assert_eq!(children, vec![record("D", "B", 1), record("E", "B", 1)]);

    // Unknown ids list nothing
    let none = handlers
        .list_children(&ApiRequest::new("GET /nodes/{id}/children").with_id("missing"))
        .await?;
    assert!(none.is_empty());
    Ok(())
}
