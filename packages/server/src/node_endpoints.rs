//! Node Endpoints
//!
//! Each route builds an [`ApiRequest`] from the path, query string and body,
//! then hands it to the matching [`NodeHandlers`] method.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /nodes` - Create a node, returns its id
//! - `GET /nodes/:id` - Fetch a node
//! - `DELETE /nodes/:id` - Delete a node
//! - `PUT /nodes/:id/update-name` - Rename a node
//! - `PUT /nodes/:id/move` - Move a node under a new parent
//! - `GET /nodes/:id/list` - Descendants (`?minRelativeDepth=&maxRelativeDepth=`)
//! - `GET /nodes/:id/ancestors` - Ancestors (same depth parameters)
//! - `GET /nodes/:id/children` - Direct children

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use hierarchy_core::models::{HierarchyRecord, Node};
use hierarchy_core::ApiRequest;
use serde::Serialize;
use std::collections::HashMap;

use crate::{AppState, HttpError};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create a node
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:3001/nodes -d '{"name":"Item A"}'
/// ```
async fn create_node(State(state): State<AppState>, body: String) -> Result<Json<String>, HttpError> {
    let request = ApiRequest::new("POST /nodes").with_body(body);
    let _guard = state.write_lock.lock().await;
    Ok(Json(state.handlers.save_node(&request).await?))
}

/// `PUT /nodes/:id` has no operation behind it; the handler answers 404
async fn save_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: String,
) -> Result<Json<String>, HttpError> {
    save(&state, "PUT /nodes/{id}", id, body).await
}

async fn update_name(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: String,
) -> Result<Json<String>, HttpError> {
    save(&state, "PUT /nodes/{id}/update-name", id, body).await
}

/// Move a node
///
/// # Example
///
/// ```bash
/// curl -X PUT http://localhost:3001/nodes/D/move -d '{"parentId":"E"}'
/// ```
async fn move_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: String,
) -> Result<Json<String>, HttpError> {
    save(&state, "PUT /nodes/{id}/move", id, body).await
}

async fn save(
    state: &AppState,
    route_key: &str,
    id: String,
    body: String,
) -> Result<Json<String>, HttpError> {
    let request = ApiRequest::new(route_key).with_id(id).with_body(body);
    let _guard = state.write_lock.lock().await;
    Ok(Json(state.handlers.save_node(&request).await?))
}

async fn get_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Node>, HttpError> {
    let request = ApiRequest::new("GET /nodes/{id}").with_id(id);
    Ok(Json(state.handlers.get_node(&request).await?))
}

async fn delete_node(State(state): State<AppState>, Path(id): Path<String>) -> Result<(), HttpError> {
    let request = ApiRequest::new("DELETE /nodes/{id}").with_id(id);
    let _guard = state.write_lock.lock().await;
    state.handlers.delete_node(&request).await?;
    Ok(())
}

fn listing_request(route_key: &str, id: String, query: HashMap<String, String>) -> ApiRequest {
    query
        .into_iter()
        .fold(ApiRequest::new(route_key).with_id(id), |request, (key, value)| {
            request.with_query(key, value)
        })
}

/// Descendants within a depth range
///
/// # Example
///
/// ```bash
/// curl "http://localhost:3001/nodes/A/list?minRelativeDepth=2&maxRelativeDepth=3"
/// ```
async fn list_nodes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Vec<HierarchyRecord>>, HttpError> {
    let request = listing_request("GET /nodes/{id}/list", id, query);
    Ok(Json(state.handlers.list_nodes(&request).await?))
}

async fn list_ancestors(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Vec<HierarchyRecord>>, HttpError> {
    let request = listing_request("GET /nodes/{id}/ancestors", id, query);
    Ok(Json(state.handlers.list_ancestors(&request).await?))
}

async fn list_children(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<HierarchyRecord>>, HttpError> {
    let request = ApiRequest::new("GET /nodes/{id}/children").with_id(id);
    Ok(Json(state.handlers.list_children(&request).await?))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/nodes", post(create_node))
        .route(
            "/nodes/:id",
            get(get_node).put(save_node).delete(delete_node),
        )
        .route("/nodes/:id/update-name", put(update_name))
        .route("/nodes/:id/move", put(move_node))
        .route("/nodes/:id/list", get(list_nodes))
        .route("/nodes/:id/ancestors", get(list_ancestors))
        .route("/nodes/:id/children", get(list_children))
        .with_state(state)
}
