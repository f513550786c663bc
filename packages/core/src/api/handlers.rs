//! Request Handlers
//!
//! Transport-agnostic handlers over the hierarchy repository. A transport
//! (the dev server, a serverless runtime, a test) builds an [`ApiRequest`]
//! and gets back a typed value or an [`ApiError`] carrying the status code.
//!
//! Routes, by route key:
//!
//! - `POST /nodes` - create a node from `{name, parentId?}`, returns the new id
//! - `PUT /nodes/{id}/update-name` - rename from `{name}`
//! - `PUT /nodes/{id}/move` - re-parent from `{parentId}`
//! - `GET /nodes/{id}` - fetch one node
//! - `DELETE /nodes/{id}` - delete one node's records
//! - `GET /nodes/{id}/list` - descendants, `?minRelativeDepth&maxRelativeDepth`
//! - `GET /nodes/{id}/ancestors` - ancestors, same depth parameters
//! - `GET /nodes/{id}/children` - direct children

use crate::api::error::ApiError;
use crate::api::id_generator::{IdGenerator, UuidGenerator};
use crate::models::{DepthRange, HierarchyRecord, Node};
use crate::services::HierarchyRepository;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub const MIN_RELATIVE_DEPTH_PARAM: &str = "minRelativeDepth";
pub const MAX_RELATIVE_DEPTH_PARAM: &str = "maxRelativeDepth";

/// Body of a create request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodeRequest {
    #[serde(default)]
    pub parent_id: Option<String>,
    pub name: String,
}

/// Body of a rename request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNameRequest {
    pub name: String,
}

/// Body of a move request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveNodeRequest {
    pub parent_id: String,
}

/// A request as seen by the handlers
#[derive(Debug, Clone, Default)]
pub struct ApiRequest {
    /// `"{METHOD} {path template}"`, e.g. `PUT /nodes/{id}/move`
    pub route_key: String,
    /// The `{id}` path parameter, if the route has one
    pub id: Option<String>,
    pub query: HashMap<String, String>,
    pub body: Option<String>,
    pub is_base64_encoded: bool,
}

impl ApiRequest {
    pub fn new(route_key: impl Into<String>) -> Self {
        Self {
            route_key: route_key.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.is_base64_encoded = false;
        self
    }

    /// Attach `body` base64-encoded, as gateways do for binary payloads
    pub fn with_base64_body(mut self, body: impl AsRef<[u8]>) -> Self {
        self.body = Some(base64::engine::general_purpose::STANDARD.encode(body));
        self.is_base64_encoded = true;
        self
    }

    /// Serialize `value` as the JSON body
    pub fn with_json<T: Serialize>(self, value: &T) -> Result<Self, serde_json::Error> {
        Ok(self.with_body(serde_json::to_string(value)?))
    }

    fn is_put(&self) -> bool {
        self.route_key.starts_with("PUT")
    }

    /// Non-empty path id
    fn path_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// The body as text, decoding base64 when flagged
    fn decoded_body(&self) -> Result<String, ApiError> {
        let body = match self.body.as_deref() {
            Some(body) if !body.is_empty() => body,
            _ => return Err(ApiError::missing_body()),
        };

        if !self.is_base64_encoded {
            return Ok(body.to_string());
        }

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(body)
            .map_err(|e| ApiError::bad_request(format!("Invalid base64 body: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| ApiError::bad_request(format!("Body is not valid UTF-8: {}", e)))
    }

    fn depth_param(&self, name: &str) -> Result<Option<u32>, ApiError> {
        match self.query.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
            None => Ok(None),
            Some(value) => value.parse::<u32>().map(Some).map_err(|_| {
                ApiError::bad_request(format!(
                    "Invalid {}: '{}' is not a non-negative integer",
                    name, value
                ))
            }),
        }
    }

    fn depth_range(&self) -> Result<DepthRange, ApiError> {
        let min = self.depth_param(MIN_RELATIVE_DEPTH_PARAM)?;
        let max = self.depth_param(MAX_RELATIVE_DEPTH_PARAM)?;
        Ok(DepthRange::from_bounds(min, max)?)
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))
}

/// Request handlers for node routes
#[derive(Clone)]
pub struct NodeHandlers {
    repository: Arc<HierarchyRepository>,
    ids: Arc<dyn IdGenerator>,
}

impl NodeHandlers {
    /// Handlers generating UUID v4 ids for new nodes
    pub fn new(repository: Arc<HierarchyRepository>) -> Self {
        Self::with_id_generator(repository, Arc::new(UuidGenerator))
    }

    pub fn with_id_generator(
        repository: Arc<HierarchyRepository>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self { repository, ids }
    }

    pub fn repository(&self) -> &Arc<HierarchyRepository> {
        &self.repository
    }

    /// Create, rename or move a node, returning its id
    ///
    /// The body is checked first, then (for `PUT`) the path id, then the
    /// route's sub-path.
    pub async fn save_node(&self, request: &ApiRequest) -> Result<String, ApiError> {
        tracing::debug!("save_node: {}", request.route_key);
        let body = request.decoded_body()?;

        if request.is_put() {
            let id = request.path_id().ok_or_else(ApiError::missing_path_id)?;

            if request.route_key.contains("/update-name") {
                let update: UpdateNameRequest = parse_body(&body)?;
                self.repository.update_name(id, &update.name).await?;
                return Ok(id.to_string());
            }

            if request.route_key.contains("/move") {
                let update: MoveNodeRequest = parse_body(&body)?;
                if update.parent_id.is_empty() {
                    return Err(ApiError::bad_request("Missing required field: parentId"));
                }
                self.repository.update_parent(id, &update.parent_id).await?;
                return Ok(id.to_string());
            }

            return Err(ApiError::path_not_found());
        }

        let create: CreateNodeRequest = parse_body(&body)?;
        let id = self.ids.next_id();
        let node = Node {
            id: id.clone(),
            parent_id: create.parent_id,
            name: create.name,
        };
        self.repository.save(node).await?;

        Ok(id)
    }

    /// Fetch one node
    pub async fn get_node(&self, request: &ApiRequest) -> Result<Node, ApiError> {
        let id = request.path_id().ok_or_else(ApiError::missing_id_parameter)?;
        self.repository
            .get(id)
            .await?
            .ok_or_else(ApiError::node_not_found)
    }

    /// Delete one node's records. Missing nodes are not an error.
    pub async fn delete_node(&self, request: &ApiRequest) -> Result<(), ApiError> {
        let id = request.path_id().ok_or_else(ApiError::missing_id_parameter)?;
        self.repository.delete(id).await?;
        Ok(())
    }

    /// Descendants of the path node within the requested depth range
    pub async fn list_nodes(&self, request: &ApiRequest) -> Result<Vec<HierarchyRecord>, ApiError> {
        let id = request.path_id().ok_or_else(ApiError::missing_id_parameter)?;
        let depths = request.depth_range()?;
        Ok(self.repository.list_all_descendants(id, depths).await?)
    }

    /// Ancestors of the path node within the requested depth range
    pub async fn list_ancestors(
        &self,
        request: &ApiRequest,
    ) -> Result<Vec<HierarchyRecord>, ApiError> {
        let id = request.path_id().ok_or_else(ApiError::missing_id_parameter)?;
        let depths = request.depth_range()?;
        Ok(self.repository.list_all_ancestors(id, depths).await?)
    }

    /// Direct children of the path node
    pub async fn list_children(
        &self,
        request: &ApiRequest,
    ) -> Result<Vec<HierarchyRecord>, ApiError> {
        let id = request.path_id().ok_or_else(ApiError::missing_id_parameter)?;
        Ok(self.repository.list_direct_children(id).await?)
    }
}
