//! Handler Boundary
//!
//! Request handlers that sit between a transport and the hierarchy
//! repository. Pure request/response logic - no HTTP framework dependencies.

pub mod error;
pub mod handlers;
pub mod id_generator;

pub use error::ApiError;
pub use handlers::{
    ApiRequest, CreateNodeRequest, MoveNodeRequest, NodeHandlers, UpdateNameRequest,
    MAX_RELATIVE_DEPTH_PARAM, MIN_RELATIVE_DEPTH_PARAM,
};
pub use id_generator::{IdGenerator, SequentialIdGenerator, UuidGenerator};
