//! Business Services
//!
//! This module contains the hierarchy repository, the only component that
//! knows how the materialized index is kept consistent:
//!
//! - `HierarchyRepository` - Insert, rename, move, delete and hierarchy listings
//! - `HierarchyError` - Errors raised by repository operations
//!
//! Services coordinate between the store layer and request handlers.

pub mod error;
pub mod hierarchy_repository;

pub use error::HierarchyError;
pub use hierarchy_repository::HierarchyRepository;
