//! Data Models
//!
//! This module contains the core data structures of the UnionAll graph:
//!
//! - `Node` - typed, topic-tagged vertex
//! - `Vector` - directed, phrase-labeled edge between two nodes
//! - `DataRequestParams` / `PagingMetadata` - collection paging
//!
//! Records are created with id `0` and receive their identifier from the
//! store on insert.

mod node;
mod paging;
mod request_params;
mod status;
mod validation;
mod vector;

pub use node::{
    derive_match_name, validate_node_name, Node, NodeId, NodeNamePair, NodeTopic, NodeType,
    NODE_NAME_MAX_LEN, NODE_NAME_MIN_LEN,
};
pub use paging::PagingMetadata;
pub use request_params::{DataRequestParams, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use status::{EditTracked, RecordStatus};
pub use validation::ValidationError;
pub use vector::{Vector, VectorId};
