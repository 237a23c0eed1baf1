//! UnionAll Core
//!
//! Data model and persistence for the UnionAll labeled graph: typed,
//! topic-tagged [`Node`]s connected by phrase-labeled [`Vector`]s.
//!
//! # Modules
//!
//! - [`models`] - Node, Vector, paging parameters and validation rules
//! - [`db`] - libsql store, repositories and the edit-state convention

pub mod db;
pub mod models;

pub use db::{
    DatabaseError, DatabaseService, NodeRepository, RepositoryError, SqlNodeRepository,
    SqlVectorRepository, VectorRepository, WriteKind,
};
pub use models::*;
