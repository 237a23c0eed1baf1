//! Database Layer
//!
//! libsql storage for the UnionAll graph:
//!
//! - [`DatabaseService`] opens the store and creates the `NODE` and `VECTOR` tables
//! - [`NodeRepository`] and [`VectorRepository`] own every query and write
//!
//! Reads only ever see active rows. Deletes are logical: the status column is
//! flipped and the row stays in place.

mod database;
mod edit_state;
mod error;
mod node_repository;
mod persist;
mod query;
pub mod schema;
mod vector_repository;

pub use database::DatabaseService;
pub use edit_state::{EditState, WriteKind};
pub use error::{DatabaseError, RepositoryError};
pub use node_repository::{NodeRepository, SqlNodeRepository};
pub use vector_repository::{SqlVectorRepository, VectorRepository};
