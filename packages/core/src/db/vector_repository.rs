//! VectorRepository - persistence for `VECTOR` rows
//!
//! Every read is scoped by the subject node that owns the vector, on top of
//! the active-status predicate applied by [`ActiveQuery`].

use std::sync::Arc;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use libsql::{Row, Value};

use crate::db::edit_state::WriteKind;
use crate::db::error::RepositoryError;
use crate::db::persist::{self, Persistable};
use crate::db::query::ActiveQuery;
use crate::db::schema::{TableDef, NODE_TABLE, VECTOR_TABLE};
use crate::db::DatabaseService;
use crate::models::{DataRequestParams, NodeId, RecordStatus, Vector, VectorId};

const SUBJECT_COLUMN: &str = "NODE_SUBJECT";

/// Vector persistence operations
///
/// Same `Ok(None)` conventions as [`NodeRepository`](super::NodeRepository).
#[async_trait]
pub trait VectorRepository: Send + Sync {
    async fn get_by_id(
        &self,
        subject: NodeId,
        id: VectorId,
    ) -> Result<Option<Vector>, RepositoryError>;

    /// Active vectors of `subject` ordered by id and paged by `params`
    ///
    /// `None` when the subject node is missing or deleted; an empty list when
    /// the subject exists but the page holds nothing.
    async fn list_by_subject(
        &self,
        subject: NodeId,
        params: &DataRequestParams,
    ) -> Result<Option<Vec<Vector>>, RepositoryError>;

    /// Number of active vectors owned by `subject`
    async fn count_by_subject(&self, subject: NodeId) -> Result<i64, RepositoryError>;

    async fn insert(&self, vector: Vector) -> Result<Option<Vector>, RepositoryError>;

    async fn insert_set(
        &self,
        vectors: Vec<Vector>,
    ) -> Result<Option<Vec<Vector>>, RepositoryError>;

    /// Active vectors of `subject` with the given ids; `None` unless all are found
    async fn select_set(
        &self,
        subject: NodeId,
        ids: &[VectorId],
    ) -> Result<Option<Vec<Vector>>, RepositoryError>;

    async fn update(&self, vector: Vector) -> Result<Option<Vector>, RepositoryError>;

    async fn delete(&self, vector: Vector) -> Result<Option<Vector>, RepositoryError>;
}

impl Persistable for Vector {
    fn table() -> &'static TableDef {
        &VECTOR_TABLE
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.phrase.clone()),
            Value::Integer(self.subject),
            Value::Integer(self.object),
            Value::Integer(self.parent),
            Value::Integer(self.root),
            Value::Integer(self.status.as_i64()),
        ]
    }

    fn from_row(row: &Row) -> anyhow::Result<Self> {
        let id: i64 = row.get(0).context("Failed to get VECTOR_ID")?;
        let phrase: String = row.get(1).context("Failed to get VECTOR_PHRASE")?;
        let subject: i64 = row.get(2).context("Failed to get NODE_SUBJECT")?;
        let object: i64 = row.get(3).context("Failed to get NODE_OBJECT")?;
        let parent: i64 = row.get(4).context("Failed to get NODE_PARENT")?;
        let root: i64 = row.get(5).context("Failed to get NODE_ROOT")?;
        let status: i64 = row.get(6).context("Failed to get VECTOR_STATUS")?;

        let status = RecordStatus::from_i64(status)
            .ok_or_else(|| anyhow!("Unknown VECTOR_STATUS {} on vector {}", status, id))?;

        Ok(Vector::from_store(
            id, phrase, subject, object, parent, root, status,
        ))
    }

    fn assign_key(&mut self, key: i64) {
        self.assign_id(key);
    }
}

/// libsql-backed [`VectorRepository`]
#[derive(Clone)]
pub struct SqlVectorRepository {
    db: Arc<DatabaseService>,
}

impl SqlVectorRepository {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    fn owned_by(subject: NodeId) -> ActiveQuery {
        ActiveQuery::on(&VECTOR_TABLE).where_eq(SUBJECT_COLUMN, subject)
    }

    async fn subject_is_active(&self, subject: NodeId) -> Result<bool, RepositoryError> {
        let query = ActiveQuery::on(&NODE_TABLE).where_eq(NODE_TABLE.key, subject);
        Ok(persist::fetch_count(&self.db, query).await? > 0)
    }
}

#[async_trait]
impl VectorRepository for SqlVectorRepository {
    async fn get_by_id(
        &self,
        subject: NodeId,
        id: VectorId,
    ) -> Result<Option<Vector>, RepositoryError> {
        let query = Self::owned_by(subject).where_eq(VECTOR_TABLE.key, id);
        persist::fetch_single(&self.db, id, query).await
    }

    async fn list_by_subject(
        &self,
        subject: NodeId,
        params: &DataRequestParams,
    ) -> Result<Option<Vec<Vector>>, RepositoryError> {
        if !self.subject_is_active(subject).await? {
            tracing::debug!("Vector listing for missing subject {}", subject);
            return Ok(None);
        }

        let query = Self::owned_by(subject)
            .order_by("VECTOR_ID ASC")
            .page(params);
        let vectors = persist::fetch_all(&self.db, query).await?;
        Ok(Some(vectors))
    }

    async fn count_by_subject(&self, subject: NodeId) -> Result<i64, RepositoryError> {
        persist::fetch_count(&self.db, Self::owned_by(subject)).await
    }

    async fn insert(&self, vector: Vector) -> Result<Option<Vector>, RepositoryError> {
        let saved = persist::write_one(&self.db, vector, WriteKind::Insert).await?;
        if let Some(vector) = &saved {
            tracing::info!(
                "Created vector {} on subject {}",
                vector.id(),
                vector.subject
            );
        }
        Ok(saved)
    }

    async fn insert_set(
        &self,
        vectors: Vec<Vector>,
    ) -> Result<Option<Vec<Vector>>, RepositoryError> {
        let saved = persist::insert_batch(&self.db, vectors).await?;
        if let Some(vectors) = &saved {
            tracing::info!("Created {} vectors", vectors.len());
        }
        Ok(saved)
    }

    async fn select_set(
        &self,
        subject: NodeId,
        ids: &[VectorId],
    ) -> Result<Option<Vec<Vector>>, RepositoryError> {
        persist::fetch_exact_set(&self.db, ids, |query| {
            query.where_eq(SUBJECT_COLUMN, subject)
        })
        .await
    }

    async fn update(&self, vector: Vector) -> Result<Option<Vector>, RepositoryError> {
        let saved = persist::write_one(&self.db, vector, WriteKind::Update).await?;
        if let Some(vector) = &saved {
            tracing::info!("Updated vector {}", vector.id());
        }
        Ok(saved)
    }

    async fn delete(&self, vector: Vector) -> Result<Option<Vector>, RepositoryError> {
        let saved = persist::write_one(&self.db, vector, WriteKind::Delete).await?;
        if let Some(vector) = &saved {
            tracing::info!("Deleted vector {}", vector.id());
        }
        Ok(saved)
    }
}
