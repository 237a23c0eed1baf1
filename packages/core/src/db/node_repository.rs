//! NodeRepository - persistence for `NODE` rows
//!
//! All reads go through [`ActiveQuery`], so deleted nodes are never listed,
//! counted or returned by a lookup. Writes go through the shared edit-state
//! check in [`persist`](super::persist): the method called decides whether a
//! write is an insert, update or delete.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use unionall_core::db::{DatabaseService, NodeRepository, SqlNodeRepository};
//! use unionall_core::models::{Node, NodeTopic, NodeType};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(DatabaseService::new(PathBuf::from("./data/unionall.db")).await?);
//!     let nodes = SqlNodeRepository::new(db);
//!
//!     let saved = nodes
//!         .insert(Node::new("France", NodeType::Name, NodeTopic::Country))
//!         .await?;
//!     println!("{:?}", saved.map(|n| n.id()));
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use libsql::{Row, Value};

use crate::db::edit_state::WriteKind;
use crate::db::error::RepositoryError;
use crate::db::persist::{self, Persistable};
use crate::db::query::ActiveQuery;
use crate::db::schema::{TableDef, NODE_TABLE};
use crate::db::DatabaseService;
use crate::models::{
    derive_match_name, DataRequestParams, Node, NodeId, NodeNamePair, NodeTopic, NodeType,
    RecordStatus,
};

const NAME_ORDER: &str = "NODE_NAME ASC, NODE_ID ASC";
const PAIR_COLUMNS: &str = "NODE_ID, NODE_NAME";

/// Node persistence operations
///
/// `Ok(None)` means "not found" for reads and "nothing was persisted" for
/// writes. Errors are reserved for store failures, duplicate active keys and
/// records handed to the wrong write method.
#[async_trait]
pub trait NodeRepository: Send + Sync {
    /// Active `(id, name)` pairs ordered by name, filtered and paged by `params`
    async fn list_name_pairs(
        &self,
        params: &DataRequestParams,
    ) -> Result<Vec<NodeNamePair>, RepositoryError>;

    /// Active nodes ordered by name, filtered and paged by `params`
    async fn list_all(&self, params: &DataRequestParams) -> Result<Vec<Node>, RepositoryError>;

    /// Number of active nodes matching the search term of `params`, ignoring paging
    async fn count_active(&self, params: &DataRequestParams) -> Result<i64, RepositoryError>;

    async fn get_by_id(&self, id: NodeId) -> Result<Option<Node>, RepositoryError>;

    /// Insert a node that has no id yet
    async fn insert(&self, node: Node) -> Result<Option<Node>, RepositoryError>;

    /// Insert all nodes or none of them
    async fn insert_set(&self, nodes: Vec<Node>) -> Result<Option<Vec<Node>>, RepositoryError>;

    /// Active nodes with the given ids, ordered by id; `None` unless all are found
    async fn select_set(&self, ids: &[NodeId]) -> Result<Option<Vec<Node>>, RepositoryError>;

    /// Replace the stored fields of a node marked with `has_edits`
    async fn update(&self, node: Node) -> Result<Option<Node>, RepositoryError>;

    /// Persist a node already flipped to `Deleted` with `has_edits` set
    async fn delete(&self, node: Node) -> Result<Option<Node>, RepositoryError>;
}

impl Persistable for Node {
    fn table() -> &'static TableDef {
        &NODE_TABLE
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name().to_string()),
            Value::Integer(self.node_type.as_i64()),
            Value::Integer(self.topic.as_i64()),
            Value::Text(self.match_name().to_string()),
            Value::Integer(self.status.as_i64()),
        ]
    }

    fn from_row(row: &Row) -> anyhow::Result<Self> {
        let id: i64 = row.get(0).context("Failed to get NODE_ID")?;
        let name: String = row.get(1).context("Failed to get NODE_NAME")?;
        let node_type: i64 = row.get(2).context("Failed to get NODE_TYPE")?;
        let topic: i64 = row.get(3).context("Failed to get NODE_TOPIC")?;
        let match_name: String = row.get(4).context("Failed to get NODE_MATCH_NAME")?;
        let status: i64 = row.get(5).context("Failed to get NODE_STATUS")?;

        let node_type = NodeType::from_i64(node_type)
            .ok_or_else(|| anyhow!("Unknown NODE_TYPE {} on node {}", node_type, id))?;
        let topic = NodeTopic::from_i64(topic)
            .ok_or_else(|| anyhow!("Unknown NODE_TOPIC {} on node {}", topic, id))?;
        let status = RecordStatus::from_i64(status)
            .ok_or_else(|| anyhow!("Unknown NODE_STATUS {} on node {}", status, id))?;

        Ok(Node::from_store(id, name, match_name, node_type, topic, status))
    }

    fn assign_key(&mut self, key: i64) {
        self.assign_id(key);
    }
}

fn row_to_name_pair(row: &Row) -> anyhow::Result<NodeNamePair> {
    Ok(NodeNamePair {
        node_id: row.get(0).context("Failed to get NODE_ID")?,
        node_name: row.get(1).context("Failed to get NODE_NAME")?,
    })
}

fn node_name(node: &Node) -> &str {
    node.name()
}

fn pair_name(pair: &NodeNamePair) -> &str {
    &pair.node_name
}

/// Apply the skip/take of `params` to rows that were filtered in memory
fn page_of<T>(rows: Vec<T>, params: &DataRequestParams) -> Vec<T> {
    let skip = usize::try_from(params.skip().max(0)).unwrap_or(usize::MAX);
    let take = usize::try_from(params.take().max(0)).unwrap_or(usize::MAX);
    rows.into_iter().skip(skip).take(take).collect()
}

/// libsql-backed [`NodeRepository`]
#[derive(Clone)]
pub struct SqlNodeRepository {
    db: Arc<DatabaseService>,
}

impl SqlNodeRepository {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    fn listing(params: &DataRequestParams) -> ActiveQuery {
        ActiveQuery::on(&NODE_TABLE)
            .order_by(NAME_ORDER)
            .page(params)
    }

    /// Active rows in name order whose name contains `term`, unpaged
    ///
    /// SQLite's `lower()` folds ASCII only, so the store narrows candidates on
    /// the Unicode-folded `NODE_MATCH_NAME` and the case-insensitive test on
    /// the name itself runs here. `term` is already lower-cased.
    async fn search<R>(
        &self,
        term: &str,
        columns: &str,
        map: fn(&Row) -> anyhow::Result<R>,
        name_of: fn(&R) -> &str,
    ) -> Result<Vec<R>, RepositoryError> {
        let folded = derive_match_name(term);
        let mut query = ActiveQuery::on(&NODE_TABLE);
        if !folded.is_empty() {
            query = query.where_contains("NODE_MATCH_NAME", &folded);
        }
        let query = query.order_by(NAME_ORDER).select_columns(columns);

        let rows = persist::fetch_mapped(&self.db, NODE_TABLE.name, query, map).await?;
        Ok(rows
            .into_iter()
            .filter(|row| name_of(row).to_lowercase().contains(term))
            .collect())
    }
}

#[async_trait]
impl NodeRepository for SqlNodeRepository {
    async fn list_name_pairs(
        &self,
        params: &DataRequestParams,
    ) -> Result<Vec<NodeNamePair>, RepositoryError> {
        match params.search_term() {
            Some(term) => {
                let pairs = self
                    .search(&term, PAIR_COLUMNS, row_to_name_pair, pair_name)
                    .await?;
                Ok(page_of(pairs, params))
            }
            None => {
                let query = Self::listing(params).select_columns(PAIR_COLUMNS);
                persist::fetch_mapped(&self.db, NODE_TABLE.name, query, row_to_name_pair).await
            }
        }
    }

    async fn list_all(&self, params: &DataRequestParams) -> Result<Vec<Node>, RepositoryError> {
        match params.search_term() {
            Some(term) => {
                let nodes = self
                    .search(&term, &NODE_TABLE.projection(), Node::from_row, node_name)
                    .await?;
                Ok(page_of(nodes, params))
            }
            None => persist::fetch_all(&self.db, Self::listing(params)).await,
        }
    }

    async fn count_active(&self, params: &DataRequestParams) -> Result<i64, RepositoryError> {
        match params.search_term() {
            Some(term) => {
                let pairs = self
                    .search(&term, PAIR_COLUMNS, row_to_name_pair, pair_name)
                    .await?;
                Ok(pairs.len() as i64)
            }
            None => persist::fetch_count(&self.db, ActiveQuery::on(&NODE_TABLE)).await,
        }
    }

    async fn get_by_id(&self, id: NodeId) -> Result<Option<Node>, RepositoryError> {
        let query = ActiveQuery::on(&NODE_TABLE).where_eq(NODE_TABLE.key, id);
        persist::fetch_single(&self.db, id, query).await
    }

    async fn insert(&self, node: Node) -> Result<Option<Node>, RepositoryError> {
        let saved = persist::write_one(&self.db, node, WriteKind::Insert).await?;
        if let Some(node) = &saved {
            tracing::info!("Created node {} ({})", node.id(), node.name());
        }
        Ok(saved)
    }

    async fn insert_set(&self, nodes: Vec<Node>) -> Result<Option<Vec<Node>>, RepositoryError> {
        let saved = persist::insert_batch(&self.db, nodes).await?;
        if let Some(nodes) = &saved {
            tracing::info!("Created {} nodes", nodes.len());
        }
        Ok(saved)
    }

    async fn select_set(&self, ids: &[NodeId]) -> Result<Option<Vec<Node>>, RepositoryError> {
        persist::fetch_exact_set(&self.db, ids, |query| query).await
    }

    async fn update(&self, node: Node) -> Result<Option<Node>, RepositoryError> {
        let saved = persist::write_one(&self.db, node, WriteKind::Update).await?;
        if let Some(node) = &saved {
            tracing::info!("Updated node {}", node.id());
        }
        Ok(saved)
    }

    async fn delete(&self, node: Node) -> Result<Option<Node>, RepositoryError> {
        let saved = persist::write_one(&self.db, node, WriteKind::Delete).await?;
        if let Some(node) = &saved {
            tracing::info!("Deleted node {}", node.id());
        }
        Ok(saved)
    }
}
