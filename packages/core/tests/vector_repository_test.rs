//! Integration tests for SqlVectorRepository
//!
//! Vectors are always read through their subject node, so every test starts
//! from a small graph of country nodes.

use std::collections::HashSet;
use std::sync::Arc;

use tempfile::TempDir;
use unionall_core::db::{
    DatabaseService, NodeRepository, RepositoryError, SqlNodeRepository, SqlVectorRepository,
    VectorRepository,
};
use unionall_core::models::{DataRequestParams, Node, NodeTopic, NodeType, Vector};

struct Graph {
    db: Arc<DatabaseService>,
    nodes: SqlNodeRepository,
    vectors: SqlVectorRepository,
    france: Node,
    paris: Node,
    _temp_dir: TempDir,
}

async fn setup() -> Graph {
    let temp_dir = TempDir::new().unwrap();
    let db = Arc::new(
        DatabaseService::new(temp_dir.path().join("test.db"))
            .await
            .unwrap(),
    );
    let nodes = SqlNodeRepository::new(db.clone());
    let vectors = SqlVectorRepository::new(db.clone());

    let france = nodes
        .insert(Node::new("France", NodeType::Name, NodeTopic::Country))
        .await
        .unwrap()
        .unwrap();
    let paris = nodes
        .insert(Node::new("Paris", NodeType::Name, NodeTopic::Region))
        .await
        .unwrap()
        .unwrap();

    Graph {
        db,
        nodes,
        vectors,
        france,
        paris,
        _temp_dir: temp_dir,
    }
}

impl Graph {
    fn edge(&self, phrase: &str) -> Vector {
        Vector::new(
            phrase,
            self.france.id(),
            self.paris.id(),
            self.france.id(),
            self.france.id(),
        )
    }

    async fn insert(&self, phrase: &str) -> Vector {
        self.vectors.insert(self.edge(phrase)).await.unwrap().unwrap()
    }
}

#[tokio::test]
async fn test_insert_and_get_by_subject() {
    let graph = setup().await;
    let saved = graph.insert("has capital").await;
    assert_ne!(saved.id(), 0);

    let fetched = graph
        .vectors
        .get_by_id(graph.france.id(), saved.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.phrase, "has capital");
    assert_eq!(fetched.object, graph.paris.id());
    assert_eq!(fetched.parent, graph.france.id());
    assert_eq!(fetched.root, graph.france.id());
}

#[tokio::test]
async fn test_get_by_id_is_scoped_by_subject() {
    let graph = setup().await;
    let saved = graph.insert("has capital").await;

    let other_subject = graph
        .vectors
        .get_by_id(graph.paris.id(), saved.id())
        .await
        .unwrap();
    assert!(other_subject.is_none());
}

#[tokio::test]
async fn test_list_by_subject_orders_by_id_and_pages() {
    let graph = setup().await;

    let mut ids = Vec::new();
    for phrase in ["has capital", "borders", "exports", "imports", "speaks"] {
        ids.push(graph.insert(phrase).await.id());
    }

    let first = DataRequestParams::new(1, 2, None);
    let page = graph
        .vectors
        .list_by_subject(graph.france.id(), &first)
        .await
        .unwrap()
        .unwrap();
    let page_ids: Vec<i64> = page.iter().map(|v| v.id()).collect();
    assert_eq!(page_ids, ids[..2].to_vec());

    let mut seen = HashSet::new();
    let mut params = first;
    loop {
        let page = graph
            .vectors
            .list_by_subject(graph.france.id(), &params)
            .await
            .unwrap()
            .unwrap();
        if page.is_empty() {
            break;
        }
        for vector in page {
            assert!(seen.insert(vector.id()));
        }
        params = params.next_page();
    }
    assert_eq!(seen.len(), 5);
    assert_eq!(
        graph
            .vectors
            .count_by_subject(graph.france.id())
            .await
            .unwrap(),
        5
    );
}

#[tokio::test]
async fn test_list_by_subject_distinguishes_missing_subject_from_empty_page() {
    let graph = setup().await;

    let empty = graph
        .vectors
        .list_by_subject(graph.paris.id(), &DataRequestParams::default())
        .await
        .unwrap();
    assert_eq!(empty, Some(Vec::new()));

    let missing = graph
        .vectors
        .list_by_subject(999, &DataRequestParams::default())
        .await
        .unwrap();
    assert!(missing.is_none());

    let mut paris = graph.paris.clone();
    paris.mark_deleted();
    graph.nodes.delete(paris).await.unwrap().unwrap();

    let deleted = graph
        .vectors
        .list_by_subject(graph.paris.id(), &DataRequestParams::default())
        .await
        .unwrap();
    assert!(deleted.is_none());
}

#[tokio::test]
async fn test_deleted_vectors_are_excluded() {
    let graph = setup().await;

    let keep = graph.insert("has capital").await;
    let mut gone = graph.insert("borders").await;
    gone.mark_deleted();
    graph.vectors.delete(gone.clone()).await.unwrap().unwrap();

    let listed = graph
        .vectors
        .list_by_subject(graph.france.id(), &DataRequestParams::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id(), keep.id());
    assert!(graph
        .vectors
        .get_by_id(graph.france.id(), gone.id())
        .await
        .unwrap()
        .is_none());

    let conn = graph.db.connect().unwrap();
    let mut stmt = conn
        .prepare("SELECT VECTOR_STATUS FROM VECTOR WHERE VECTOR_ID = ?")
        .await
        .unwrap();
    let mut rows = stmt.query(libsql::params![gone.id()]).await.unwrap();
    let row = rows.next().await.unwrap().unwrap();
    let status: i64 = row.get(0).unwrap();
    assert_eq!(status, 9);
}

#[tokio::test]
async fn test_second_delete_is_none() {
    let graph = setup().await;
    let mut saved = graph.insert("has capital").await;
    saved.mark_deleted();

    assert!(graph.vectors.delete(saved.clone()).await.unwrap().is_some());
    assert!(graph.vectors.delete(saved).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_requires_edit_flag() {
    let graph = setup().await;
    let saved = graph.insert("has capital").await;

    let mut changed = saved.clone();
    changed.phrase = "is capital of".to_string();
    let err = graph.vectors.update(changed.clone()).await.unwrap_err();
    assert!(matches!(err, RepositoryError::UnmodifiedRecord { .. }));

    let stored = graph
        .vectors
        .get_by_id(graph.france.id(), saved.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.phrase, "has capital");

    changed.has_edits = true;
    graph.vectors.update(changed).await.unwrap().unwrap();
    let stored = graph
        .vectors
        .get_by_id(graph.france.id(), saved.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.phrase, "is capital of");
}

#[tokio::test]
async fn test_insert_set_and_select_set() {
    let graph = setup().await;

    let saved = graph
        .vectors
        .insert_set(vec![graph.edge("borders"), graph.edge("exports")])
        .await
        .unwrap()
        .unwrap();
    let ids: Vec<i64> = saved.iter().map(|v| v.id()).collect();
    assert!(ids.iter().all(|id| *id != 0));

    let selected = graph
        .vectors
        .select_set(graph.france.id(), &ids)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(selected.len(), 2);

    let wrong_subject = graph
        .vectors
        .select_set(graph.paris.id(), &ids)
        .await
        .unwrap();
    assert!(wrong_subject.is_none());

    let with_missing = graph
        .vectors
        .select_set(graph.france.id(), &[ids[0], 999])
        .await
        .unwrap();
    assert!(with_missing.is_none());

    let repeated = graph
        .vectors
        .select_set(graph.france.id(), &[ids[0], ids[1], ids[0]])
        .await
        .unwrap();
    assert!(repeated.is_none());
}
