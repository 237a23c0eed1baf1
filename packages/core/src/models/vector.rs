//! Vector Data Structures
//!
//! A `Vector` is a directed, phrase-labeled edge. It belongs to its `subject`
//! node and points at its `object` node. `parent` and `root` record where the
//! edge came from; they are plain references and are not checked against the
//! node table.

use serde::Serialize;

use super::{EditTracked, NodeId, RecordStatus};

/// Identifier assigned to a vector by the store. `0` means "not yet assigned".
pub type VectorId = i64;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vector {
    id: VectorId,
    pub phrase: String,
    pub subject: NodeId,
    pub object: NodeId,
    pub parent: NodeId,
    pub root: NodeId,
    pub status: RecordStatus,
    #[serde(skip)]
    pub has_edits: bool,
}

impl Vector {
    /// Create an unsaved, active vector
    pub fn new(
        phrase: impl Into<String>,
        subject: NodeId,
        object: NodeId,
        parent: NodeId,
        root: NodeId,
    ) -> Self {
        Self {
            id: 0,
            phrase: phrase.into(),
            subject,
            object,
            parent,
            root,
            status: RecordStatus::Active,
            has_edits: false,
        }
    }

    pub(crate) fn from_store(
        id: VectorId,
        phrase: String,
        subject: NodeId,
        object: NodeId,
        parent: NodeId,
        root: NodeId,
        status: RecordStatus,
    ) -> Self {
        Self {
            id,
            phrase,
            subject,
            object,
            parent,
            root,
            status,
            has_edits: false,
        }
    }

    pub fn id(&self) -> VectorId {
        self.id
    }

    /// Flip the vector to `Deleted` and mark it as edited
    pub fn mark_deleted(&mut self) {
        self.status = RecordStatus::Deleted;
        self.has_edits = true;
    }

    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active
    }

    pub(crate) fn assign_id(&mut self, id: VectorId) {
        if self.id == 0 {
            self.id = id;
        }
    }
}

impl EditTracked for Vector {
    fn key(&self) -> i64 {
        self.id
    }

    fn has_edits(&self) -> bool {
        self.has_edits
    }

    fn status(&self) -> RecordStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_vector_defaults() {
        let vector = Vector::new("has capital", 1, 2, 1, 1);
        assert_eq!(vector.id(), 0);
        assert_eq!(vector.status, RecordStatus::Active);
        assert!(!vector.has_edits);
    }

    #[test]
    fn test_mark_deleted_sets_edit_flag() {
        let mut vector = Vector::new("has capital", 1, 2, 1, 1);
        vector.mark_deleted();
        assert!(!vector.is_active());
        assert!(vector.has_edits);
    }
}
