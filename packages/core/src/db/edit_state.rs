//! Edit-state determination
//!
//! Before a record is written, it is classified from its key and edit flag:
//!
//! | key assigned | `has_edits` | state       |
//! |--------------|-------------|-------------|
//! | no           | any         | `Added`     |
//! | yes          | true        | `Modified`  |
//! | yes          | false       | `Unchanged` |
//!
//! The repository method that was called supplies a [`WriteKind`]. A
//! classification that does not fit the requested kind is a caller error and
//! nothing is written; in particular an update of a record nobody marked as
//! edited is rejected instead of being silently skipped.

use chrono::{DateTime, Utc};

use crate::db::error::RepositoryError;
use crate::models::{EditTracked, RecordStatus};

/// What the caller asked the repository to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Insert,
    Update,
    Delete,
}

/// Classification of a record about to be persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Added,
    Modified,
    Unchanged,
}

impl EditState {
    pub fn of<T: EditTracked>(record: &T) -> Self {
        if record.is_key_set() {
            if record.has_edits() {
                EditState::Modified
            } else {
                EditState::Unchanged
            }
        } else {
            EditState::Added
        }
    }
}

/// Statement a write resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteStatement {
    Insert,
    Update,
}

/// A write that passed edit-state checks, stamped with its `LAST_MODIFIED` value
#[derive(Debug, Clone)]
pub(crate) struct PendingWrite {
    pub statement: WriteStatement,
    pub last_modified: DateTime<Utc>,
}

impl PendingWrite {
    /// `LAST_MODIFIED` in the stored text format
    pub fn last_modified_text(&self) -> String {
        self.last_modified
            .format("%Y-%m-%d %H:%M:%S%.3f")
            .to_string()
    }
}

/// Check `record` against `kind` and stamp the write
pub(crate) fn plan_write<T: EditTracked>(
    table: &'static str,
    record: &T,
    kind: WriteKind,
) -> Result<PendingWrite, RepositoryError> {
    let state = EditState::of(record);

    let statement = match (kind, state) {
        (WriteKind::Insert, EditState::Added) => WriteStatement::Insert,
        (WriteKind::Insert, _) => {
            return Err(RepositoryError::KeyAlreadyAssigned {
                table,
                id: record.key(),
            })
        }
        (WriteKind::Update | WriteKind::Delete, EditState::Added) => {
            return Err(RepositoryError::KeyNotAssigned { table })
        }
        (WriteKind::Update | WriteKind::Delete, EditState::Unchanged) => {
            return Err(RepositoryError::UnmodifiedRecord {
                table,
                id: record.key(),
            })
        }
        (WriteKind::Delete, EditState::Modified) if record.status() != RecordStatus::Deleted => {
            return Err(RepositoryError::DeleteNotMarked {
                table,
                id: record.key(),
            })
        }
        (WriteKind::Update | WriteKind::Delete, EditState::Modified) => WriteStatement::Update,
    };

    Ok(PendingWrite {
        statement,
        last_modified: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Record {
        key: i64,
        edited: bool,
        status: RecordStatus,
    }

    impl EditTracked for Record {
        fn key(&self) -> i64 {
            self.key
        }
        fn has_edits(&self) -> bool {
            self.edited
        }
        fn status(&self) -> RecordStatus {
            self.status
        }
    }

    fn record(key: i64, edited: bool) -> Record {
        Record {
            key,
            edited,
            status: RecordStatus::Active,
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(EditState::of(&record(0, false)), EditState::Added);
        assert_eq!(EditState::of(&record(0, true)), EditState::Added);
        assert_eq!(EditState::of(&record(4, true)), EditState::Modified);
        assert_eq!(EditState::of(&record(4, false)), EditState::Unchanged);
    }

    #[test]
    fn test_insert_of_new_record() {
        let write = plan_write("NODE", &record(0, false), WriteKind::Insert).unwrap();
        assert_eq!(write.statement, WriteStatement::Insert);
    }

    #[test]
    fn test_insert_of_keyed_record_is_rejected() {
        let err = plan_write("NODE", &record(3, true), WriteKind::Insert).unwrap_err();
        assert!(matches!(err, RepositoryError::KeyAlreadyAssigned { id: 3, .. }));
    }

    #[test]
    fn test_update_without_edit_flag_is_rejected() {
        let err = plan_write("NODE", &record(3, false), WriteKind::Update).unwrap_err();
        assert!(matches!(err, RepositoryError::UnmodifiedRecord { id: 3, .. }));
        assert!(err.is_caller_error());
    }

    #[test]
    fn test_update_of_unsaved_record_is_rejected() {
        let err = plan_write("VECTOR", &record(0, true), WriteKind::Update).unwrap_err();
        assert!(matches!(err, RepositoryError::KeyNotAssigned { .. }));
    }

    #[test]
    fn test_delete_requires_deleted_status() {
        let err = plan_write("NODE", &record(3, true), WriteKind::Delete).unwrap_err();
        assert!(matches!(err, RepositoryError::DeleteNotMarked { id: 3, .. }));

        let marked = Record {
            key: 3,
            edited: true,
            status: RecordStatus::Deleted,
        };
        let write = plan_write("NODE", &marked, WriteKind::Delete).unwrap();
        assert_eq!(write.statement, WriteStatement::Update);
    }

    #[test]
    fn test_last_modified_text_format() {
        let write = plan_write("NODE", &record(0, false), WriteKind::Insert).unwrap();
        let text = write.last_modified_text();
        assert!(chrono::NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.3f").is_ok());
    }
}
