//! Record status and edit tracking shared by nodes and vectors.

use serde::Serialize;

/// Soft-delete visibility flag. Only `Active` records are ever selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum RecordStatus {
    #[default]
    Active,
    Deleted,
}

impl RecordStatus {
    /// Stored column value
    pub fn as_i64(self) -> i64 {
        match self {
            RecordStatus::Active => 1,
            RecordStatus::Deleted => 9,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(RecordStatus::Active),
            9 => Some(RecordStatus::Deleted),
            _ => None,
        }
    }
}

/// State the persistence layer needs to classify a record before writing it
pub trait EditTracked {
    /// Store-assigned key, `0` while unassigned
    fn key(&self) -> i64;

    /// Caller has intentionally modified this instance
    fn has_edits(&self) -> bool;

    fn status(&self) -> RecordStatus;

    fn is_key_set(&self) -> bool {
        self.key() != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(RecordStatus::Active.as_i64(), 1);
        assert_eq!(RecordStatus::Deleted.as_i64(), 9);
        assert_eq!(RecordStatus::from_i64(9), Some(RecordStatus::Deleted));
        assert_eq!(RecordStatus::from_i64(2), None);
    }
}
