//! Table definitions for the `NODE` and `VECTOR` tables.
//!
//! Column order in `columns` is the order used by every INSERT, UPDATE and
//! SELECT built from a [`TableDef`]; row readers rely on it. The key is always
//! selected first. `LAST_MODIFIED` is written by the persistence layer and is
//! never selected.

/// Stored value of an active record's status column
pub const STATUS_ACTIVE: i64 = 1;

/// Column written on every insert and update
pub const LAST_MODIFIED_COLUMN: &str = "LAST_MODIFIED";

#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub key: &'static str,
    pub status: &'static str,
    /// Writable columns, excluding the key and `LAST_MODIFIED`
    pub columns: &'static [&'static str],
}

impl TableDef {
    /// `KEY, COL1, COL2, ...`
    pub fn projection(&self) -> String {
        std::iter::once(self.key)
            .chain(self.columns.iter().copied())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// INSERT of every writable column plus `LAST_MODIFIED`
    pub fn insert_sql(&self) -> String {
        let placeholders = vec!["?"; self.columns.len() + 1].join(", ");
        format!(
            "INSERT INTO {} ({}, {}) VALUES ({})",
            self.name,
            self.columns.join(", "),
            LAST_MODIFIED_COLUMN,
            placeholders
        )
    }

    /// UPDATE of every writable column plus `LAST_MODIFIED`, restricted to an
    /// active row with the given key (key is the last parameter)
    pub fn update_sql(&self) -> String {
        let assignments = self
            .columns
            .iter()
            .map(|c| format!("{} = ?", c))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "UPDATE {} SET {}, {} = ? WHERE {} = ? AND {} = {}",
            self.name,
            assignments,
            LAST_MODIFIED_COLUMN,
            self.key,
            self.status,
            STATUS_ACTIVE
        )
    }
}

pub const NODE_TABLE: TableDef = TableDef {
    name: "NODE",
    key: "NODE_ID",
    status: "NODE_STATUS",
    columns: &[
        "NODE_NAME",
        "NODE_TYPE",
        "NODE_TOPIC",
        "NODE_MATCH_NAME",
        "NODE_STATUS",
    ],
};

pub const VECTOR_TABLE: TableDef = TableDef {
    name: "VECTOR",
    key: "VECTOR_ID",
    status: "VECTOR_STATUS",
    columns: &[
        "VECTOR_PHRASE",
        "NODE_SUBJECT",
        "NODE_OBJECT",
        "NODE_PARENT",
        "NODE_ROOT",
        "VECTOR_STATUS",
    ],
};

pub(crate) const CREATE_NODE_TABLE: &str = "CREATE TABLE IF NOT EXISTS NODE (
    NODE_ID INTEGER CONSTRAINT PK_NODE_NODEID PRIMARY KEY AUTOINCREMENT,
    NODE_NAME TEXT NOT NULL CHECK (length(NODE_NAME) <= 512),
    NODE_TYPE INTEGER NOT NULL,
    NODE_TOPIC INTEGER NOT NULL,
    NODE_MATCH_NAME TEXT NOT NULL CHECK (length(NODE_MATCH_NAME) <= 512),
    NODE_STATUS INTEGER NOT NULL DEFAULT 1,
    LAST_MODIFIED DATETIME NOT NULL
)";

pub(crate) const CREATE_VECTOR_TABLE: &str = "CREATE TABLE IF NOT EXISTS VECTOR (
    VECTOR_ID INTEGER CONSTRAINT PK_VECTOR_VECTORID PRIMARY KEY AUTOINCREMENT,
    VECTOR_PHRASE TEXT NOT NULL,
    NODE_SUBJECT INTEGER NOT NULL,
    NODE_OBJECT INTEGER NOT NULL,
    NODE_PARENT INTEGER NOT NULL,
    NODE_ROOT INTEGER NOT NULL,
    VECTOR_STATUS INTEGER NOT NULL DEFAULT 1,
    LAST_MODIFIED DATETIME NOT NULL
)";

/// (index name, DDL)
pub(crate) const VECTOR_INDEXES: [(&str, &str); 4] = [
    (
        "IX_NODE_NODEOBJECT",
        "CREATE INDEX IF NOT EXISTS IX_NODE_NODEOBJECT ON VECTOR(NODE_OBJECT)",
    ),
    (
        "IX_NODE_NODESUBJECT",
        "CREATE INDEX IF NOT EXISTS IX_NODE_NODESUBJECT ON VECTOR(NODE_SUBJECT)",
    ),
    (
        "IX_NODE_NODEPARENT",
        "CREATE INDEX IF NOT EXISTS IX_NODE_NODEPARENT ON VECTOR(NODE_PARENT)",
    ),
    (
        "IX_NODE_NODEROOT",
        "CREATE INDEX IF NOT EXISTS IX_NODE_NODEROOT ON VECTOR(NODE_ROOT)",
    ),
];
