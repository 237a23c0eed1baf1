//! Database Connection Management
//!
//! Opens the libsql store that backs the repositories and creates the
//! `NODE` and `VECTOR` tables on first use.
//!
//! # Connection pattern
//!
//! Every repository operation opens its own connection through
//! [`DatabaseService::connect_with_timeout`], runs its statements and drops
//! the connection. Nothing is cached between operations, so each read returns
//! a detached snapshot of the rows.
//!
//! The 5-second busy timeout lets concurrent writers wait for the lock
//! instead of failing immediately with `SQLITE_BUSY`.

use crate::db::error::DatabaseError;
use crate::db::schema::{CREATE_NODE_TABLE, CREATE_VECTOR_TABLE, VECTOR_INDEXES};
use libsql::{Builder, Database};
use std::path::PathBuf;
use std::sync::Arc;

/// Database service for managing the libsql connection and schema
///
/// # Examples
///
/// ```no_run
/// use unionall_core::db::DatabaseService;
/// use std::path::PathBuf;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let db = DatabaseService::new(PathBuf::from("./data/unionall.db")).await?;
///     let conn = db.connect_with_timeout().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseService {
    /// libsql database handle (wrapped in Arc for sharing)
    pub db: Arc<Database>,

    /// Path to the database file
    pub db_path: PathBuf,
}

impl DatabaseService {
    /// Open (or create) the database file at `db_path` and initialize the schema
    ///
    /// Parent directories are created when missing. Schema creation uses
    /// `IF NOT EXISTS` throughout, so opening an existing database is safe.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the parent directory cannot be created, the
    /// database cannot be opened, or a DDL statement fails.
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::PermissionDenied {
                        DatabaseError::permission_denied(db_path.clone())
                    } else {
                        DatabaseError::DirectoryCreationFailed(e)
                    }
                })?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
        };

        service.initialize_schema().await?;

        tracing::info!("Database ready at {}", service.db_path.display());

        Ok(service)
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements return rows, so they go through `query()` rather
    /// than `execute()`.
    async fn execute_pragma(
        &self,
        conn: &libsql::Connection,
        pragma: &str,
    ) -> Result<(), DatabaseError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Create the tables and Vector indexes
    async fn initialize_schema(&self) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;

        conn.execute(CREATE_NODE_TABLE, ())
            .await
            .map_err(|e| {
                DatabaseError::initialization_failed(format!("Failed to create NODE table: {}", e))
            })?;

        conn.execute(CREATE_VECTOR_TABLE, ())
            .await
            .map_err(|e| {
                DatabaseError::initialization_failed(format!(
                    "Failed to create VECTOR table: {}",
                    e
                ))
            })?;

        for (name, ddl) in VECTOR_INDEXES {
            conn.execute(ddl, ()).await.map_err(|e| {
                DatabaseError::initialization_failed(format!(
                    "Failed to create index '{}': {}",
                    name, e
                ))
            })?;
        }

        Ok(())
    }

    /// Get a connection without configuring a busy timeout
    ///
    /// Only for single-threaded contexts such as test inspection; repository
    /// code uses [`connect_with_timeout`](Self::connect_with_timeout).
    pub fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        self.db.connect().map_err(DatabaseError::LibsqlError)
    }

    /// Get a connection with a 5-second busy timeout configured
    pub async fn connect_with_timeout(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.connect()?;

        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;

        Ok(conn)
    }
}
