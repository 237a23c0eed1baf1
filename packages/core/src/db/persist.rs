//! Shared read and write paths for the repositories
//!
//! Node and Vector repositories differ only in their table and row layout,
//! described by [`Persistable`]. Everything that touches SQL for a record
//! (single lookups, exact-set lookups, single writes, atomic batch inserts)
//! lives here so both repositories apply the same active-status and
//! edit-state rules.

use libsql::params::Params;
use libsql::{Connection, Row, Value};

use crate::db::edit_state::{plan_write, PendingWrite, WriteKind, WriteStatement};
use crate::db::error::{DatabaseError, RepositoryError};
use crate::db::query::ActiveQuery;
use crate::db::schema::TableDef;
use crate::db::DatabaseService;
use crate::models::EditTracked;

/// A record type stored in one table
pub(crate) trait Persistable: EditTracked + Sized + Send {
    fn table() -> &'static TableDef;

    /// Values for `table().columns`, in order
    fn column_values(&self) -> Vec<Value>;

    /// Build a record from a row selected with `table().projection()`
    fn from_row(row: &Row) -> anyhow::Result<Self>;

    fn assign_key(&mut self, key: i64);
}

/// Run a SELECT built from `query` and map every row
pub(crate) async fn fetch_all<T: Persistable>(
    db: &DatabaseService,
    query: ActiveQuery,
) -> Result<Vec<T>, RepositoryError> {
    fetch_mapped(db, T::table().name, query.select(), T::from_row).await
}

/// Run an already built SELECT and map every row with `map`
pub(crate) async fn fetch_mapped<R>(
    db: &DatabaseService,
    table: &'static str,
    (sql, params): (String, Params),
    map: fn(&Row) -> anyhow::Result<R>,
) -> Result<Vec<R>, RepositoryError> {
    tracing::debug!("{}", sql);

    let conn = db.connect_with_timeout().await?;

    let mut stmt = conn.prepare(&sql).await.map_err(|e| {
        DatabaseError::sql_execution(format!("Failed to prepare {} query: {}", table, e))
    })?;

    let mut rows = stmt.query(params).await.map_err(|e| {
        DatabaseError::sql_execution(format!("Failed to execute {} query: {}", table, e))
    })?;

    let mut records = Vec::new();
    while let Some(row) = rows
        .next()
        .await
        .map_err(|e| DatabaseError::sql_execution(e.to_string()))?
    {
        let record = map(&row).map_err(|e| RepositoryError::row_mapping(table, e))?;
        records.push(record);
    }

    Ok(records)
}

/// Run a COUNT(*) built from `query`
pub(crate) async fn fetch_count(
    db: &DatabaseService,
    query: ActiveQuery,
) -> Result<i64, RepositoryError> {
    let (sql, params) = query.count();
    let conn = db.connect_with_timeout().await?;

    let mut stmt = conn.prepare(&sql).await.map_err(|e| {
        DatabaseError::sql_execution(format!("Failed to prepare count query: {}", e))
    })?;
    let mut rows = stmt.query(params).await.map_err(|e| {
        DatabaseError::sql_execution(format!("Failed to execute count query: {}", e))
    })?;

    let count = match rows
        .next()
        .await
        .map_err(|e| DatabaseError::sql_execution(e.to_string()))?
    {
        Some(row) => row.get::<i64>(0)?,
        None => 0,
    };

    Ok(count)
}

/// Fetch at most one active record matching `query`
///
/// Two or more matches means a key that should be unique is not, which is
/// reported as an invariant violation rather than resolved by picking one.
pub(crate) async fn fetch_single<T: Persistable>(
    db: &DatabaseService,
    id: i64,
    query: ActiveQuery,
) -> Result<Option<T>, RepositoryError> {
    let mut records: Vec<T> = fetch_all(db, query.limit(2)).await?;

    match records.len() {
        0 => Ok(None),
        1 => Ok(records.pop()),
        count => {
            tracing::error!(
                "{} active {} rows share id {}",
                count,
                T::table().name,
                id
            );
            Err(RepositoryError::InvariantViolation {
                table: T::table().name,
                id,
                count,
            })
        }
    }
}

/// Fetch the active records with the given ids, ordered by id
///
/// Returns `None` unless one record was found per requested id; a repeated
/// id can match only one row, so a request containing duplicates is `None`.
pub(crate) async fn fetch_exact_set<T: Persistable>(
    db: &DatabaseService,
    ids: &[i64],
    scope: impl FnOnce(ActiveQuery) -> ActiveQuery,
) -> Result<Option<Vec<T>>, RepositoryError> {
    let table = T::table();

    let query = scope(ActiveQuery::on(table))
        .where_in(table.key, ids)
        .order_by(&format!("{} ASC", table.key));

    let records: Vec<T> = fetch_all(db, query).await?;

    if records.len() == ids.len() {
        Ok(Some(records))
    } else {
        tracing::debug!(
            "{} set lookup found {} rows for {} ids",
            table.name,
            records.len(),
            ids.len()
        );
        Ok(None)
    }
}

/// Execute one planned write on `conn`; returns the number of affected rows
async fn execute_write<T: Persistable>(
    conn: &Connection,
    record: &mut T,
    pending: &PendingWrite,
) -> Result<u64, RepositoryError> {
    let table = T::table();
    let mut values = record.column_values();
    values.push(Value::Text(pending.last_modified_text()));

    let affected = match pending.statement {
        WriteStatement::Insert => {
            let affected = conn
                .execute(&table.insert_sql(), Params::Positional(values))
                .await
                .map_err(|e| {
                    DatabaseError::sql_execution(format!("Failed to insert {}: {}", table.name, e))
                })?;
            if affected > 0 {
                record.assign_key(conn.last_insert_rowid());
            }
            affected
        }
        WriteStatement::Update => {
            values.push(Value::Integer(record.key()));
            conn.execute(&table.update_sql(), Params::Positional(values))
                .await
                .map_err(|e| {
                    DatabaseError::sql_execution(format!(
                        "Failed to update {} {}: {}",
                        table.name,
                        record.key(),
                        e
                    ))
                })?
        }
    };

    Ok(affected)
}

/// Persist one record as `kind`
///
/// `Ok(None)` means the store reported zero affected rows: the record no
/// longer exists as an active row, or the store refused the write silently.
pub(crate) async fn write_one<T: Persistable>(
    db: &DatabaseService,
    mut record: T,
    kind: WriteKind,
) -> Result<Option<T>, RepositoryError> {
    let pending = plan_write(T::table().name, &record, kind)?;
    let conn = db.connect_with_timeout().await?;

    let affected = execute_write(&conn, &mut record, &pending).await?;

    if affected == 0 {
        tracing::warn!(
            "{:?} of {} {} affected no rows",
            kind,
            T::table().name,
            record.key()
        );
        return Ok(None);
    }

    Ok(Some(record))
}

/// Insert every record inside one transaction
///
/// The batch commits only when the affected row count equals the number of
/// records; otherwise it is rolled back and `Ok(None)` is returned. A store
/// error also rolls back and is returned as `Err`.
pub(crate) async fn insert_batch<T: Persistable>(
    db: &DatabaseService,
    mut records: Vec<T>,
) -> Result<Option<Vec<T>>, RepositoryError> {
    let table = T::table();

    let planned = records
        .iter()
        .map(|r| plan_write(table.name, r, WriteKind::Insert))
        .collect::<Result<Vec<_>, _>>()?;

    if records.is_empty() {
        return Ok(Some(records));
    }

    let conn = db.connect_with_timeout().await?;

    conn.execute("BEGIN TRANSACTION", ()).await.map_err(|e| {
        DatabaseError::sql_execution(format!("Failed to begin transaction: {}", e))
    })?;

    let mut affected = 0u64;
    for (record, pending) in records.iter_mut().zip(planned.iter()) {
        match execute_write(&conn, record, pending).await {
            Ok(count) => affected += count,
            Err(e) => {
                let _rollback = conn.execute("ROLLBACK", ()).await;
                return Err(e);
            }
        }
    }

    if affected != records.len() as u64 {
        let _rollback = conn.execute("ROLLBACK", ()).await;
        tracing::error!(
            "{} batch insert affected {} of {} rows; rolled back",
            table.name,
            affected,
            records.len()
        );
        return Ok(None);
    }

    if let Err(e) = conn.execute("COMMIT", ()).await {
        let _rollback = conn.execute("ROLLBACK", ()).await;
        return Err(DatabaseError::sql_execution(format!("Failed to commit transaction: {}", e)).into());
    }

    Ok(Some(records))
}
