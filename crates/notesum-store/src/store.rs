use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnection, SqlitePool, SqliteRow};
use sqlx::{Row, TypeInfo, ValueRef};
use tracing::{debug, info};

use notesum_core::models::result_set::{ResultSet, Row as ResultRow, Scalar};
use notesum_core::models::sql::SqlStatement;

use crate::error::StoreError;
use crate::pool::read_only_pool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Upper bound on concurrently open connections.
    pub pool_size: usize,
    /// Sample rows shown per table in the schema description.
    pub sample_rows: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            pool_size: 5,
            sample_rows: 3,
        }
    }
}

/// Read-only access to the patient database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
    pool: SqlitePool,
    sample_rows: usize,
}

impl SqliteStore {
    /// Build the store and its lazy pool. Nothing is opened until the first
    /// query.
    pub fn new(path: impl Into<PathBuf>, config: StoreConfig) -> Self {
        let path = path.into();
        Self {
            pool: read_only_pool(&path, config.pool_size),
            path,
            sample_rows: config.sample_rows,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run one statement and materialize every row. A valid query with no
    /// rows yields an empty result set.
    pub async fn execute(&self, sql: &SqlStatement) -> Result<ResultSet, StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StoreError::from_query(e, sql.as_str(), &self.path))?;
        let rows = execute_on(&mut conn, sql)
            .await
            .map_err(|e| self.classify(e, sql.as_str()))?;
        info!(rows = rows.len(), "query executed");
        Ok(rows)
    }

    /// Describe every user table: its CREATE statement followed by a few
    /// sample rows. Read fresh on every call.
    pub async fn describe_schema(&self) -> Result<String, StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StoreError::from_query(e, "", &self.path))?;
        let description = describe_on(&mut conn, self.sample_rows).await?;
        debug!(len = description.len(), "schema described");
        Ok(description)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn classify(&self, error: StoreError, sql: &str) -> StoreError {
        match error {
            StoreError::Database(e) => StoreError::from_query(e, sql, &self.path),
            other => other,
        }
    }
}

pub async fn execute_on(
    conn: &mut SqliteConnection,
    sql: &SqlStatement,
) -> Result<ResultSet, StoreError> {
    let rows = sqlx::query(sql.as_str()).fetch_all(&mut *conn).await?;
    rows.iter()
        .map(row_values)
        .collect::<Result<ResultSet, _>>()
        .map_err(StoreError::from)
}

fn row_values(row: &SqliteRow) -> Result<ResultRow, sqlx::Error> {
    (0..row.len()).map(|i| scalar(row, i)).collect()
}

/// Decode by the stored value's own type; SQLite columns are not uniformly
/// typed.
fn scalar(row: &SqliteRow, index: usize) -> Result<Scalar, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Scalar::Null);
    }
    let value = match raw.type_info().name() {
        "INTEGER" => Scalar::Integer(row.try_get(index)?),
        "REAL" => Scalar::Real(row.try_get(index)?),
        "BLOB" => Scalar::Blob(row.try_get(index)?),
        _ => Scalar::Text(row.try_get(index)?),
    };
    Ok(value)
}

pub async fn describe_on(
    conn: &mut SqliteConnection,
    sample_rows: usize,
) -> Result<String, StoreError> {
    let tables: Vec<(String, String)> = sqlx::query_as(
        "SELECT name, sql FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND sql IS NOT NULL \
         ORDER BY name",
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut sections = Vec::with_capacity(tables.len());
    for (name, create_sql) in tables {
        let mut section = create_sql.trim().to_string();
        if sample_rows > 0 {
            section.push_str("\n\n");
            section.push_str(&sample_block(conn, &name, sample_rows).await?);
        }
        sections.push(section);
    }
    Ok(sections.join("\n\n"))
}

async fn sample_block(
    conn: &mut SqliteConnection,
    table: &str,
    limit: usize,
) -> Result<String, StoreError> {
    let header: Vec<String> =
        sqlx::query_scalar("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
            .bind(table)
            .fetch_all(&mut *conn)
            .await?;

    let sql = format!("SELECT * FROM {} LIMIT {limit}", quote_identifier(table));
    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;

    let mut lines = vec![format!("/*\n{limit} rows from {table} table:"), header.join("\t")];
    for row in &rows {
        let values = row_values(row)?
            .iter()
            .map(Scalar::to_string)
            .collect::<Vec<_>>();
        lines.push(values.join("\t"));
    }
    lines.push("*/".to_string());
    Ok(lines.join("\n"))
}

/// Quote an SQLite identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
