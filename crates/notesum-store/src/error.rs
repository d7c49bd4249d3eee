use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("statement is not read-only: {0}")]
    NotReadOnly(String),

    #[error("source file missing for table {table}: {path}")]
    MissingSource { table: String, path: PathBuf },

    #[error("CSV error in {table}: {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

const SQLITE_CANTOPEN: i32 = 14;
const SQLITE_READONLY: i32 = 8;

/// Primary SQLite result code of a driver error, if it came from SQLite.
pub(crate) fn sqlite_code(error: &sqlx::Error) -> Option<i32> {
    match error {
        sqlx::Error::Database(db) => db
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .map(|code| code & 0xff),
        _ => None,
    }
}

impl StoreError {
    /// Classify a failure from running `sql`.
    pub(crate) fn from_query(error: sqlx::Error, sql: &str, path: &std::path::Path) -> Self {
        match sqlite_code(&error) {
            Some(SQLITE_READONLY) => StoreError::NotReadOnly(sql.to_string()),
            Some(SQLITE_CANTOPEN) => StoreError::Open {
                path: path.to_path_buf(),
                reason: error.to_string(),
            },
            _ => StoreError::Database(error),
        }
    }
}
