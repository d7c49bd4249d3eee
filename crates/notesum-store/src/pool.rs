//! Read-only connection pool over the patient database.
//!
//! Connections are opened lazily, on first use, so a pool can be built
//! before the database file exists. Must be called inside a Tokio runtime.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Options for a connection SQLite itself refuses to write through.
pub fn read_only_options(path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new().filename(path).read_only(true)
}

/// A pool of at most `size` read-only connections to `path`.
pub fn read_only_pool(path: &Path, size: usize) -> SqlitePool {
    let max_connections = u32::try_from(size.max(1)).unwrap_or(u32::MAX);
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_lazy_with(read_only_options(path))
}
