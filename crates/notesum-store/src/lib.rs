//! notesum-store
//!
//! SQLite data access: a bounded pool of read-only connections for query
//! execution and schema description, plus CSV ingestion of the source tables.

pub mod error;
pub mod ingest;
pub mod pool;
pub mod store;

pub use store::{SqliteStore, StoreConfig};
