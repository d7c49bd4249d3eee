pub mod patient;
pub mod result_set;
pub mod schema;
pub mod sql;
pub mod summary;
pub mod usage;
