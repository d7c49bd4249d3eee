//! notesum-core
//!
//! Pure domain types for the note summarization pipeline.
//! No AWS SDK or database dependency. This is the shared vocabulary of the
//! notesum system.

pub mod error;
pub mod models;
