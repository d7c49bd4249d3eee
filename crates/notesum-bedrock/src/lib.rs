//! notesum-bedrock
//!
//! Schema-constrained model invocation over the Bedrock Converse API, plus
//! the two model-backed pipeline stages built on it: SQL synthesis and
//! structured summarization.

pub mod cache;
pub mod client;
pub mod converse;
pub mod document;
pub mod error;
pub mod model;
pub mod summarize;
pub mod synthesize;
pub mod tokens;
