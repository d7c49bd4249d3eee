//! notesum-pipeline
//!
//! The template-driven generation pipeline: resolve a template, synthesize
//! and run one query per retrieval prompt, compose the rows into a prompt
//! and ask the summarizer for a schema-constrained result.

pub mod compose;
pub mod error;
pub mod guard;
pub mod orchestrator;
pub mod ports;
pub mod state;

pub use error::{ErrorKind, PipelineError};
pub use orchestrator::{Pipeline, StageTimeouts};
pub use state::{PipelineRun, PipelineState};
