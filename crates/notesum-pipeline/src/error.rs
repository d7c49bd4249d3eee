use serde::Serialize;
use thiserror::Error;

use notesum_templates::error::TemplateError;

/// Terminal outcomes of a failed pipeline run. None are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("{0}")]
    UnknownTemplate(#[from] TemplateError),

    #[error("invalid patient identity: {0}")]
    InvalidPatientIdentity(String),

    #[error("query synthesis failed: {0}")]
    SynthesisFailure(String),

    #[error("query execution failed: {0}")]
    QueryExecution(String),

    #[error("no records found for request: {request}")]
    NoDataFound { request: String },

    #[error("summarization failed: {0}")]
    SummarizationFailure(String),
}

/// Coarse classification used by transports to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    NoData,
    Upstream,
    Internal,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::UnknownTemplate(_) => ErrorKind::NotFound,
            PipelineError::InvalidPatientIdentity(_) => ErrorKind::InvalidInput,
            PipelineError::NoDataFound { .. } => ErrorKind::NoData,
            PipelineError::SynthesisFailure(_) | PipelineError::SummarizationFailure(_) => {
                ErrorKind::Upstream
            }
            PipelineError::QueryExecution(_) => ErrorKind::Internal,
        }
    }
}
