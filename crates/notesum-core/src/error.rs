use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid patient identity: {0}")]
    InvalidIdentity(String),

    #[error("summary is not a JSON object (got {0})")]
    NotAnObject(&'static str),
}
