//! The model seam: one schema-constrained call in, one JSON object out.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use notesum_core::models::schema::OutputSchema;
use notesum_core::models::usage::TokenUsage;

use crate::error::BedrockError;

/// A single structured-output request. System and user text travel as
/// distinct roles.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    pub system: String,
    pub user: String,
    pub schema: OutputSchema,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructuredResponse {
    /// The tool input the model produced, as JSON.
    pub output: Value,
    pub usage: TokenUsage,
}

/// A language model that can answer under an output schema.
#[async_trait]
pub trait StructuredModel: Send + Sync {
    fn model_id(&self) -> &str;

    async fn invoke(&self, request: &StructuredRequest)
    -> Result<StructuredResponse, BedrockError>;
}

#[async_trait]
impl<T: StructuredModel + ?Sized> StructuredModel for Arc<T> {
    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    async fn invoke(
        &self,
        request: &StructuredRequest,
    ) -> Result<StructuredResponse, BedrockError> {
        (**self).invoke(request).await
    }
}
