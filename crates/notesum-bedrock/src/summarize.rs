//! Schema-constrained summarization of composed prompts.

use serde_json::Value;
use tracing::info;

use notesum_core::models::schema::OutputSchema;
use notesum_core::models::summary::StructuredSummary;

use crate::error::BedrockError;
use crate::model::{StructuredModel, StructuredRequest};

#[derive(Debug)]
pub struct Summarizer<M> {
    model: M,
}

impl<M: StructuredModel> Summarizer<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// One model call constrained to `schema`. The payload must be a JSON
    /// object carrying every required top-level field.
    pub async fn summarize(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: &OutputSchema,
    ) -> Result<StructuredSummary, BedrockError> {
        let call = StructuredRequest {
            system: system_prompt.to_string(),
            user: user_prompt.to_string(),
            schema: schema.clone(),
        };

        let response = self.model.invoke(&call).await?;

        schema
            .validate(&response.output)
            .map_err(|e| BedrockError::SchemaViolation(e.to_string()))?;

        info!(
            model_id = %self.model.model_id(),
            schema = %schema.title,
            fields = response.output.as_object().map(|o| o.len()).unwrap_or(0),
            cost_usd = response.usage.cost_usd,
            "summary generated"
        );

        into_summary(response.output)
    }
}

fn into_summary(output: Value) -> Result<StructuredSummary, BedrockError> {
    StructuredSummary::try_from(output).map_err(|e| BedrockError::ResponseParse(e.to_string()))
}
