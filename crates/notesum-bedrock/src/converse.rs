//! Structured output via the Bedrock Converse API.
//!
//! Converse has no native JSON mode, so the output schema is offered as the
//! input schema of a single tool and the model is forced to call it. The
//! tool-use block's input is the structured response.

use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, InferenceConfiguration, Message, SpecificToolChoice,
    SystemContentBlock, Tool, ToolChoice, ToolConfiguration, ToolInputSchema, ToolSpecification,
};
use tracing::info;

use notesum_core::models::schema::OutputSchema;
use notesum_core::models::usage::{ModelPricing, TokenUsage};

use crate::document::{document_to_json, json_to_document};
use crate::error::BedrockError;
use crate::model::{StructuredModel, StructuredRequest, StructuredResponse};
use crate::tokens;

/// A Bedrock model invoked at temperature zero with a forced tool call.
#[derive(Debug, Clone)]
pub struct BedrockModel {
    client: Client,
    model_id: String,
    pricing: Option<ModelPricing>,
}

impl BedrockModel {
    pub fn new(client: Client, model_id: impl Into<String>) -> Self {
        let model_id = model_id.into();
        let pricing = tokens::get_pricing(&model_id);
        Self {
            client,
            model_id,
            pricing,
        }
    }
}

#[async_trait]
impl StructuredModel for BedrockModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn invoke(
        &self,
        request: &StructuredRequest,
    ) -> Result<StructuredResponse, BedrockError> {
        let tool_name = tool_name(&request.schema);
        let tool_config = tool_configuration(&tool_name, &request.schema)?;

        let message = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(request.user.clone()))
            .build()
            .map_err(|e| BedrockError::Invocation(e.to_string()))?;

        info!(
            model_id = %self.model_id,
            tool = %tool_name,
            user_len = request.user.len(),
            "invoking structured model"
        );

        let response = self
            .client
            .converse()
            .model_id(&self.model_id)
            .system(SystemContentBlock::Text(request.system.clone()))
            .messages(message)
            .tool_config(tool_config)
            .inference_config(InferenceConfiguration::builder().temperature(0.0).build())
            .send()
            .await
            .map_err(|e| BedrockError::Invocation(e.into_service_error().to_string()))?;

        let output_message = response
            .output()
            .and_then(|o| o.as_message().ok())
            .ok_or_else(|| BedrockError::ResponseParse("no message in response".to_string()))?;

        let tool_input = output_message
            .content()
            .iter()
            .find_map(|block| match block {
                ContentBlock::ToolUse(tool_use) if tool_use.name() == tool_name => {
                    Some(tool_use.input())
                }
                _ => None,
            })
            .ok_or_else(|| {
                BedrockError::ResponseParse(format!("model did not call tool `{tool_name}`"))
            })?;

        let usage = response
            .usage()
            .map(|u| tokens::calculate_cost(tokens::extract_token_usage(u), self.pricing.as_ref()))
            .unwrap_or_else(TokenUsage::default);

        info!(
            model_id = %self.model_id,
            input_tokens = usage.tokens.input,
            output_tokens = usage.tokens.output,
            cost_usd = usage.cost_usd,
            "structured model call complete"
        );

        Ok(StructuredResponse {
            output: document_to_json(tool_input),
            usage,
        })
    }
}

fn tool_configuration(
    tool_name: &str,
    schema: &OutputSchema,
) -> Result<ToolConfiguration, BedrockError> {
    let spec = ToolSpecification::builder()
        .name(tool_name)
        .description(&schema.description)
        .input_schema(ToolInputSchema::Json(json_to_document(&schema.to_value())))
        .build()
        .map_err(|e| BedrockError::Invocation(e.to_string()))?;

    let choice = SpecificToolChoice::builder()
        .name(tool_name)
        .build()
        .map_err(|e| BedrockError::Invocation(e.to_string()))?;

    ToolConfiguration::builder()
        .tools(Tool::ToolSpec(spec))
        .tool_choice(ToolChoice::Tool(choice))
        .build()
        .map_err(|e| BedrockError::Invocation(e.to_string()))
}

/// Tool names are limited to `[a-zA-Z0-9_-]{1,64}`.
fn tool_name(schema: &OutputSchema) -> String {
    let name: String = schema
        .title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(64)
        .collect();

    if name.is_empty() {
        "structured_output".to_string()
    } else {
        name
    }
}
