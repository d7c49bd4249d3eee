use notesum_core::models::usage::{ModelPricing, TokenCount, TokenUsage};

/// Extract token counts from a Bedrock Converse response.
pub fn extract_token_usage(usage: &aws_sdk_bedrockruntime::types::TokenUsage) -> TokenCount {
    TokenCount {
        input: usage.input_tokens.max(0) as u64,
        output: usage.output_tokens.max(0) as u64,
    }
}

/// Price a token count, or report it at zero cost when the model is unpriced.
pub fn calculate_cost(tokens: TokenCount, pricing: Option<&ModelPricing>) -> TokenUsage {
    match pricing {
        Some(p) => p.usage(tokens),
        None => TokenUsage {
            tokens,
            cost_usd: 0.0,
        },
    }
}

/// Known model pricing (per million tokens).
/// These are approximate and should be updated as pricing changes.
pub fn get_pricing(model_id: &str) -> Option<ModelPricing> {
    match model_id {
        // Claude 4 Opus
        id if id.contains("claude-opus-4") => Some(ModelPricing {
            input_per_million: 15.0,
            output_per_million: 75.0,
        }),
        // Claude 4 Sonnet
        id if id.contains("claude-sonnet-4") => Some(ModelPricing {
            input_per_million: 3.0,
            output_per_million: 15.0,
        }),
        // Claude 3.5 Haiku
        id if id.contains("claude-haiku") => Some(ModelPricing {
            input_per_million: 0.80,
            output_per_million: 4.0,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sonnet_inference_profile_is_priced() {
        let pricing = get_pricing("us.anthropic.claude-sonnet-4-20250514-v1:0").unwrap();
        assert_eq!(pricing.input_per_million, 3.0);
    }

    #[test]
    fn unknown_model_costs_nothing() {
        let tokens = TokenCount {
            input: 1000,
            output: 1000,
        };
        let usage = calculate_cost(tokens, get_pricing("mistral.large").as_ref());
        assert_eq!(usage.tokens, tokens);
        assert_eq!(usage.cost_usd, 0.0);
    }
}
