//! Natural-language to SQL translation.

use std::sync::LazyLock;

use serde_json::{Map, Value, json};
use tracing::info;

use notesum_core::models::schema::OutputSchema;
use notesum_core::models::sql::SqlStatement;

use crate::error::BedrockError;
use crate::model::{StructuredModel, StructuredRequest};

const SQL_SYSTEM_PROMPT: &str = "\
You are a SQLite expert. Given an input question, create a syntactically correct SQLite query to run.
The database schema consists of multiple tables, each containing different columns.
Never query for all columns from a table. You must query only the columns that are needed to answer the question.
For each question, assume you know NOTHING except the schema provided.
Use only the information explicitly provided in the input question and schema. Do not make any assumptions.
Treat every input value exactly as provided. All comparisons use strict equality, never partial matches or similarity.
Do not make any assumptions about misspellings, typos, or variations in input values.
Do not interpret or infer relationships between input values unless explicitly defined in the schema or question.
Wrap each column name in double quotes (\") to denote them as delimited identifiers.
Pay attention to use only the column names you can see in the tables provided. Be careful to not query for columns that do not exist. Also, pay attention to which column is in which table.
Pay attention to use date('now') function to get the current date, if the question involves \"today\".
Return only a single read-only SQL statement. Do not include any explanations, formatting, or additional text.";

static SQL_OUTPUT_SCHEMA: LazyLock<OutputSchema> = LazyLock::new(|| {
    let properties = match json!({
        "sql": {
            "type": "string",
            "description": "A single syntactically correct SQLite SELECT statement."
        }
    }) {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    OutputSchema {
        title: "sql_query".to_string(),
        description: "Return the SQLite query that answers the question.".to_string(),
        schema_type: "object".to_string(),
        properties,
        required: vec!["sql".to_string()],
    }
});

/// The schema the synthesizer constrains its model call to.
pub fn sql_output_schema() -> &'static OutputSchema {
    &SQL_OUTPUT_SCHEMA
}

/// Build the system prompt for one synthesis call around the live schema.
pub fn system_prompt(schema_description: &str) -> String {
    format!("{SQL_SYSTEM_PROMPT}\n\nOnly use the following tables:\n{schema_description}")
}

/// Turns a natural-language data request into one SQL statement.
#[derive(Debug)]
pub struct QuerySynthesizer<M> {
    model: M,
}

impl<M: StructuredModel> QuerySynthesizer<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub async fn synthesize(
        &self,
        request: &str,
        schema_description: &str,
    ) -> Result<SqlStatement, BedrockError> {
        let call = StructuredRequest {
            system: system_prompt(schema_description),
            user: format!("Question: {request}"),
            schema: sql_output_schema().clone(),
        };

        let response = self.model.invoke(&call).await?;

        let sql = response
            .output
            .get("sql")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                BedrockError::SchemaViolation("response lacks a `sql` string".to_string())
            })?;

        let statement = SqlStatement::new(strip_code_fences(sql));
        if statement.is_empty() {
            return Err(BedrockError::SchemaViolation(
                "response `sql` is empty".to_string(),
            ));
        }

        info!(
            model_id = %self.model.model_id(),
            sql = %statement,
            input_tokens = response.usage.tokens.input,
            output_tokens = response.usage.tokens.output,
            "synthesized query"
        );

        Ok(statement)
    }
}

/// Strip a surrounding Markdown code fence, including an optional language tag.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if !(trimmed.len() >= 6 && trimmed.starts_with("```") && trimmed.ends_with("```")) {
        return trimmed;
    }

    let mut inner = &trimmed[3..trimmed.len() - 3];
    if let Some(newline) = inner.find('\n') {
        let first_line = inner[..newline].trim();
        if !first_line.contains(' ') {
            inner = &inner[newline + 1..];
        }
    }
    inner.trim()
}
