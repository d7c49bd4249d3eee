//! The collaborators the orchestrator drives, and their production adapters.

use async_trait::async_trait;

use notesum_bedrock::error::BedrockError;
use notesum_bedrock::model::StructuredModel;
use notesum_bedrock::summarize::Summarizer;
use notesum_bedrock::synthesize::QuerySynthesizer;
use notesum_core::models::result_set::ResultSet;
use notesum_core::models::schema::OutputSchema;
use notesum_core::models::sql::SqlStatement;
use notesum_core::models::summary::StructuredSummary;
use notesum_store::SqliteStore;
use notesum_store::error::StoreError;

/// Natural-language request plus schema description in, SQL out.
#[async_trait]
pub trait SqlSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        request: &str,
        schema_description: &str,
    ) -> Result<SqlStatement, BedrockError>;
}

/// Read access to the relational store.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn describe_schema(&self) -> Result<String, StoreError>;

    async fn execute(&self, sql: &SqlStatement) -> Result<ResultSet, StoreError>;
}

/// One schema-constrained summarization call.
#[async_trait]
pub trait SummaryModel: Send + Sync {
    async fn summarize(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: &OutputSchema,
    ) -> Result<StructuredSummary, BedrockError>;
}

#[async_trait]
impl<M: StructuredModel> SqlSynthesizer for QuerySynthesizer<M> {
    async fn synthesize(
        &self,
        request: &str,
        schema_description: &str,
    ) -> Result<SqlStatement, BedrockError> {
        QuerySynthesizer::synthesize(self, request, schema_description).await
    }
}

#[async_trait]
impl QueryExecutor for SqliteStore {
    async fn describe_schema(&self) -> Result<String, StoreError> {
        SqliteStore::describe_schema(self).await
    }

    async fn execute(&self, sql: &SqlStatement) -> Result<ResultSet, StoreError> {
        SqliteStore::execute(self, sql).await
    }
}

#[async_trait]
impl<M: StructuredModel> SummaryModel for Summarizer<M> {
    async fn summarize(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: &OutputSchema,
    ) -> Result<StructuredSummary, BedrockError> {
        Summarizer::summarize(self, system_prompt, user_prompt, schema).await
    }
}
