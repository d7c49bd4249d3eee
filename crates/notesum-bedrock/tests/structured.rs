//! Synthesizer, summarizer and cache behaviour against a scripted model.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use notesum_bedrock::cache::{CacheKey, CachedModel, ResponseCache};
use notesum_bedrock::error::BedrockError;
use notesum_bedrock::model::{StructuredModel, StructuredRequest, StructuredResponse};
use notesum_bedrock::summarize::Summarizer;
use notesum_bedrock::synthesize::QuerySynthesizer;
use notesum_core::models::schema::OutputSchema;
use notesum_core::models::usage::{TokenCount, TokenUsage};

/// Returns a fixed output and records every request it sees.
struct ScriptedModel {
    output: Value,
    calls: AtomicUsize,
    requests: Mutex<Vec<StructuredRequest>>,
}

impl ScriptedModel {
    fn new(output: Value) -> Self {
        Self {
            output,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StructuredModel for ScriptedModel {
    fn model_id(&self) -> &str {
        "scripted"
    }

    async fn invoke(
        &self,
        request: &StructuredRequest,
    ) -> Result<StructuredResponse, BedrockError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        Ok(StructuredResponse {
            output: self.output.clone(),
            usage: TokenUsage {
                tokens: TokenCount {
                    input: 100,
                    output: 20,
                },
                cost_usd: 0.01,
            },
        })
    }
}

/// Serves scripted outputs in order; the last one repeats.
struct SequencedModel {
    outputs: Mutex<Vec<Value>>,
    calls: AtomicUsize,
}

impl SequencedModel {
    fn new(outputs: Vec<Value>) -> Self {
        Self {
            outputs: Mutex::new(outputs),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StructuredModel for SequencedModel {
    fn model_id(&self) -> &str {
        "sequenced"
    }

    async fn invoke(&self, _: &StructuredRequest) -> Result<StructuredResponse, BedrockError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut outputs = self.outputs.lock().unwrap();
        let output = if outputs.len() > 1 {
            outputs.remove(0)
        } else {
            outputs[0].clone()
        };
        Ok(StructuredResponse {
            output,
            usage: TokenUsage::default(),
        })
    }
}

struct FailingModel;

#[async_trait]
impl StructuredModel for FailingModel {
    fn model_id(&self) -> &str {
        "failing"
    }

    async fn invoke(&self, _: &StructuredRequest) -> Result<StructuredResponse, BedrockError> {
        Err(BedrockError::Invocation("throttled".to_string()))
    }
}

fn notes_schema() -> OutputSchema {
    OutputSchema::from_value(json!({
        "title": "admin_notes",
        "description": "Administrative notes.",
        "type": "object",
        "properties": { "notes": { "type": "array", "items": { "type": "string" } } },
        "required": ["notes"]
    }))
    .unwrap()
}

#[tokio::test]
async fn synthesizer_strips_fences_and_sends_schema() {
    let model = Arc::new(ScriptedModel::new(
        json!({ "sql": "```sql\nSELECT \"DESCRIPTION\" FROM allergies\n```" }),
    ));
    let synthesizer = QuerySynthesizer::new(model.clone());

    let sql = synthesizer
        .synthesize("Retrieve all allergies", "CREATE TABLE allergies (\"DESCRIPTION\" TEXT)")
        .await
        .unwrap();

    assert_eq!(sql.as_str(), "SELECT \"DESCRIPTION\" FROM allergies");

    let requests = model.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].system.contains("CREATE TABLE allergies"));
    assert!(requests[0].user.contains("Retrieve all allergies"));
    assert_eq!(requests[0].schema.required, vec!["sql".to_string()]);
}

#[tokio::test]
async fn synthesizer_rejects_missing_or_blank_sql() {
    let missing = QuerySynthesizer::new(ScriptedModel::new(json!({ "query": "SELECT 1" })));
    assert!(matches!(
        missing.synthesize("q", "schema").await,
        Err(BedrockError::SchemaViolation(_))
    ));

    let blank = QuerySynthesizer::new(ScriptedModel::new(json!({ "sql": "  ```\n```  " })));
    assert!(matches!(
        blank.synthesize("q", "schema").await,
        Err(BedrockError::SchemaViolation(_))
    ));
}

#[tokio::test]
async fn synthesizer_propagates_model_failure() {
    let synthesizer = QuerySynthesizer::new(FailingModel);
    let err = synthesizer.synthesize("q", "schema").await.unwrap_err();
    assert!(err.to_string().contains("throttled"));
}

#[tokio::test]
async fn summarizer_returns_conforming_object() {
    let summarizer = Summarizer::new(ScriptedModel::new(json!({ "notes": ["renew insurance"] })));
    let summary = summarizer
        .summarize("Patient first name: A last name: B.", "List notes:\nrow", &notes_schema())
        .await
        .unwrap();
    assert_eq!(summary.get("notes"), Some(&json!(["renew insurance"])));
}

#[tokio::test]
async fn summarizer_rejects_missing_required_field() {
    let summarizer = Summarizer::new(ScriptedModel::new(json!({ "other": 1 })));
    let err = summarizer
        .summarize("system", "user", &notes_schema())
        .await
        .unwrap_err();
    assert!(matches!(err, BedrockError::SchemaViolation(ref m) if m.contains("notes")));
}

#[tokio::test]
async fn summarizer_rejects_non_object_payload() {
    let summarizer = Summarizer::new(ScriptedModel::new(json!(["notes"])));
    assert!(matches!(
        summarizer.summarize("system", "user", &notes_schema()).await,
        Err(BedrockError::SchemaViolation(_))
    ));
}

#[tokio::test]
async fn cache_serves_identical_requests_once() {
    let inner = Arc::new(ScriptedModel::new(json!({ "notes": [] })));
    let cache = Arc::new(ResponseCache::new());
    let model = CachedModel::new(inner.clone(), cache.clone());

    let request = StructuredRequest {
        system: "system".to_string(),
        user: "user".to_string(),
        schema: notes_schema(),
    };

    let first = model.invoke(&request).await.unwrap();
    let second = model.invoke(&request).await.unwrap();

    assert_eq!(inner.calls(), 1);
    assert_eq!(first.output, second.output);
    assert_eq!(first.usage.tokens.input, 100);
    assert_eq!(second.usage, TokenUsage::default());
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn cache_key_covers_prompts_and_schema() {
    let inner = Arc::new(ScriptedModel::new(json!({ "notes": [] })));
    let model = CachedModel::new(inner.clone(), Arc::new(ResponseCache::new()));

    let base = StructuredRequest {
        system: "system".to_string(),
        user: "user".to_string(),
        schema: notes_schema(),
    };
    let mut other_user = base.clone();
    other_user.user.push('!');
    let mut other_schema = base.clone();
    other_schema.schema.description = "Different.".to_string();

    model.invoke(&base).await.unwrap();
    model.invoke(&other_user).await.unwrap();
    model.invoke(&other_schema).await.unwrap();

    assert_eq!(inner.calls(), 3);
    assert_eq!(model.cache().len(), 3);
}

#[tokio::test]
async fn failed_calls_are_not_cached() {
    let cache = Arc::new(ResponseCache::new());
    let model = CachedModel::new(FailingModel, cache.clone());
    let request = StructuredRequest {
        system: "s".to_string(),
        user: "u".to_string(),
        schema: notes_schema(),
    };
    assert!(model.invoke(&request).await.is_err());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn nonconforming_responses_are_not_cached() {
    let inner = Arc::new(SequencedModel::new(vec![
        json!({ "wrong": 1 }),
        json!({ "notes": ["ok"] }),
    ]));
    let cache = Arc::new(ResponseCache::new());
    let summarizer = Summarizer::new(CachedModel::new(inner.clone(), cache.clone()));

    let first = summarizer.summarize("system", "user", &notes_schema()).await;
    assert!(matches!(first, Err(BedrockError::SchemaViolation(_))));
    assert!(cache.is_empty());

    let second = summarizer
        .summarize("system", "user", &notes_schema())
        .await
        .unwrap();
    assert_eq!(second.into_value(), json!({ "notes": ["ok"] }));
    assert_eq!(inner.calls(), 2);
    assert_eq!(cache.len(), 1);
}

fn request(user: &str) -> StructuredRequest {
    StructuredRequest {
        system: "system".to_string(),
        user: user.to_string(),
        schema: notes_schema(),
    }
}

#[test]
fn cache_evicts_least_recently_used() {
    let cache = ResponseCache::with_capacity(2);
    let a = CacheKey::new("m", &request("a"));
    let b = CacheKey::new("m", &request("b"));
    let c = CacheKey::new("m", &request("c"));

    cache.insert(a.clone(), json!({ "notes": ["a"] }));
    cache.insert(b.clone(), json!({ "notes": ["b"] }));
    assert!(cache.get(&a).is_some());
    cache.insert(c.clone(), json!({ "notes": ["c"] }));

    assert_eq!(cache.len(), 2);
    assert!(cache.get(&a).is_some());
    assert!(cache.get(&b).is_none());
    assert!(cache.get(&c).is_some());
}

#[test]
fn reinserting_a_key_does_not_grow_the_cache() {
    let cache = ResponseCache::with_capacity(2);
    let a = CacheKey::new("m", &request("a"));
    cache.insert(a.clone(), json!({ "notes": ["old"] }));
    cache.insert(a.clone(), json!({ "notes": ["new"] }));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&a), Some(json!({ "notes": ["new"] })));
}

#[tokio::test]
async fn evicted_requests_reach_the_model_again() {
    let inner = Arc::new(ScriptedModel::new(json!({ "notes": [] })));
    let model = CachedModel::new(inner.clone(), Arc::new(ResponseCache::with_capacity(1)));

    model.invoke(&request("first")).await.unwrap();
    model.invoke(&request("second")).await.unwrap();
    model.invoke(&request("first")).await.unwrap();

    assert_eq!(inner.calls(), 3);
    assert_eq!(model.cache().len(), 1);
    assert_eq!(model.cache().capacity(), 1);
}
