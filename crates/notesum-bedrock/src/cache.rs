//! Process-scoped response cache for structured model calls.
//!
//! Keys cover everything that shapes a response: model id, both prompts and
//! the full output schema. Hits are reported with zero token usage. Only
//! responses that satisfy their schema are stored, and the least recently
//! used entry is evicted once the cache is full.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use notesum_core::models::usage::TokenUsage;

use crate::error::BedrockError;
use crate::model::{StructuredModel, StructuredRequest, StructuredResponse};

/// Entries kept when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    model_id: String,
    system: String,
    user: String,
    schema: String,
}

impl CacheKey {
    pub fn new(model_id: &str, request: &StructuredRequest) -> Self {
        Self {
            model_id: model_id.to_string(),
            system: request.system.clone(),
            user: request.user.clone(),
            schema: request.schema.canonical(),
        }
    }
}

#[derive(Debug, Default)]
struct Entries {
    values: HashMap<CacheKey, Value>,
    /// Least recently used at the front.
    order: VecDeque<CacheKey>,
}

impl Entries {
    fn touch(&mut self, key: &CacheKey) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(key) = self.order.remove(pos) {
                self.order.push_back(key);
            }
        }
    }
}

#[derive(Debug)]
pub struct ResponseCache {
    capacity: usize,
    entries: Mutex<Entries>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache holding at most `capacity` responses (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(Entries::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // A poisoned lock only means another thread panicked mid-insert; the
    // map itself is still usable.
    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        let mut entries = self.lock();
        let value = entries.values.get(key).cloned()?;
        entries.touch(key);
        Some(value)
    }

    pub fn insert(&self, key: CacheKey, value: Value) {
        let mut entries = self.lock();
        if entries.values.insert(key.clone(), value).is_some() {
            entries.touch(&key);
            return;
        }
        entries.order.push_back(key);
        while entries.values.len() > self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.values.remove(&oldest);
            debug!(capacity = self.capacity, "evicted least recently used response");
        }
    }

    pub fn len(&self) -> usize {
        self.lock().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().values.is_empty()
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.values.clear();
        entries.order.clear();
    }
}

/// Decorates a [`StructuredModel`] with a shared [`ResponseCache`].
#[derive(Debug)]
pub struct CachedModel<M> {
    inner: M,
    cache: Arc<ResponseCache>,
}

impl<M: StructuredModel> CachedModel<M> {
    pub fn new(inner: M, cache: Arc<ResponseCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }
}

#[async_trait]
impl<M: StructuredModel> StructuredModel for CachedModel<M> {
    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    async fn invoke(
        &self,
        request: &StructuredRequest,
    ) -> Result<StructuredResponse, BedrockError> {
        let key = CacheKey::new(self.inner.model_id(), request);

        if let Some(output) = self.cache.get(&key) {
            debug!(model_id = %self.inner.model_id(), "structured response cache hit");
            return Ok(StructuredResponse {
                output,
                usage: TokenUsage::default(),
            });
        }

        let response = self.inner.invoke(request).await?;
        match request.schema.validate(&response.output) {
            Ok(()) => self.cache.insert(key, response.output.clone()),
            Err(violation) => {
                debug!(model_id = %self.inner.model_id(), %violation, "response not cached")
            }
        }
        Ok(response)
    }
}
