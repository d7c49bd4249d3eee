use std::path::PathBuf;
use std::sync::Arc;

use notesum_bedrock::cache::ResponseCache;
use notesum_pipeline::Pipeline;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub cache: Arc<ResponseCache>,
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
}
