use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};
use tracing::info;

use notesum_store::ingest;

use crate::error::ApiError;
use crate::state::AppState;

/// Load the CSV sources into the database, replacing existing tables.
pub async fn ingest_database(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let report = ingest::initialize(&state.db_path, &state.data_dir).await?;

    // Cached responses were produced against the old data.
    state.cache.clear();

    info!(
        tables = report.tables.len(),
        rows = report.total_rows(),
        "ingestion complete"
    );

    Ok(Json(json!({ "message": "Database initialized and CSV files imported." })))
}
