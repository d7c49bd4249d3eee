use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct TemplateSummary {
    id: String,
    name: String,
}

pub async fn list_templates(State(state): State<AppState>) -> Json<Vec<TemplateSummary>> {
    let templates: Vec<TemplateSummary> = state
        .pipeline
        .registry()
        .list()
        .iter()
        .map(|t| TemplateSummary {
            id: t.id.to_string(),
            name: t.display_name.to_string(),
        })
        .collect();
    Json(templates)
}
