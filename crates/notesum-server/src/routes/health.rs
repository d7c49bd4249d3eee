use axum::Json;
use serde_json::{Value, json};

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to Note Summarizer!" }))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
