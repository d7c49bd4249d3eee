use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::response::IntoResponse;
use serde::Deserialize;

use notesum_core::models::summary::StructuredSummary;
use notesum_export::render::render_summary;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PatientInfo {
    first_name: Option<String>,
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    patient_info: Option<PatientInfo>,
    template_name: Option<String>,
}

struct Validated {
    first_name: String,
    last_name: String,
    template_name: String,
}

impl AnswerRequest {
    fn validate(self) -> Result<Validated, ApiError> {
        let template_name = self
            .template_name
            .ok_or_else(|| ApiError::BadRequest("template_name is required".to_string()))?;
        let patient = self
            .patient_info
            .ok_or_else(|| ApiError::BadRequest("patient_info is required".to_string()))?;
        let first_name = patient.first_name.ok_or_else(|| {
            ApiError::BadRequest("patient_info.first_name is required".to_string())
        })?;
        let last_name = patient.last_name.ok_or_else(|| {
            ApiError::BadRequest("patient_info.last_name is required".to_string())
        })?;

        Ok(Validated {
            first_name,
            last_name,
            template_name,
        })
    }
}

async fn run(state: &AppState, request: AnswerRequest) -> Result<(String, StructuredSummary), ApiError> {
    let request = request.validate()?;
    let summary = state
        .pipeline
        .summarize(&request.first_name, &request.last_name, &request.template_name)
        .await?;
    Ok((request.template_name, summary))
}

/// Generate a structured patient summary from a template.
pub async fn answer(
    State(state): State<AppState>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<StructuredSummary>, ApiError> {
    let Json(request) = payload?;
    let (_, summary) = run(&state, request).await?;
    Ok(Json(summary))
}

/// Generate a summary and render it as Markdown.
pub async fn report(
    State(state): State<AppState>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let (template_name, summary) = run(&state, request).await?;

    let template = state.pipeline.registry().resolve(&template_name)?;
    let markdown = render_summary(template.renderer, &template.display_name, &summary)?;

    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        markdown,
    ))
}
