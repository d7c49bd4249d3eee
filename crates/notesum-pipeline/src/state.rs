use jiff::Timestamp;
use serde::Serialize;
use uuid::Uuid;

use notesum_core::models::summary::StructuredSummary;
use notesum_templates::TemplateId;

use crate::error::PipelineError;

/// Where a pipeline run is. `Errored` is reachable from every other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    Resolving,
    /// Working on retrieval prompt `step` of `of`, counted from one.
    Retrieving { step: usize, of: usize },
    Composing,
    Summarizing,
    Done,
    Errored,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Errored)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    pub state: PipelineState,
    pub at: Timestamp,
}

/// The record of one pipeline run for one (patient, template) pair.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub template: Option<TemplateId>,
    pub history: Vec<Transition>,
    pub summary: Option<StructuredSummary>,
    #[serde(skip)]
    pub error: Option<PipelineError>,
}

impl PipelineRun {
    pub(crate) fn start() -> Self {
        let mut run = Self {
            run_id: Uuid::new_v4(),
            template: None,
            history: Vec::new(),
            summary: None,
            error: None,
        };
        run.enter(PipelineState::Resolving);
        run
    }

    pub(crate) fn enter(&mut self, state: PipelineState) {
        self.history.push(Transition {
            state,
            at: Timestamp::now(),
        });
    }

    pub(crate) fn fail(&mut self, error: PipelineError) {
        self.enter(PipelineState::Errored);
        self.error = Some(error);
    }

    pub fn state(&self) -> PipelineState {
        self.history
            .last()
            .map(|t| t.state)
            .unwrap_or(PipelineState::Resolving)
    }

    /// The states visited, in order.
    pub fn states(&self) -> Vec<PipelineState> {
        self.history.iter().map(|t| t.state).collect()
    }

    pub fn into_result(self) -> Result<StructuredSummary, PipelineError> {
        match (self.summary, self.error) {
            (_, Some(error)) => Err(error),
            (Some(summary), None) => Ok(summary),
            (None, None) => Err(PipelineError::SummarizationFailure(
                "run ended without a summary".to_string(),
            )),
        }
    }
}
