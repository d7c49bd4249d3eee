//! Pipeline orchestrator.
//!
//! Sequences one run: resolve → retrieve (synthesize, guard, execute per
//! retrieval prompt) → compose → summarize. Every stage failure ends the
//! run with a distinct [`PipelineError`]; nothing is retried.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use notesum_core::models::patient::PatientIdentity;
use notesum_core::models::result_set::ResultSet;
use notesum_core::models::summary::StructuredSummary;
use notesum_store::error::StoreError;
use notesum_templates::{ResolvedTemplate, TemplateRegistry};

use crate::compose::compose;
use crate::error::PipelineError;
use crate::guard::ensure_read_only;
use crate::ports::{QueryExecutor, SqlSynthesizer, SummaryModel};
use crate::state::{PipelineRun, PipelineState};

/// Optional per-call limits. A call that exceeds its limit fails with the
/// error of the stage it belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTimeouts {
    pub synthesis: Option<Duration>,
    pub execution: Option<Duration>,
    pub summarization: Option<Duration>,
}

impl StageTimeouts {
    /// The same limit for every external call.
    pub fn uniform(limit: Duration) -> Self {
        Self {
            synthesis: Some(limit),
            execution: Some(limit),
            summarization: Some(limit),
        }
    }
}

#[derive(Clone)]
pub struct Pipeline {
    registry: Arc<TemplateRegistry>,
    synthesizer: Arc<dyn SqlSynthesizer>,
    executor: Arc<dyn QueryExecutor>,
    summarizer: Arc<dyn SummaryModel>,
    timeouts: StageTimeouts,
}

impl Pipeline {
    pub fn new(
        registry: Arc<TemplateRegistry>,
        synthesizer: Arc<dyn SqlSynthesizer>,
        executor: Arc<dyn QueryExecutor>,
        summarizer: Arc<dyn SummaryModel>,
    ) -> Self {
        Self {
            registry,
            synthesizer,
            executor,
            summarizer,
            timeouts: StageTimeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: StageTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Run the pipeline and return only its outcome.
    pub async fn summarize(
        &self,
        first_name: &str,
        last_name: &str,
        template_name: &str,
    ) -> Result<StructuredSummary, PipelineError> {
        self.run(first_name, last_name, template_name)
            .await
            .into_result()
    }

    /// Run the pipeline and return the full run record, including the
    /// states it passed through.
    pub async fn run(&self, first_name: &str, last_name: &str, template_name: &str) -> PipelineRun {
        let mut run = PipelineRun::start();

        match self
            .drive(&mut run, first_name, last_name, template_name)
            .await
        {
            Ok(summary) => {
                run.summary = Some(summary);
                run.enter(PipelineState::Done);
                info!(run_id = %run.run_id, template = template_name, "pipeline run complete");
            }
            Err(error) => {
                match &error {
                    PipelineError::NoDataFound { .. } => {
                        info!(run_id = %run.run_id, template = template_name, %error, "pipeline found no data")
                    }
                    _ => {
                        warn!(run_id = %run.run_id, template = template_name, %error, "pipeline run failed")
                    }
                }
                run.fail(error);
            }
        }

        run
    }

    async fn drive(
        &self,
        run: &mut PipelineRun,
        first_name: &str,
        last_name: &str,
        template_name: &str,
    ) -> Result<StructuredSummary, PipelineError> {
        // Resolving: nothing external is touched until both checks pass.
        let template = self.registry.resolve(template_name)?;
        run.template = Some(template.id);
        let identity = PatientIdentity::new(first_name, last_name)
            .map_err(|e| PipelineError::InvalidPatientIdentity(e.to_string()))?;

        let rows = self.retrieve(run, &template, &identity).await?;

        run.enter(PipelineState::Composing);
        let user_prompt = compose(&template.summary_prompt, &rows);

        run.enter(PipelineState::Summarizing);
        let system_prompt = identity.system_prompt();
        let summary = with_timeout(
            self.timeouts.summarization,
            self.summarizer
                .summarize(&system_prompt, &user_prompt, &template.output_schema),
        )
        .await
        .map_err(|_| PipelineError::SummarizationFailure("summarization timed out".to_string()))?
        .map_err(|e| PipelineError::SummarizationFailure(e.to_string()))?;

        template
            .output_schema
            .validate(&summary.to_value())
            .map_err(|e| PipelineError::SummarizationFailure(e.to_string()))?;

        Ok(summary)
    }

    async fn retrieve(
        &self,
        run: &mut PipelineRun,
        template: &ResolvedTemplate,
        identity: &PatientIdentity,
    ) -> Result<ResultSet, PipelineError> {
        let total = template.retrieval_prompts.len();
        let mut rows = ResultSet::default();

        for (i, prompt) in template.retrieval_prompts.iter().enumerate() {
            run.enter(PipelineState::Retrieving {
                step: i + 1,
                of: total,
            });
            let request = identity.apply_to(&prompt.text);

            let schema_description = with_timeout(
                self.timeouts.execution,
                self.executor.describe_schema(),
            )
            .await
            .map_err(|_| PipelineError::QueryExecution("schema description timed out".to_string()))?
            .map_err(|e| PipelineError::QueryExecution(e.to_string()))?;

            let sql = with_timeout(
                self.timeouts.synthesis,
                self.synthesizer.synthesize(&request, &schema_description),
            )
            .await
            .map_err(|_| PipelineError::SynthesisFailure("synthesis timed out".to_string()))?
            .map_err(|e| PipelineError::SynthesisFailure(e.to_string()))?;

            let sql = ensure_read_only(&sql)
                .map_err(|e| PipelineError::SynthesisFailure(format!("{e}: {sql}")))?;

            let fetched = with_timeout(self.timeouts.execution, self.executor.execute(&sql))
                .await
                .map_err(|_| PipelineError::QueryExecution("query timed out".to_string()))?
                .map_err(|e| match e {
                    // A write the guard let through is still the synthesizer's fault.
                    StoreError::NotReadOnly(_) => PipelineError::SynthesisFailure(e.to_string()),
                    other => PipelineError::QueryExecution(other.to_string()),
                })?;

            info!(
                run_id = %run.run_id,
                stage = "retrieving",
                step = i + 1,
                of = total,
                rows = fetched.len(),
                "retrieval prompt executed"
            );

            if fetched.is_empty() {
                return Err(PipelineError::NoDataFound { request });
            }
            rows.extend(fetched);
        }

        Ok(rows)
    }
}

/// `Err(())` when the limit elapsed first.
async fn with_timeout<F: Future>(limit: Option<Duration>, fut: F) -> Result<F::Output, ()> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| ()),
        None => Ok(fut.await),
    }
}
