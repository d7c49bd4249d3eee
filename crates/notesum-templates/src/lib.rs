//! notesum-templates
//!
//! Report template catalog. Pure data, no AWS or database dependency.
//! Each template binds a summary prompt, an ordered list of data-retrieval
//! prompts, an output schema and an output renderer.

pub mod error;
pub mod prompts;
pub mod schemas;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use notesum_core::models::schema::OutputSchema;

use error::TemplateError;
use prompts::{RetrievalPromptId, SummaryPromptId};
use schemas::SchemaId;

/// Every report template the service knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    PatientDemographics,
    VisitPriorities,
    CriticalChanges,
    ActiveProblemList,
    AdministrativeNotes,
    Medications,
    Symptoms,
    PhysicalExam,
    Consultation,
    Immunizations,
    Allergies,
}

impl TemplateId {
    pub const ALL: [TemplateId; 11] = [
        TemplateId::PatientDemographics,
        TemplateId::VisitPriorities,
        TemplateId::CriticalChanges,
        TemplateId::ActiveProblemList,
        TemplateId::AdministrativeNotes,
        TemplateId::Medications,
        TemplateId::Symptoms,
        TemplateId::PhysicalExam,
        TemplateId::Consultation,
        TemplateId::Immunizations,
        TemplateId::Allergies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::PatientDemographics => "patient_demographics",
            TemplateId::VisitPriorities => "visit_priorities",
            TemplateId::CriticalChanges => "critical_changes",
            TemplateId::ActiveProblemList => "active_problem_list",
            TemplateId::AdministrativeNotes => "administrative_notes",
            TemplateId::Medications => "medications",
            TemplateId::Symptoms => "symptoms",
            TemplateId::PhysicalExam => "physical_exam",
            TemplateId::Consultation => "consultation",
            TemplateId::Immunizations => "immunizations",
            TemplateId::Allergies => "allergies",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| TemplateError::NotFound(s.to_string()))
    }
}

/// How a finished summary is rendered for people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererId {
    Demographics,
    VisitPriorities,
    CriticalChanges,
    ActiveProblemList,
    AdminNotes,
    Medications,
    Generic,
}

impl RendererId {
    pub const ALL: [RendererId; 7] = [
        RendererId::Demographics,
        RendererId::VisitPriorities,
        RendererId::CriticalChanges,
        RendererId::ActiveProblemList,
        RendererId::AdminNotes,
        RendererId::Medications,
        RendererId::Generic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RendererId::Demographics => "demographics",
            RendererId::VisitPriorities => "visit_priorities",
            RendererId::CriticalChanges => "critical_changes",
            RendererId::ActiveProblemList => "active_problem_list",
            RendererId::AdminNotes => "admin_notes",
            RendererId::Medications => "medications",
            RendererId::Generic => "generic",
        }
    }
}

/// A template as declared in the catalog: references only.
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub id: TemplateId,
    pub display_name: &'static str,
    pub summary_prompt: SummaryPromptId,
    pub retrieval_prompts: &'static [RetrievalPromptId],
    pub output_schema: SchemaId,
    pub renderer: RendererId,
}

/// A retrieval prompt with its text dereferenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalPrompt {
    pub id: RetrievalPromptId,
    pub text: String,
}

/// A template with every reference dereferenced, scoped to one pipeline run.
#[derive(Debug, Clone)]
pub struct ResolvedTemplate {
    pub id: TemplateId,
    pub display_name: String,
    pub summary_prompt: String,
    pub retrieval_prompts: Vec<RetrievalPrompt>,
    pub output_schema: OutputSchema,
    pub renderer: RendererId,
}

impl Template {
    pub fn resolve(&self) -> ResolvedTemplate {
        ResolvedTemplate {
            id: self.id,
            display_name: self.display_name.to_string(),
            summary_prompt: self.summary_prompt.text().to_string(),
            retrieval_prompts: self
                .retrieval_prompts
                .iter()
                .map(|id| RetrievalPrompt {
                    id: *id,
                    text: id.text().to_string(),
                })
                .collect(),
            output_schema: self.output_schema.schema().clone(),
            renderer: self.renderer,
        }
    }
}

/// Read-only catalog of templates, built once at startup.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: Vec<Template>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateRegistry {
    /// The built-in catalog.
    pub fn builtin() -> Self {
        Self {
            templates: builtin_templates(),
        }
    }

    pub fn get(&self, id: TemplateId) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Resolve a template by its string id.
    pub fn resolve(&self, name: &str) -> Result<ResolvedTemplate, TemplateError> {
        let id: TemplateId = name.parse()?;
        self.get(id)
            .map(Template::resolve)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }

    /// Every template, in catalog order.
    pub fn list(&self) -> &[Template] {
        &self.templates
    }
}

fn builtin_templates() -> Vec<Template> {
    use RetrievalPromptId as R;

    vec![
        Template {
            id: TemplateId::PatientDemographics,
            display_name: "Patient Demographics (*)",
            summary_prompt: SummaryPromptId::Demographics,
            retrieval_prompts: &[R::Demographics, R::Conditions, R::Allergies],
            output_schema: SchemaId::Demographics,
            renderer: RendererId::Demographics,
        },
        Template {
            id: TemplateId::VisitPriorities,
            display_name: "Visit Priorities (*)",
            summary_prompt: SummaryPromptId::VisitPriorities,
            retrieval_prompts: &[R::Encounters, R::Conditions, R::Medications],
            output_schema: SchemaId::VisitPriorities,
            renderer: RendererId::VisitPriorities,
        },
        Template {
            id: TemplateId::CriticalChanges,
            display_name: "Critical Changes (*)",
            summary_prompt: SummaryPromptId::CriticalChanges,
            retrieval_prompts: &[R::Encounters, R::Conditions, R::Labs, R::Medications],
            output_schema: SchemaId::CriticalChanges,
            renderer: RendererId::CriticalChanges,
        },
        Template {
            id: TemplateId::ActiveProblemList,
            display_name: "Active Problem List (*)",
            summary_prompt: SummaryPromptId::ProblemList,
            retrieval_prompts: &[R::Conditions],
            output_schema: SchemaId::ActiveProblemList,
            renderer: RendererId::ActiveProblemList,
        },
        Template {
            id: TemplateId::AdministrativeNotes,
            display_name: "Administrative Notes (*)",
            summary_prompt: SummaryPromptId::AdminNotes,
            retrieval_prompts: &[R::Insurance],
            output_schema: SchemaId::AdminNotes,
            renderer: RendererId::AdminNotes,
        },
        Template {
            id: TemplateId::Medications,
            display_name: "Medications (*)",
            summary_prompt: SummaryPromptId::Medications,
            retrieval_prompts: &[R::Medications],
            output_schema: SchemaId::Medications,
            renderer: RendererId::Medications,
        },
        Template {
            id: TemplateId::Symptoms,
            display_name: "Symptoms",
            summary_prompt: SummaryPromptId::Symptoms,
            retrieval_prompts: &[R::Encounters],
            output_schema: SchemaId::Generic,
            renderer: RendererId::Generic,
        },
        Template {
            id: TemplateId::PhysicalExam,
            display_name: "Physical Exam",
            summary_prompt: SummaryPromptId::PhysicalExam,
            retrieval_prompts: &[R::Encounters],
            output_schema: SchemaId::Generic,
            renderer: RendererId::Generic,
        },
        Template {
            id: TemplateId::Consultation,
            display_name: "Consultation",
            summary_prompt: SummaryPromptId::Consultation,
            retrieval_prompts: &[R::Encounters],
            output_schema: SchemaId::Generic,
            renderer: RendererId::Generic,
        },
        Template {
            id: TemplateId::Immunizations,
            display_name: "Immunizations",
            summary_prompt: SummaryPromptId::Immunizations,
            retrieval_prompts: &[R::Immunizations],
            output_schema: SchemaId::Generic,
            renderer: RendererId::Generic,
        },
        Template {
            id: TemplateId::Allergies,
            display_name: "Allergies",
            summary_prompt: SummaryPromptId::Allergies,
            retrieval_prompts: &[R::Allergies],
            output_schema: SchemaId::Generic,
            renderer: RendererId::Generic,
        },
    ]
}
