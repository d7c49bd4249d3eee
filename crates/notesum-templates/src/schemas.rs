//! Output schemas constraining the summarizer, one per dedicated template
//! plus a generic fallback.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use notesum_core::models::schema::OutputSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaId {
    Demographics,
    VisitPriorities,
    CriticalChanges,
    ActiveProblemList,
    AdminNotes,
    Medications,
    Generic,
}

impl SchemaId {
    pub const ALL: [SchemaId; 7] = [
        SchemaId::Demographics,
        SchemaId::VisitPriorities,
        SchemaId::CriticalChanges,
        SchemaId::ActiveProblemList,
        SchemaId::AdminNotes,
        SchemaId::Medications,
        SchemaId::Generic,
    ];

    pub fn schema(&self) -> &'static OutputSchema {
        match self {
            SchemaId::Demographics => &DEMOGRAPHICS,
            SchemaId::VisitPriorities => &VISIT_PRIORITIES,
            SchemaId::CriticalChanges => &CRITICAL_CHANGES,
            SchemaId::ActiveProblemList => &ACTIVE_PROBLEM_LIST,
            SchemaId::AdminNotes => &ADMIN_NOTES,
            SchemaId::Medications => &MEDICATIONS,
            SchemaId::Generic => &GENERIC,
        }
    }
}

fn schema(title: &str, description: &str, properties: Value, required: &[&str]) -> OutputSchema {
    let properties = match properties {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    OutputSchema {
        title: title.to_string(),
        description: description.to_string(),
        schema_type: "object".to_string(),
        properties,
        required: required.iter().map(|s| s.to_string()).collect(),
    }
}

fn string_list(description: &str) -> Value {
    json!({ "type": "array", "items": { "type": "string" }, "description": description })
}

static DEMOGRAPHICS: LazyLock<OutputSchema> = LazyLock::new(|| {
    schema(
        "demographics_summary",
        "Structured format for summarizing patient demographics.",
        json!({
            "name": { "type": "string", "description": "Patient's full name." },
            "dob": { "type": "string", "format": "date", "description": "Date of birth." },
            "race": { "type": "string", "description": "Patient's race." },
            "ethnicity": { "type": "string", "description": "Patient's ethnicity." },
            "gender": { "type": "string", "description": "Patient's gender." },
            "primary_conditions": string_list("Top 3-5 active conditions."),
            "allergies": string_list("Known allergies.")
        }),
        &["name", "dob"],
    )
});

static VISIT_PRIORITIES: LazyLock<OutputSchema> = LazyLock::new(|| {
    schema(
        "visit_priorities",
        "Structured format for identifying visit priorities with associated action items.",
        json!({
            "priorities": {
                "type": "array",
                "description": "List of visit priorities with associated action items.",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "description": "Name of the priority." },
                        "action_items": string_list("List of action items associated with the priority.")
                    },
                    "required": ["name", "action_items"]
                }
            }
        }),
        &["priorities"],
    )
});

static CRITICAL_CHANGES: LazyLock<OutputSchema> = LazyLock::new(|| {
    schema(
        "critical_changes",
        "Structured format for summarizing critical changes since the last well visit.",
        json!({
            "changes": string_list(
                "List of all critical changes (hospitalizations, new diagnoses, abnormal labs, medication changes)."
            )
        }),
        &["changes"],
    )
});

static ACTIVE_PROBLEM_LIST: LazyLock<OutputSchema> = LazyLock::new(|| {
    schema(
        "active_problem_list",
        "Structured format for listing medical conditions with detailed subsections.",
        json!({
            "problems": {
                "type": "array",
                "description": "List of problems with detailed information.",
                "items": {
                    "type": "object",
                    "properties": {
                        "condition_name": { "type": "string", "description": "Name of the medical condition." },
                        "status": { "type": "string", "description": "Clinical status of the condition, e.g. active or resolved." },
                        "recent_events": string_list("Relevant recent events such as hospitalizations, ER visits, or lab results."),
                        "risks": string_list("Specific risks associated with the condition."),
                        "coordination_notes": string_list("Notes on coordination with other providers or family."),
                        "pending_items": string_list("Pending labs, tests, or referrals."),
                        "suggested_actions": string_list("Recommended actions or to-dos for the condition.")
                    },
                    "required": ["condition_name", "status"]
                }
            }
        }),
        &["problems"],
    )
});

static ADMIN_NOTES: LazyLock<OutputSchema> = LazyLock::new(|| {
    schema(
        "admin_notes",
        "Structured format for listing administrative notes.",
        json!({
            "notes": string_list(
                "List of all administrative concerns (insurance issues, documentation needs)."
            )
        }),
        &["notes"],
    )
});

static MEDICATIONS: LazyLock<OutputSchema> = LazyLock::new(|| {
    schema(
        "medications_summary",
        "Medications prescribed to the patient. Output only information relevant to the prompt. \
         Do not output unavailable information.",
        json!({
            "medications": {
                "type": "array",
                "description": "Medications prescribed to the patient.",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "description": "Name of the medication." },
                        "dosage": { "type": "string", "description": "Dosage of the medication." },
                        "frequency": { "type": "string", "description": "Frequency of administration." },
                        "start_date": { "type": "string", "format": "date", "description": "Start date of the medication." },
                        "end_date": { "type": ["string", "null"], "format": "date", "description": "End date of the medication, if applicable." }
                    },
                    "required": ["name", "dosage", "frequency", "start_date"]
                }
            },
            "notes": { "type": "string", "description": "Additional notes about medications." }
        }),
        &["notes"],
    )
});

static GENERIC: LazyLock<OutputSchema> = LazyLock::new(|| {
    schema(
        "generic_summary",
        "Structured format for summarization. Output only information relevant to the prompt. \
         Do not output unavailable information.",
        json!({
            "title": { "type": "string", "description": "Title of the summary." },
            "abstract": { "type": "string", "description": "A brief summary of the key findings and conclusions." },
            "context": { "type": "string", "description": "Background information relevant to the summary." },
            "key_points": string_list("List of main points covered in the summary."),
            "data": {
                "type": "array",
                "description": "Structured data relevant to the summary.",
                "items": {
                    "type": "object",
                    "properties": {
                        "category": { "type": "string", "description": "Category of the data." },
                        "details": { "type": "string", "description": "Details of the data entry." },
                        "date": { "type": "string", "format": "date", "description": "Date of relevance." }
                    }
                }
            },
            "analysis": { "type": "string", "description": "Interpretation and analysis of the summarized information." },
            "recommendations": { "type": "string", "description": "Recommendations based on the summary." },
            "conclusion": { "type": "string", "description": "Final summary of findings and next steps." }
        }),
        &["title", "abstract", "context", "key_points", "conclusion"],
    )
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fields_are_declared_properties() {
        for id in SchemaId::ALL {
            let schema = id.schema();
            assert_eq!(schema.schema_type, "object");
            for field in &schema.required {
                assert!(
                    schema.properties.contains_key(field),
                    "{id:?}: required field `{field}` has no property"
                );
            }
        }
    }
}
