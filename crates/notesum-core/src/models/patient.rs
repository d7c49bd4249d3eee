use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Placeholder that retrieval prompts use for the patient-identifying phrase.
pub const PATIENT_DETAILS_PLACEHOLDER: &str = "{patient_details}";

/// The patient a pipeline run is about.
///
/// Both names are carried verbatim into every retrieval prompt and into the
/// summarizer's system message, so they are never trimmed or re-cased once
/// accepted. Blank names are rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawIdentity")]
pub struct PatientIdentity {
    first_name: String,
    last_name: String,
}

#[derive(Deserialize)]
struct RawIdentity {
    first_name: String,
    last_name: String,
}

impl TryFrom<RawIdentity> for PatientIdentity {
    type Error = CoreError;

    fn try_from(raw: RawIdentity) -> Result<Self, Self::Error> {
        PatientIdentity::new(raw.first_name, raw.last_name)
    }
}

impl PatientIdentity {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let first_name = first_name.into();
        let last_name = last_name.into();

        if first_name.trim().is_empty() {
            return Err(CoreError::InvalidIdentity(
                "first_name must not be blank".to_string(),
            ));
        }
        if last_name.trim().is_empty() {
            return Err(CoreError::InvalidIdentity(
                "last_name must not be blank".to_string(),
            ));
        }

        Ok(Self {
            first_name,
            last_name,
        })
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Patient-identifying phrase substituted into retrieval prompts,
    /// e.g. `first name: 'Lupe126' last name: 'Rippin620'`.
    pub fn details(&self) -> String {
        format!(
            "first name: '{}' last name: '{}'",
            self.first_name, self.last_name
        )
    }

    /// System message that pins the summarizer to this patient.
    pub fn system_prompt(&self) -> String {
        format!(
            "Patient first name: {} last name: {}.",
            self.first_name, self.last_name
        )
    }

    /// Substitute [`PATIENT_DETAILS_PLACEHOLDER`] in a retrieval prompt.
    ///
    /// Prompts without the placeholder get the phrase appended so the
    /// identity still reaches the synthesizer.
    pub fn apply_to(&self, prompt: &str) -> String {
        if prompt.contains(PATIENT_DETAILS_PLACEHOLDER) {
            prompt.replace(PATIENT_DETAILS_PLACEHOLDER, &self.details())
        } else {
            format!("{prompt} Patient: {}.", self.details())
        }
    }
}
