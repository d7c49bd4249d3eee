//! Prompt library: data-retrieval prompts fed to the query synthesizer and
//! summary prompts fed to the summarizer.
//!
//! Retrieval prompts carry the `{patient_details}` placeholder, which the
//! pipeline replaces with the patient-identifying phrase.

use serde::{Deserialize, Serialize};

/// A natural-language data request, turned into SQL per patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalPromptId {
    Demographics,
    Conditions,
    Allergies,
    Encounters,
    Medications,
    Labs,
    Imaging,
    Insurance,
    Hospitalizations,
    Polypharmacy,
    Immunizations,
}

impl RetrievalPromptId {
    pub const ALL: [RetrievalPromptId; 11] = [
        RetrievalPromptId::Demographics,
        RetrievalPromptId::Conditions,
        RetrievalPromptId::Allergies,
        RetrievalPromptId::Encounters,
        RetrievalPromptId::Medications,
        RetrievalPromptId::Labs,
        RetrievalPromptId::Imaging,
        RetrievalPromptId::Insurance,
        RetrievalPromptId::Hospitalizations,
        RetrievalPromptId::Polypharmacy,
        RetrievalPromptId::Immunizations,
    ];

    pub fn text(&self) -> &'static str {
        match self {
            RetrievalPromptId::Demographics => {
                "Retrieve all available demographic information for the patient {patient_details}."
            }
            RetrievalPromptId::Conditions => {
                "Retrieve all medical conditions (active and inactive) for the patient {patient_details}."
            }
            RetrievalPromptId::Allergies => {
                "Retrieve all recorded allergies and adverse reactions for the patient {patient_details}."
            }
            RetrievalPromptId::Encounters => {
                "Retrieve all hospital or facility visits associated with the patient {patient_details}, including facility details."
            }
            RetrievalPromptId::Medications => {
                "Retrieve all medications associated with the patient {patient_details}."
            }
            RetrievalPromptId::Labs => {
                "Retrieve all available lab results for the patient {patient_details}."
            }
            RetrievalPromptId::Imaging => {
                "Retrieve all imaging studies performed for the patient {patient_details}."
            }
            RetrievalPromptId::Insurance => {
                "Retrieve all insurance and payer information associated with the patient {patient_details}."
            }
            RetrievalPromptId::Hospitalizations => {
                "Retrieve all hospital visits for the patient {patient_details}."
            }
            RetrievalPromptId::Polypharmacy => {
                "Retrieve the total count of medications currently prescribed to the patient {patient_details}."
            }
            RetrievalPromptId::Immunizations => {
                "Retrieve ALL immunizations for the patient {patient_details}."
            }
        }
    }
}

/// The instruction placed ahead of the retrieved rows in the user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryPromptId {
    Demographics,
    VisitPriorities,
    CriticalChanges,
    ProblemList,
    AdminNotes,
    Medications,
    Symptoms,
    PhysicalExam,
    Consultation,
    Immunizations,
    Allergies,
}

impl SummaryPromptId {
    pub fn text(&self) -> &'static str {
        match self {
            SummaryPromptId::Demographics => {
                "Summarize the patient's demographics, including name, date of birth, race, \
                 ethnicity, gender, top 3-5 active conditions, and any known allergies:"
            }
            SummaryPromptId::VisitPriorities => {
                "Identify 3-5 top priorities for today's visit based on recent diagnoses, \
                 hospital visits, and medication changes. For each priority, provide associated \
                 action items:"
            }
            SummaryPromptId::CriticalChanges => {
                "List critical changes in the patient's condition since the last well visit, \
                 such as hospitalizations, new diagnoses, abnormal labs, or medication adjustments:"
            }
            SummaryPromptId::ProblemList => {
                "List all active medical conditions currently documented for the patient. \
                 For each medical condition, summarize relevant recent events, associated risks, \
                 coordination notes, pending items, and action items:"
            }
            SummaryPromptId::AdminNotes => {
                "List administrative tasks (if any) requiring attention such as insurance \
                 changes or incomplete forms:"
            }
            SummaryPromptId::Medications => "Summarize the patient's current and past medications:",
            SummaryPromptId::Symptoms => {
                "Provide an overview of the patient's reported symptoms and their progression \
                 over time:"
            }
            SummaryPromptId::PhysicalExam => {
                "What are the key points and key notes/observations from the patient's last \
                 physical examination?"
            }
            SummaryPromptId::Consultation => {
                "What are the key findings from the patient's last non well-visit consultation note?"
            }
            SummaryPromptId::Immunizations => "Summarize the patient's immunizations:",
            SummaryPromptId::Allergies => {
                "Highlight any noted allergies or adverse reactions documented in the patient's \
                 records."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use notesum_core::models::patient::PATIENT_DETAILS_PLACEHOLDER;

    use super::*;

    #[test]
    fn every_retrieval_prompt_has_placeholder() {
        for id in RetrievalPromptId::ALL {
            assert!(
                id.text().contains(PATIENT_DETAILS_PLACEHOLDER),
                "{id:?} is missing the patient placeholder"
            );
        }
    }
}
