use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::intent::EditAction;
use crate::validation::ValidationResult;

use super::SurgicalError;

/// Where an applied edit landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditType {
    Selection,
    Section,
    NewSection,
    DocumentEnd,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSummary {
    pub action: EditAction,
    pub target_section: Option<String>,
    pub original_length: usize,
    pub new_length: usize,
    pub delta_length: isize,
    /// The text that was inserted or substituted; empty for deletions.
    pub applied_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditMetadata {
    pub edit_type: EditType,
    pub target_section: Option<String>,
    /// The raw generated text, before cleanup.
    pub ai_response: String,
    pub validation: Option<ValidationResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedEdit {
    pub new_document: String,
    pub changes: ChangeSummary,
    pub metadata: EditMetadata,
    pub session_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedEdit {
    #[serde(serialize_with = "as_message")]
    pub error: SurgicalError,
    /// The original document, unchanged.
    pub fallback_document: String,
    pub session_id: Uuid,
}

/// Outcome of [`super::SurgicalEditor::perform_surgical_edit`].
#[derive(Debug, Clone, PartialEq)]
pub enum EditResult {
    Applied(AppliedEdit),
    Failed(FailedEdit),
}

impl EditResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// The document the host should display: the edited one, or the
    /// untouched original on failure.
    pub fn document(&self) -> &str {
        match self {
            Self::Applied(applied) => &applied.new_document,
            Self::Failed(failed) => &failed.fallback_document,
        }
    }

    pub fn into_document(self) -> String {
        match self {
            Self::Applied(applied) => applied.new_document,
            Self::Failed(failed) => failed.fallback_document,
        }
    }

    pub fn session_id(&self) -> Uuid {
        match self {
            Self::Applied(applied) => applied.session_id,
            Self::Failed(failed) => failed.session_id,
        }
    }

    pub fn error(&self) -> Option<&SurgicalError> {
        match self {
            Self::Applied(_) => None,
            Self::Failed(failed) => Some(&failed.error),
        }
    }

    pub fn applied(&self) -> Option<&AppliedEdit> {
        match self {
            Self::Applied(applied) => Some(applied),
            Self::Failed(_) => None,
        }
    }
}

impl Serialize for EditResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Flagged<'a, T> {
            success: bool,
            #[serde(flatten)]
            inner: &'a T,
        }

        match self {
            Self::Applied(applied) => Flagged {
                success: true,
                inner: applied,
            }
            .serialize(serializer),
            Self::Failed(failed) => Flagged {
                success: false,
                inner: failed,
            }
            .serialize(serializer),
        }
    }
}

fn as_message<S: Serializer>(error: &SurgicalError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}
