use crate::intent::EditAction;

/// Why a surgical edit did not produce a new document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurgicalError {
    #[error("Section \"{section}\" was not found in the document")]
    SectionNotFound { section: String },

    #[error("Generation service returned an empty response on all {attempts} attempt(s)")]
    EmptyGenerationResponse { attempts: u32 },

    #[error("Generation failed after {attempts} attempt(s): {last_error}")]
    GenerationFailureAfterRetries { attempts: u32, last_error: String },

    #[error("Cannot {action} here: {reason}")]
    UnsupportedAction { action: EditAction, reason: String },

    #[error("Surgical application failed: {0}")]
    SurgicalApplicationFailed(String),

    #[error("Validation failed: {}", issues.join("; "))]
    ValidationFailed { issues: Vec<String> },

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}
