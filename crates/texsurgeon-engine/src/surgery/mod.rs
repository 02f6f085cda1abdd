//! The edit pipeline: parse, classify, locate, prompt, generate, clean,
//! apply, validate.
//!
//! [`SurgicalEditor::perform_surgical_edit`] never fails: problems are
//! reported as [`EditResult::Failed`] carrying the untouched document, and
//! every attempt leaves an [`EditSession`] in the editor's history.
//!
//! The target is resolved before anything is generated, so an unknown
//! section costs no generation call.

mod error;
mod generator;
mod options;
mod response;
mod result;
mod session;
mod target;

use std::ops::Range;

use uuid::Uuid;

use crate::intent::{EditAction, classify};
use crate::parsing::parse_document;
use crate::prompt::{DELETE_CONFIRMATION_TOKEN, PromptRequest, render};
use crate::validation::{ValidationContext, validate};

pub use error::SurgicalError;
pub use generator::{FixedResponse, TextGenerator};
pub use options::EditorOptions;
pub use response::clean_response;
pub use result::{AppliedEdit, ChangeSummary, EditMetadata, EditResult, EditType, FailedEdit};
pub use session::{EditHistory, EditSession, SessionStep, Stage};

use target::{EditTarget, apply_to_target, locate_selection, plan_target};

/// One edit request from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest<'a> {
    pub document: &'a str,
    pub instruction: &'a str,
    pub selected_text: Option<&'a str>,
    /// Byte range of the selection within `document`.
    pub selection_range: Option<Range<usize>>,
}

impl<'a> EditRequest<'a> {
    pub fn new(document: &'a str, instruction: &'a str) -> Self {
        Self {
            document,
            instruction,
            selected_text: None,
            selection_range: None,
        }
    }

    pub fn with_selected_text(mut self, text: &'a str) -> Self {
        self.selected_text = Some(text);
        self
    }

    pub fn with_selection_range(mut self, range: Range<usize>) -> Self {
        self.selection_range = Some(range);
        self
    }
}

/// Cleaned text from a successful generation.
struct Generated {
    raw: String,
    content: String,
}

pub struct SurgicalEditor<G> {
    generator: G,
    options: EditorOptions,
    history: EditHistory,
}

impl<G: TextGenerator> SurgicalEditor<G> {
    pub fn new(generator: G) -> Self {
        Self::with_options(generator, EditorOptions::default())
    }

    pub fn with_options(generator: G, options: EditorOptions) -> Self {
        let history = EditHistory::new(options.history_capacity);
        Self {
            generator,
            options,
            history,
        }
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn reset_history(&mut self) {
        self.history.clear();
    }

    /// Runs one edit. Taking `&mut self` keeps sessions on one editor
    /// strictly sequential.
    pub async fn perform_surgical_edit(&mut self, request: EditRequest<'_>) -> EditResult {
        let mut session = EditSession::start(&request);
        let session_id = session.id();
        log::info!("Edit session {session_id}: {:?}", request.instruction);

        let result = match self.run(&request, &mut session, session_id).await {
            Ok(applied) => {
                log::info!(
                    "Edit session {session_id} applied {} ({:+} bytes)",
                    applied.changes.action,
                    applied.changes.delta_length
                );
                EditResult::Applied(applied)
            }
            Err(error) => {
                log::warn!("Edit session {session_id} failed: {error}");
                session.fail(&error);
                EditResult::Failed(FailedEdit {
                    error,
                    fallback_document: request.document.to_string(),
                    session_id,
                })
            }
        };

        self.history.push(session);
        result
    }

    async fn run(
        &self,
        request: &EditRequest<'_>,
        session: &mut EditSession,
        session_id: Uuid,
    ) -> Result<AppliedEdit, SurgicalError> {
        let document = request.document;

        let tree = parse_document(document);
        session.record(
            Stage::Parse,
            format!(
                "{} elements, {} sections",
                tree.elements.len(),
                tree.section_count()
            ),
        );

        let intent = classify(request.instruction);
        session.record(
            Stage::Classify,
            format!(
                "action={} target={:?} insertion={} complexity={:?}",
                intent.action,
                intent.target_section,
                intent.insertion_point.as_str(),
                intent.complexity
            ),
        );

        let selection = locate_selection(
            document,
            request.selected_text,
            request.selection_range.clone(),
        )?;
        let target = plan_target(document, &tree, &intent, request.instruction, selection)?;
        session.record(Stage::Locate, target.describe());

        let prompt_request = PromptRequest {
            instruction: request.instruction,
            selected_text: request.selected_text,
            editor_context: document,
            target_section: intent.target_section.as_deref(),
            action: intent.action,
            insertion_point: intent.insertion_point,
        };
        let context = target.prompt_context(document);
        let prompt = render(&prompt_request, &context);
        if self.options.debug_mode {
            session.record(Stage::Prompt, prompt.clone());
        } else {
            session.record(
                Stage::Prompt,
                format!("{:?} branch, {} bytes", context.branch(), prompt.len()),
            );
        }

        let generated = self.generate_with_retry(&prompt, session).await?;
        if self.options.debug_mode {
            log::debug!("Response for session {session_id}:\n{}", generated.raw);
        }
        session.record(
            Stage::Clean,
            format!(
                "{} bytes raw, {} bytes cleaned",
                generated.raw.len(),
                generated.content.len()
            ),
        );

        if intent.action == EditAction::Delete
            && !generated.raw.contains(DELETE_CONFIRMATION_TOKEN)
        {
            log::warn!("Deletion was not confirmed by the generator, applying anyway");
            session.record(Stage::Apply, "deletion not confirmed by generator");
        }

        let outcome = apply_to_target(document, &tree, &target, &intent, &generated.content)?;
        session.record(
            Stage::Apply,
            format!(
                "{} bytes -> {} bytes",
                outcome.original_length, outcome.new_length
            ),
        );

        let validation = if self.options.validation_enabled {
            let result = validate(
                document,
                &outcome.new_document,
                ValidationContext {
                    action: intent.action,
                    creates_section: target.creates_section(),
                },
            );
            session.mark_validated(&result.issues);
            if result.is_valid() {
                session.record(Stage::Validate, "valid");
            } else {
                let issues = result.issues.join("; ");
                session.record(Stage::Validate, issues.clone());
                if self.options.rollback_on_invalid {
                    return Err(SurgicalError::ValidationFailed {
                        issues: result.issues,
                    });
                }
                log::warn!("Edit kept despite validation issues: {issues}");
            }
            Some(result)
        } else {
            None
        };

        let target_section = match &target {
            EditTarget::Section(boundary) => Some(boundary.section_name.clone()),
            _ => intent.target_section.clone(),
        };

        Ok(AppliedEdit {
            changes: ChangeSummary {
                action: intent.action,
                target_section: target_section.clone(),
                original_length: outcome.original_length,
                new_length: outcome.new_length,
                delta_length: outcome.delta_length(),
                applied_code: outcome.applied_text().to_string(),
            },
            metadata: EditMetadata {
                edit_type: target.edit_type(),
                target_section,
                ai_response: generated.raw,
                validation,
            },
            new_document: outcome.new_document,
            session_id,
        })
    }

    /// Calls the generator up to [`EditorOptions::attempts`] times with
    /// exponential backoff. Replies that are empty after cleanup count as
    /// failed attempts.
    async fn generate_with_retry(
        &self,
        prompt: &str,
        session: &mut EditSession,
    ) -> Result<Generated, SurgicalError> {
        let attempts = self.options.attempts();
        let mut empty_replies = 0;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.generator.generate(prompt).await {
                Ok(raw) => {
                    let content = clean_response(&raw);
                    if !content.is_empty() {
                        session.record(
                            Stage::Generate,
                            format!("attempt {attempt}: {} bytes", raw.len()),
                        );
                        return Ok(Generated { raw, content });
                    }
                    empty_replies += 1;
                    last_error = "empty response".to_string();
                }
                Err(e) => last_error = format!("{e:#}"),
            }

            log::warn!("Generation attempt {attempt}/{attempts} failed: {last_error}");
            session.record(
                Stage::Generate,
                format!("attempt {attempt} failed: {last_error}"),
            );
            if attempt < attempts {
                tokio::time::sleep(self.options.backoff_delay(attempt)).await;
            }
        }

        if empty_replies == attempts {
            Err(SurgicalError::EmptyGenerationResponse { attempts })
        } else {
            Err(SurgicalError::GenerationFailureAfterRetries {
                attempts,
                last_error,
            })
        }
    }
}
