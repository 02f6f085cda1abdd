use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::anyhow;
use pretty_assertions::assert_eq;
use texsurgeon_engine::{
    EditAction, EditRequest, EditResult, EditType, EditorOptions, Stage, SurgicalEditor,
    SurgicalError, TextGenerator,
};

const SMALL: &str = "\\section{Intro}\nHello\n\\section{Conclusion}\nBye\n\\end{document}";

/// Replays canned replies in order and records every prompt it receives.
#[derive(Default)]
struct Scripted {
    replies: Mutex<VecDeque<anyhow::Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl Scripted {
    fn new(replies: Vec<anyhow::Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::default(),
        }
    }

    fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

impl TextGenerator for Scripted {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("script exhausted")))
    }
}

fn editor(generator: Scripted) -> SurgicalEditor<Scripted> {
    SurgicalEditor::with_options(
        generator,
        EditorOptions {
            retry_base_delay_ms: 0,
            ..EditorOptions::default()
        },
    )
}

fn thesis() -> String {
    std::fs::read_to_string(format!(
        "{}/tests/fixtures/thesis.tex",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap()
}

fn applied(result: &EditResult) -> &texsurgeon_engine::AppliedEdit {
    match result {
        EditResult::Applied(applied) => applied,
        EditResult::Failed(failed) => panic!("edit failed: {}", failed.error),
    }
}

#[tokio::test]
async fn deletes_named_section_and_nothing_else() {
    let mut editor = editor(Scripted::replying("DELETE_CONFIRMED"));

    let result = editor
        .perform_surgical_edit(EditRequest::new(SMALL, "delete the intro section"))
        .await;

    let edit = applied(&result);
    assert_eq!(
        edit.new_document,
        "\\section{Conclusion}\nBye\n\\end{document}"
    );
    assert_eq!(edit.changes.action, EditAction::Delete);
    assert_eq!(edit.changes.target_section.as_deref(), Some("Intro"));
    assert_eq!(edit.changes.delta_length, -22);
    assert_eq!(edit.metadata.edit_type, EditType::Section);
    assert!(editor.generator().last_prompt().contains("DELETE_CONFIRMED"));

    let session = editor.history().latest().unwrap();
    assert_eq!(session.id(), result.session_id());
    assert!(session.is_success());
    assert_eq!(session.original_document(), SMALL);
}

#[tokio::test]
async fn generator_failure_leaves_document_untouched() {
    let mut editor = editor(Scripted::new(vec![
        Err(anyhow!("connection refused")),
        Err(anyhow!("connection refused")),
        Err(anyhow!("connection refused")),
    ]));

    let result = editor
        .perform_surgical_edit(EditRequest::new(SMALL, "improve the conclusion"))
        .await;

    assert!(!result.is_success());
    assert_eq!(result.document(), SMALL);
    assert!(matches!(
        result.error(),
        Some(SurgicalError::GenerationFailureAfterRetries { attempts: 3, last_error })
            if last_error.contains("connection refused")
    ));
    assert_eq!(editor.generator().calls(), 3);

    let session = editor.history().latest().unwrap();
    assert!(session.error().is_some());
    assert_eq!(session.steps_for(Stage::Generate).count(), 3);
}

#[tokio::test]
async fn retries_past_errors_and_empty_replies() {
    let doc = thesis();
    let mut editor = editor(Scripted::new(vec![
        Err(anyhow!("timeout")),
        Ok("   \n".to_string()),
        Ok("Large language models can edit text.".to_string()),
    ]));

    let result = editor
        .perform_surgical_edit(EditRequest::new(&doc, "fix the introduction"))
        .await;

    let expected = doc.replace(
        "Large language models can edit documents.\nThey should change only what was asked.\n",
        "Large language models can edit text.\n",
    );
    assert_eq!(applied(&result).new_document, expected);
    assert_eq!(editor.generator().calls(), 3);
}

#[tokio::test]
async fn empty_replies_on_every_attempt() {
    let mut editor = editor(Scripted::new(vec![
        Ok(String::new()),
        Ok("```\n```".to_string()),
        Ok("\\begin{document}\n\\end{document}".to_string()),
    ]));

    let result = editor
        .perform_surgical_edit(EditRequest::new(SMALL, "expand the conclusion"))
        .await;

    assert_eq!(
        result.error(),
        Some(&SurgicalError::EmptyGenerationResponse { attempts: 3 })
    );
    assert_eq!(result.document(), SMALL);
}

#[tokio::test]
async fn creates_missing_section_without_duplicate_heading() {
    let doc = thesis();
    let mut editor = editor(Scripted::replying(
        "```latex\n\\section{Future Work}\nWe will extend this.\n```",
    ));

    let result = editor
        .perform_surgical_edit(EditRequest::new(&doc, "add a future work section"))
        .await;

    let edit = applied(&result);
    assert_eq!(edit.new_document.matches("\\section{Future Work}").count(), 1);
    assert!(edit.new_document.ends_with(
        "Surgical edits preserve everything else.\n\n\\section{Future Work}\nWe will extend this.\n\n\\end{document}\n"
    ));
    assert_eq!(edit.metadata.edit_type, EditType::NewSection);
    let validation = edit.metadata.validation.as_ref().unwrap();
    assert!(validation.is_valid(), "{:?}", validation.issues);
}

#[tokio::test]
async fn synthesizes_heading_for_new_section() {
    let doc = thesis();
    let mut editor = editor(Scripted::replying("We will extend this."));

    let result = editor
        .perform_surgical_edit(EditRequest::new(&doc, "write the future work section"))
        .await;

    let edit = applied(&result);
    assert!(
        edit.new_document
            .contains("\\section{Future Work}\nWe will extend this.\n\n\\end{document}")
    );
}

#[tokio::test]
async fn unknown_section_fails_before_generation() {
    let doc = thesis();
    let mut editor = editor(Scripted::replying("unused"));

    let result = editor
        .perform_surgical_edit(EditRequest::new(&doc, "rewrite the evaluation section"))
        .await;

    assert_eq!(
        result.error(),
        Some(&SurgicalError::SectionNotFound {
            section: "evaluation".to_string()
        })
    );
    assert_eq!(result.document(), doc);
    assert_eq!(editor.generator().calls(), 0);
}

#[tokio::test]
async fn untargeted_modification_is_unsupported() {
    let mut editor = editor(Scripted::replying("unused"));

    let result = editor
        .perform_surgical_edit(EditRequest::new(SMALL, "make it better"))
        .await;

    assert!(matches!(
        result.error(),
        Some(SurgicalError::UnsupportedAction {
            action: EditAction::Improve,
            ..
        })
    ));
    assert_eq!(editor.generator().calls(), 0);
}

#[tokio::test]
async fn replaces_selected_text_found_by_content() {
    let doc = thesis();
    let selected = "They should change only what was asked.";
    let mut editor = editor(Scripted::replying("They should change only what is asked."));

    let request = EditRequest::new(&doc, "fix this").with_selected_text(selected);
    let result = editor.perform_surgical_edit(request).await;

    let edit = applied(&result);
    assert_eq!(
        edit.new_document,
        doc.replace(selected, "They should change only what is asked.")
    );
    assert_eq!(edit.metadata.edit_type, EditType::Selection);
    assert_eq!(edit.changes.applied_code, "They should change only what is asked.");
    assert!(editor.generator().last_prompt().contains(selected));
}

#[tokio::test]
async fn out_of_bounds_selection_is_rejected() {
    let mut editor = editor(Scripted::replying("unused"));

    let request = EditRequest::new(SMALL, "fix this").with_selection_range(10..500);
    let result = editor.perform_surgical_edit(request).await;

    assert!(matches!(
        result.error(),
        Some(SurgicalError::InvalidSelection(_))
    ));
    assert_eq!(editor.generator().calls(), 0);
}

#[tokio::test]
async fn inserts_at_section_start() {
    let doc = thesis();
    let mut editor = editor(Scripted::replying("In short:"));

    let result = editor
        .perform_surgical_edit(EditRequest::new(
            &doc,
            "add an opening sentence at the start of the conclusion",
        ))
        .await;

    assert_eq!(
        applied(&result).new_document,
        doc.replace(
            "\\section{Conclusion}\n",
            "\\section{Conclusion}\nIn short:\n"
        )
    );
}

const UNBALANCED: &str = "\\textbf{Surgical edits preserve everything else.";

#[tokio::test]
async fn invalid_edit_is_kept_by_default() {
    let doc = thesis();
    let mut editor = editor(Scripted::replying(UNBALANCED));

    let result = editor
        .perform_surgical_edit(EditRequest::new(&doc, "improve the conclusion"))
        .await;

    let validation = applied(&result).metadata.validation.as_ref().unwrap();
    assert!(!validation.syntax_valid);
    assert!(result.document().contains(UNBALANCED));

    let session = editor.history().latest().unwrap();
    assert!(session.is_success());
    assert_eq!(session.is_valid(), Some(false));
    assert_eq!(session.validation_issues(), validation.issues.as_slice());
}

#[tokio::test]
async fn invalid_edit_is_rolled_back_on_request() {
    let doc = thesis();
    let mut editor = SurgicalEditor::with_options(
        Scripted::replying(UNBALANCED),
        EditorOptions {
            retry_base_delay_ms: 0,
            rollback_on_invalid: true,
            ..EditorOptions::default()
        },
    );

    let result = editor
        .perform_surgical_edit(EditRequest::new(&doc, "improve the conclusion"))
        .await;

    assert!(matches!(
        result.error(),
        Some(SurgicalError::ValidationFailed { issues }) if !issues.is_empty()
    ));
    assert_eq!(result.document(), doc);

    let session = editor.history().latest().unwrap();
    assert!(!session.is_success());
    assert_eq!(session.is_valid(), Some(false));
    assert!(!session.validation_issues().is_empty());
}

#[tokio::test]
async fn history_is_bounded() {
    let mut editor = SurgicalEditor::with_options(
        Scripted::default(),
        EditorOptions {
            retry_base_delay_ms: 0,
            max_retries: 1,
            history_capacity: 2,
            ..EditorOptions::default()
        },
    );

    for instruction in ["fix the intro", "fix the conclusion", "expand the intro"] {
        editor
            .perform_surgical_edit(EditRequest::new(SMALL, instruction))
            .await;
    }

    let kept: Vec<&str> = editor
        .history()
        .iter()
        .map(|session| session.user_instruction())
        .collect();
    assert_eq!(kept, ["fix the conclusion", "expand the intro"]);

    editor.reset_history();
    assert!(editor.history().is_empty());
}

#[tokio::test]
async fn debug_mode_records_full_prompt() {
    let mut editor = SurgicalEditor::with_options(
        Scripted::replying("DELETE_CONFIRMED"),
        EditorOptions {
            debug_mode: true,
            ..EditorOptions::default()
        },
    );

    editor
        .perform_surgical_edit(EditRequest::new(SMALL, "delete the intro section"))
        .await;

    let session = editor.history().latest().unwrap();
    let prompt_step = session.steps_for(Stage::Prompt).next().unwrap();
    assert_eq!(prompt_step.detail, editor.generator().last_prompt());
}

#[tokio::test]
async fn results_serialize_with_success_flag() {
    let mut editor = editor(Scripted::replying("DELETE_CONFIRMED"));

    let ok = editor
        .perform_surgical_edit(EditRequest::new(SMALL, "delete the intro section"))
        .await;
    let json = serde_json::to_value(&ok).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["changes"]["deltaLength"], -22);
    assert_eq!(json["metadata"]["editType"], "section");

    let failed = editor
        .perform_surgical_edit(EditRequest::new(SMALL, "rewrite the abstract"))
        .await;
    let json = serde_json::to_value(&failed).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["fallbackDocument"], SMALL);
    assert_eq!(
        json["error"],
        "Section \"abstract\" was not found in the document"
    );
}
