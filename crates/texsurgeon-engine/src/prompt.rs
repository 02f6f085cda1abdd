//! Synthesis of the instruction text sent to the generation service.
//!
//! The output contracts stated here are load-bearing: the edit applier
//! assumes the generated text obeys them (only the replacement, only the new
//! content, the confirmation token for deletions).

use serde::Serialize;

use crate::intent::{EditAction, InsertionPoint};
use crate::parsing::parse_document;
use crate::sections::{SectionBoundary, find_section, heading_line, heading_title};

/// Reply demanded from the service to confirm a deletion.
pub const DELETE_CONFIRMATION_TOKEN: &str = "DELETE_CONFIRMED";

/// How much of the document end is embedded when no section or selection
/// narrows the context.
pub const CONTEXT_TAIL_CHARS: usize = 2000;

const ROLE: &str = "You are assisting with a surgical edit of a LaTeX document. \
Change only what the instruction asks for and leave everything else untouched.";

const PREAMBLE_BAN: &str = "Do NOT include \\documentclass, \\usepackage, \\begin{document} \
or \\end{document} commands.";

const OUTPUT_RULES: &str = "Output plain LaTeX only: no markdown code fences, no explanations, \
no commentary before or after the content.";

/// Inputs to [`build_prompt`].
#[derive(Debug, Clone, Copy)]
pub struct PromptRequest<'a> {
    pub instruction: &'a str,
    pub selected_text: Option<&'a str>,
    /// The full current document.
    pub editor_context: &'a str,
    pub target_section: Option<&'a str>,
    pub action: EditAction,
    pub insertion_point: InsertionPoint,
}

/// Which content the prompt embeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptContext<'a> {
    Selection(&'a str),
    Section(SectionBoundary),
    Document { tail: &'a str },
}

/// Name of a [`PromptContext`] branch, for session records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptBranch {
    Selection,
    Section,
    Document,
}

impl<'a> PromptContext<'a> {
    /// The trailing [`CONTEXT_TAIL_CHARS`] characters of `text`.
    pub fn document(text: &'a str) -> Self {
        Self::Document {
            tail: tail_chars(text, CONTEXT_TAIL_CHARS),
        }
    }

    pub fn branch(&self) -> PromptBranch {
        match self {
            Self::Selection(_) => PromptBranch::Selection,
            Self::Section(_) => PromptBranch::Section,
            Self::Document { .. } => PromptBranch::Document,
        }
    }
}

/// Picks the prompt branch: a non-empty selection, else a resolvable target
/// section, else the document tail.
pub fn prompt_context<'a>(request: &PromptRequest<'a>) -> PromptContext<'a> {
    if let Some(selected) = request.selected_text.filter(|s| !s.trim().is_empty()) {
        return PromptContext::Selection(selected);
    }

    if let Some(target) = request.target_section {
        let tree = parse_document(request.editor_context);
        if let Some(boundary) = find_section(request.editor_context, &tree, target) {
            return PromptContext::Section(boundary);
        }
    }

    PromptContext::document(request.editor_context)
}

/// Builds the full prompt for `request`.
pub fn build_prompt(request: &PromptRequest) -> String {
    let context = prompt_context(request);
    render(request, &context)
}

/// Renders the prompt for an already chosen context.
pub fn render(request: &PromptRequest, context: &PromptContext) -> String {
    let instruction = format!("Instruction: {}", request.instruction.trim());
    let parts: Vec<String> = match context {
        PromptContext::Selection(selected) => vec![
            ROLE.to_string(),
            format!("The user selected this text:\n<<<SELECTION\n{selected}\nSELECTION>>>"),
            instruction,
            selection_contract(request.action, request.insertion_point),
            OUTPUT_RULES.to_string(),
        ],
        PromptContext::Section(boundary) => vec![
            ROLE.to_string(),
            format!(
                "The instruction targets the section \"{}\". Its current content is:\n<<<SECTION\n{}\nSECTION>>>",
                boundary.section_name,
                boundary.original_content.trim_end_matches('\n')
            ),
            instruction,
            section_contract(request.action, request.insertion_point),
            PREAMBLE_BAN.to_string(),
            OUTPUT_RULES.to_string(),
        ],
        PromptContext::Document { tail } => vec![
            ROLE.to_string(),
            format!("The end of the current document is:\n<<<DOCUMENT\n{tail}\nDOCUMENT>>>"),
            instruction,
            document_contract(request.action, request.target_section),
            PREAMBLE_BAN.to_string(),
            OUTPUT_RULES.to_string(),
        ],
    };
    parts.join("\n\n")
}

fn selection_contract(action: EditAction, point: InsertionPoint) -> String {
    match action {
        EditAction::Delete => format!(
            "The selected text will be removed from the document. Do not return any \
             replacement content. Reply with exactly {DELETE_CONFIRMATION_TOKEN} to confirm."
        ),
        EditAction::Replace => "Return ONLY the replacement for the selected text.".to_string(),
        EditAction::Expand | EditAction::Add => {
            let place = match point {
                InsertionPoint::Beginning => "before",
                InsertionPoint::End => "after",
            };
            format!(
                "Return ONLY the new content to insert {place} the selection. \
                 Do NOT repeat the original text."
            )
        }
        EditAction::Fix => "Return ONLY the corrected version of the selected text.".to_string(),
        EditAction::Improve => {
            "Return ONLY the improved version of the selected text.".to_string()
        }
    }
}

fn section_contract(action: EditAction, point: InsertionPoint) -> String {
    match action {
        EditAction::Delete => format!(
            "This section, including its heading, will be removed from the document. Do not \
             return any replacement content. Reply with exactly {DELETE_CONFIRMATION_TOKEN} to confirm."
        ),
        EditAction::Replace => "Return ONLY the replacement for this section, starting with its \
                                heading line."
            .to_string(),
        EditAction::Expand | EditAction::Add => format!(
            "Return ONLY the new content to add at the {} of this section. Do NOT repeat the \
             existing section content or its heading.",
            point.as_str()
        ),
        EditAction::Fix => {
            "Return ONLY the corrected section, starting with its heading line.".to_string()
        }
        EditAction::Improve => {
            "Return ONLY the improved section, starting with its heading line.".to_string()
        }
    }
}

fn document_contract(action: EditAction, target: Option<&str>) -> String {
    match target {
        Some(name) => format!(
            "The document has no \"{title}\" section yet. Write it as a new section that \
             starts with its heading line {heading} followed by the section content.",
            title = heading_title(name),
            heading = heading_line(name)
        ),
        None if action.is_additive() => {
            "Return ONLY the new content to append to the end of the document.".to_string()
        }
        None => "Return ONLY the LaTeX content that carries out the instruction.".to_string(),
    }
}

/// The last `max_chars` characters of `text`.
fn tail_chars(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return "";
    }
    match text.char_indices().rev().nth(max_chars - 1) {
        Some((index, _)) => &text[index..],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\\documentclass{article}\n\\begin{document}\n\\section{Introduction}\nWe study cats.\n\\section{Results}\nCats sleep.\n\\end{document}\n";

    fn request<'a>(
        instruction: &'a str,
        selected: Option<&'a str>,
        target: Option<&'a str>,
        action: EditAction,
    ) -> PromptRequest<'a> {
        PromptRequest {
            instruction,
            selected_text: selected,
            editor_context: DOC,
            target_section: target,
            action,
            insertion_point: InsertionPoint::End,
        }
    }

    #[test]
    fn selection_branch_wins_over_target() {
        let req = request("fix this", Some("Cats sleep."), Some("results"), EditAction::Fix);
        assert_eq!(prompt_context(&req).branch(), PromptBranch::Selection);

        let prompt = build_prompt(&req);
        assert!(prompt.contains("<<<SELECTION\nCats sleep.\nSELECTION>>>"));
        assert!(prompt.contains("Return ONLY the corrected version of the selected text."));
        assert!(!prompt.contains("<<<SECTION"));
    }

    #[test]
    fn blank_selection_is_ignored() {
        let req = request("expand the results", Some("  "), Some("results"), EditAction::Expand);
        assert_eq!(prompt_context(&req).branch(), PromptBranch::Section);
    }

    #[test]
    fn selection_delete_demands_confirmation_token() {
        let req = request("delete this", Some("We study cats."), None, EditAction::Delete);
        let prompt = build_prompt(&req);
        assert!(prompt.contains("Reply with exactly DELETE_CONFIRMED to confirm."));
    }

    #[test]
    fn selection_expand_asks_for_new_content_only() {
        let mut req = request("expand this", Some("Cats sleep."), None, EditAction::Expand);
        assert!(build_prompt(&req).contains("insert after the selection. Do NOT repeat the original text."));

        req.insertion_point = InsertionPoint::Beginning;
        assert!(build_prompt(&req).contains("insert before the selection."));
    }

    #[test]
    fn section_branch_embeds_current_content_and_bans_preamble() {
        let req = request("expand the results", None, Some("results"), EditAction::Expand);
        let prompt = build_prompt(&req);

        assert!(prompt.contains(
            "The instruction targets the section \"Results\". Its current content is:\n<<<SECTION\n\\section{Results}\nCats sleep.\nSECTION>>>"
        ));
        assert!(prompt.contains("add at the end of this section. Do NOT repeat the existing section content"));
        assert!(prompt.contains(PREAMBLE_BAN));
        assert!(!prompt.contains("We study cats."));
    }

    #[test]
    fn section_replace_asks_for_heading() {
        let req = request("rewrite the intro", None, Some("intro"), EditAction::Replace);
        let prompt = build_prompt(&req);
        assert!(prompt.contains("Return ONLY the replacement for this section, starting with its heading line."));
    }

    #[test]
    fn missing_section_falls_back_to_document_tail() {
        let req = request("write a future work section", None, Some("future work"), EditAction::Add);
        assert_eq!(prompt_context(&req).branch(), PromptBranch::Document);

        let prompt = build_prompt(&req);
        assert!(prompt.contains("<<<DOCUMENT\n\\documentclass{article}"));
        assert!(prompt.contains("heading line \\section{Future Work}"));
        assert!(prompt.contains(PREAMBLE_BAN));
        assert!(prompt.ends_with(OUTPUT_RULES));
    }

    #[test]
    fn document_tail_is_bounded() {
        let long = format!("{}{}", "a".repeat(5000), "é".repeat(10));
        let tail = tail_chars(&long, CONTEXT_TAIL_CHARS);
        assert_eq!(tail.chars().count(), CONTEXT_TAIL_CHARS);
        assert!(tail.ends_with("éé"));
        assert_eq!(tail_chars("short", CONTEXT_TAIL_CHARS), "short");
    }
}
