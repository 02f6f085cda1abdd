//! Where an edit lands, decided before any text is generated.

use std::ops::Range;

use crate::editing::{self, EditOutcome};
use crate::intent::{EditAction, EditIntent, InsertionPoint, contains_phrase};
use crate::parsing::{DocumentTree, parse_heading};
use crate::prompt::PromptContext;
use crate::sections::{SectionBoundary, ensure_heading, find_section};

use super::{EditType, SurgicalError};

/// Instruction words that turn an unresolved target into a request for a
/// new section.
const CREATION_WORDS: &[&str] = &["write", "create", "draft", "compose"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EditTarget {
    Selection(Range<usize>),
    Section(SectionBoundary),
    NewSection { name: String },
    DocumentEnd,
}

impl EditTarget {
    pub(crate) fn edit_type(&self) -> EditType {
        match self {
            Self::Selection(_) => EditType::Selection,
            Self::Section(_) => EditType::Section,
            Self::NewSection { .. } => EditType::NewSection,
            Self::DocumentEnd => EditType::DocumentEnd,
        }
    }

    pub(crate) fn creates_section(&self) -> bool {
        matches!(self, Self::NewSection { .. })
    }

    pub(crate) fn prompt_context<'a>(&self, document: &'a str) -> PromptContext<'a> {
        match self {
            Self::Selection(range) => PromptContext::Selection(&document[range.clone()]),
            Self::Section(boundary) => PromptContext::Section(boundary.clone()),
            Self::NewSection { .. } | Self::DocumentEnd => PromptContext::document(document),
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Selection(range) => format!("selection {}..{}", range.start, range.end),
            Self::Section(boundary) => format!(
                "section \"{}\" at {}..{} ({:?} match)",
                boundary.section_name, boundary.start_pos, boundary.end_pos, boundary.matched_by
            ),
            Self::NewSection { name } => format!("new section \"{name}\""),
            Self::DocumentEnd => "end of document".to_string(),
        }
    }
}

/// Resolves the selection to a byte range.
///
/// An explicit range wins; otherwise the first occurrence of the selected
/// text is used. Empty selections count as no selection.
pub(crate) fn locate_selection(
    document: &str,
    selected_text: Option<&str>,
    range: Option<Range<usize>>,
) -> Result<Option<Range<usize>>, SurgicalError> {
    let selected_text = selected_text.filter(|s| !s.is_empty());

    if let Some(range) = range {
        editing::check_range(document, &range)
            .map_err(|e| SurgicalError::InvalidSelection(e.to_string()))?;
        if range.is_empty() && selected_text.is_none() {
            return Ok(None);
        }
        if let Some(selected) = selected_text
            && document[range.clone()] != *selected
        {
            log::warn!(
                "Selected text does not match the document at {}..{}, using the range",
                range.start,
                range.end
            );
        }
        return Ok(Some(range));
    }

    match selected_text {
        None => Ok(None),
        Some(selected) => document
            .find(selected)
            .map(|start| Some(start..start + selected.len()))
            .ok_or_else(|| {
                SurgicalError::InvalidSelection("selected text does not occur in the document".into())
            }),
    }
}

fn is_creation_request(intent: &EditIntent, instruction: &str) -> bool {
    if intent.action.is_modify() {
        return false;
    }
    if intent.action == EditAction::Add {
        return true;
    }
    let lowered = instruction.to_lowercase();
    CREATION_WORDS
        .iter()
        .any(|word| contains_phrase(&lowered, word))
}

/// Picks the edit target for a classified instruction.
pub(crate) fn plan_target(
    document: &str,
    tree: &DocumentTree,
    intent: &EditIntent,
    instruction: &str,
    selection: Option<Range<usize>>,
) -> Result<EditTarget, SurgicalError> {
    if let Some(range) = selection {
        return Ok(EditTarget::Selection(range));
    }

    match &intent.target_section {
        Some(name) => match find_section(document, tree, name) {
            Some(boundary) => Ok(EditTarget::Section(boundary)),
            None if is_creation_request(intent, instruction) => {
                Ok(EditTarget::NewSection { name: name.clone() })
            }
            None => Err(SurgicalError::SectionNotFound {
                section: name.clone(),
            }),
        },
        None if intent.action.is_additive() => Ok(EditTarget::DocumentEnd),
        None => Err(SurgicalError::UnsupportedAction {
            action: intent.action,
            reason: "no section was named and no text was selected".to_string(),
        }),
    }
}

/// Applies cleaned generated `content` at `target`.
pub(crate) fn apply_to_target(
    document: &str,
    tree: &DocumentTree,
    target: &EditTarget,
    intent: &EditIntent,
    content: &str,
) -> Result<EditOutcome, SurgicalError> {
    let failed = |e: editing::EditError| SurgicalError::SurgicalApplicationFailed(e.to_string());
    let action = intent.action;

    match target {
        EditTarget::Selection(range) => match action {
            EditAction::Delete => editing::delete_range(document, range.clone()).map_err(failed),
            EditAction::Replace | EditAction::Fix | EditAction::Improve => {
                editing::replace_range(document, range.clone(), content).map_err(failed)
            }
            EditAction::Expand | EditAction::Add => match intent.insertion_point {
                InsertionPoint::Beginning => {
                    editing::insert_at(document, range.start, &format!("{content}\n"))
                        .map_err(failed)
                }
                InsertionPoint::End => {
                    editing::insert_at(document, range.end, &format!("\n{content}")).map_err(failed)
                }
            },
        },
        EditTarget::Section(boundary) => Ok(match action {
            EditAction::Delete => editing::delete_section(boundary),
            EditAction::Replace | EditAction::Fix | EditAction::Improve => {
                editing::replace_section(boundary, &keep_heading(boundary, content))
            }
            EditAction::Expand | EditAction::Add => {
                editing::add_content_to_section(boundary, content, intent.insertion_point)
            }
        }),
        EditTarget::NewSection { name } => Ok(editing::insert_new_section(
            document,
            tree,
            &ensure_heading(name, content),
        )),
        EditTarget::DocumentEnd => Ok(editing::insert_new_section(document, tree, content)),
    }
}

/// Replacement text for a whole section. The original heading line is
/// restored when the generated text does not open with a heading of its own,
/// and the original trailing newlines are kept so the next section keeps its
/// spacing.
fn keep_heading(boundary: &SectionBoundary, content: &str) -> String {
    let opens_with_heading = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .and_then(parse_heading)
        .is_some();

    let body = content.trim_end_matches('\n');
    let original = &boundary.original_content;
    let trailing = &original[original.trim_end_matches('\n').len()..];
    if opens_with_heading {
        format!("{body}{trailing}")
    } else {
        let header = boundary.header_line();
        let separator = if header.ends_with('\n') { "" } else { "\n" };
        format!("{header}{separator}{body}{trailing}")
    }
}
