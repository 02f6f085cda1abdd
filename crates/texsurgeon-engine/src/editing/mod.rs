//! Pure, offset-based mutation primitives.
//!
//! Nothing here mutates its input: every primitive returns a new document in
//! an [`EditOutcome`]. Section primitives work on a [`SectionBoundary`] and
//! rebuild the text as `before + updated + after`, so bytes outside the
//! section are untouched. Name-based wrappers resolve first and return `None`
//! when the name does not resolve.

pub mod apply;
pub mod outcome;


pub use apply::{
    add_content_to_section, check_range, delete_range, delete_section, insert_at,
    insert_new_section, replace_range, replace_section,
};
pub use outcome::{EditError, EditOutcome};

use crate::intent::InsertionPoint;
use crate::sections::resolve_section;

/// Resolves `name` in `text` and adds `content` to it.
pub fn add_content_to_named_section(
    text: &str,
    name: &str,
    content: &str,
    point: InsertionPoint,
) -> Option<EditOutcome> {
    resolve_section(text, name).map(|b| add_content_to_section(&b, content, point))
}

/// Resolves `name` in `text` and removes that section.
pub fn delete_named_section(text: &str, name: &str) -> Option<EditOutcome> {
    resolve_section(text, name).map(|b| delete_section(&b))
}

/// Resolves `name` in `text` and replaces that section with `content`.
pub fn replace_named_section(text: &str, name: &str, content: &str) -> Option<EditOutcome> {
    resolve_section(text, name).map(|b| replace_section(&b, content))
}
