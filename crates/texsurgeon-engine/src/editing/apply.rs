use std::ops::Range;

use crate::intent::InsertionPoint;
use crate::parsing::DocumentTree;
use crate::sections::SectionBoundary;

use super::outcome::{EditError, EditOutcome};

/// Inserts `content` right after the heading line (`Beginning`) or at the
/// end of the section (`End`).
pub fn add_content_to_section(
    boundary: &SectionBoundary,
    content: &str,
    point: InsertionPoint,
) -> EditOutcome {
    let block = content.trim_matches('\n');
    let (updated, offset) = match point {
        InsertionPoint::Beginning => {
            let header = boundary.header_line();
            let separator = if header.ends_with('\n') { "" } else { "\n" };
            let updated = format!("{header}{separator}{block}\n{}", boundary.body());
            (updated, header.len() + separator.len())
        }
        InsertionPoint::End => {
            let original = &boundary.original_content;
            let separator = if original.is_empty() || original.ends_with('\n') {
                ""
            } else {
                "\n"
            };
            let updated = format!("{original}{separator}{block}\n");
            (updated, original.len() + separator.len())
        }
    };

    let start = boundary.start_pos + offset;
    EditOutcome::new(
        boundary.source_len(),
        boundary.splice(&updated),
        start..start + block.len(),
    )
}

/// Removes the section, heading included.
pub fn delete_section(boundary: &SectionBoundary) -> EditOutcome {
    EditOutcome::new(
        boundary.source_len(),
        boundary.splice(""),
        boundary.start_pos..boundary.start_pos,
    )
}

/// Replaces the whole section, heading included, with `content`.
pub fn replace_section(boundary: &SectionBoundary, content: &str) -> EditOutcome {
    EditOutcome::new(
        boundary.source_len(),
        boundary.splice(content),
        boundary.start_pos..boundary.start_pos + content.len(),
    )
}

/// Inserts `content` as a new block before the final `\end{document}`, or
/// appends it when the document has none.
///
/// The caller is responsible for the heading of a new section.
pub fn insert_new_section(text: &str, tree: &DocumentTree, content: &str) -> EditOutcome {
    let position = tree
        .document_close()
        .map_or(text.len(), |close| close.char_start());
    let (before, after) = text.split_at(position);

    let lead = if before.is_empty() || before.ends_with("\n\n") {
        ""
    } else if before.ends_with('\n') {
        "\n"
    } else {
        "\n\n"
    };
    let trail = if after.is_empty() { "\n" } else { "\n\n" };
    let block = content.trim_matches('\n');

    let new_document = format!("{before}{lead}{block}{trail}{after}");
    let start = before.len() + lead.len();
    EditOutcome::new(text.len(), new_document, start..start + block.len())
}

/// Removes `range` from `text`.
pub fn delete_range(text: &str, range: Range<usize>) -> Result<EditOutcome, EditError> {
    replace_range(text, range, "")
}

/// Replaces `range` of `text` with `content`.
pub fn replace_range(
    text: &str,
    range: Range<usize>,
    content: &str,
) -> Result<EditOutcome, EditError> {
    check_range(text, &range)?;
    let new_document = format!("{}{content}{}", &text[..range.start], &text[range.end..]);
    Ok(EditOutcome::new(
        text.len(),
        new_document,
        range.start..range.start + content.len(),
    ))
}

/// Inserts `content` at byte `offset`.
pub fn insert_at(text: &str, offset: usize, content: &str) -> Result<EditOutcome, EditError> {
    replace_range(text, offset..offset, content)
}

/// Checks that `range` lies within `text` on char boundaries.
pub fn check_range(text: &str, range: &Range<usize>) -> Result<(), EditError> {
    let valid = range.start <= range.end
        && range.end <= text.len()
        && text.is_char_boundary(range.start)
        && text.is_char_boundary(range.end);
    if valid {
        Ok(())
    } else {
        Err(EditError::InvalidRange {
            start: range.start,
            end: range.end,
            len: text.len(),
        })
    }
}
