use std::ops::Range;

use serde::Serialize;

/// Result of applying one mutation primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOutcome {
    pub new_document: String,
    pub original_length: usize,
    pub new_length: usize,
    /// Byte range in `new_document` holding the inserted text; empty for
    /// pure deletions.
    pub changed: Range<usize>,
}

impl EditOutcome {
    pub(crate) fn new(original_length: usize, new_document: String, changed: Range<usize>) -> Self {
        Self {
            new_length: new_document.len(),
            new_document,
            original_length,
            changed,
        }
    }

    /// Signed change in document length.
    pub fn delta_length(&self) -> isize {
        self.new_length as isize - self.original_length as isize
    }

    /// The text this edit put into the document.
    pub fn applied_text(&self) -> &str {
        &self.new_document[self.changed.clone()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("range {start}..{end} is not a valid range in a document of {len} bytes")]
    InvalidRange { start: usize, end: usize, len: usize },
}
