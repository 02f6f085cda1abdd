use serde::Serialize;

use crate::parsing::DocumentTree;

use super::matching::MatchRule;

/// The resolved region of one section in a document snapshot.
///
/// `before_content + original_content + after_content` always reproduces the
/// text the boundary was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionBoundary {
    /// Title of the matched section, as written.
    pub section_name: String,
    /// Start of the heading line.
    pub start_pos: usize,
    /// End of the heading line, terminator included.
    pub header_end: usize,
    /// Start of the next section, the first end marker, or end of text.
    pub end_pos: usize,
    pub original_content: String,
    pub before_content: String,
    pub after_content: String,
    pub matched_by: MatchRule,
}

impl SectionBoundary {
    /// Computes the boundary of the section element at `index` in `tree`.
    ///
    /// Returns `None` when `index` is not a section element.
    pub fn for_element(
        text: &str,
        tree: &DocumentTree,
        index: usize,
        matched_by: MatchRule,
    ) -> Option<Self> {
        let element = tree.elements.get(index)?;
        let heading = element.heading()?;

        let start_pos = element.char_start();
        let end_pos = tree
            .next_section_start(index)
            .or_else(|| {
                tree.first_end_marker_after(start_pos)
                    .map(|marker| marker.char_start())
            })
            .unwrap_or(text.len());

        Some(Self {
            section_name: heading.title.clone(),
            start_pos,
            header_end: element.char_end(),
            end_pos,
            original_content: text[start_pos..end_pos].to_string(),
            before_content: text[..start_pos].to_string(),
            after_content: text[end_pos..].to_string(),
            matched_by,
        })
    }

    /// The heading line, terminator included.
    pub fn header_line(&self) -> &str {
        &self.original_content[..self.header_end - self.start_pos]
    }

    /// Section content after the heading line.
    pub fn body(&self) -> &str {
        &self.original_content[self.header_end - self.start_pos..]
    }

    /// Length of the document this boundary was computed from.
    pub fn source_len(&self) -> usize {
        self.before_content.len() + self.original_content.len() + self.after_content.len()
    }

    /// Reassembles the source text.
    pub fn reconstruct(&self) -> String {
        self.splice(&self.original_content)
    }

    /// `before + replacement + after`.
    pub fn splice(&self, replacement: &str) -> String {
        let mut out = String::with_capacity(
            self.before_content.len() + replacement.len() + self.after_content.len(),
        );
        out.push_str(&self.before_content);
        out.push_str(replacement);
        out.push_str(&self.after_content);
        out
    }
}
