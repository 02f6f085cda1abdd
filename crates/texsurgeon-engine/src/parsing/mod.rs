//! Line-oriented structural parser for LaTeX documents.
//!
//! The parser is deliberately a line classifier rather than a grammar: every
//! line becomes at most one [`Element`], and structure inside a line or across
//! nested braces is not modelled. Boundary resolution in [`crate::sections`]
//! assumes this one-element-per-line granularity.

pub mod classify;
pub mod lines;
pub mod span;
pub mod types;

#[cfg(test)]
mod tests;

pub use classify::{LatexLineClassifier, normalize_title, parse_heading};
pub use lines::{LineRef, lines_with_spans};
pub use span::Span;
pub use types::{DocumentTree, Element, ElementKind, EndMarker, SectionCommand, SectionHeading};

/// Parses `text` into its structural elements, in source order.
pub fn parse_document(text: &str) -> DocumentTree {
    let classifier = LatexLineClassifier;
    let elements = lines_with_spans(text)
        .filter_map(|lr| classifier.classify(&lr))
        .collect();

    DocumentTree {
        elements,
        len: text.len(),
    }
}
