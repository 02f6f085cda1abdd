//! Resolution of free-text section names to exact document ranges.

pub mod boundary;
pub mod heading;
pub mod matching;

pub use boundary::SectionBoundary;
pub use heading::{ensure_heading, has_matching_heading, heading_line, heading_title};
pub use matching::{MatchRule, best_match};

use crate::parsing::{DocumentTree, parse_document};

/// Finds the section best matching `target` and computes its boundary.
///
/// Returns `None` when no section matches by any rule; the resolver never
/// guesses.
pub fn find_section(text: &str, tree: &DocumentTree, target: &str) -> Option<SectionBoundary> {
    let candidates = tree
        .sections()
        .map(|(index, _, heading)| (index, heading.normalized_title.as_str()));
    let (index, rule) = best_match(target, candidates)?;
    log::debug!("resolved section {target:?} at element {index} by {rule:?}");
    SectionBoundary::for_element(text, tree, index, rule)
}

/// Parses `text` and resolves `target` against it.
pub fn resolve_section(text: &str, target: &str) -> Option<SectionBoundary> {
    let tree = parse_document(text);
    find_section(text, &tree, target)
}

/// Boundaries of every section, in source order.
pub fn section_boundaries(text: &str, tree: &DocumentTree) -> Vec<SectionBoundary> {
    tree.sections()
        .filter_map(|(index, _, _)| {
            SectionBoundary::for_element(text, tree, index, MatchRule::Exact)
        })
        .collect()
}
