use crate::parsing::{DocumentTree, parse_document};

use super::matching::best_match;

/// Abbreviations users type for common section names.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("intro", "Introduction"),
    ("lit review", "Literature Review"),
    ("related", "Related Work"),
    ("bg", "Background"),
    ("method", "Methodology"),
    ("methods", "Methods"),
    ("eval", "Evaluation"),
    ("impl", "Implementation"),
    ("exp", "Experiments"),
    ("conc", "Conclusion"),
    ("ack", "Acknowledgments"),
    ("acks", "Acknowledgments"),
    ("refs", "References"),
];

const MINOR_WORDS: &[&str] = &["a", "an", "and", "as", "at", "for", "in", "of", "on", "or", "the", "to", "vs"];

/// Display title for a section name typed by the user.
pub fn heading_title(name: &str) -> String {
    let name = name.trim();
    let lowered = name.to_lowercase();
    if let Some((_, title)) = ABBREVIATIONS.iter().find(|(abbr, _)| *abbr == lowered) {
        return (*title).to_string();
    }

    name.split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i > 0 && MINOR_WORDS.contains(&lower.as_str()) {
                lower
            } else {
                capitalize(&lower)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `\section{Title}` line for a section name, without a terminator.
pub fn heading_line(name: &str) -> String {
    format!("\\section{{{}}}", heading_title(name))
}

/// Whether `tree` contains a heading that matches `name` by any match rule.
pub fn has_matching_heading(tree: &DocumentTree, name: &str) -> bool {
    let candidates = tree
        .sections()
        .map(|(index, _, heading)| (index, heading.normalized_title.as_str()));
    best_match(name, candidates).is_some()
}

/// Prefixes `content` with a heading for `name` unless it already starts a
/// section matching that name.
pub fn ensure_heading(name: &str, content: &str) -> String {
    let tree = parse_document(content);
    if has_matching_heading(&tree, name) {
        content.to_string()
    } else {
        format!("{}\n{}", heading_line(name), content.trim_start_matches('\n'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("intro", "Introduction")]
    #[case("Lit Review", "Literature Review")]
    #[case("future work", "Future Work")]
    #[case("threats to validity", "Threats to Validity")]
    #[case("  the appendix ", "The Appendix")]
    #[case("conclusion", "Conclusion")]
    fn titles(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(heading_title(name), expected);
    }

    #[test]
    fn keeps_existing_heading() {
        let content = "\\section{Future Work}\nMore to do.";
        assert_eq!(ensure_heading("future work", content), content);
    }

    #[test]
    fn prepends_missing_heading() {
        assert_eq!(
            ensure_heading("intro", "\nWe begin."),
            "\\section{Introduction}\nWe begin."
        );
    }
}
