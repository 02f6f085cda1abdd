use std::sync::OnceLock;

use regex::Regex;

use super::lines::LineRef;
use super::types::{Element, ElementKind, EndMarker, SectionCommand, SectionHeading};

fn section_regex() -> &'static Regex {
    static SECTION_REGEX: OnceLock<Regex> = OnceLock::new();
    SECTION_REGEX.get_or_init(|| {
        Regex::new(
            r"^\s*\\(part|chapter|section|subsection|subsubsection|paragraph|subparagraph)(\*)?\s*(?:\[[^\]]*\])?\s*\{((?:[^{}]|\{[^{}]*\})*)\}",
        )
        .expect("Invalid section regex")
    })
}

fn bibliography_regex() -> &'static Regex {
    static BIBLIOGRAPHY_REGEX: OnceLock<Regex> = OnceLock::new();
    BIBLIOGRAPHY_REGEX.get_or_init(|| {
        Regex::new(r"\\(?:bibliography\{|printbibliography\b|begin\{thebibliography\})")
            .expect("Invalid bibliography regex")
    })
}

fn environment_regex() -> &'static Regex {
    static ENVIRONMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    ENVIRONMENT_REGEX.get_or_init(|| {
        Regex::new(r"\\(begin|end)\s*\{([^}]+)\}").expect("Invalid environment regex")
    })
}

/// Classifies individual lines of a LaTeX document.
///
/// Each line is classified on its own facts; no context from surrounding lines
/// is consulted, so a heading inside a `verbatim` block still counts.
pub struct LatexLineClassifier;

impl LatexLineClassifier {
    /// Classifies a line, returning `None` for prose, blank and comment lines.
    pub fn classify(&self, lr: &LineRef) -> Option<Element> {
        let kind = self.classify_text(lr.content())?;
        Some(Element {
            kind,
            line_index: lr.index,
            span: lr.span,
            raw_line: lr.content().to_string(),
        })
    }

    /// Line-level rules, in priority order: section heading, end marker,
    /// environment start, environment end.
    pub fn classify_text(&self, line: &str) -> Option<ElementKind> {
        if line.trim_start().starts_with('%') {
            return None;
        }

        if let Some(heading) = parse_heading(line) {
            return Some(ElementKind::Section(heading));
        }

        if bibliography_regex().is_match(line) {
            return Some(ElementKind::DocumentEndMarker {
                marker: EndMarker::Bibliography,
            });
        }

        let environments: Vec<(&str, &str)> = environment_regex()
            .captures_iter(line)
            .filter_map(|caps| Some((caps.get(1)?.as_str(), caps.get(2)?.as_str())))
            .collect();

        if environments
            .iter()
            .any(|(verb, name)| *verb == "end" && name.trim() == "document")
        {
            return Some(ElementKind::DocumentEndMarker {
                marker: EndMarker::DocumentClose,
            });
        }

        if let Some((_, name)) = environments.iter().find(|(verb, _)| *verb == "begin") {
            return Some(ElementKind::EnvironmentStart {
                name: name.trim().to_string(),
            });
        }

        environments
            .iter()
            .find(|(verb, _)| *verb == "end")
            .map(|(_, name)| ElementKind::EnvironmentEnd {
                name: name.trim().to_string(),
            })
    }
}

/// Extracts the heading facts from a line starting with a sectioning command.
pub fn parse_heading(line: &str) -> Option<SectionHeading> {
    let caps = section_regex().captures(line)?;
    let command = SectionCommand::from_name(caps.get(1)?.as_str())?;
    let title = caps.get(3).map_or("", |m| m.as_str()).to_string();
    Some(SectionHeading {
        command,
        level: command.level(),
        starred: caps.get(2).is_some(),
        normalized_title: normalize_title(&title),
        title,
    })
}

/// Lower-cases and trims a title for matching.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}
