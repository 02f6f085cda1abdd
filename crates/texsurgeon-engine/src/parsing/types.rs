use serde::Serialize;

use super::span::Span;

/// The heading command that introduced a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionCommand {
    Part,
    Chapter,
    Section,
    Subsection,
    Subsubsection,
    Paragraph,
    Subparagraph,
}

impl SectionCommand {
    /// Maps a command name (without the backslash) to its variant.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "part" => Some(Self::Part),
            "chapter" => Some(Self::Chapter),
            "section" => Some(Self::Section),
            "subsection" => Some(Self::Subsection),
            "subsubsection" => Some(Self::Subsubsection),
            "paragraph" => Some(Self::Paragraph),
            "subparagraph" => Some(Self::Subparagraph),
            _ => None,
        }
    }

    /// Nesting depth, `\part` being the outermost.
    pub fn level(self) -> u8 {
        match self {
            Self::Part => 0,
            Self::Chapter => 1,
            Self::Section => 2,
            Self::Subsection => 3,
            Self::Subsubsection => 4,
            Self::Paragraph => 5,
            Self::Subparagraph => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Part => "part",
            Self::Chapter => "chapter",
            Self::Section => "section",
            Self::Subsection => "subsection",
            Self::Subsubsection => "subsubsection",
            Self::Paragraph => "paragraph",
            Self::Subparagraph => "subparagraph",
        }
    }
}

/// Facts extracted from a section heading line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionHeading {
    pub command: SectionCommand,
    /// Recorded for display; sections are never nested by level.
    pub level: u8,
    /// `\section*{...}` form.
    pub starred: bool,
    /// Title exactly as written between the braces.
    pub title: String,
    /// Lower-cased, trimmed title used for matching.
    pub normalized_title: String,
}

/// What marks the end of the body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndMarker {
    /// `\bibliography{..}`, `\printbibliography` or `\begin{thebibliography}`.
    Bibliography,
    /// `\end{document}`.
    DocumentClose,
}

/// The classification of a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    Section(SectionHeading),
    EnvironmentStart { name: String },
    EnvironmentEnd { name: String },
    DocumentEndMarker { marker: EndMarker },
}

/// A structural line of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub kind: ElementKind,
    /// Zero-based line number.
    pub line_index: usize,
    /// Byte span of the whole line, terminator included.
    pub span: Span,
    /// The line without its terminator.
    pub raw_line: String,
}

impl Element {
    pub fn char_start(&self) -> usize {
        self.span.start
    }

    pub fn char_end(&self) -> usize {
        self.span.end
    }

    pub fn heading(&self) -> Option<&SectionHeading> {
        match &self.kind {
            ElementKind::Section(heading) => Some(heading),
            _ => None,
        }
    }

    pub fn is_section(&self) -> bool {
        matches!(self.kind, ElementKind::Section(_))
    }

    pub fn is_end_marker(&self) -> bool {
        matches!(self.kind, ElementKind::DocumentEndMarker { .. })
    }
}

/// Structural elements of one document snapshot, in source order.
///
/// Built fresh by [`super::parse_document`] and never mutated afterwards; the
/// offsets are only meaningful against the exact text it was parsed from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentTree {
    pub elements: Vec<Element>,
    /// Byte length of the source text.
    pub len: usize,
}

impl DocumentTree {
    /// Section elements with their headings, in source order.
    pub fn sections(&self) -> impl Iterator<Item = (usize, &Element, &SectionHeading)> + Clone {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.heading().map(|h| (i, e, h)))
    }

    pub fn section_count(&self) -> usize {
        self.elements.iter().filter(|e| e.is_section()).count()
    }

    /// Start offset of the first section element after element `index`.
    pub fn next_section_start(&self, index: usize) -> Option<usize> {
        self.elements
            .iter()
            .skip(index + 1)
            .find(|e| e.is_section())
            .map(Element::char_start)
    }

    /// The first end marker that starts at or after `pos`.
    pub fn first_end_marker_after(&self, pos: usize) -> Option<&Element> {
        self.elements
            .iter()
            .find(|e| e.is_end_marker() && e.char_start() >= pos)
    }

    /// The last `\end{document}` line, if any.
    pub fn document_close(&self) -> Option<&Element> {
        self.elements.iter().rev().find(|e| {
            matches!(
                e.kind,
                ElementKind::DocumentEndMarker {
                    marker: EndMarker::DocumentClose
                }
            )
        })
    }

    /// Environment openings minus closings, counted per line.
    pub fn environment_balance(&self) -> isize {
        self.elements.iter().fold(0, |acc, e| match e.kind {
            ElementKind::EnvironmentStart { .. } => acc + 1,
            ElementKind::EnvironmentEnd { .. } => acc - 1,
            _ => acc,
        })
    }
}
