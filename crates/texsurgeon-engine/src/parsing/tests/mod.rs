//! Integration tests for the parsing module.
//!
//! Fixtures (.tex) live in `fixtures/`; outlines are checked with inline
//! snapshots.


use crate::parsing::{DocumentTree, ElementKind, EndMarker, parse_document};

const PAPER: &str = include_str!("fixtures/paper.tex");

fn outline(tree: &DocumentTree) -> String {
    tree.elements
        .iter()
        .map(|e| {
            let desc = match &e.kind {
                ElementKind::Section(h) => format!(
                    "{}{} level={} \"{}\"",
                    h.command.name(),
                    if h.starred { "*" } else { "" },
                    h.level,
                    h.title
                ),
                ElementKind::EnvironmentStart { name } => format!("begin {name}"),
                ElementKind::EnvironmentEnd { name } => format!("end {name}"),
                ElementKind::DocumentEndMarker { marker } => match marker {
                    EndMarker::Bibliography => "end-marker bibliography".to_string(),
                    EndMarker::DocumentClose => "end-marker document-close".to_string(),
                },
            };
            format!("{}: {desc}", e.line_index)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn fixture_paper_outline() {
    let tree = parse_document(PAPER);
    invariants::check(PAPER, &tree);

    insta::assert_snapshot!(outline(&tree), @r#"
    2: begin document
    4: section level=2 "Introduction"
    6: begin itemize
    8: end itemize
    9: subsection* level=3 "Motivation"
    11: section level=2 "Literature Review"
    13: section level=2 "Results"
    15: end-marker bibliography
    16: end-marker document-close
    "#);
}

#[test]
fn fixture_paper_helpers() {
    let tree = parse_document(PAPER);

    assert_eq!(tree.section_count(), 4);
    assert_eq!(tree.environment_balance(), 1, "document is opened but closed by the end marker");

    let intro = &tree.elements[1];
    assert_eq!(
        tree.next_section_start(1),
        Some(tree.elements[4].char_start()),
        "next section after {:?} should be the subsection",
        intro.raw_line
    );

    let close = tree.document_close().expect("fixture has \\end{document}");
    assert_eq!(close.raw_line, r"\end{document}");

    let results_start = tree.elements[6].char_start();
    let marker = tree.first_end_marker_after(results_start).unwrap();
    assert_eq!(marker.raw_line, r"\bibliography{refs}");
}

/// Offsets count the newline of every preceding line.
#[test]
fn offsets_include_newlines() {
    let text = "\\section{Intro}\nHello\n\\section{Conclusion}\nBye\n\\end{document}";
    let tree = parse_document(text);
    invariants::check(text, &tree);

    let starts: Vec<_> = tree.elements.iter().map(|e| e.char_start()).collect();
    assert_eq!(starts, vec![0, 22, 47]);
    assert_eq!(tree.elements[0].char_end(), 16);
}

#[test]
fn windows_line_endings() {
    let text = "\\section{A}\r\nBody\r\n\\section{B}\r\n";
    let tree = parse_document(text);
    invariants::check(text, &tree);

    assert_eq!(tree.section_count(), 2);
    assert_eq!(tree.elements[0].raw_line, r"\section{A}");
    assert_eq!(tree.elements[1].char_start(), 19);
}

/// Test empty document produces no elements.
#[test]
fn empty_document() {
    let tree = parse_document("");
    assert!(tree.elements.is_empty());
    assert_eq!(tree.len, 0);
}

/// Prose is not modelled.
#[test]
fn prose_only() {
    let tree = parse_document("Just some text.\n\nMore text.\n");
    assert!(tree.elements.is_empty());
}
