//! Post-edit checks on a mutated document.
//!
//! Checks are reported, not enforced; the orchestrator decides whether an
//! invalid result is kept or rolled back.

use serde::Serialize;

use crate::intent::EditAction;
use crate::parsing::parse_document;

/// Maximum length change, in percent, for ordinary edits.
pub const DEFAULT_CHANGE_THRESHOLD: f64 = 50.0;
/// Maximum length change, in percent, when a new section is created.
pub const CREATION_CHANGE_THRESHOLD: f64 = 200.0;
/// Largest section-count change tolerated for edits that do not create a
/// section.
pub const MAX_SECTION_DRIFT: usize = 3;

/// What the edit was meant to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    pub action: EditAction,
    pub creates_section: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMetrics {
    pub length_delta: isize,
    pub percentage_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_surgical: bool,
    pub syntax_valid: bool,
    pub structure_valid: bool,
    pub issues: Vec<String>,
    pub metrics: ValidationMetrics,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.is_surgical && self.syntax_valid && self.structure_valid
    }
}

/// Compares `modified` against `original`.
pub fn validate(original: &str, modified: &str, context: ValidationContext) -> ValidationResult {
    let mut issues = Vec::new();

    let length_delta = modified.len() as isize - original.len() as isize;
    let percentage_change = percentage_change(original.len(), modified.len());
    let threshold = if context.creates_section {
        CREATION_CHANGE_THRESHOLD
    } else {
        DEFAULT_CHANGE_THRESHOLD
    };
    let is_surgical = percentage_change <= threshold;
    if !is_surgical {
        issues.push(format!(
            "document length changed by {percentage_change:.1}% (limit {threshold:.0}%)"
        ));
    }

    let (open, close) = count_braces(modified);
    let begins = modified.matches("\\begin{").count();
    let ends = modified.matches("\\end{").count();
    if open != close {
        issues.push(format!("unbalanced braces: {open} opening vs {close} closing"));
    }
    if begins != ends {
        issues.push(format!(
            "unbalanced environments: {begins} \\begin vs {ends} \\end"
        ));
    }
    let syntax_valid = open == close && begins == ends;

    let before = parse_document(original).section_count();
    let after = parse_document(modified).section_count();
    let structure_valid = if context.creates_section {
        let ok = after == before + 1;
        if !ok {
            issues.push(format!(
                "expected exactly one new section, section count went from {before} to {after}"
            ));
        }
        ok
    } else {
        let drift = before.abs_diff(after);
        let ok = drift <= MAX_SECTION_DRIFT;
        if !ok {
            issues.push(format!(
                "{} changed the section count by {drift} (limit {MAX_SECTION_DRIFT})",
                context.action
            ));
        }
        ok
    };

    ValidationResult {
        is_surgical,
        syntax_valid,
        structure_valid,
        issues,
        metrics: ValidationMetrics {
            length_delta,
            percentage_change,
        },
    }
}

fn percentage_change(original: usize, modified: usize) -> f64 {
    if original == 0 {
        return if modified == 0 { 0.0 } else { 100.0 };
    }
    original.abs_diff(modified) as f64 / original as f64 * 100.0
}

/// Counts `{` and `}` that are not escaped with a backslash.
fn count_braces(text: &str) -> (usize, usize) {
    let mut open = 0;
    let mut close = 0;
    let mut escaped = false;
    for c in text.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => open += 1,
            '}' => close += 1,
            _ => {}
        }
    }
    (open, close)
}
