//! Keyword-rule classification of natural-language edit instructions.
//!
//! Rules are an explicit ordered list so the tie-break between ambiguous
//! instructions ("replace and expand ...") can be read off the table and
//! tested on its own.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// The edit operation an instruction asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditAction {
    Delete,
    Replace,
    Expand,
    Add,
    Fix,
    Improve,
}

impl EditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Replace => "replace",
            Self::Expand => "expand",
            Self::Add => "add",
            Self::Fix => "fix",
            Self::Improve => "improve",
        }
    }

    /// Actions that rewrite or remove existing content and therefore need an
    /// existing target.
    pub fn is_modify(self) -> bool {
        matches!(self, Self::Delete | Self::Replace | Self::Fix | Self::Improve)
    }

    /// Actions whose generated text is new content placed next to the
    /// original rather than instead of it.
    pub fn is_additive(self) -> bool {
        matches!(self, Self::Expand | Self::Add)
    }
}

impl fmt::Display for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where additive content goes within a section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertionPoint {
    Beginning,
    #[default]
    End,
}

impl InsertionPoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginning => "beginning",
            Self::End => "end",
        }
    }
}

/// Rough size of the requested change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

/// The classified meaning of an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditIntent {
    pub action: EditAction,
    pub target_section: Option<String>,
    pub insertion_point: InsertionPoint,
    pub complexity: Complexity,
}

/// One row of the action table.
#[derive(Debug, Clone, Copy)]
pub struct IntentRule {
    pub action: EditAction,
    /// Whole words or phrases, lower-case.
    pub keywords: &'static [&'static str],
}

impl IntentRule {
    /// Whether any keyword occurs in the lower-cased instruction.
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| contains_phrase(lowered, k))
    }
}

/// Action rules, evaluated top to bottom. [`EditAction::Improve`] applies
/// when none matches.
pub const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        action: EditAction::Delete,
        keywords: &[
            "delete", "deletes", "deleting", "remove", "removes", "removing", "erase",
            "get rid of", "cut out", "drop",
        ],
    },
    IntentRule {
        action: EditAction::Replace,
        keywords: &[
            "replace", "replaces", "replacing", "rewrite", "rewriting", "re-write",
            "substitute", "swap",
        ],
    },
    IntentRule {
        action: EditAction::Expand,
        keywords: &[
            "expand", "expanding", "elaborate", "extend", "lengthen", "flesh out",
            "more detail", "go deeper",
        ],
    },
    IntentRule {
        action: EditAction::Add,
        keywords: &[
            "add", "adding", "insert", "inserting", "append", "write", "create", "include",
            "draft", "compose",
        ],
    },
    IntentRule {
        action: EditAction::Fix,
        keywords: &[
            "fix", "fixing", "correct", "repair", "proofread", "typo", "typos", "grammar",
            "spelling",
        ],
    },
];

/// Known section names, most specific first.
pub const SECTION_VOCABULARY: &[&str] = &[
    "introduction",
    "intro",
    "abstract",
    "background",
    "related work",
    "literature review",
    "motivation",
    "methodology",
    "methods",
    "method",
    "experimental setup",
    "experiments",
    "implementation",
    "evaluation",
    "results",
    "analysis",
    "discussion",
    "limitations",
    "future work",
    "conclusions",
    "conclusion",
    "summary",
    "acknowledgments",
    "acknowledgements",
    "appendix",
    "references",
    "bibliography",
];

const BEGINNING_WORDS: &[&str] = &["start", "beginning", "top"];

/// Classifies `instruction` into an [`EditIntent`].
pub fn classify(instruction: &str) -> EditIntent {
    let lowered = instruction.to_lowercase();
    EditIntent {
        action: detect_action(&lowered),
        target_section: detect_target(instruction, &lowered),
        insertion_point: detect_insertion_point(&lowered),
        complexity: estimate_complexity(&lowered),
    }
}

fn detect_action(lowered: &str) -> EditAction {
    INTENT_RULES
        .iter()
        .find(|rule| rule.matches(lowered))
        .map_or(EditAction::Improve, |rule| rule.action)
}

fn detect_target(instruction: &str, lowered: &str) -> Option<String> {
    // Plain substring: "introductory" still names the intro.
    if let Some(name) = SECTION_VOCABULARY
        .iter()
        .find(|name| lowered.contains(**name))
    {
        return Some((*name).to_string());
    }

    quoted_name(instruction).or_else(|| named_section_phrase(lowered))
}

fn quoted_name(instruction: &str) -> Option<String> {
    static QUOTED: OnceLock<Regex> = OnceLock::new();
    let re = QUOTED.get_or_init(|| {
        Regex::new(r#""([^"]+)"|“([^”]+)”|(?:^|\s)'([^']+)'"#).expect("Invalid quoted-name regex")
    });
    let caps = re.captures(instruction)?;
    let name = caps.get(1).or(caps.get(2)).or(caps.get(3))?.as_str();
    let name = name.trim().to_lowercase();
    (!name.is_empty()).then_some(name)
}

fn named_section_phrase(lowered: &str) -> Option<String> {
    static PHRASE: OnceLock<Regex> = OnceLock::new();
    let re = PHRASE.get_or_init(|| {
        Regex::new(r"\bthe ((?:[a-z0-9-]+ ){0,3}[a-z0-9-]+) (?:sub)?section\b")
            .expect("Invalid section-phrase regex")
    });
    let name = re.captures(lowered)?.get(1)?.as_str().trim().to_string();
    (!name.is_empty()).then_some(name)
}

fn detect_insertion_point(lowered: &str) -> InsertionPoint {
    if BEGINNING_WORDS.iter().any(|w| contains_phrase(lowered, w)) {
        InsertionPoint::Beginning
    } else {
        InsertionPoint::End
    }
}

fn estimate_complexity(lowered: &str) -> Complexity {
    let families = INTENT_RULES.iter().filter(|r| r.matches(lowered)).count();
    let words = lowered.split_whitespace().count();
    if families > 1 || words > 25 {
        Complexity::Complex
    } else if words > 10 {
        Complexity::Medium
    } else {
        Complexity::Simple
    }
}

/// Whether `phrase` occurs in `haystack` delimited by non-alphanumerics.
pub(crate) fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    haystack.match_indices(phrase).any(|(i, m)| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + m.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
