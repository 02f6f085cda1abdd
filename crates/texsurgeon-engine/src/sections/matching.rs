use std::collections::HashSet;

use serde::Serialize;

/// How a target name was matched against a section title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// Normalized strings are equal.
    Exact,
    /// One normalized string contains the other.
    Substring,
    /// At least half of either side's words are shared.
    WordOverlap,
}

impl MatchRule {
    /// Rules in the order they are tried.
    pub const ORDERED: [MatchRule; 3] = [Self::Exact, Self::Substring, Self::WordOverlap];

    /// Whether `target` matches `title`. Both must already be normalized.
    pub fn matches(self, target: &str, title: &str) -> bool {
        match self {
            Self::Exact => target == title,
            Self::Substring => {
                !title.is_empty() && (title.contains(target) || target.contains(title))
            }
            Self::WordOverlap => words_overlap(target, title),
        }
    }
}

fn words_overlap(target: &str, title: &str) -> bool {
    let target_words: HashSet<&str> = target.split_whitespace().collect();
    let title_words: HashSet<&str> = title.split_whitespace().collect();
    if target_words.is_empty() || title_words.is_empty() {
        return false;
    }

    let shared = target_words.intersection(&title_words).count();
    shared > 0 && (shared * 2 >= target_words.len() || shared * 2 >= title_words.len())
}

/// Finds the first candidate matched by the highest-priority rule.
///
/// Each rule is tried against every candidate in order before the next rule
/// is considered, so an exact match late in the document beats a substring
/// match early on. Ties within a rule go to the earliest candidate.
pub fn best_match<'a, I>(target: &str, candidates: I) -> Option<(usize, MatchRule)>
where
    I: IntoIterator<Item = (usize, &'a str)>,
    I::IntoIter: Clone,
{
    let target = target.trim().to_lowercase();
    if target.is_empty() {
        return None;
    }

    let candidates = candidates.into_iter();
    MatchRule::ORDERED.into_iter().find_map(|rule| {
        candidates
            .clone()
            .find(|(_, title)| rule.matches(&target, title))
            .map(|(index, _)| (index, rule))
    })
}
