use once_cell::sync::Lazy;
use regex::Regex;

use super::clean_text;
use super::markers::{first_marker, MarkerKind};
use crate::models::Subpart;

// A letter counts as an answer when it is upper case, or lower case and
// followed by punctuation or the end of the text ("answer is a" stays prose).
const ANSWER_LETTER: &str = r"([A-D]\b|[a-d](?:[.):,]|$))";

/// Answer indicators in priority order.
static ANSWER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        format!(r"(?i:correct\s+answer\s+is)\s*:?\s*\(?{}", ANSWER_LETTER),
        format!(r"(?i:answer\s+is)\s*:?\s*\(?{}", ANSWER_LETTER),
        format!(r"(?i:\boption)\s+\(?{}", ANSWER_LETTER),
        r"^\s*\(?([A-D])[.)]".to_string(),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid answer pattern"))
    .collect()
});

static SOLUTION_LABEL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:solution)\b\s*:?\s*").expect("Invalid solution label regex")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectiveSolution {
    pub answer: Option<char>,
    pub solution: String,
}

/// Pull the answer letter out of an objective solution. The first matching
/// indicator wins; with no match the answer stays absent.
pub fn reconcile_objective(solution_text: &str) -> ObjectiveSolution {
    let cleaned = clean_text(solution_text);
    let solution = SOLUTION_LABEL_REGEX.replace(&cleaned, "").trim().to_string();

    let answer = ANSWER_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(&solution)
            .and_then(|captures| captures.get(1))
            .and_then(|letter| letter.as_str().chars().next())
            .map(|letter| letter.to_ascii_uppercase())
    });

    ObjectiveSolution { answer, solution }
}

/// Attach each subpart's span of the solution text. Every subpart searches
/// the whole text independently; unmatched subparts keep no solution.
pub fn reconcile_theory(mut subparts: Vec<Subpart>, solution_text: &str) -> Vec<Subpart> {
    for subpart in subparts.iter_mut() {
        if let Some(span) = solution_span(solution_text, subpart.label()) {
            subpart.solution = Some(span);
        }
    }
    subparts
}

fn solution_span(solution_text: &str, label: &str) -> Option<String> {
    if label.is_empty() {
        return None;
    }
    let marker = format!("({})", label);
    let start = solution_text.find(&marker)? + marker.len();
    let rest = &solution_text[start..];
    let end = first_marker(rest, MarkerKind::Part).unwrap_or(rest.len());
    Some(clean_text(&rest[..end]))
}
