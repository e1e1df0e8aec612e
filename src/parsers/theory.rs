use once_cell::sync::Lazy;
use regex::Regex;

use super::markers::{marker_count, tokenize, MarkerKind, Segment};
use super::{clean_text, question_number, reconcile_theory, strip_leading_number, QuestionParser};
use crate::models::{SubSubpart, Subpart, TheoryQuestion};

static SHOW_SOLUTION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s)(?i:show\s+solution)(?:\s|$)").expect("Invalid show solution regex")
});

/// Structure needs at least this many markers; fewer leaves the text flat.
const MIN_MARKERS: usize = 2;

fn split_solution(text: &str) -> (&str, &str) {
    match SHOW_SOLUTION_REGEX.find(text) {
        Some(m) => (text[..m.start()].trim(), text[m.end()..].trim()),
        None => (text.trim(), ""),
    }
}

/// `(label, text)` pairs for every marked segment.
fn marked(segments: &[Segment<'_>]) -> Vec<(String, String)> {
    segments
        .iter()
        .filter_map(|s| s.marker.map(|m| (format!("({})", m), clean_text(s.text))))
        .collect()
}

/// Split a subpart's text on `(i)`, `(ii)`, ... Returns nothing unless there
/// are enough markers. Items without text are dropped.
pub fn parse_sub_subparts(text: &str) -> Vec<SubSubpart> {
    let segments = tokenize(text, MarkerKind::Roman);
    if marker_count(&segments) < MIN_MARKERS {
        return Vec::new();
    }
    marked(&segments)
        .into_iter()
        .filter(|(_, question)| !question.is_empty())
        .map(|(part, question)| SubSubpart {
            part,
            question,
            solution: None,
        })
        .collect()
}

/// Split the question part into the main stem and `(a)`..`(d)` subparts.
pub fn parse_structure(question_part: &str) -> (String, Vec<Subpart>) {
    let segments = tokenize(question_part, MarkerKind::Part);
    if marker_count(&segments) < MIN_MARKERS {
        return (clean_text(question_part), Vec::new());
    }

    let main_question = segments
        .first()
        .filter(|s| s.marker.is_none())
        .map(|s| clean_text(s.text))
        .unwrap_or_default();

    let subparts = marked(&segments)
        .into_iter()
        .map(|(part, text)| {
            let nested = parse_sub_subparts(&text);
            Subpart {
                part,
                question: if nested.is_empty() { text } else { String::new() },
                solution: None,
                subparts: nested,
            }
        })
        .collect();

    (main_question, subparts)
}

impl QuestionParser {
    /// Parse a structured essay block. Returns `None` when the block has no
    /// question number or neither a stem nor any subpart.
    pub fn parse_theory<S: AsRef<str>>(&self, block_text: &str, diagrams: &[S]) -> Option<TheoryQuestion> {
        let text = clean_text(block_text);
        let (number, digits) = question_number(&text)?;

        let (question_part, solution_part) = split_solution(&text);
        let question_part = strip_leading_number(question_part, digits);

        let (question, mut subparts) = parse_structure(question_part);
        if !solution_part.is_empty() {
            subparts = reconcile_theory(subparts, solution_part);
        }

        if question.is_empty() && subparts.is_empty() {
            return None;
        }

        Some(TheoryQuestion {
            number,
            question,
            subparts,
            diagrams: self.resolver().resolve(diagrams),
        })
    }
}
