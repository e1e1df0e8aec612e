use once_cell::sync::Lazy;
use regex::Regex;

use super::markers::{first_marker, tokenize, MarkerKind};
use super::{clean_text, question_number, reconcile_objective, strip_leading_number, QuestionParser};
use crate::models::{ObjectiveQuestion, Options};

/// Words that introduce the solution of an objective question. Case
/// sensitive so that prose like "a salt solution" is not split on.
static SOLUTION_SPLIT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s(?:Mark|Solution)(?:\s|$)").expect("Invalid solution split regex")
});

static BULLET_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\s•·\-\*–]+").expect("Invalid bullet regex")
});

/// Split a block into the question part and the (possibly empty) solution part.
fn split_solution(text: &str) -> (&str, &str) {
    match SOLUTION_SPLIT_REGEX.find(text) {
        Some(m) => (text[..m.start()].trim(), text[m.end()..].trim()),
        None => (text.trim(), ""),
    }
}

/// Question stem: everything before the first option marker.
pub fn extract_question_stem(question_part: &str) -> String {
    let cut = first_marker(question_part, MarkerKind::OptionDot).or_else(|| {
        MarkerKind::OPTION_STYLES
            .iter()
            .filter_map(|kind| first_marker(question_part, *kind))
            .min()
    });
    let stem = match cut {
        Some(offset) => &question_part[..offset],
        None => question_part,
    };
    clean_text(stem)
}

fn clean_option_text(text: &str) -> String {
    let text = BULLET_REGEX.replace(text, "");
    let text = clean_text(&text);
    text.trim_end_matches('.').trim_end().to_string()
}

/// Fill the four option slots. Marker styles are tried in priority order and
/// a slot is only filled while it is still empty.
pub fn extract_options(question_part: &str) -> Options {
    let mut options = Options::default();
    for kind in MarkerKind::OPTION_STYLES {
        for segment in tokenize(question_part, kind) {
            let Some(letter) = segment.marker.and_then(|m| m.chars().next()) else {
                continue;
            };
            let text = clean_option_text(segment.text);
            if text.is_empty() {
                continue;
            }
            if let Some(slot) = options.slot_mut(letter) {
                if slot.is_empty() {
                    *slot = text;
                }
            }
        }
    }
    options
}

impl QuestionParser {
    /// Parse a multiple-choice block. Returns `None` when the block has no
    /// question number, no stem, or no option text.
    pub fn parse_objective<S: AsRef<str>>(&self, block_text: &str, diagrams: &[S]) -> Option<ObjectiveQuestion> {
        let text = clean_text(block_text);
        let (number, digits) = question_number(&text)?;

        let (question_part, solution_part) = split_solution(&text);
        let question_part = strip_leading_number(question_part, digits);

        let question = extract_question_stem(question_part);
        let options = extract_options(question_part);

        let (answer, solution) = if solution_part.is_empty() {
            (None, None)
        } else {
            let reconciled = reconcile_objective(solution_part);
            (reconciled.answer, Some(reconciled.solution))
        };

        if question.is_empty() || !options.any_filled() {
            return None;
        }

        Some(ObjectiveQuestion {
            number,
            question,
            options,
            answer,
            solution,
            diagrams: self.resolver().resolve(diagrams),
        })
    }
}
