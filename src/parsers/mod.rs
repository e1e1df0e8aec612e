pub mod diagrams;
pub mod markers;
pub mod notation;
pub mod objective;
pub mod solution;
pub mod theory;

pub use diagrams::DiagramResolver;
pub use solution::{reconcile_objective, reconcile_theory, ObjectiveSolution};

use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::{Question, QuestionBlock, Section};

static NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)\.").expect("Invalid question number regex")
});

/// Clean and normalize text: decode HTML entities, collapse whitespace and
/// tidy up ion charge notation.
pub fn clean_text(text: &str) -> String {
    let decoded = decode_html_entities(text);
    let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    notation::fix_ion_notation(&collapsed)
}

/// Locate the first `<number>.` in the block. Returns the parsed number and
/// its digits as written, or `None` for zero and unparsable numbers.
pub(crate) fn question_number(text: &str) -> Option<(u32, &str)> {
    let digits = NUMBER_REGEX.captures(text)?.get(1)?.as_str();
    match digits.parse::<u32>() {
        Ok(number) if number > 0 => Some((number, digits)),
        _ => None,
    }
}

/// Drop a leading `<digits>.` (the dot is optional) and following spaces.
pub(crate) fn strip_leading_number<'a>(text: &'a str, digits: &str) -> &'a str {
    let trimmed = text.trim_start();
    match trimmed.strip_prefix(digits) {
        Some(rest) => rest.strip_prefix('.').unwrap_or(rest).trim_start(),
        None => trimmed,
    }
}

/// Parses question blocks into structured questions, filtering diagrams
/// through the configured resolver.
#[derive(Debug, Clone)]
pub struct QuestionParser {
    resolver: DiagramResolver,
}

impl QuestionParser {
    pub fn new(resolver: DiagramResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &DiagramResolver {
        &self.resolver
    }

    pub fn parse_block(&self, block: &QuestionBlock) -> Option<Question> {
        match block.section {
            Section::Objective => self
                .parse_objective(&block.text, &block.image_urls)
                .map(Question::Objective),
            Section::Theory => self
                .parse_theory(&block.text, &block.image_urls)
                .map(Question::Theory),
        }
    }

    /// Parse every block, skipping the ones that are not questions.
    pub fn parse_blocks(&self, blocks: &[QuestionBlock]) -> Vec<Question> {
        let mut questions = Vec::with_capacity(blocks.len());
        for block in blocks {
            match self.parse_block(block) {
                Some(question) => questions.push(question),
                None => debug!(
                    "Skipping {} block without a parsable question: {:.60}",
                    block.section, block.text
                ),
            }
        }
        questions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clean_text_decodes_and_collapses() {
        assert_eq!(clean_text("  Salt &amp; water\n\n is  &lt;mixed&gt; "), "Salt & water is <mixed>");
    }

    #[test]
    fn clean_text_of_empty_is_empty() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text(" \n\t "), "");
    }

    #[test]
    fn question_number_rejects_zero() {
        assert_eq!(question_number("0. Nothing"), None);
        assert_eq!(question_number("no number here"), None);
        assert_eq!(question_number("12. Twelve"), Some((12, "12")));
    }

    #[test]
    fn question_number_rejects_overflow() {
        assert_eq!(question_number("99999999999. Too big"), None);
    }

    #[test]
    fn strip_leading_number_keeps_text_without_prefix() {
        assert_eq!(strip_leading_number("4. Name it", "4"), "Name it");
        assert_eq!(strip_leading_number("4 Name it", "4"), "Name it");
        assert_eq!(strip_leading_number("Question 4. Name it", "4"), "Question 4. Name it");
    }

    #[test]
    fn parse_blocks_skips_malformed() {
        let parser = QuestionParser::new(DiagramResolver::default());
        let blocks = vec![
            QuestionBlock::new(Section::Objective, "Advert without number", vec![]),
            QuestionBlock::new(Section::Objective, "1. Pick A. yes B. no", vec![]),
            QuestionBlock::new(Section::Theory, "2. Discuss water.", vec![]),
        ];
        let questions = parser.parse_blocks(&blocks);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].section(), Section::Objective);
        assert_eq!(questions[1].number(), 2);
    }
}
