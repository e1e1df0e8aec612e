//! Flat tokenizer for structural markers such as `(a)`, `(ii)` or `B.`.
//!
//! Text is cut into a leading segment followed by one segment per marker;
//! each marker's text runs up to the next marker of the same kind or the end
//! of the input. Nesting is assembled by the callers.

use once_cell::sync::Lazy;
use regex::Regex;

static PART_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(([a-d])\)").expect("Invalid part marker regex")
});

static ROMAN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(([ivx]+)\)").expect("Invalid roman marker regex")
});

static OPTION_DOT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s)([A-D])\.").expect("Invalid option marker regex")
});

static OPTION_PAREN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s)\(([A-D])\)").expect("Invalid parenthesised option regex")
});

static OPTION_BRACKET_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s)([A-D])\)").expect("Invalid bracketed option regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Top-level theory part, `(a)` to `(d)`.
    Part,
    /// Nested theory part, `(i)`, `(ii)`, ...
    Roman,
    /// `A.` style option.
    OptionDot,
    /// `(A)` style option.
    OptionParen,
    /// `A)` style option.
    OptionBracket,
}

impl MarkerKind {
    /// Option marker styles in the order they are tried.
    pub const OPTION_STYLES: [MarkerKind; 3] = [
        MarkerKind::OptionDot,
        MarkerKind::OptionParen,
        MarkerKind::OptionBracket,
    ];

    fn regex(&self) -> &'static Regex {
        match self {
            MarkerKind::Part => &PART_REGEX,
            MarkerKind::Roman => &ROMAN_REGEX,
            MarkerKind::OptionDot => &OPTION_DOT_REGEX,
            MarkerKind::OptionParen => &OPTION_PAREN_REGEX,
            MarkerKind::OptionBracket => &OPTION_BRACKET_REGEX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Marker label without punctuation (`a`, `ii`, `B`); `None` for the
    /// leading text.
    pub marker: Option<&'a str>,
    pub text: &'a str,
}

/// Start offset of the first marker of `kind`, if any.
pub fn first_marker(text: &str, kind: MarkerKind) -> Option<usize> {
    kind.regex().find(text).map(|m| m.start())
}

/// Cut `text` into the leading segment plus one segment per marker.
/// Segment texts are trimmed.
pub fn tokenize(text: &str, kind: MarkerKind) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut marker: Option<&str> = None;
    let mut cursor = 0;

    for captures in kind.regex().captures_iter(text) {
        let (Some(whole), Some(label)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        segments.push(Segment {
            marker,
            text: text[cursor..whole.start()].trim(),
        });
        marker = Some(label.as_str());
        cursor = whole.end();
    }

    segments.push(Segment {
        marker,
        text: text[cursor..].trim(),
    });
    segments
}

/// Number of markers in a token stream.
pub fn marker_count(segments: &[Segment<'_>]) -> usize {
    segments.iter().filter(|s| s.marker.is_some()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seg<'a>(marker: Option<&'a str>, text: &'a str) -> Segment<'a> {
        Segment { marker, text }
    }

    #[test]
    fn tokenizes_parts_with_leading_text() {
        let segments = tokenize("Intro (a) first (b) second", MarkerKind::Part);
        assert_eq!(
            segments,
            vec![
                seg(None, "Intro"),
                seg(Some("a"), "first"),
                seg(Some("b"), "second"),
            ]
        );
        assert_eq!(marker_count(&segments), 2);
    }

    #[test]
    fn text_without_markers_is_one_segment() {
        let segments = tokenize("just text", MarkerKind::Roman);
        assert_eq!(segments, vec![seg(None, "just text")]);
        assert_eq!(marker_count(&segments), 0);
    }

    #[test]
    fn roman_markers_ignore_letters() {
        let segments = tokenize("(i) one (ii) two (e) three", MarkerKind::Roman);
        assert_eq!(
            segments,
            vec![seg(None, ""), seg(Some("i"), "one"), seg(Some("ii"), "two (e) three")]
        );
    }

    #[test]
    fn option_dot_requires_leading_space() {
        let segments = tokenize("U.S.A. is A. big B. small", MarkerKind::OptionDot);
        assert_eq!(
            segments,
            vec![seg(None, "U.S.A. is"), seg(Some("A"), "big"), seg(Some("B"), "small")]
        );
    }

    #[test]
    fn bracket_options_need_a_closing_paren() {
        let segments = tokenize("Pick A) red B) blue (C) green", MarkerKind::OptionBracket);
        assert_eq!(
            segments,
            vec![seg(None, "Pick"), seg(Some("A"), "red"), seg(Some("B"), "blue (C) green")]
        );
    }

    #[test]
    fn first_marker_reports_offset() {
        assert_eq!(first_marker("Pick (A) one", MarkerKind::OptionParen), Some(4));
        assert_eq!(first_marker("Pick one", MarkerKind::OptionParen), None);
    }
}
