use serde::{Deserialize, Serialize};
use std::fmt;

use super::OPTION_LETTERS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Objective,
    Theory,
}

impl Section {
    /// Key under which questions of this section are grouped in the restructured record.
    pub fn record_key(&self) -> &'static str {
        match self {
            Section::Objective => "objectives",
            Section::Theory => "theory",
        }
    }

    /// Folder name used for downloaded diagrams.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Section::Objective => "objective",
            Section::Theory => "theory",
        }
    }

    pub fn from_record_key(key: &str) -> Option<Self> {
        match key {
            "objectives" => Some(Section::Objective),
            "theory" => Some(Section::Theory),
            _ => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// The four option slots of a multiple-choice question. Every slot is always
/// present; an unmatched letter holds an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(rename = "D")]
    pub d: String,
}

impl Options {
    pub fn get(&self, letter: char) -> Option<&str> {
        let slot = match letter.to_ascii_uppercase() {
            'A' => &self.a,
            'B' => &self.b,
            'C' => &self.c,
            'D' => &self.d,
            _ => return None,
        };
        Some(slot.as_str())
    }

    pub fn slot_mut(&mut self, letter: char) -> Option<&mut String> {
        match letter.to_ascii_uppercase() {
            'A' => Some(&mut self.a),
            'B' => Some(&mut self.b),
            'C' => Some(&mut self.c),
            'D' => Some(&mut self.d),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> + '_ {
        OPTION_LETTERS
            .into_iter()
            .filter_map(move |letter| self.get(letter).map(|text| (letter, text)))
    }

    pub fn any_filled(&self) -> bool {
        self.iter().any(|(_, text)| !text.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveQuestion {
    pub number: u32,
    pub question: String,
    pub options: Options,
    pub answer: Option<char>,
    pub solution: Option<String>,
    pub diagrams: Vec<String>,
}

/// Roman-numeral item nested inside a lettered subpart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubSubpart {
    pub part: String,
    pub question: String,
    pub solution: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subpart {
    pub part: String,
    /// Empty when the subpart is decomposed into `subparts`.
    pub question: String,
    pub solution: Option<String>,
    pub subparts: Vec<SubSubpart>,
}

impl Subpart {
    /// Letter inside the part label, e.g. `a` for `(a)`.
    pub fn label(&self) -> &str {
        self.part.trim_start_matches('(').trim_end_matches(')')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheoryQuestion {
    pub number: u32,
    pub question: String,
    pub subparts: Vec<Subpart>,
    pub diagrams: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    Objective(ObjectiveQuestion),
    Theory(TheoryQuestion),
}

impl Question {
    pub fn section(&self) -> Section {
        match self {
            Question::Objective(_) => Section::Objective,
            Question::Theory(_) => Section::Theory,
        }
    }

    pub fn number(&self) -> u32 {
        match self {
            Question::Objective(q) => q.number,
            Question::Theory(q) => q.number,
        }
    }

    pub fn diagrams(&self) -> &[String] {
        match self {
            Question::Objective(q) => &q.diagrams,
            Question::Theory(q) => &q.diagrams,
        }
    }
}

fn non_empty(text: &Option<String>) -> bool {
    text.as_deref().map_or(false, |s| !s.trim().is_empty())
}

impl ObjectiveQuestion {
    pub fn has_solution(&self) -> bool {
        non_empty(&self.solution)
    }
}

impl TheoryQuestion {
    /// True when any subpart, at any depth, carries a non-empty solution.
    pub fn has_solution(&self) -> bool {
        self.subparts.iter().any(|part| {
            non_empty(&part.solution) || part.subparts.iter().any(|nested| non_empty(&nested.solution))
        })
    }
}
