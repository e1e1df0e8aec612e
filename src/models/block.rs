use serde::{Deserialize, Serialize};

use super::Section;

/// A raw question fragment as delivered by a page scraper, before parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBlock {
    pub section: Section,
    pub text: String,
    pub image_urls: Vec<String>,
}

impl QuestionBlock {
    pub fn new(section: Section, text: impl Into<String>, image_urls: Vec<String>) -> Self {
        Self {
            section,
            text: text.into(),
            image_urls,
        }
    }
}
