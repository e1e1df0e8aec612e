use async_trait::async_trait;
use anyhow::Result;
use reqwest::Client;

use crate::models::QuestionBlock;

mod kuulchat;

pub use kuulchat::{extract_page, ExtractedPage, KuulchatScraper};

/// Source of raw question blocks for one subject/year page.
#[async_trait]
pub trait ExamScraper: Send + Sync {
    /// Blocks in scrape order, objectives before theory.
    async fn scrape(&self, client: &Client, subject: &str, year: &str) -> Result<Vec<QuestionBlock>>;
    fn source_url(&self, subject: &str, year: &str) -> String;
}
