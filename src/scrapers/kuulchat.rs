use async_trait::async_trait;
use anyhow::Result;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::models::{QuestionBlock, Section};
use crate::parsers::clean_text;
use crate::scrapers::ExamScraper;
use crate::utils::http::fetch_with_retry;

const OBJECTIVE_HEADING: &str = "OBJECTIVE TEST";
const THEORY_HEADING: &str = "THEORY QUESTIONS";

static HEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h4.center").expect("Invalid heading selector")
});

static IMG_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("img").expect("Invalid image selector")
});

static NEXT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a.next").expect("Invalid next link selector")
});

static PAGINATION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".pagination a").expect("Invalid pagination selector")
});

/// Question blocks and pagination link found on one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedPage {
    pub blocks: Vec<QuestionBlock>,
    pub next_page: Option<String>,
}

pub struct KuulchatScraper {
    config: Arc<Config>,
}

impl KuulchatScraper {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ExamScraper for KuulchatScraper {
    async fn scrape(&self, client: &Client, subject: &str, year: &str) -> Result<Vec<QuestionBlock>> {
        let start_url = self.source_url(subject, year);
        info!("Scraping {} {} from {}", subject, year, start_url);

        let mut blocks = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(start_url);

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                warn!("Pagination loops back to {}, stopping", url);
                break;
            }
            if visited.len() > self.config.max_pages.max(1) {
                warn!("Reached page limit of {} for {} {}", self.config.max_pages, subject, year);
                break;
            }
            if visited.len() > 1 {
                tokio::time::sleep(Duration::from_millis(self.config.download_delay_ms)).await;
            }

            let response = fetch_with_retry(client, &url, self.config.max_retries).await?;
            let html = response.text().await?;

            let page = extract_page(&html, &url, &self.config.ad_text_keywords);
            info!("Found {} question blocks on {}", page.blocks.len(), url);
            blocks.extend(page.blocks);
            next = page.next_page;
        }

        // Stable, so scrape order is kept within each section.
        blocks.sort_by_key(|block| block.section);
        Ok(blocks)
    }

    fn source_url(&self, subject: &str, year: &str) -> String {
        self.config.url_for(subject, year)
    }
}

/// Pull objective and theory blocks plus the next-page link out of a page.
pub fn extract_page(html: &str, page_url: &str, ad_text_keywords: &[String]) -> ExtractedPage {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();

    let mut blocks = Vec::new();
    if let Some(container) = section_container(&document, OBJECTIVE_HEADING) {
        for div in child_divs(container) {
            let text = element_text(div);
            if clean_text(&text).contains(THEORY_HEADING) {
                break;
            }
            if let Some(block) = build_block(Section::Objective, div, text, base.as_ref(), ad_text_keywords) {
                blocks.push(block);
            }
        }
    }

    if let Some(container) = section_container(&document, THEORY_HEADING) {
        for div in child_divs(container) {
            let text = element_text(div);
            if let Some(block) = build_block(Section::Theory, div, text, base.as_ref(), ad_text_keywords) {
                blocks.push(block);
            }
        }
    }

    ExtractedPage {
        blocks,
        next_page: next_page_link(&document, base.as_ref()),
    }
}

fn section_container<'a>(document: &'a Html, heading: &str) -> Option<ElementRef<'a>> {
    let heading = document
        .select(&HEADING_SELECTOR)
        .find(|h| element_text(*h).contains(heading))?;
    heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == "div")
}

fn child_divs(container: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    container
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "div")
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ")
}

fn is_advertisement(text: &str, ad_text_keywords: &[String]) -> bool {
    let lower = clean_text(text).to_lowercase();
    ad_text_keywords
        .iter()
        .any(|keyword| lower.contains(&keyword.to_lowercase()))
}

fn build_block(
    section: Section,
    div: ElementRef<'_>,
    text: String,
    base: Option<&Url>,
    ad_text_keywords: &[String],
) -> Option<QuestionBlock> {
    if is_advertisement(&text, ad_text_keywords) {
        debug!("Skipping advertisement block in {} section", section);
        return None;
    }
    if clean_text(&text).is_empty() {
        return None;
    }

    let image_urls = div
        .select(&IMG_SELECTOR)
        .filter_map(|img| img.value().attr("src").or_else(|| img.value().attr("data-src")))
        .map(|src| resolve_url(base, src))
        .collect();

    Some(QuestionBlock::new(section, text, image_urls))
}

fn resolve_url(base: Option<&Url>, href: &str) -> String {
    base.and_then(|base| base.join(href).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| href.to_string())
}

fn next_page_link(document: &Html, base: Option<&Url>) -> Option<String> {
    let href = document
        .select(&NEXT_SELECTOR)
        .find_map(|a| a.value().attr("href"))
        .or_else(|| {
            document
                .select(&PAGINATION_SELECTOR)
                .find(|a| clean_text(&element_text(*a)) == "Next")
                .and_then(|a| a.value().attr("href"))
        })?;
    Some(resolve_url(base, href))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::{DiagramResolver, QuestionParser};
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"
        <html><body>
        <h4 class="center">OBJECTIVE TEST</h4>
        <div>
            <div><span>1.</span> Which is a gas? <br>A. Oxygen<br>B. Iron<br>C. Salt<br>D. Sand
                <img src="/images/qns/gas 1.png">
                <img src="/images/banner.png">
            </div>
            <div>Sponsored: get a professional website today</div>
            <div>2. Water boils at A. 50 B. 100 C. 150 D. 200 Solution B. 100 degrees</div>
            <div>THEORY QUESTIONS</div>
        </div>
        <h4 class="center">THEORY QUESTIONS</h4>
        <div>
            <div>1. (a) Define matter (b) Give two examples Show Solution (a) anything with mass</div>
        </div>
        <ul class="pagination"><li><a href="?page=2">Next</a></li></ul>
        </body></html>
    "#;

    fn keywords() -> Vec<String> {
        Config::default().ad_text_keywords
    }

    #[test]
    fn extracts_blocks_in_section_order() {
        let page = extract_page(PAGE, "https://kuulchat.com/bece/questions/science-2022/", &keywords());
        let sections: Vec<Section> = page.blocks.iter().map(|b| b.section).collect();
        assert_eq!(sections, vec![Section::Objective, Section::Objective, Section::Theory]);
    }

    #[test]
    fn resolves_image_sources_against_page() {
        let page = extract_page(PAGE, "https://kuulchat.com/bece/questions/science-2022/", &keywords());
        assert_eq!(
            page.blocks[0].image_urls,
            vec![
                "https://kuulchat.com/images/qns/gas%201.png".to_string(),
                "https://kuulchat.com/images/banner.png".to_string(),
            ]
        );
    }

    #[test]
    fn finds_next_page() {
        let page = extract_page(PAGE, "https://kuulchat.com/bece/questions/science-2022/", &keywords());
        assert_eq!(
            page.next_page.as_deref(),
            Some("https://kuulchat.com/bece/questions/science-2022/?page=2")
        );
    }

    #[test]
    fn page_without_sections_has_no_blocks() {
        let page = extract_page("<html><body><p>Not found</p></body></html>", "https://x.com/", &keywords());
        assert_eq!(page, ExtractedPage::default());
    }

    #[test]
    fn extracted_blocks_parse_into_questions() {
        let page = extract_page(PAGE, "https://kuulchat.com/bece/questions/science-2022/", &keywords());
        let parser = QuestionParser::new(DiagramResolver::default());
        let questions = parser.parse_blocks(&page.blocks);
        assert_eq!(questions.len(), 3);
        assert_eq!(
            questions[0].diagrams().to_vec(),
            vec!["https://kuulchat.com/images/qns/gas%201.png".to_string()]
        );
    }
}
