use anyhow::{Context, Result};
use std::env;
use std::fs;

use exam_scraper::config::Config;
use exam_scraper::models::Section;
use exam_scraper::parsers::{DiagramResolver, QuestionParser};
use exam_scraper::scrapers::extract_page;
use exam_scraper::utils::http::{create_client, fetch_with_retry};

/// Fetch one subject/year page, save the raw HTML and print what the
/// extractor and parser make of it.
#[tokio::main]
async fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let subject = args.next().unwrap_or_else(|| "science".to_string());
    let year = args.next().unwrap_or_else(|| "2022".to_string());

    let config = Config::load()?;
    let client = create_client(&config)?;
    let url = config.url_for(&subject, &year);

    println!("Fetching {}...", url);
    let html = fetch_with_retry(&client, &url, config.max_retries)
        .await?
        .text()
        .await?;
    let sample = format!("{}_{}_sample.html", subject, year);
    fs::write(&sample, &html).with_context(|| format!("Failed to write {}", sample))?;
    println!("Saved raw HTML to {}", sample);

    let page = extract_page(&html, &url, &config.ad_text_keywords);
    for section in [Section::Objective, Section::Theory] {
        let blocks: Vec<_> = page.blocks.iter().filter(|b| b.section == section).collect();
        let images: usize = blocks.iter().map(|b| b.image_urls.len()).sum();
        println!("{} blocks: {} ({} images)", section, blocks.len(), images);
    }
    match &page.next_page {
        Some(next) => println!("Next page: {}", next),
        None => println!("No next page"),
    }

    let parser = QuestionParser::new(DiagramResolver::from_config(&config));
    let questions = parser.parse_blocks(&page.blocks);
    println!("Parsed {} questions", questions.len());
    for question in questions.iter().take(5) {
        println!(
            "  {} {} ({} diagrams)",
            question.section(),
            question.number(),
            question.diagrams().len()
        );
    }

    Ok(())
}
