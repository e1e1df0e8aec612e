//! Batch processing of subject/year combinations.

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::images::HttpDiagramDownloader;
use crate::parsers::{DiagramResolver, QuestionParser};
use crate::reports::{combination_dir, generate_report};
use crate::restructure::{restructure, RestructureOutcome, RunContext};
use crate::scrapers::ExamScraper;

/// One subject/year unit of work.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Combination {
    pub subject: String,
    pub year: String,
}

impl Combination {
    pub fn new(subject: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            year: year.into(),
        }
    }
}

impl std::fmt::Display for Combination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.subject, self.year)
    }
}

/// Split a comma separated subject list, dropping empty entries.
pub fn parse_subjects(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Expand `2019`, `2019-2021` or `2018,2020-2021` into individual years.
/// Ranges stop at the current year.
pub fn parse_years(input: &str) -> Result<Vec<String>> {
    parse_years_until(input, Local::now().year())
}

fn parse_years_until(input: &str, last_year: i32) -> Result<Vec<String>> {
    let mut years = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let start: i32 = start
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid start year in range '{}'", part))?;
                let end: i32 = end
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid end year in range '{}'", part))?;
                if start > end {
                    bail!("Year range '{}' runs backwards", part);
                }
                if start > last_year {
                    bail!("Year range '{}' starts after {}", part, last_year);
                }
                if end > last_year {
                    warn!("Year range '{}' capped at {}", part, last_year);
                }
                years.extend((start..=end.min(last_year)).map(|y| y.to_string()));
            }
            None => years.push(part.to_string()),
        }
    }
    Ok(years)
}

fn check_combination(config: &Config, subject: &str, year: &str, current_year: i32) -> PipelineResult<()> {
    let invalid = |reason: String| PipelineError::InvalidCombination {
        subject: subject.to_string(),
        year: year.to_string(),
        reason,
    };

    if !config.has_subject(subject) {
        return Err(invalid(format!(
            "unknown subject, expected one of {}",
            config.subjects.join(", ")
        )));
    }
    if year.is_empty() || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("year must be numeric".to_string()));
    }
    let value: i32 = year
        .parse()
        .map_err(|_| invalid("year out of range".to_string()))?;
    if value < config.min_year || value > current_year {
        return Err(invalid(format!(
            "year must be between {} and {}",
            config.min_year, current_year
        )));
    }
    Ok(())
}

/// The subject must be configured and the year must fall within
/// `min_year..=` the current year.
pub fn validate_combination(config: &Config, subject: &str, year: &str) -> PipelineResult<()> {
    check_combination(config, subject, year, Local::now().year())
}

/// Cross product of subjects and years, keeping only valid combinations.
/// Rejected ones are returned alongside.
pub fn plan_combinations(
    config: &Config,
    subjects: &[String],
    years: &[String],
) -> (Vec<Combination>, Vec<PipelineError>) {
    let mut valid = Vec::new();
    let mut rejected = Vec::new();
    for subject in subjects {
        for year in years {
            match validate_combination(config, subject, year) {
                Ok(()) => valid.push(Combination::new(subject.as_str(), year.as_str())),
                Err(e) => rejected.push(e),
            }
        }
    }
    (valid, rejected)
}

/// Scrape, parse, restructure, download and report for one combination.
pub async fn process_combination(
    config: &Config,
    client: &Client,
    scraper: &dyn ExamScraper,
    combination: &Combination,
) -> Result<RestructureOutcome> {
    let Combination { subject, year } = combination;
    let source_url = scraper.source_url(subject, year);

    let blocks = scraper
        .scrape(client, subject, year)
        .await
        .with_context(|| format!("Failed to scrape {}", source_url))?;

    let parser = QuestionParser::new(DiagramResolver::from_config(config));
    let questions = parser.parse_blocks(&blocks);
    info!(
        "Parsed {} questions from {} blocks for {}",
        questions.len(),
        blocks.len(),
        combination
    );
    if questions.is_empty() {
        return Err(PipelineError::NoQuestions(source_url).into());
    }

    let output_dir = combination_dir(&config.output_dir, subject, year);
    let downloader = HttpDiagramDownloader::new(client.clone(), &output_dir, config.max_retries);
    let context = RunContext {
        subject: subject.clone(),
        year: year.clone(),
        source_url,
        output_dir,
    };

    let outcome = restructure(&questions, &downloader, &context).await?;
    generate_report(&config.output_dir, subject, year)?;
    Ok(outcome)
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<Combination>,
    pub failed: Vec<(Combination, String)>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn print(&self) {
        println!("\n=== Summary ===");
        println!(
            "Processed {} combinations: {} succeeded, {} failed",
            self.succeeded.len() + self.failed.len(),
            self.succeeded.len(),
            self.failed.len()
        );
        for combination in &self.succeeded {
            println!("  OK    {}", combination);
        }
        for (combination, reason) in &self.failed {
            println!("  FAIL  {}: {}", combination, reason);
        }
    }
}

/// Run every combination as an independent unit, `config.concurrency` at a
/// time. A failing unit never stops its siblings.
pub async fn run_batch(
    config: &Config,
    client: &Client,
    scraper: &dyn ExamScraper,
    combinations: Vec<Combination>,
) -> BatchSummary {
    let results: Vec<_> = stream::iter(combinations)
        .map(|combination| async move {
            info!("Processing {}", combination);
            let result = process_combination(config, client, scraper, &combination).await;
            (combination, result)
        })
        .buffered(config.concurrency.max(1))
        .collect()
        .await;

    let mut summary = BatchSummary::default();
    for (combination, result) in results {
        match result {
            Ok(outcome) => {
                info!(
                    "Finished {}: {} questions written to {}",
                    combination,
                    outcome.record.len(),
                    outcome.paths.questions_json.display()
                );
                summary.succeeded.push(combination);
            }
            Err(e) => {
                error!("Failed to process {}: {:#}", combination, e);
                summary.failed.push((combination, format!("{:#}", e)));
            }
        }
    }
    summary
}
