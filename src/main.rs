use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

use exam_scraper::config::Config;
use exam_scraper::reports::{find_combinations, generate_report};
use exam_scraper::runner::{parse_subjects, parse_years, plan_combinations, run_batch};
use exam_scraper::scrapers::{ExamScraper, KuulchatScraper};
use exam_scraper::utils::http::create_client;

#[derive(Parser)]
#[command(name = "exam-scraper", about = "Scrape and restructure past exam questions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape, restructure and report one or more subject/year combinations
    Run {
        /// Single subject (e.g. science)
        #[arg(short, long, conflicts_with = "subjects")]
        subject: Option<String>,
        /// Single year (e.g. 2022)
        #[arg(short, long, conflicts_with = "years")]
        year: Option<String>,
        /// Comma separated subjects
        #[arg(short = 'S', long)]
        subjects: Option<String>,
        /// Years or ranges, e.g. "2019-2021,2023"
        #[arg(short = 'Y', long)]
        years: Option<String>,
        /// Output directory (overrides configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the page URLs and exit without scraping
        #[arg(long)]
        list_urls: bool,
    },
    /// List configured subjects with example URLs
    List,
    /// Regenerate image download reports for every combination on disk
    Report {
        /// Output directory (overrides configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("exam_scraper=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Commands::Run {
            subject,
            year,
            subjects,
            years,
            output,
            list_urls,
        } => {
            if let Some(output) = output {
                config.output_dir = output;
            }
            let subjects = match subject.or(subjects) {
                Some(list) => parse_subjects(&list),
                None => config.subjects.clone(),
            };
            let years = match year.or(years) {
                Some(list) => parse_years(&list)?,
                None => anyhow::bail!("No year given, use --year or --years"),
            };

            let (combinations, rejected) = plan_combinations(&config, &subjects, &years);
            for e in &rejected {
                warn!("Skipping {}", e);
            }
            if combinations.is_empty() {
                error!("No valid subject/year combinations to process");
                return Ok(ExitCode::FAILURE);
            }

            let config = Arc::new(config);
            let scraper = KuulchatScraper::new(config.clone());

            if list_urls {
                for combination in &combinations {
                    println!("{}: {}", combination, scraper.source_url(&combination.subject, &combination.year));
                }
                return Ok(ExitCode::SUCCESS);
            }

            let client = create_client(&config)?;
            info!(
                "Processing {} combinations into {}",
                combinations.len(),
                config.output_dir.display()
            );
            let summary = run_batch(&config, &client, &scraper, combinations).await;
            summary.print();

            if summary.is_success() && rejected.is_empty() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::List => {
            println!("Configured subjects:");
            for subject in &config.subjects {
                println!("  {:<16} {}", subject, config.example_url(subject));
            }
            println!("Years: {} to current", config.min_year);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Report { output } => {
            let base_dir = output.unwrap_or_else(|| config.output_dir.clone());
            let combinations = find_combinations(&base_dir)
                .with_context(|| format!("Failed to scan {}", base_dir.display()))?;
            if combinations.is_empty() {
                warn!("No subject/year directories found under {}", base_dir.display());
                return Ok(ExitCode::SUCCESS);
            }

            let mut failed = 0;
            for (subject, year) in &combinations {
                match generate_report(&base_dir, subject, year) {
                    Ok(Some(path)) => println!("{} {}: {}", subject, year, path.display()),
                    Ok(None) => {}
                    Err(e) => {
                        error!("Failed to generate report for {} {}: {}", subject, year, e);
                        failed += 1;
                    }
                }
            }

            if failed == 0 {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
