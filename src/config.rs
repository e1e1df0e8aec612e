use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::parsers::diagrams::{DEFAULT_AD_URL_KEYWORDS, DEFAULT_EDUCATIONAL_MARKER};

const CONFIG_FILE: &str = "exam_scraper";
const ENV_PREFIX: &str = "EXAM_SCRAPER";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub base_url: String,
    pub subjects: Vec<String>,
    pub min_year: i32,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub download_delay_ms: u64,
    pub max_pages: usize,
    pub concurrency: usize,
    pub output_dir: PathBuf,
    /// Path segment the site uses for real question diagrams.
    pub educational_path_marker: String,
    pub ad_url_keywords: Vec<String>,
    /// Block text containing any of these is treated as an advert.
    pub ad_text_keywords: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://kuulchat.com/bece/questions/".to_string(),
            subjects: ["science", "mathematics", "english", "social-studies"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_year: 2000,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36".to_string(),
            request_timeout_secs: 25,
            max_retries: 3,
            download_delay_ms: 2000,
            max_pages: 10,
            concurrency: 1,
            output_dir: PathBuf::from("data"),
            educational_path_marker: DEFAULT_EDUCATIONAL_MARKER.to_string(),
            ad_url_keywords: DEFAULT_AD_URL_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            ad_text_keywords: [
                "sponsored",
                "advertise",
                "kuulchat media",
                "kuulpay.com",
                "get a professional",
                "affordable website",
                "management system",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
        }
    }
}

impl Config {
    /// Defaults, overridden by an optional `exam_scraper.{toml,json,yaml}`
    /// file, overridden by `EXAM_SCRAPER__*` environment variables.
    pub fn load() -> Result<Self> {
        let defaults = ::config::Config::try_from(&Config::default())
            .context("Failed to build default configuration")?;

        let settings = ::config::Config::builder()
            .add_source(defaults)
            .add_source(::config::File::with_name(CONFIG_FILE).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("subjects")
                    .with_list_parse_key("ad_url_keywords")
                    .with_list_parse_key("ad_text_keywords"),
            )
            .build()
            .context("Failed to load configuration")?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Page URL for a subject and year.
    pub fn url_for(&self, subject: &str, year: &str) -> String {
        format!("{}{}-{}/", self.base_url, subject, year)
    }

    /// Page URL for last year's paper, shown by `list`.
    pub fn example_url(&self, subject: &str) -> String {
        self.url_for(subject, &(Local::now().year() - 1).to_string())
    }

    pub fn has_subject(&self, subject: &str) -> bool {
        self.subjects.iter().any(|s| s == subject)
    }
}
