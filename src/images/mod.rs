use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use url::Url;

use crate::models::{ImageDownloadSummary, RestructuredRecord, Section};
use crate::utils::http::fetch_with_retry;

pub const IMAGES_DIR: &str = "images";

/// Best-effort download of every diagram referenced by a record.
#[async_trait]
pub trait DiagramDownloader: Send + Sync {
    async fn download_all(&self, record: &RestructuredRecord) -> ImageDownloadSummary;
}

/// File extension of the URL path, lower-cased, `.jpg` when absent.
pub fn file_extension(url: &str) -> String {
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.split(['?', '#']).next().unwrap_or(url).to_string());
    let filename = path.rsplit('/').next().unwrap_or("");
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => format!(".{}", ext.to_lowercase()),
        _ => ".jpg".to_string(),
    }
}

/// `images/{section}/question_{n}/q{n}_diagram{ext}`; later images of the
/// same question get a `_{index+1}` suffix.
pub fn diagram_path(section: Section, number: u32, index: usize, url: &str) -> PathBuf {
    let ext = file_extension(url);
    let filename = if index == 0 {
        format!("q{}_diagram{}", number, ext)
    } else {
        format!("q{}_diagram_{}{}", number, index + 1, ext)
    };
    Path::new(IMAGES_DIR)
        .join(section.dir_name())
        .join(format!("question_{}", number))
        .join(filename)
}

pub struct HttpDiagramDownloader {
    client: Client,
    output_dir: PathBuf,
    max_retries: u32,
}

impl HttpDiagramDownloader {
    pub fn new(client: Client, output_dir: impl Into<PathBuf>, max_retries: u32) -> Self {
        Self {
            client,
            output_dir: output_dir.into(),
            max_retries,
        }
    }

    async fn download_one(&self, url: &str, relative: &Path) -> anyhow::Result<()> {
        let response = fetch_with_retry(&self.client, url, self.max_retries).await?;
        let bytes = response.bytes().await?;
        let target = self.output_dir.join(relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl DiagramDownloader for HttpDiagramDownloader {
    async fn download_all(&self, record: &RestructuredRecord) -> ImageDownloadSummary {
        let mut summary = ImageDownloadSummary {
            total_questions: record.len(),
            ..Default::default()
        };
        let mut downloaded: HashMap<String, String> = HashMap::new();

        for question in record.questions() {
            let diagrams = question.diagrams();
            if diagrams.is_empty() {
                continue;
            }
            summary.questions_with_diagrams += 1;
            summary.total_images_expected += diagrams.len();
            match question.section() {
                Section::Objective => summary.objective_questions += 1,
                Section::Theory => summary.theory_questions += 1,
            }

            for (index, url) in diagrams.iter().enumerate() {
                if downloaded.contains_key(url) {
                    summary.downloaded_images_count += 1;
                    continue;
                }
                let relative = diagram_path(question.section(), question.number(), index, url);
                match self.download_one(url, &relative).await {
                    Ok(()) => {
                        let local = relative.to_string_lossy().replace('\\', "/");
                        info!("Downloaded: {} -> {}", url, local);
                        downloaded.insert(url.clone(), local.clone());
                        summary.downloaded_image_map.insert(url.clone(), local);
                        summary.downloaded_images_count += 1;
                    }
                    Err(e) => {
                        warn!("Failed to download {}: {:#}", url, e);
                        summary.failed_downloads += 1;
                    }
                }
            }
        }

        info!(
            "Image download finished: {}/{} downloaded, {} failed",
            summary.downloaded_images_count, summary.total_images_expected, summary.failed_downloads
        );
        summary
    }
}
