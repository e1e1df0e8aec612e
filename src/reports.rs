//! Plain-text image download reports built from a combination's metadata.

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::images::IMAGES_DIR;
use crate::models::Metadata;
use crate::restructure::output::metadata_path;

pub const REPORTS_DIR: &str = "reports";

pub fn combination_dir(base_dir: &Path, subject: &str, year: &str) -> PathBuf {
    base_dir.join(format!("{}_{}", subject, year))
}

fn title_case(subject: &str) -> String {
    subject
        .replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render the report text for one combination.
pub fn render_report(metadata: &Metadata) -> String {
    let stats = &metadata.spider_stats;
    let images = &stats.image_download_stats;

    let mut lines = vec![
        format!("Image Download Report for {} {}", title_case(&metadata.subject), metadata.year),
        format!("Generated on: {}", Local::now().to_rfc3339()),
        "\nSummary:".to_string(),
        format!("  Total Questions: {}", stats.stats.total_questions),
        "  Questions with Images:".to_string(),
        format!("    Objective Questions: {}", stats.stats.questions_with_diagrams.objectives),
        format!("    Theory Questions: {}", stats.stats.questions_with_diagrams.theory),
        format!("  Total Images Expected: {}", images.total_images_expected),
        format!("  Successfully Downloaded: {}", images.downloaded_images_count),
        format!("  Failed Downloads: {}", images.failed_downloads),
        format!("  Success Rate: {:.2}%", images.success_rate()),
        "  Images are organized in:".to_string(),
        format!("    {}/objective/", IMAGES_DIR),
        format!("    {}/theory/", IMAGES_DIR),
        "\nDownloaded Images:".to_string(),
    ];
    for (url, local) in &images.downloaded_image_map {
        lines.push(format!("  Downloaded: {} -> {}", url, local));
    }
    if images.failed_downloads > 0 {
        lines.push("\nFailed Downloads:".to_string());
        lines.push(format!(
            "  {} images failed to download or were not found.",
            images.failed_downloads
        ));
    }

    lines.join("\n") + "\n"
}

/// Write `reports/{subject}_{year}_image_download_report.txt` from the
/// combination's metadata. A missing metadata file is skipped with a warning.
pub fn generate_report(base_dir: &Path, subject: &str, year: &str) -> PipelineResult<Option<PathBuf>> {
    let dir = combination_dir(base_dir, subject, year);
    let metadata_file = metadata_path(&dir, subject, year);
    if !metadata_file.exists() {
        warn!("Metadata file not found for {} {}: {}", subject, year, metadata_file.display());
        return Ok(None);
    }

    let content = fs::read_to_string(&metadata_file).map_err(|e| PipelineError::io(&metadata_file, e))?;
    let metadata: Metadata = serde_json::from_str(&content)?;

    let reports_dir = dir.join(REPORTS_DIR);
    fs::create_dir_all(&reports_dir).map_err(|e| PipelineError::io(&reports_dir, e))?;
    let report_path = reports_dir.join(format!("{}_{}_image_download_report.txt", subject, year));
    fs::write(&report_path, render_report(&metadata)).map_err(|e| PipelineError::io(&report_path, e))?;

    info!("Report generated for {} {} at {}", subject, year, report_path.display());
    Ok(Some(report_path))
}

/// `(subject, year)` pairs for every `{subject}_{year}` directory under
/// `base_dir`, sorted.
pub fn find_combinations(base_dir: &Path) -> PipelineResult<Vec<(String, String)>> {
    let entries = fs::read_dir(base_dir).map_err(|e| PipelineError::io(base_dir, e))?;
    let mut combinations = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| PipelineError::io(base_dir, e))?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some((subject, year)) = name.rsplit_once('_') {
            if !subject.is_empty() && !year.is_empty() && year.chars().all(|c| c.is_ascii_digit()) {
                combinations.push((subject.to_string(), year.to_string()));
            }
        }
    }

    combinations.sort();
    Ok(combinations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImageDownloadSummary, Stats, TypeCounts};
    use pretty_assertions::assert_eq;

    fn metadata(failed: usize) -> Metadata {
        let mut images = ImageDownloadSummary {
            total_images_expected: 3,
            downloaded_images_count: 3 - failed,
            failed_downloads: failed,
            ..Default::default()
        };
        images.downloaded_image_map.insert(
            "https://x.com/qns/a.png".into(),
            "images/objective/question_1/q1_diagram.png".into(),
        );
        Metadata::new(
            "social_studies",
            "2021",
            "https://x.com/social_studies-2021/",
            Stats {
                total_questions: 5,
                questions_with_diagrams: TypeCounts { objectives: 1, theory: 2 },
                ..Default::default()
            },
            images,
        )
    }

    #[test]
    fn report_lists_totals_and_downloads() {
        let report = render_report(&metadata(1));
        assert!(report.starts_with("Image Download Report for Social Studies 2021\n"));
        assert!(report.contains("  Total Questions: 5\n"));
        assert!(report.contains("    Theory Questions: 2\n"));
        assert!(report.contains("  Success Rate: 66.67%\n"));
        assert!(report.contains(
            "  Downloaded: https://x.com/qns/a.png -> images/objective/question_1/q1_diagram.png\n"
        ));
        assert!(report.contains("1 images failed"));
    }

    #[test]
    fn report_omits_failure_section_when_clean() {
        assert!(!render_report(&metadata(0)).contains("Failed Downloads:\n"));
    }

    #[test]
    fn missing_metadata_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(generate_report(dir.path(), "science", "2020").unwrap(), None);
    }

    #[test]
    fn finds_subject_year_directories() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["science_2022", "social_studies_2021", "notes", "draft_x"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("english_2020"), "not a dir").unwrap();

        assert_eq!(
            find_combinations(dir.path()).unwrap(),
            vec![
                ("science".to_string(), "2022".to_string()),
                ("social_studies".to_string(), "2021".to_string()),
            ]
        );
    }
}
