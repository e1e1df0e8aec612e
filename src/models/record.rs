use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ObjectiveQuestion, Question, Section, TheoryQuestion, FORMAT_VERSION};

/// Type-partitioned questions of one scrape. Built once by the aggregator and
/// only handed out by shared reference afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestructuredRecord {
    objectives: Vec<ObjectiveQuestion>,
    theory: Vec<TheoryQuestion>,
}

impl RestructuredRecord {
    pub(crate) fn new(objectives: Vec<ObjectiveQuestion>, theory: Vec<TheoryQuestion>) -> Self {
        Self { objectives, theory }
    }

    pub fn objectives(&self) -> &[ObjectiveQuestion] {
        &self.objectives
    }

    pub fn theory(&self) -> &[TheoryQuestion] {
        &self.theory
    }

    pub fn len(&self) -> usize {
        self.objectives.len() + self.theory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, section: Section) -> usize {
        match section {
            Section::Objective => self.objectives.len(),
            Section::Theory => self.theory.len(),
        }
    }

    /// Owned copies of every question, objectives first.
    pub fn questions(&self) -> Vec<Question> {
        self.objectives
            .iter()
            .cloned()
            .map(Question::Objective)
            .chain(self.theory.iter().cloned().map(Question::Theory))
            .collect()
    }
}

/// Per-type counter serialized as `{"objectives": n, "theory": m}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeCounts {
    pub objectives: usize,
    pub theory: usize,
}

impl TypeCounts {
    pub fn get(&self, section: Section) -> usize {
        match section {
            Section::Objective => self.objectives,
            Section::Theory => self.theory,
        }
    }

    pub fn increment(&mut self, section: Section) {
        match section {
            Section::Objective => self.objectives += 1,
            Section::Theory => self.theory += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub total_questions: usize,
    pub objective_questions: usize,
    pub theory_questions: usize,
    pub questions_with_diagrams: TypeCounts,
    pub questions_with_solutions: TypeCounts,
}

/// Summary returned by the diagram download pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageDownloadSummary {
    pub total_questions: usize,
    pub objective_questions: usize,
    pub theory_questions: usize,
    pub questions_with_diagrams: usize,
    pub total_images_expected: usize,
    pub downloaded_images_count: usize,
    pub failed_downloads: usize,
    /// Remote URL to local path, relative to the output directory.
    pub downloaded_image_map: BTreeMap<String, String>,
}

impl ImageDownloadSummary {
    pub fn success_rate(&self) -> f64 {
        if self.total_images_expected == 0 {
            0.0
        } else {
            self.downloaded_images_count as f64 / self.total_images_expected as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiderStats {
    #[serde(flatten)]
    pub stats: Stats,
    pub subject: String,
    pub source_url: String,
    pub spider_reason: String,
    pub image_download_stats: ImageDownloadSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStructure {
    pub questions_json: String,
    pub questions_csv: String,
    pub images: String,
    pub reports: String,
}

impl FileStructure {
    pub fn for_combination(subject: &str, year: &str) -> Self {
        Self {
            questions_json: format!("{}_{}.json", subject, year),
            questions_csv: format!("{}_{}.csv", subject, year),
            images: "images/".to_string(),
            reports: "reports/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub subject: String,
    pub year: String,
    pub extraction_date: DateTime<Local>,
    pub spider_stats: SpiderStats,
    pub file_structure: FileStructure,
    pub format_version: String,
}

impl Metadata {
    pub fn new(
        subject: &str,
        year: &str,
        source_url: &str,
        stats: Stats,
        image_download_stats: ImageDownloadSummary,
    ) -> Self {
        Self {
            subject: subject.to_string(),
            year: year.to_string(),
            extraction_date: Local::now(),
            spider_stats: SpiderStats {
                stats,
                subject: subject.to_string(),
                source_url: source_url.to_string(),
                spider_reason: "restructured".to_string(),
                image_download_stats,
            },
            file_structure: FileStructure::for_combination(subject, year),
            format_version: FORMAT_VERSION.to_string(),
        }
    }
}
