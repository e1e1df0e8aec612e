//! Grouping of parsed questions into the restructured record, statistics,
//! and the per-combination output pass.

pub mod flatten;
pub mod output;

pub use flatten::{column_order, flatten_question, flatten_record, FlatRow};
pub use output::{write_outputs, OutputPaths};

use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::PipelineResult;
use crate::images::DiagramDownloader;
use crate::models::{Metadata, ObjectiveQuestion, Question, RestructuredRecord, Section, Stats, TheoryQuestion};

/// Keep the first question per number after a stable sort by number.
fn sort_and_dedup<T>(mut questions: Vec<T>, number: impl Fn(&T) -> u32, section: Section) -> Vec<T> {
    questions.sort_by_key(|q| number(q));
    let mut seen = HashSet::new();
    questions.retain(|q| {
        let fresh = seen.insert(number(q));
        if !fresh {
            debug!("Dropping duplicate {} question {}", section, number(q));
        }
        fresh
    });
    questions
}

/// Pure statistics over a record.
pub fn compute_stats(record: &RestructuredRecord) -> Stats {
    let mut stats = Stats {
        total_questions: record.len(),
        objective_questions: record.objectives().len(),
        theory_questions: record.theory().len(),
        ..Default::default()
    };

    for question in record.objectives() {
        if !question.diagrams.is_empty() {
            stats.questions_with_diagrams.increment(Section::Objective);
        }
        if question.has_solution() {
            stats.questions_with_solutions.increment(Section::Objective);
        }
    }
    for question in record.theory() {
        if !question.diagrams.is_empty() {
            stats.questions_with_diagrams.increment(Section::Theory);
        }
        if question.has_solution() {
            stats.questions_with_solutions.increment(Section::Theory);
        }
    }

    stats
}

/// Partition questions by section, sort each bucket by number, drop
/// duplicate numbers and compute statistics. Deterministic in its input.
pub fn aggregate(questions: &[Question]) -> (RestructuredRecord, Stats) {
    let mut objectives: Vec<ObjectiveQuestion> = Vec::new();
    let mut theory: Vec<TheoryQuestion> = Vec::new();

    for question in questions {
        match question {
            Question::Objective(q) => objectives.push(q.clone()),
            Question::Theory(q) => theory.push(q.clone()),
        }
    }

    let objectives = sort_and_dedup(objectives, |q| q.number, Section::Objective);
    let theory = sort_and_dedup(theory, |q| q.number, Section::Theory);

    let record = RestructuredRecord::new(objectives, theory);
    let stats = compute_stats(&record);
    (record, stats)
}

/// Identity of one subject/year unit of work.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub subject: String,
    pub year: String,
    pub source_url: String,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct RestructureOutcome {
    pub record: RestructuredRecord,
    pub metadata: Metadata,
    pub paths: OutputPaths,
}

/// Aggregate, run the diagram download pass once, and write the JSON, CSV
/// and metadata files. Stored diagram URLs stay remote; local paths only
/// appear in the download map.
pub async fn restructure(
    questions: &[Question],
    downloader: &dyn DiagramDownloader,
    context: &RunContext,
) -> PipelineResult<RestructureOutcome> {
    let (record, stats) = aggregate(questions);
    info!(
        "Restructured {} {}: {} objective, {} theory questions",
        context.subject,
        context.year,
        stats.objective_questions,
        stats.theory_questions
    );

    let download_summary = downloader.download_all(&record).await;
    let metadata = Metadata::new(
        &context.subject,
        &context.year,
        &context.source_url,
        stats,
        download_summary,
    );

    let paths = write_outputs(&context.output_dir, &context.subject, &context.year, &record, &metadata)?;

    Ok(RestructureOutcome {
        record,
        metadata,
        paths,
    })
}
