use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use super::flatten::{column_order, flatten_record, FlatRow};
use crate::error::{PipelineError, PipelineResult};
use crate::models::{Metadata, RestructuredRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub questions_json: PathBuf,
    /// Absent when the record produced no rows.
    pub questions_csv: Option<PathBuf>,
    pub metadata_json: PathBuf,
}

pub fn metadata_path(dir: &Path, subject: &str, year: &str) -> PathBuf {
    dir.join(format!("{}_{}_metadata.json", subject, year))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> PipelineResult<()> {
    let file = fs::File::create(path).map_err(|e| PipelineError::io(path, e))?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush().map_err(|e| PipelineError::io(path, e))?;
    Ok(())
}

/// Write rows with a header taken from the union of their columns.
pub fn write_csv(path: &Path, rows: &[FlatRow]) -> PipelineResult<()> {
    let columns = column_order(rows);
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&columns)?;
    for row in rows {
        writer.write_record(
            columns
                .iter()
                .map(|column| row.get(column).map(String::as_str).unwrap_or("")),
        )?;
    }
    writer.flush().map_err(|e| PipelineError::io(path, e))?;
    Ok(())
}

/// Write `{subject}_{year}.json`, `{subject}_{year}.csv` and
/// `{subject}_{year}_metadata.json` into `dir`.
pub fn write_outputs(
    dir: &Path,
    subject: &str,
    year: &str,
    record: &RestructuredRecord,
    metadata: &Metadata,
) -> PipelineResult<OutputPaths> {
    fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;

    let questions_json = dir.join(&metadata.file_structure.questions_json);
    write_json(&questions_json, record)?;

    let rows = flatten_record(record);
    let questions_csv = if rows.is_empty() {
        None
    } else {
        let path = dir.join(&metadata.file_structure.questions_csv);
        write_csv(&path, &rows)?;
        info!("Wrote {} rows to {}", rows.len(), path.display());
        Some(path)
    };

    let metadata_json = metadata_path(dir, subject, year);
    write_json(&metadata_json, metadata)?;

    info!(
        "Wrote {} and {}",
        questions_json.display(),
        metadata_json.display()
    );

    Ok(OutputPaths {
        questions_json,
        questions_csv,
        metadata_json,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn csv_fills_missing_columns_with_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");

        let mut first = FlatRow::new();
        first.insert("type".into(), "theory".into());
        first.insert("subpart_1_question".into(), "why".into());
        let mut second = FlatRow::new();
        second.insert("type".into(), "theory".into());

        write_csv(&path, &[first, second]).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "type,subpart_1_question\ntheory,why\ntheory,\n");
    }
}
