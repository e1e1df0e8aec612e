use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Question, RestructuredRecord, Section};

/// One spreadsheet row. Keys a row does not have are rendered empty.
pub type FlatRow = BTreeMap<String, String>;

const BASE_COLUMNS: [&str; 6] = ["type", "number", "question", "solution", "answer", "diagrams"];

fn subpart_letter(index: usize) -> char {
    (b'a' + (index % 26) as u8) as char
}

/// Project one question into a flat row. `type` holds the record key
/// (`objectives` or `theory`).
pub fn flatten_question(question: &Question) -> FlatRow {
    let mut row = FlatRow::new();
    row.insert("type".into(), question.section().record_key().into());
    row.insert("number".into(), question.number().to_string());
    row.insert("diagrams".into(), question.diagrams().join("|"));

    match question {
        Question::Objective(q) => {
            row.insert("question".into(), q.question.clone());
            row.insert("solution".into(), q.solution.clone().unwrap_or_default());
            row.insert(
                "answer".into(),
                q.answer.map(|a| a.to_string()).unwrap_or_default(),
            );
            for (letter, text) in q.options.iter() {
                row.insert(format!("option_{}", letter), text.to_string());
            }
        }
        Question::Theory(q) => {
            row.insert("question".into(), q.question.clone());
            row.insert("solution".into(), String::new());
            row.insert("answer".into(), String::new());
            for (i, subpart) in q.subparts.iter().enumerate() {
                let prefix = format!("subpart_{}", i + 1);
                row.insert(format!("{}_question", prefix), subpart.question.clone());
                row.insert(
                    format!("{}_solution", prefix),
                    subpart.solution.clone().unwrap_or_default(),
                );
                row.insert(format!("{}_answer", prefix), String::new());
                for (j, nested) in subpart.subparts.iter().enumerate() {
                    let nested_prefix = format!("{}_{}", prefix, subpart_letter(j));
                    row.insert(format!("{}_question", nested_prefix), nested.question.clone());
                    row.insert(
                        format!("{}_solution", nested_prefix),
                        nested.solution.clone().unwrap_or_default(),
                    );
                    row.insert(format!("{}_answer", nested_prefix), String::new());
                }
            }
        }
    }

    row
}

/// Rows for every question in the record, objectives first.
pub fn flatten_record(record: &RestructuredRecord) -> Vec<FlatRow> {
    record.questions().iter().map(flatten_question).collect()
}

fn column_group(column: &str) -> u8 {
    if BASE_COLUMNS.contains(&column) {
        0
    } else if column.starts_with("option_") {
        1
    } else if column.starts_with("subpart_") {
        2
    } else {
        3
    }
}

/// Union of all row keys: base columns, then `option_*`, then `subpart_*`,
/// each group sorted alphabetically.
pub fn column_order(rows: &[FlatRow]) -> Vec<String> {
    let columns: BTreeSet<&String> = rows.iter().flat_map(|row| row.keys()).collect();
    let mut ordered: Vec<String> = columns.into_iter().cloned().collect();
    ordered.sort_by(|a, b| (column_group(a), a).cmp(&(column_group(b), b)));
    ordered
}

/// Group rows back by their `type` column.
pub fn rows_per_section(rows: &[FlatRow]) -> BTreeMap<Section, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        if let Some(section) = row.get("type").and_then(|t| Section::from_record_key(t)) {
            *counts.entry(section).or_insert(0) += 1;
        }
    }
    counts
}
