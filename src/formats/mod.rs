mod csv;

use std::{collections::HashSet, path::Path};

use serde_json::{Map, Value};
use tracing::debug;

use crate::{
  engine::CoreError,
  models::{BuildReport, Dataset, FileFormat, Record},
};

pub use self::csv::tokenize_line;

pub(crate) fn detect_format(path: &Path) -> FileFormat {
  let ext = path
    .extension()
    .and_then(|s| s.to_str())
    .unwrap_or("")
    .to_ascii_lowercase();
  match ext.as_str() {
    "csv" => FileFormat::Csv,
    _ => FileFormat::Unknown,
  }
}

/// Parse a whole delimited text into a dataset.
///
/// The first non-blank line is the header. Data lines whose field count differs from the
/// header count are dropped and listed in [`BuildReport::skipped_lines`].
pub fn build_dataset(text: &str) -> Result<(Dataset, BuildReport), CoreError> {
  let lines: Vec<(usize, &str)> = csv::content_lines(text).collect();
  if lines.len() < 2 {
    return Err(CoreError::InsufficientData { lines: lines.len() });
  }

  let headers = normalize_headers(tokenize_line(lines[0].1));
  let mut report = BuildReport {
    lines_read: lines.len(),
    ..BuildReport::default()
  };

  let mut records = Vec::with_capacity(lines.len() - 1);
  for (line_no, line) in &lines[1..] {
    let fields = tokenize_line(line);
    if fields.len() != headers.len() {
      report.skipped_lines.push(*line_no);
      continue;
    }
    records.push(Record { fields });
  }
  report.records_built = records.len();

  if !report.skipped_lines.is_empty() {
    debug!(
      skipped = report.skipped_lines.len(),
      columns = headers.len(),
      "dropped lines with mismatched field count"
    );
  }

  Ok((Dataset::from_parts(headers, records), report))
}

/// Build a dataset from rows that arrive already structured (e.g. from a remote store).
///
/// Missing keys become empty strings, non-string JSON values are stringified and keys that
/// are not in `headers` are ignored.
pub fn dataset_from_rows(
  headers: Vec<String>,
  rows: Vec<Map<String, Value>>,
) -> Result<(Dataset, BuildReport), CoreError> {
  if headers.is_empty() {
    return Err(CoreError::InsufficientData { lines: 0 });
  }
  if rows.is_empty() {
    return Err(CoreError::InsufficientData { lines: 1 });
  }

  let records: Vec<Record> = rows
    .iter()
    .map(|row| Record {
      fields: headers
        .iter()
        .map(|h| row.get(h).map(value_to_field).unwrap_or_default())
        .collect(),
    })
    .collect();

  let report = BuildReport {
    lines_read: rows.len() + 1,
    records_built: records.len(),
    skipped_lines: vec![],
  };
  Ok((Dataset::from_parts(normalize_headers(headers), records), report))
}

fn value_to_field(v: &Value) -> String {
  match v {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

/// Empty headers become `col_<i>`; repeats get a `_<i>` suffix so names stay unique.
fn normalize_headers(raw: Vec<String>) -> Vec<String> {
  let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
  let mut out = Vec::with_capacity(raw.len());
  for (i, h) in raw.into_iter().enumerate() {
    let mut name = if h.trim().is_empty() {
      format!("col_{i}")
    } else {
      h
    };
    while seen.contains(&name) {
      name = format!("{name}_{i}");
    }
    seen.insert(name.clone());
    out.push(name);
  }
  out
}
