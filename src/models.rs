use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
  Csv,
  Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
  pub session_id: String,
  /// File path, sample name or remote label the dataset came from.
  pub source: String,
  pub format: FileFormat,
  pub created_at_ms: i64,
  pub record_count: u64,
  pub skipped_lines: u64,
}

/// One row of a dataset. Field `i` belongs to header `i` of the owning [`Dataset`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
  pub fields: Vec<String>,
}

impl Record {
  pub fn get(&self, column: usize) -> Option<&str> {
    self.fields.get(column).map(String::as_str)
  }
}

/// Headers plus records of one import. Immutable once built; a new import replaces it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dataset {
  headers: Vec<String>,
  records: Vec<Record>,
}

impl Dataset {
  /// Caller guarantees every record has `headers.len()` fields.
  pub(crate) fn from_parts(headers: Vec<String>, records: Vec<Record>) -> Self {
    Self { headers, records }
  }

  pub fn headers(&self) -> &[String] {
    &self.headers
  }

  pub fn records(&self) -> &[Record] {
    &self.records
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  pub fn record(&self, id: usize) -> Option<&Record> {
    self.records.get(id)
  }

  /// Exact header lookup.
  pub fn column_index(&self, name: &str) -> Option<usize> {
    self.headers.iter().position(|h| h == name)
  }

  /// Value of `column` in record `id`; missing columns read as an empty string.
  pub fn value(&self, id: usize, column: &str) -> &str {
    match (self.record(id), self.column_index(column)) {
      (Some(r), Some(c)) => r.get(c).unwrap_or(""),
      _ => "",
    }
  }

  /// Record `id` as a JSON object keyed by header, in header order.
  pub fn record_json(&self, id: usize) -> Option<serde_json::Value> {
    let record = self.record(id)?;
    let mut obj = serde_json::Map::new();
    for (h, v) in self.headers.iter().zip(record.fields.iter()) {
      obj.insert(h.clone(), serde_json::Value::String(v.clone()));
    }
    Some(serde_json::Value::Object(obj))
  }
}

/// Diagnostics of one dataset build. Skipped lines are never surfaced as errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildReport {
  /// Non-blank lines seen, header included.
  pub lines_read: usize,
  pub records_built: usize,
  /// 1-based line numbers (in the raw input) dropped for a field-count mismatch.
  pub skipped_lines: Vec<usize>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
  Asc,
  Desc,
}

impl SortDirection {
  pub fn flipped(self) -> Self {
    match self {
      SortDirection::Asc => SortDirection::Desc,
      SortDirection::Desc => SortDirection::Asc,
    }
  }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortKind {
  Numeric,
  Temporal,
  Lexical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
  #[default]
  Windowed,
  Infinite,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
  #[default]
  Table,
  Grid,
}

/// Case-insensitive predicate over a header name, used by sort and projection rule tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "type", content = "text")]
pub enum NameMatch {
  Equals(String),
  Contains(String),
}

impl NameMatch {
  pub fn equals(s: &str) -> Self {
    NameMatch::Equals(s.to_lowercase())
  }

  pub fn contains(s: &str) -> Self {
    NameMatch::Contains(s.to_lowercase())
  }

  /// `lower` must already be lowercased.
  pub fn matches_lower(&self, lower: &str) -> bool {
    match self {
      NameMatch::Equals(t) => lower == t,
      NameMatch::Contains(t) => lower.contains(t.as_str()),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortReport {
  pub column: String,
  pub direction: SortDirection,
  pub kind: SortKind,
  /// Values that failed numeric/temporal parsing and were compared as 0 / epoch.
  pub coercion_fallbacks: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowRow {
  /// Index of the record in the dataset.
  pub id: usize,
  /// Position in the working sequence.
  pub position: usize,
  pub fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageWindow {
  pub page: usize,
  pub total_pages: usize,
  pub page_size: usize,
  /// Working-sequence range covered by `rows`.
  pub start: usize,
  pub end: usize,
  pub total_records: usize,
  pub has_more: bool,
  /// True when `rows` should be appended to what is already shown (infinite scroll).
  pub append: bool,
  pub rows: Vec<WindowRow>,
}

/// Read-only snapshot of a session's view settings for the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewState {
  pub query: String,
  pub sort_column: Option<String>,
  pub sort_direction: SortDirection,
  pub page: usize,
  pub page_size: usize,
  pub total_pages: usize,
  pub working_len: usize,
  pub dataset_len: usize,
  pub display_mode: DisplayMode,
  pub view_kind: ViewKind,
}

/// Settings remembered across sessions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewPreferences {
  pub page_size: usize,
  pub display_mode: DisplayMode,
  pub view_kind: ViewKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryStats {
  pub total_records: usize,
  pub unique_artists: Option<usize>,
  pub unique_albums: Option<usize>,
  pub total_duration_ms: Option<i64>,
}

/// The fields a grid card shows for one record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackCard {
  pub id: usize,
  pub track_name: String,
  pub artist_name: String,
  pub album_name: String,
  pub image_url: Option<String>,
  pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentImport {
  pub source: String,
  pub display_name: String,
  pub last_opened_at_ms: i64,
  pub record_count: u64,
}
