use crate::models::{Dataset, Record};

/// A case-folded query, ready to be matched against many records.
#[derive(Debug, Clone)]
pub(crate) struct PreparedSearch {
  q: String,
}

impl PreparedSearch {
  /// `None` for a blank query, which means "everything matches".
  pub(crate) fn new(text: &str) -> Option<Self> {
    if text.trim().is_empty() {
      return None;
    }
    Some(Self {
      q: text.to_lowercase(),
    })
  }

  pub(crate) fn matches(&self, record: &Record) -> bool {
    record
      .fields
      .iter()
      .any(|f| f.to_lowercase().contains(&self.q))
  }
}

/// Ids of every dataset record matching `query`, in dataset order.
///
/// Always evaluated against the full dataset, so a new query replaces the previous
/// result instead of narrowing it.
pub fn filter_records(dataset: &Dataset, query: &str) -> Vec<usize> {
  match PreparedSearch::new(query) {
    None => (0..dataset.len()).collect(),
    Some(prepared) => dataset
      .records()
      .iter()
      .enumerate()
      .filter(|(_, r)| prepared.matches(r))
      .map(|(id, _)| id)
      .collect(),
  }
}
