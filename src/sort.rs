use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::{Dataset, NameMatch, SortDirection, SortKind, SortReport};

/// One row of the comparator table: if any matcher fits the column name, use `kind`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortRule {
  pub matchers: Vec<NameMatch>,
  pub kind: SortKind,
}

/// Ordered comparator table. The first matching rule wins; no match means lexical.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortRules {
  pub rules: Vec<SortRule>,
}

impl Default for SortRules {
  fn default() -> Self {
    Self {
      rules: vec![
        SortRule {
          matchers: vec![
            NameMatch::contains("popularity"),
            NameMatch::contains("duration"),
            NameMatch::equals("disc number"),
            NameMatch::equals("track number"),
          ],
          kind: SortKind::Numeric,
        },
        SortRule {
          matchers: vec![
            NameMatch::contains("added"),
            NameMatch::contains("date"),
            NameMatch::contains("release"),
          ],
          kind: SortKind::Temporal,
        },
      ],
    }
  }
}

impl SortRules {
  pub fn kind_for(&self, column: &str) -> SortKind {
    let lower = column.to_lowercase();
    self
      .rules
      .iter()
      .find(|r| r.matchers.iter().any(|m| m.matches_lower(&lower)))
      .map(|r| r.kind)
      .unwrap_or(SortKind::Lexical)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
  Number(i64),
  Text(String),
}

/// Reorder `working` (dataset ids) by `column` and return the new order.
///
/// The sort is stable in both directions: descending reverses the comparator, not the
/// result, so equal keys keep their previous relative order.
pub fn sort_records(
  dataset: &Dataset,
  working: &[usize],
  column: &str,
  direction: SortDirection,
  rules: &SortRules,
) -> (Vec<usize>, SortReport) {
  let kind = rules.kind_for(column);
  let col = dataset.column_index(column);
  let mut fallbacks = 0usize;

  let keys: Vec<SortKey> = working
    .iter()
    .map(|&id| {
      let raw = col
        .and_then(|c| dataset.record(id).and_then(|r| r.get(c)))
        .unwrap_or("");
      match kind {
        SortKind::Numeric => SortKey::Number(parse_leading_int(raw).unwrap_or_else(|| {
          fallbacks += 1;
          0
        })),
        SortKind::Temporal => SortKey::Number(parse_timestamp_ms(raw).unwrap_or_else(|| {
          fallbacks += 1;
          0
        })),
        SortKind::Lexical => SortKey::Text(raw.to_lowercase()),
      }
    })
    .collect();

  let mut order: Vec<usize> = (0..working.len()).collect();
  order.sort_by(|&a, &b| {
    let o: Ordering = keys[a].cmp(&keys[b]);
    match direction {
      SortDirection::Asc => o,
      SortDirection::Desc => o.reverse(),
    }
  });

  let sorted = order.into_iter().map(|pos| working[pos]).collect();
  (
    sorted,
    SortReport {
      column: column.to_string(),
      direction,
      kind,
      coercion_fallbacks: fallbacks,
    },
  )
}

/// Leading-integer parse: optional whitespace and sign, then digits; anything after the
/// digits is ignored. `None` when no digit is found. Saturates instead of overflowing.
pub fn parse_leading_int(s: &str) -> Option<i64> {
  let t = s.trim_start();
  let (negative, digits) = match t.as_bytes().first() {
    Some(b'-') => (true, &t[1..]),
    Some(b'+') => (false, &t[1..]),
    _ => (false, t),
  };

  let mut value: i64 = 0;
  let mut seen = false;
  for b in digits.bytes() {
    if !b.is_ascii_digit() {
      break;
    }
    seen = true;
    let d = (b - b'0') as i64;
    value = if negative {
      value.saturating_mul(10).saturating_sub(d)
    } else {
      value.saturating_mul(10).saturating_add(d)
    };
  }
  seen.then_some(value)
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y"];

/// Milliseconds since the Unix epoch for a calendar value. Values without an offset are
/// read as UTC. Also takes `2019/05/03` and `May 3, 2019`. Year-only and year-month dates
/// map to the first instant of the period.
pub fn parse_timestamp_ms(s: &str) -> Option<i64> {
  let t = s.trim();
  if t.is_empty() {
    return None;
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
    return Some(dt.timestamp_millis());
  }
  if let Ok(dt) = DateTime::parse_from_rfc2822(t) {
    return Some(dt.timestamp_millis());
  }
  for fmt in NAIVE_DATETIME_FORMATS {
    if let Ok(dt) = NaiveDateTime::parse_from_str(t, fmt) {
      return Some(dt.and_utc().timestamp_millis());
    }
  }
  for fmt in DATE_FORMATS {
    if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
      return date_ms(d);
    }
  }

  let mut parts = t.splitn(2, '-');
  let year = parts.next().filter(|y| all_digits(y, 4))?.parse::<i32>().ok()?;
  let month = match parts.next() {
    None => 1,
    Some(m) if all_digits(m, 2) => m.parse::<u32>().ok()?,
    Some(_) => return None,
  };
  NaiveDate::from_ymd_opt(year, month, 1).and_then(date_ms)
}

fn all_digits(s: &str, len: usize) -> bool {
  s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

fn date_ms(d: NaiveDate) -> Option<i64> {
  d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis())
}
