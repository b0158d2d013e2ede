use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::{
  engine::CoreError,
  models::{SortDirection, ViewKind},
};

/// The shareable part of a view: enough to rebuild the same window over the same dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedView {
  #[serde(default)]
  pub view: ViewKind,
  #[serde(default)]
  pub query: String,
  #[serde(default)]
  pub sort_column: Option<String>,
  #[serde(default)]
  pub sort_direction: Option<SortDirection>,
  #[serde(default = "first_page")]
  pub page: usize,
}

fn first_page() -> usize {
  1
}

/// Opaque, URL-safe token for a saved view.
pub fn encode_view(v: &SavedView) -> String {
  let json = serde_json::to_vec(v).unwrap_or_default();
  base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(json)
}

pub fn decode_view(token: &str) -> Result<SavedView, CoreError> {
  let t = token.trim();
  if t.is_empty() {
    return Err(CoreError::BadToken("empty token".into()));
  }
  let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
    .decode(t)
    .map_err(|e| CoreError::BadToken(e.to_string()))?;
  serde_json::from_slice(&bytes).map_err(|e| CoreError::BadToken(e.to_string()))
}
