use serde::{Deserialize, Serialize};

use crate::models::NameMatch;

/// Which headers a table view surfaces, and in what order.
///
/// The defaults are tuned to playlist exports (track/album/artist columns); other shapes
/// can supply their own lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectionConfig {
  /// Shown first, in this order, when present (case-insensitive equality).
  pub priority: Vec<String>,
  /// Never shown after the priority pass.
  pub excluded: Vec<NameMatch>,
  pub max_columns: usize,
}

impl Default for ProjectionConfig {
  fn default() -> Self {
    let excluded_names = [
      "added at",
      "added by",
      "artist name(s)",
      "artist name",
      "artists",
      "artist",
      "album artist name(s)",
      "album artist name",
      "album artists",
      "album release date",
      "release date",
      "disc number",
      "track number",
      "isrc",
      "spotify id",
      "explicit",
      "explicit?",
    ];
    let mut excluded: Vec<NameMatch> =
      excluded_names.iter().map(|n| NameMatch::equals(n)).collect();
    excluded.extend(["image", "uri", "url"].iter().map(|n| NameMatch::contains(n)));

    Self {
      priority: ["Track Name", "Album Name", "Track Duration (ms)", "Popularity"]
        .iter()
        .map(|s| s.to_string())
        .collect(),
      excluded,
      max_columns: 5,
    }
  }
}

impl ProjectionConfig {
  pub fn project(&self, headers: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(self.max_columns);

    for p in &self.priority {
      if out.len() >= self.max_columns {
        break;
      }
      let wanted = p.to_lowercase();
      if let Some(found) = headers.iter().find(|h| h.to_lowercase() == wanted) {
        if !out.contains(found) {
          out.push(found.clone());
        }
      }
    }

    for h in headers {
      if out.len() >= self.max_columns {
        break;
      }
      if out.contains(h) {
        continue;
      }
      let lower = h.to_lowercase();
      if self.excluded.iter().any(|m| m.matches_lower(&lower)) {
        continue;
      }
      out.push(h.clone());
    }

    out
  }
}

/// Header lists tried, in order, to locate each grid-card field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardAliases {
  pub track: Vec<String>,
  pub artist: Vec<String>,
  pub album: Vec<String>,
  pub image: Vec<String>,
  pub preview: Vec<String>,
  pub duration: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
  list.iter().map(|s| s.to_string()).collect()
}

impl Default for CardAliases {
  fn default() -> Self {
    Self {
      track: names(&["Track Name", "Name", "Track", "title"]),
      artist: names(&["Artist Name(s)", "Artist Name", "Artists", "artist"]),
      album: names(&["Album Name", "Album", "album"]),
      image: names(&["Album Image URL", "Image URL", "image"]),
      preview: names(&["Track Preview URL", "Preview URL", "preview_url", "Preview"]),
      duration: names(&["Track Duration (ms)", "Duration (ms)", "duration_ms", "Duration"]),
    }
  }
}

impl CardAliases {
  /// Columns a grid card reads from, in card order, skipping fields with no header.
  pub fn card_columns(&self, headers: &[String]) -> Vec<String> {
    [&self.track, &self.artist, &self.album, &self.image, &self.preview]
      .into_iter()
      .filter_map(|aliases| find_header(headers, aliases.as_slice()))
      .map(str::to_string)
      .collect()
  }
}

/// First header equal (ignoring case) to any of `aliases`. Header order wins over alias order.
pub fn find_header<'a, S: AsRef<str>>(headers: &'a [String], aliases: &[S]) -> Option<&'a str> {
  headers
    .iter()
    .find(|h| {
      let lower = h.to_lowercase();
      aliases.iter().any(|a| a.as_ref().to_lowercase() == lower)
    })
    .map(String::as_str)
}
