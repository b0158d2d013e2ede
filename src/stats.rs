use std::collections::HashSet;

use crate::{
  models::{Dataset, LibraryStats, TrackCard},
  projection::{find_header, CardAliases},
  sort::parse_leading_int,
};

/// Summary numbers over the records in `ids`. A stat is `None` when its column is absent.
pub fn library_stats(dataset: &Dataset, ids: &[usize], aliases: &CardAliases) -> LibraryStats {
  let headers = dataset.headers();
  let column =
    |names: &[String]| find_header(headers, names).and_then(|h| dataset.column_index(h));
  let values = move |col: usize| {
    ids
      .iter()
      .filter_map(move |&id| dataset.record(id).and_then(|r| r.get(col)))
  };

  let unique_artists = column(&aliases.artist).map(|col| {
    let mut artists: HashSet<&str> = HashSet::new();
    for v in values(col) {
      artists.extend(v.split(',').map(str::trim).filter(|a| !a.is_empty()));
    }
    artists.len()
  });

  let unique_albums = column(&aliases.album).map(|col| {
    values(col)
      .filter(|v| !v.is_empty())
      .collect::<HashSet<&str>>()
      .len()
  });

  let total_duration_ms = column(&aliases.duration).map(|col| {
    values(col)
      .map(|v| parse_leading_int(v).unwrap_or(0))
      .fold(0i64, i64::saturating_add)
  });

  LibraryStats {
    total_records: ids.len(),
    unique_artists,
    unique_albums,
    total_duration_ms,
  }
}

pub fn track_card(dataset: &Dataset, id: usize, aliases: &CardAliases) -> Option<TrackCard> {
  let record = dataset.record(id)?;
  let headers = dataset.headers();
  let field = |names: &[String]| {
    find_header(headers, names)
      .and_then(|h| dataset.column_index(h))
      .and_then(|c| record.get(c))
  };
  let non_empty = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_string);

  Some(TrackCard {
    id,
    track_name: field(&aliases.track).unwrap_or("Unknown Track").to_string(),
    artist_name: field(&aliases.artist).unwrap_or("Unknown Artist").to_string(),
    album_name: field(&aliases.album).unwrap_or("Unknown Album").to_string(),
    image_url: non_empty(field(&aliases.image)),
    preview_url: non_empty(field(&aliases.preview)),
  })
}

/// Friendlier column titles for a few well-known headers.
pub fn display_name(header: &str) -> &str {
  match header {
    "Track Duration (ms)" => "Duration",
    "Artist Name(s)" => "Artist",
    "Album Name" => "Album",
    other => other,
  }
}

/// Library-length duration, e.g. `3h 12m` or `45m`.
pub fn format_duration(ms: i64) -> String {
  let total_seconds = ms.max(0) / 1000;
  let hours = total_seconds / 3600;
  let minutes = (total_seconds % 3600) / 60;
  if hours > 0 {
    format!("{hours}h {minutes}m")
  } else {
    format!("{minutes}m")
  }
}

/// Track-length duration, e.g. `3:07`.
pub fn format_track_duration(ms: i64) -> String {
  let total_seconds = ms.max(0) / 1000;
  format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}
