mod engine;
mod formats;
mod models;
mod pager;
mod projection;
mod search_match;
mod session;
mod sort;
mod stats;
mod storage;
mod token;

pub use crate::engine::{CoreEngine, CoreOptions};
pub use crate::formats::{build_dataset, dataset_from_rows, tokenize_line};
pub use crate::models::{
  BuildReport, Dataset, DisplayMode, FileFormat, LibraryStats, NameMatch, PageWindow, RecentImport,
  Record, SessionInfo, SortDirection, SortKind, SortReport, TrackCard, ViewKind, ViewPreferences,
  ViewState, WindowRow,
};
pub use crate::pager::{PageSpan, Pager};
pub use crate::projection::{find_header, CardAliases, ProjectionConfig};
pub use crate::search_match::filter_records;
pub use crate::session::{Session, SessionOptions};
pub use crate::sort::{parse_leading_int, parse_timestamp_ms, sort_records, SortRule, SortRules};
pub use crate::stats::{
  display_name, format_duration, format_track_duration, library_stats, track_card,
};
pub use crate::storage::{Storage, StorageOptions};
pub use crate::token::{decode_view, encode_view, SavedView};

pub use crate::engine::CoreError;
