use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{
  engine::CoreError,
  formats,
  models::{
    BuildReport, Dataset, DisplayMode, LibraryStats, PageWindow, SortDirection, SortReport,
    TrackCard, ViewKind, ViewPreferences, ViewState, WindowRow,
  },
  pager::{PageSpan, Pager},
  projection::{CardAliases, ProjectionConfig},
  search_match, sort,
  sort::SortRules,
  stats,
  token::{self, SavedView},
};

#[derive(Debug, Clone)]
pub struct SessionOptions {
  pub page_size: usize,
  pub display_mode: DisplayMode,
  pub view_kind: ViewKind,
  pub projection: ProjectionConfig,
  pub sort_rules: SortRules,
  pub card_aliases: CardAliases,
}

impl Default for SessionOptions {
  fn default() -> Self {
    Self {
      page_size: 20,
      display_mode: DisplayMode::Windowed,
      view_kind: ViewKind::Table,
      projection: ProjectionConfig::default(),
      sort_rules: SortRules::default(),
      card_aliases: CardAliases::default(),
    }
  }
}

impl SessionOptions {
  pub fn with_preferences(mut self, prefs: ViewPreferences) -> Self {
    if prefs.page_size > 0 {
      self.page_size = prefs.page_size;
    }
    self.display_mode = prefs.display_mode;
    self.view_kind = prefs.view_kind;
    self
  }
}

#[derive(Debug, Clone)]
struct ActiveSort {
  column: String,
  direction: SortDirection,
}

/// One browsing context: the installed dataset plus everything derived from it.
///
/// The working sequence holds dataset ids. Query and sort changes swap in a new sequence
/// rather than reordering the old one, so windows handed out earlier stay valid.
#[derive(Debug, Clone)]
pub struct Session {
  options: SessionOptions,
  dataset: Arc<Dataset>,
  working: Arc<Vec<usize>>,
  query: String,
  sort: Option<ActiveSort>,
  pager: Pager,
  view_kind: ViewKind,
  last_build: BuildReport,
  last_sort: Option<SortReport>,
}

impl Session {
  pub fn new(options: SessionOptions) -> Result<Self, CoreError> {
    let pager = Pager::new(options.page_size, options.display_mode)?;
    Ok(Self {
      view_kind: options.view_kind,
      options,
      dataset: Arc::new(Dataset::default()),
      working: Arc::new(Vec::new()),
      query: String::new(),
      sort: None,
      pager,
      last_build: BuildReport::default(),
      last_sort: None,
    })
  }

  pub fn dataset(&self) -> &Arc<Dataset> {
    &self.dataset
  }

  /// Dataset ids in display order.
  pub fn working(&self) -> &[usize] {
    &self.working
  }

  pub fn build_report(&self) -> &BuildReport {
    &self.last_build
  }

  pub fn last_sort(&self) -> Option<&SortReport> {
    self.last_sort.as_ref()
  }

  /// Parse `text` and install it. On error the previous dataset and view stay in place.
  pub fn install_text(&mut self, text: &str) -> Result<BuildReport, CoreError> {
    let (dataset, report) = formats::build_dataset(text)?;
    self.install(dataset, report.clone());
    Ok(report)
  }

  /// Install rows that arrive already structured, bypassing text parsing.
  pub fn install_records(
    &mut self,
    headers: Vec<String>,
    rows: Vec<Map<String, Value>>,
  ) -> Result<BuildReport, CoreError> {
    let (dataset, report) = formats::dataset_from_rows(headers, rows)?;
    self.install(dataset, report.clone());
    Ok(report)
  }

  fn install(&mut self, dataset: Dataset, report: BuildReport) {
    info!(
      records = dataset.len(),
      columns = dataset.headers().len(),
      skipped = report.skipped_lines.len(),
      "dataset installed"
    );
    self.working = Arc::new((0..dataset.len()).collect());
    self.dataset = Arc::new(dataset);
    self.last_build = report;
    self.reset_view();
  }

  /// Drop the dataset and return to the empty state.
  pub fn reset(&mut self) {
    self.dataset = Arc::new(Dataset::default());
    self.working = Arc::new(Vec::new());
    self.last_build = BuildReport::default();
    self.reset_view();
  }

  fn reset_view(&mut self) {
    self.query.clear();
    self.sort = None;
    self.last_sort = None;
    self.pager.reset();
  }

  /// Recompute the working sequence from the full dataset. Any previous sort order is
  /// discarded; the active sort column is remembered so the next `sort_by` still toggles.
  pub fn set_query(&mut self, query: &str) -> &[usize] {
    self.query = query.to_string();
    self.working = Arc::new(search_match::filter_records(&self.dataset, query));
    self.pager.reset();
    debug!(query, matches = self.working.len(), "query applied");
    &self.working
  }

  /// Sort by `column`: a new column starts descending, the same column flips direction.
  pub fn sort_by(&mut self, column: &str) -> SortReport {
    let direction = match &self.sort {
      Some(s) if s.column == column => s.direction.flipped(),
      _ => SortDirection::Desc,
    };
    self.sort_by_direction(column, direction)
  }

  /// Sort by `column` in an explicit direction, making it the active sort.
  pub fn sort_by_direction(&mut self, column: &str, direction: SortDirection) -> SortReport {
    let (order, report) = sort::sort_records(
      &self.dataset,
      &self.working,
      column,
      direction,
      &self.options.sort_rules,
    );
    self.working = Arc::new(order);
    self.sort = Some(ActiveSort {
      column: column.to_string(),
      direction,
    });
    self.pager.reset();
    debug!(
      column,
      ?direction,
      kind = ?report.kind,
      fallbacks = report.coercion_fallbacks,
      "records sorted"
    );
    self.last_sort = Some(report.clone());
    report
  }

  /// Columns to show for the current view kind: the projected table columns, or the
  /// fields a grid card reads.
  pub fn project_columns(&self) -> Vec<String> {
    match self.view_kind {
      ViewKind::Table => self.options.projection.project(self.dataset.headers()),
      ViewKind::Grid => self.options.card_aliases.card_columns(self.dataset.headers()),
    }
  }

  pub fn current_window(&self) -> PageWindow {
    self.window(self.pager.current(self.working.len()))
  }

  /// Jump to `page` (1-based). Out-of-range pages are rejected without changing state.
  pub fn get_page(&mut self, page: usize) -> Result<PageWindow, CoreError> {
    let span = self.pager.go_to(self.working.len(), page)?;
    Ok(self.window(span))
  }

  /// Next page: a replacement window in windowed mode, rows to append in infinite mode.
  /// `None` once the last page has been reached.
  pub fn advance_page(&mut self) -> Option<PageWindow> {
    let span = self.pager.advance(self.working.len())?;
    Some(self.window(span))
  }

  pub fn set_page_size(&mut self, page_size: usize) -> Result<PageWindow, CoreError> {
    self.pager.set_page_size(page_size)?;
    Ok(self.current_window())
  }

  pub fn set_display_mode(&mut self, mode: DisplayMode) -> PageWindow {
    self.pager.set_mode(mode);
    self.current_window()
  }

  /// Switching view kind only changes the projection; data and page are kept.
  pub fn set_view_kind(&mut self, kind: ViewKind) -> Vec<String> {
    self.view_kind = kind;
    self.project_columns()
  }

  pub fn view_state(&self) -> ViewState {
    let len = self.working.len();
    ViewState {
      query: self.query.clone(),
      sort_column: self.sort.as_ref().map(|s| s.column.clone()),
      sort_direction: self
        .sort
        .as_ref()
        .map(|s| s.direction)
        .unwrap_or(SortDirection::Desc),
      page: self.pager.page(),
      page_size: self.pager.page_size(),
      total_pages: self.pager.total_pages(len),
      working_len: len,
      dataset_len: self.dataset.len(),
      display_mode: self.pager.mode(),
      view_kind: self.view_kind,
    }
  }

  pub fn preferences(&self) -> ViewPreferences {
    ViewPreferences {
      page_size: self.pager.page_size(),
      display_mode: self.pager.mode(),
      view_kind: self.view_kind,
    }
  }

  /// Stats over the working sequence (what the user currently sees, across all pages).
  pub fn stats(&self) -> LibraryStats {
    stats::library_stats(&self.dataset, &self.working, &self.options.card_aliases)
  }

  pub fn track_card(&self, id: usize) -> Option<TrackCard> {
    stats::track_card(&self.dataset, id, &self.options.card_aliases)
  }

  /// Full record as a header-keyed JSON object, for detail views.
  pub fn record_detail(&self, id: usize) -> Option<Value> {
    self.dataset.record_json(id)
  }

  pub fn save_view(&self) -> String {
    token::encode_view(&SavedView {
      view: self.view_kind,
      query: self.query.clone(),
      sort_column: self.sort.as_ref().map(|s| s.column.clone()),
      sort_direction: self.sort.as_ref().map(|s| s.direction),
      page: self.pager.page(),
    })
  }

  /// Re-apply a token from [`Session::save_view`] to the current dataset. A page beyond
  /// the restored result falls back to page 1.
  pub fn restore_view(&mut self, view_token: &str) -> Result<PageWindow, CoreError> {
    let saved = token::decode_view(view_token)?;
    self.view_kind = saved.view;
    self.set_query(&saved.query);
    if let Some(column) = &saved.sort_column {
      self.sort_by_direction(column, saved.sort_direction.unwrap_or(SortDirection::Desc));
    }
    if self.pager.go_to(self.working.len(), saved.page).is_err() {
      self.pager.reset();
    }
    Ok(self.current_window())
  }

  fn window(&self, span: PageSpan) -> PageWindow {
    let rows = self.working[span.range.clone()]
      .iter()
      .enumerate()
      .map(|(i, &id)| WindowRow {
        id,
        position: span.range.start + i,
        fields: self
          .dataset
          .record(id)
          .map(|r| r.fields.clone())
          .unwrap_or_default(),
      })
      .collect();
    PageWindow {
      page: span.page,
      total_pages: span.total_pages,
      page_size: self.pager.page_size(),
      start: span.range.start,
      end: span.range.end,
      total_records: self.working.len(),
      has_more: span.has_more(),
      append: span.append,
      rows,
    }
  }
}
