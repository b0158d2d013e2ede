use std::{
  collections::HashMap,
  path::Path,
  sync::Arc,
  time::{SystemTime, UNIX_EPOCH},
};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  formats,
  models::{
    BuildReport, DisplayMode, FileFormat, LibraryStats, PageWindow, RecentImport, SessionInfo,
    SortReport, TrackCard, ViewKind, ViewState,
  },
  session::{Session, SessionOptions},
  storage::{Storage, StorageOptions},
};

#[derive(Debug, Error)]
pub enum CoreError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
  #[error("insufficient data: {lines} usable line(s), need a header and at least one row")]
  InsufficientData { lines: usize },
  #[error("unsupported format: {0:?}")]
  UnsupportedFormat(FileFormat),
  #[error("unknown session: {0}")]
  UnknownSession(String),
  #[error("page {page} out of range (1..={total_pages})")]
  PageOutOfRange { page: usize, total_pages: usize },
  #[error("bad view token: {0}")]
  BadToken(String),
  #[error("invalid argument: {0}")]
  InvalidArg(String),
  #[error("storage error: {0}")]
  Storage(String),
}

#[derive(Debug, Clone, Default)]
pub struct CoreOptions {
  /// Defaults for new sessions; stored preferences override the view settings.
  pub session: SessionOptions,
  pub storage: StorageOptions,
}

struct SessionEntry {
  info: SessionInfo,
  session: Session,
}

/// Entry point for the presentation layer: owns sessions by id and remembers view
/// preferences and recent imports.
#[derive(Clone)]
pub struct CoreEngine {
  options: CoreOptions,
  sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
  storage: Storage,
}

impl CoreEngine {
  pub fn new(options: CoreOptions) -> Result<Self, CoreError> {
    let storage = Storage::new(options.storage.clone()).map_err(CoreError::Storage)?;
    Ok(Self {
      options,
      sessions: Arc::new(Mutex::new(HashMap::new())),
      storage,
    })
  }

  /// IPC API: open_file(path) -> { session, first_window }
  ///
  /// Reads the whole file; invalid UTF-8 is replaced rather than rejected.
  pub fn open_file(&self, path: impl AsRef<Path>) -> Result<(SessionInfo, PageWindow), CoreError> {
    let path = path.as_ref();
    let format = formats::detect_format(path);
    if format != FileFormat::Csv {
      return Err(CoreError::UnsupportedFormat(format));
    }
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    self.open_text(&path.to_string_lossy(), &text)
  }

  /// IPC API: open_text(source, text) -> { session, first_window }
  ///
  /// `source` is only a label (file name, bundled sample, fetched URL).
  pub fn open_text(
    &self,
    source: &str,
    text: &str,
  ) -> Result<(SessionInfo, PageWindow), CoreError> {
    let mut session = self.new_session()?;
    let report = session.install_text(text)?;
    Ok(self.register(source, FileFormat::Csv, session, &report))
  }

  /// IPC API: open_records(source, headers, rows) -> { session, first_window }
  pub fn open_records(
    &self,
    source: &str,
    headers: Vec<String>,
    rows: Vec<Map<String, Value>>,
  ) -> Result<(SessionInfo, PageWindow), CoreError> {
    let mut session = self.new_session()?;
    let report = session.install_records(headers, rows)?;
    Ok(self.register(source, FileFormat::Unknown, session, &report))
  }

  /// Replace the dataset of an existing session. A failed parse leaves it untouched.
  pub fn reimport_text(&self, session_id: &str, text: &str) -> Result<PageWindow, CoreError> {
    self.with_session(session_id, |s| {
      s.install_text(text)?;
      Ok(s.current_window())
    })?
  }

  pub fn close(&self, session_id: &str) -> Result<(), CoreError> {
    self
      .sessions
      .lock()
      .remove(session_id)
      .map(|_| ())
      .ok_or_else(|| CoreError::UnknownSession(session_id.to_string()))
  }

  pub fn session_info(&self, session_id: &str) -> Result<SessionInfo, CoreError> {
    let sessions = self.sessions.lock();
    sessions
      .get(session_id)
      .map(|e| e.info.clone())
      .ok_or_else(|| CoreError::UnknownSession(session_id.to_string()))
  }

  /// IPC API: set_query(session_id, query) -> first window of the filtered view
  pub fn set_query(&self, session_id: &str, query: &str) -> Result<PageWindow, CoreError> {
    self.with_session(session_id, |s| {
      s.set_query(query);
      s.current_window()
    })
  }

  /// IPC API: sort_by(session_id, column) -> (sort report, first window)
  pub fn sort_by(
    &self,
    session_id: &str,
    column: &str,
  ) -> Result<(SortReport, PageWindow), CoreError> {
    self.with_session(session_id, |s| {
      let report = s.sort_by(column);
      (report, s.current_window())
    })
  }

  /// IPC API: project_columns(session_id) -> display headers
  pub fn project_columns(&self, session_id: &str) -> Result<Vec<String>, CoreError> {
    self.with_session(session_id, |s| s.project_columns())
  }

  /// IPC API: get_page(session_id, page) -> PageWindow
  pub fn get_page(&self, session_id: &str, page: usize) -> Result<PageWindow, CoreError> {
    self.with_session(session_id, |s| s.get_page(page))?
  }

  /// IPC API: advance_page(session_id) -> next window, or None at the end
  pub fn advance_page(&self, session_id: &str) -> Result<Option<PageWindow>, CoreError> {
    self.with_session(session_id, |s| s.advance_page())
  }

  pub fn current_window(&self, session_id: &str) -> Result<PageWindow, CoreError> {
    self.with_session(session_id, |s| s.current_window())
  }

  pub fn set_page_size(&self, session_id: &str, page_size: usize) -> Result<PageWindow, CoreError> {
    let window = self.with_session(session_id, |s| s.set_page_size(page_size))??;
    self.persist_preferences(session_id);
    Ok(window)
  }

  pub fn set_display_mode(
    &self,
    session_id: &str,
    mode: DisplayMode,
  ) -> Result<PageWindow, CoreError> {
    let window = self.with_session(session_id, |s| s.set_display_mode(mode))?;
    self.persist_preferences(session_id);
    Ok(window)
  }

  pub fn set_view_kind(&self, session_id: &str, kind: ViewKind) -> Result<Vec<String>, CoreError> {
    let columns = self.with_session(session_id, |s| s.set_view_kind(kind))?;
    self.persist_preferences(session_id);
    Ok(columns)
  }

  pub fn view_state(&self, session_id: &str) -> Result<ViewState, CoreError> {
    self.with_session(session_id, |s| s.view_state())
  }

  pub fn stats(&self, session_id: &str) -> Result<LibraryStats, CoreError> {
    self.with_session(session_id, |s| s.stats())
  }

  pub fn track_card(
    &self,
    session_id: &str,
    record_id: usize,
  ) -> Result<Option<TrackCard>, CoreError> {
    self.with_session(session_id, |s| s.track_card(record_id))
  }

  pub fn record_detail(
    &self,
    session_id: &str,
    record_id: usize,
  ) -> Result<Option<Value>, CoreError> {
    self.with_session(session_id, |s| s.record_detail(record_id))
  }

  pub fn build_report(&self, session_id: &str) -> Result<BuildReport, CoreError> {
    self.with_session(session_id, |s| s.build_report().clone())
  }

  /// IPC API: save_view(session_id) -> opaque token
  pub fn save_view(&self, session_id: &str) -> Result<String, CoreError> {
    self.with_session(session_id, |s| s.save_view())
  }

  /// IPC API: restore_view(session_id, token) -> window
  pub fn restore_view(&self, session_id: &str, token: &str) -> Result<PageWindow, CoreError> {
    self.with_session(session_id, |s| s.restore_view(token))?
  }

  /// Clear the session back to its empty state (no dataset).
  pub fn reset(&self, session_id: &str) -> Result<PageWindow, CoreError> {
    self.with_session(session_id, |s| {
      s.reset();
      s.current_window()
    })
  }

  pub fn recent_imports(&self, limit: usize) -> Result<Vec<RecentImport>, CoreError> {
    self.storage.list_recent(limit).map_err(CoreError::Storage)
  }

  pub fn storage(&self) -> &Storage {
    &self.storage
  }

  fn new_session(&self) -> Result<Session, CoreError> {
    let mut options = self.options.session.clone();
    match self.storage.load_preferences() {
      Ok(Some(prefs)) => options = options.with_preferences(prefs),
      Ok(None) => {}
      Err(e) => warn!(error = %e, "could not load view preferences"),
    }
    Session::new(options)
  }

  fn register(
    &self,
    source: &str,
    format: FileFormat,
    session: Session,
    report: &BuildReport,
  ) -> (SessionInfo, PageWindow) {
    let info = SessionInfo {
      session_id: Uuid::new_v4().to_string(),
      source: source.to_string(),
      format,
      created_at_ms: now_ms(),
      record_count: report.records_built as u64,
      skipped_lines: report.skipped_lines.len() as u64,
    };

    if let Err(e) = self.storage.touch_recent(source, info.record_count) {
      warn!(error = %e, source, "could not record recent import");
    }

    info!(session = %info.session_id, source, records = info.record_count, "session opened");
    let first = session.current_window();
    self.sessions.lock().insert(
      info.session_id.clone(),
      SessionEntry {
        info: info.clone(),
        session,
      },
    );
    (info, first)
  }

  fn with_session<R>(
    &self,
    session_id: &str,
    f: impl FnOnce(&mut Session) -> R,
  ) -> Result<R, CoreError> {
    let mut sessions = self.sessions.lock();
    let entry = sessions
      .get_mut(session_id)
      .ok_or_else(|| CoreError::UnknownSession(session_id.to_string()))?;
    let out = f(&mut entry.session);
    let report = entry.session.build_report();
    entry.info.record_count = report.records_built as u64;
    entry.info.skipped_lines = report.skipped_lines.len() as u64;
    Ok(out)
  }

  fn persist_preferences(&self, session_id: &str) {
    let prefs = match self.with_session(session_id, |s| s.preferences()) {
      Ok(p) => p,
      Err(_) => return,
    };
    if let Err(e) = self.storage.save_preferences(&prefs) {
      warn!(error = %e, "could not save view preferences");
    }
  }
}

fn now_ms() -> i64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
    .as_millis() as i64
}
