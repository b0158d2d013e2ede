use std::{
  fs,
  path::{Path, PathBuf},
  time::{SystemTime, UNIX_EPOCH},
};

use rusqlite::{params, Connection};

use crate::models::{RecentImport, ViewPreferences};

const PREFERENCES_KEY: &str = "view_preferences";

#[derive(Debug, Clone, Default)]
pub struct StorageOptions {
  /// Path to SQLite file. If None, defaults to ~/.libview/storage.sqlite
  /// (or %USERPROFILE% on Windows).
  pub sqlite_path: Option<PathBuf>,
}

#[derive(Clone)]
pub struct Storage {
  path: PathBuf,
}

impl Storage {
  pub fn new(opts: StorageOptions) -> Result<Self, String> {
    let path = opts
      .sqlite_path
      .unwrap_or_else(default_sqlite_path)
      .to_path_buf();

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }

    let conn = Connection::open(&path).map_err(|e| e.to_string())?;
    migrate(&conn).map_err(|e| e.to_string())?;
    Ok(Self { path })
  }

  fn open(&self) -> Result<Connection, String> {
    Connection::open(&self.path).map_err(|e| e.to_string())
  }

  /// Add/update a recent import entry. `source` is a path or any other label.
  pub fn touch_recent(&self, source: &str, record_count: u64) -> Result<(), String> {
    let conn = self.open()?;
    let now = now_ms();
    let display_name = Path::new(source)
      .file_name()
      .and_then(|s| s.to_str())
      .unwrap_or(source)
      .to_string();

    conn
      .execute(
        r#"
INSERT INTO recent_imports(source, display_name, last_opened_at, record_count)
VALUES(?1, ?2, ?3, ?4)
ON CONFLICT(source) DO UPDATE SET
  display_name=excluded.display_name,
  last_opened_at=excluded.last_opened_at,
  record_count=excluded.record_count
        "#,
        params![source, display_name, now, record_count as i64],
      )
      .map_err(|e| e.to_string())?;
    Ok(())
  }

  pub fn list_recent(&self, limit: usize) -> Result<Vec<RecentImport>, String> {
    let conn = self.open()?;
    let mut stmt = conn
      .prepare(
        r#"
SELECT source, display_name, last_opened_at, record_count
FROM recent_imports
ORDER BY last_opened_at DESC, id DESC
LIMIT ?1
        "#,
      )
      .map_err(|e| e.to_string())?;

    let rows = stmt
      .query_map(params![limit as i64], |row| {
        Ok(RecentImport {
          source: row.get(0)?,
          display_name: row.get(1)?,
          last_opened_at_ms: row.get(2)?,
          record_count: row.get::<_, i64>(3)?.max(0) as u64,
        })
      })
      .map_err(|e| e.to_string())?;

    let mut out = Vec::new();
    for r in rows {
      out.push(r.map_err(|e| e.to_string())?);
    }
    Ok(out)
  }

  pub fn set_setting_json(&self, key: &str, value_json: &str) -> Result<(), String> {
    let conn = self.open()?;
    conn
      .execute(
        r#"
INSERT INTO settings(key, value_json)
VALUES(?1, ?2)
ON CONFLICT(key) DO UPDATE SET value_json=excluded.value_json
        "#,
        params![key, value_json],
      )
      .map_err(|e| e.to_string())?;
    Ok(())
  }

  pub fn get_setting_json(&self, key: &str) -> Result<Option<String>, String> {
    let conn = self.open()?;
    let mut stmt = conn
      .prepare("SELECT value_json FROM settings WHERE key=?1")
      .map_err(|e| e.to_string())?;
    let mut rows = stmt.query(params![key]).map_err(|e| e.to_string())?;
    if let Some(row) = rows.next().map_err(|e| e.to_string())? {
      let v: String = row.get(0).map_err(|e| e.to_string())?;
      Ok(Some(v))
    } else {
      Ok(None)
    }
  }

  pub fn save_preferences(&self, prefs: &ViewPreferences) -> Result<(), String> {
    let json = serde_json::to_string(prefs).map_err(|e| e.to_string())?;
    self.set_setting_json(PREFERENCES_KEY, &json)
  }

  /// `None` when nothing was saved yet. An unreadable value is reported as an error.
  pub fn load_preferences(&self) -> Result<Option<ViewPreferences>, String> {
    match self.get_setting_json(PREFERENCES_KEY)? {
      Some(json) => serde_json::from_str(&json).map(Some).map_err(|e| e.to_string()),
      None => Ok(None),
    }
  }
}

fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
  conn.execute_batch(
    r#"
CREATE TABLE IF NOT EXISTS recent_imports(
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  source TEXT NOT NULL UNIQUE,
  display_name TEXT NOT NULL,
  last_opened_at INTEGER NOT NULL,
  record_count INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS settings(
  key TEXT PRIMARY KEY,
  value_json TEXT NOT NULL
);
    "#,
  )?;
  Ok(())
}

fn default_sqlite_path() -> PathBuf {
  // - macOS/Linux: $HOME/.libview/storage.sqlite
  // - Windows: %USERPROFILE%\.libview\storage.sqlite
  let base = std::env::var_os("HOME")
    .or_else(|| std::env::var_os("USERPROFILE"))
    .map(PathBuf::from)
    .unwrap_or_else(|| PathBuf::from("."));
  base.join(".libview").join("storage.sqlite")
}

fn now_ms() -> i64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
    .as_millis() as i64
}

