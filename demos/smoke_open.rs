use std::path::PathBuf;

use libview_core::{CoreEngine, CoreOptions, StorageOptions};

fn main() -> Result<(), String> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  let path = std::env::args()
    .nth(1)
    .ok_or_else(|| "usage: cargo run --example smoke_open -- <path-to-csv>".to_string())?;
  let path = PathBuf::from(path);

  let dir = tempfile::tempdir().map_err(|e| e.to_string())?;
  let sqlite = dir.path().join("smoke.sqlite");

  let eng = CoreEngine::new(CoreOptions {
    storage: StorageOptions {
      sqlite_path: Some(sqlite),
    },
    ..CoreOptions::default()
  })
  .map_err(|e| e.to_string())?;

  let (session, first) = eng.open_file(&path).map_err(|e| e.to_string())?;
  println!("records={}", session.record_count);
  println!("skipped_lines={}", session.skipped_lines);
  println!("pages={}", first.total_pages);
  let columns = eng
    .project_columns(&session.session_id)
    .map_err(|e| e.to_string())?;
  println!("columns={}", columns.join(" | "));
  if let Some(r0) = first.rows.first() {
    println!("first.id={}", r0.id);
    println!("first.fields={}", r0.fields.join(" | "));
  }
  Ok(())
}
