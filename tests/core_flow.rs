use std::path::PathBuf;

use libview_core::{
  CoreEngine, CoreError, CoreOptions, DisplayMode, SessionOptions, SortDirection, StorageOptions,
  ViewKind,
};
use serde_json::json;

fn engine_with_sqlite(sqlite_path: PathBuf) -> CoreEngine {
  CoreEngine::new(CoreOptions {
    session: SessionOptions {
      page_size: 2,
      ..SessionOptions::default()
    },
    storage: StorageOptions {
      sqlite_path: Some(sqlite_path),
    },
  })
  .unwrap()
}

#[test]
fn open_file_then_page_through_without_dup_or_drop() {
  let dir = tempfile::tempdir().unwrap();
  let sqlite = dir.path().join("t.sqlite");
  let file = dir.path().join("a.csv");
  std::fs::write(&file, "id,name\n0,a\n1,b\n2,c\n3,d\n4,e\n").unwrap();

  let eng = engine_with_sqlite(sqlite);
  let (session, p1) = eng.open_file(&file).unwrap();
  assert_eq!(session.record_count, 5);
  assert_eq!(p1.total_pages, 3);
  assert_eq!(p1.rows.len(), 2);

  let sid = session.session_id.clone();
  let mut seen: Vec<usize> = p1.rows.iter().map(|r| r.id).collect();
  while let Some(w) = eng.advance_page(&sid).unwrap() {
    seen.extend(w.rows.iter().map(|r| r.id));
  }
  assert_eq!(seen, vec![0, 1, 2, 3, 4]);
}

#[test]
fn crlf_and_non_utf8_tolerant() {
  let dir = tempfile::tempdir().unwrap();
  let sqlite = dir.path().join("t.sqlite");
  let file = dir.path().join("a.csv");
  let mut bytes = Vec::new();
  bytes.extend_from_slice(b"a,b\r\n");
  bytes.extend_from_slice(&[0xff, 0xfe, b'x', b',', b'y', b'\r', b'\n']);
  std::fs::write(&file, bytes).unwrap();

  let eng = engine_with_sqlite(sqlite);
  let (_session, p1) = eng.open_file(&file).unwrap();
  assert_eq!(p1.rows.len(), 1);
  assert!(p1.rows[0].fields[0].ends_with('x'));
  assert_eq!(p1.rows[0].fields[1], "y");
}

#[test]
fn unsupported_extension_and_missing_file() {
  let dir = tempfile::tempdir().unwrap();
  let eng = engine_with_sqlite(dir.path().join("t.sqlite"));

  let txt = dir.path().join("a.json");
  std::fs::write(&txt, "[]").unwrap();
  assert!(matches!(eng.open_file(&txt), Err(CoreError::UnsupportedFormat(_))));
  assert!(matches!(
    eng.open_file(dir.path().join("missing.csv")),
    Err(CoreError::Io(_))
  ));
}

#[test]
fn insufficient_data_installs_nothing() {
  let dir = tempfile::tempdir().unwrap();
  let eng = engine_with_sqlite(dir.path().join("t.sqlite"));
  assert!(matches!(
    eng.open_text("empty", "id,name\n\n"),
    Err(CoreError::InsufficientData { lines: 1 })
  ));
  assert!(eng.recent_imports(10).unwrap().is_empty());
}

#[test]
fn query_sort_and_project_through_engine() {
  let dir = tempfile::tempdir().unwrap();
  let eng = engine_with_sqlite(dir.path().join("t.sqlite"));
  let text = "Track Name,Album Name,Popularity,Track URI\nAlpha,One,5,spotify:track:1\nBeta,Two,80,spotify:track:2\nGamma,One,40,spotify:track:3\n";
  let (session, _) = eng.open_text("sample.csv", text).unwrap();
  let sid = session.session_id;

  let cols = eng.project_columns(&sid).unwrap();
  assert_eq!(cols, vec!["Track Name", "Album Name", "Popularity"]);

  let w = eng.set_query(&sid, "one").unwrap();
  assert_eq!(w.total_records, 2);

  let (report, w) = eng.sort_by(&sid, "Popularity").unwrap();
  assert_eq!(report.direction, SortDirection::Desc);
  let names: Vec<&str> = w.rows.iter().map(|r| r.fields[0].as_str()).collect();
  assert_eq!(names, vec!["Gamma", "Alpha"]);

  let detail = eng.record_detail(&sid, 1).unwrap().unwrap();
  assert_eq!(detail["Track Name"], json!("Beta"));
}

#[test]
fn open_records_skips_text_parsing() {
  let dir = tempfile::tempdir().unwrap();
  let eng = engine_with_sqlite(dir.path().join("t.sqlite"));
  let rows = vec![
    json!({"Track Name": "Remote", "Popularity": 12}),
    json!({"Track Name": "Other"}),
  ]
  .into_iter()
  .filter_map(|v| v.as_object().cloned())
  .collect();

  let (session, w) = eng
    .open_records("shared", vec!["Track Name".into(), "Popularity".into()], rows)
    .unwrap();
  assert_eq!(session.record_count, 2);
  assert_eq!(w.rows[0].fields, vec!["Remote", "12"]);
  assert_eq!(w.rows[1].fields, vec!["Other", ""]);
}

#[test]
fn reimport_failure_keeps_previous_dataset() {
  let dir = tempfile::tempdir().unwrap();
  let eng = engine_with_sqlite(dir.path().join("t.sqlite"));
  let (session, _) = eng.open_text("a", "x,y\n1,2\n3,4\n").unwrap();
  let sid = session.session_id;

  assert!(eng.reimport_text(&sid, "x,y").is_err());
  assert_eq!(eng.view_state(&sid).unwrap().dataset_len, 2);

  let w = eng.reimport_text(&sid, "x,y\n5,6\n7\n").unwrap();
  assert_eq!(w.total_records, 1);
  let info = eng.session_info(&sid).unwrap();
  assert_eq!(info.record_count, 1);
  assert_eq!(info.skipped_lines, 1);
  assert_eq!(eng.build_report(&sid).unwrap().skipped_lines, vec![3]);
}

#[test]
fn unknown_session_and_close() {
  let dir = tempfile::tempdir().unwrap();
  let eng = engine_with_sqlite(dir.path().join("t.sqlite"));
  assert!(matches!(eng.get_page("nope", 1), Err(CoreError::UnknownSession(_))));

  let (session, _) = eng.open_text("a", "x\n1\n").unwrap();
  eng.close(&session.session_id).unwrap();
  assert!(matches!(
    eng.view_state(&session.session_id),
    Err(CoreError::UnknownSession(_))
  ));
}

#[test]
fn view_preferences_persist_across_engines() {
  let dir = tempfile::tempdir().unwrap();
  let sqlite = dir.path().join("t.sqlite");

  {
    let eng = engine_with_sqlite(sqlite.clone());
    let (session, _) = eng.open_text("a", "x\n1\n2\n3\n").unwrap();
    eng.set_display_mode(&session.session_id, DisplayMode::Infinite).unwrap();
    eng.set_view_kind(&session.session_id, ViewKind::Grid).unwrap();
    eng.set_page_size(&session.session_id, 7).unwrap();
  }

  let eng = engine_with_sqlite(sqlite);
  let (session, w) = eng.open_text("b", "x\n1\n").unwrap();
  let state = eng.view_state(&session.session_id).unwrap();
  assert_eq!(state.display_mode, DisplayMode::Infinite);
  assert_eq!(state.view_kind, ViewKind::Grid);
  assert_eq!(state.page_size, 7);
  assert_eq!(w.page_size, 7);
}

#[test]
fn recent_imports_are_recorded() {
  let dir = tempfile::tempdir().unwrap();
  let eng = engine_with_sqlite(dir.path().join("t.sqlite"));
  let file = dir.path().join("library.csv");
  std::fs::write(&file, "x\n1\n2\n").unwrap();

  eng.open_file(&file).unwrap();
  eng.open_text("sample", "x\n1\n").unwrap();
  eng.open_file(&file).unwrap();

  let recent = eng.recent_imports(10).unwrap();
  assert_eq!(recent.len(), 2);
  let lib = recent.iter().find(|r| r.display_name == "library.csv").unwrap();
  assert_eq!(lib.record_count, 2);
}

#[test]
fn share_and_restore_view_between_sessions() {
  let dir = tempfile::tempdir().unwrap();
  let eng = engine_with_sqlite(dir.path().join("t.sqlite"));
  let text = "name,Popularity\na,1\nb,2\nc,3\nd,4\ne,5\n";

  let (s1, _) = eng.open_text("one", text).unwrap();
  eng.sort_by(&s1.session_id, "Popularity").unwrap();
  let expected = eng.get_page(&s1.session_id, 2).unwrap();
  let token = eng.save_view(&s1.session_id).unwrap();

  let (s2, _) = eng.open_text("two", text).unwrap();
  let restored = eng.restore_view(&s2.session_id, &token).unwrap();
  assert_eq!(restored.rows, expected.rows);
  assert_eq!(restored.page, 2);
}

#[test]
fn reset_clears_the_dataset() {
  let dir = tempfile::tempdir().unwrap();
  let eng = engine_with_sqlite(dir.path().join("t.sqlite"));
  let (session, _) = eng.open_text("a", "x\n1\n2\n").unwrap();
  let w = eng.reset(&session.session_id).unwrap();
  assert_eq!(w.total_records, 0);
  assert_eq!(eng.session_info(&session.session_id).unwrap().record_count, 0);
}
