use libview_core::{build_dataset, dataset_from_rows, tokenize_line, CoreError};
use serde_json::{json, Map, Value};

fn row(v: Value) -> Map<String, Value> {
  match v {
    Value::Object(m) => m,
    _ => panic!("expected object"),
  }
}

#[test]
fn tokenizer_splits_and_trims() {
  assert_eq!(tokenize_line("a,b,c"), vec!["a", "b", "c"]);
  assert_eq!(tokenize_line("  a , b ,c  "), vec!["a", "b", "c"]);
  assert_eq!(tokenize_line("a,b,"), vec!["a", "b", ""]);
  assert_eq!(tokenize_line(""), vec![""]);
}

#[test]
fn tokenizer_quoted_delimiter_and_escaped_quote() {
  assert_eq!(tokenize_line(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
  assert_eq!(tokenize_line(r#"a,"b""c",d"#), vec!["a", "b\"c", "d"]);
  assert_eq!(tokenize_line(r#""""#), vec![""]);
}

#[test]
fn tokenizer_unbalanced_quote_swallows_rest_of_line() {
  assert_eq!(tokenize_line(r#"a,"b,c,d"#), vec!["a", "b,c,d"]);
}

#[test]
fn build_drops_lines_with_wrong_arity() {
  let (ds, report) = build_dataset("x,y\n1,2\n3\n").unwrap();
  assert_eq!(ds.headers(), &["x".to_string(), "y".to_string()]);
  assert_eq!(ds.len(), 1);
  assert_eq!(ds.records()[0].fields, vec!["1", "2"]);
  assert_eq!(report.records_built, 1);
  assert_eq!(report.skipped_lines, vec![3]);
  assert_eq!(report.lines_read, 3);
}

#[test]
fn build_needs_header_and_one_row() {
  for text in ["", "\n\n", "x,y", "\n  x,y  \n\n"] {
    match build_dataset(text) {
      Err(CoreError::InsufficientData { lines }) => assert!(lines <= 1, "{text:?}"),
      other => panic!("expected InsufficientData for {text:?}, got {other:?}"),
    }
  }

  let (ds, _) = build_dataset("x,y\n1,2").unwrap();
  assert_eq!(ds.len(), 1);
  assert_eq!(ds.value(0, "y"), "2");
}

#[test]
fn build_ignores_blank_lines_crlf_and_bom() {
  let text = "\u{feff}x,y\r\n\r\n1,2\r\n   \n3,4\r\n";
  let (ds, report) = build_dataset(text).unwrap();
  assert_eq!(ds.headers(), &["x".to_string(), "y".to_string()]);
  assert_eq!(ds.len(), 2);
  assert_eq!(ds.records()[1].fields, vec!["3", "4"]);
  assert!(report.skipped_lines.is_empty());
}

#[test]
fn build_line_numbers_refer_to_raw_input() {
  let (_, report) = build_dataset("x,y\n\n1,2\n\n1,2,3\n4,5").unwrap();
  assert_eq!(report.skipped_lines, vec![5]);
  assert_eq!(report.records_built, 2);
}

#[test]
fn build_keeps_quoted_commas_inside_one_field() {
  let (ds, _) = build_dataset("name,artists\nSong,\"A, B\"\n").unwrap();
  assert_eq!(ds.value(0, "artists"), "A, B");
}

#[test]
fn headers_are_made_unique_and_non_empty() {
  let (ds, _) = build_dataset("a,,a\n1,2,3").unwrap();
  assert_eq!(
    ds.headers(),
    &["a".to_string(), "col_1".to_string(), "a_2".to_string()]
  );
  assert_eq!(ds.value(0, "a_2"), "3");
}

#[test]
fn record_json_is_keyed_by_header() {
  let (ds, _) = build_dataset("id,name\n1,Alice\n").unwrap();
  let v = ds.record_json(0).unwrap();
  assert_eq!(v, json!({"id": "1", "name": "Alice"}));
  assert!(ds.record_json(1).is_none());
}

#[test]
fn structured_rows_conform_to_headers() {
  let headers = vec!["x".to_string(), "y".to_string(), "z".to_string()];
  let rows = vec![
    row(json!({"x": "1", "y": 2, "extra": "ignored"})),
    row(json!({"x": null, "z": true})),
  ];
  let (ds, report) = dataset_from_rows(headers, rows).unwrap();
  assert_eq!(report.records_built, 2);
  assert_eq!(ds.records()[0].fields, vec!["1", "2", ""]);
  assert_eq!(ds.records()[1].fields, vec!["", "", "true"]);
}

#[test]
fn structured_rows_need_headers_and_rows() {
  assert!(matches!(
    dataset_from_rows(vec![], vec![row(json!({"x": "1"}))]),
    Err(CoreError::InsufficientData { lines: 0 })
  ));
  assert!(matches!(
    dataset_from_rows(vec!["x".into()], vec![]),
    Err(CoreError::InsufficientData { lines: 1 })
  ));
}
