use libview_core::{
  display_name, format_duration, DisplayMode, Session, SessionOptions,
};

const SAMPLE: &str = "\
Track Name,Artist Name(s),Album Name,Track Duration (ms),Popularity,Added At
Song A,Artist One,Album X,215000,71,2023-04-01T10:00:00Z
Song B,\"Artist Two, Artist Three\",Album Y,187000,55,2022-11-12T08:30:00Z
Song C,Artist One,Album X,not-a-number,90,2024-01-05T19:45:00Z
broken line
";

fn main() -> Result<(), String> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  let mut session = Session::new(SessionOptions {
    page_size: 2,
    ..SessionOptions::default()
  })
  .map_err(|e| e.to_string())?;
  let report = session.install_text(SAMPLE).map_err(|e| e.to_string())?;
  println!("built={} skipped={:?}", report.records_built, report.skipped_lines);

  let columns = session.project_columns();
  let titles: Vec<&str> = columns.iter().map(|c| display_name(c)).collect();
  println!("columns={}", titles.join(" | "));

  let sort = session.sort_by("Popularity");
  println!("sorted by {} {:?} ({:?})", sort.column, sort.direction, sort.kind);

  session.set_display_mode(DisplayMode::Infinite);
  let mut window = session.current_window();
  loop {
    for row in &window.rows {
      println!("#{} {}", row.position, row.fields.join(" | "));
    }
    match session.advance_page() {
      Some(next) => window = next,
      None => break,
    }
  }

  let stats = session.stats();
  println!(
    "tracks={} artists={:?} albums={:?} duration={}",
    stats.total_records,
    stats.unique_artists,
    stats.unique_albums,
    format_duration(stats.total_duration_ms.unwrap_or(0))
  );
  println!("share={}", session.save_view());
  Ok(())
}
