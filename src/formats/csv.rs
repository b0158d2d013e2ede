/// Split one line into trimmed fields.
/// - `,` separates fields outside quotes
/// - `""` inside a quoted region is a literal quote
/// - An unterminated quote swallows the rest of the line; this is not an error
pub fn tokenize_line(line: &str) -> Vec<String> {
  let mut out: Vec<String> = Vec::new();
  let mut cur = String::new();
  let mut in_quotes = false;
  let mut chars = line.chars().peekable();

  while let Some(ch) = chars.next() {
    match ch {
      '"' => {
        if in_quotes && matches!(chars.peek(), Some('"')) {
          cur.push('"');
          let _ = chars.next();
        } else {
          in_quotes = !in_quotes;
        }
      }
      ',' if !in_quotes => {
        out.push(cur.trim().to_string());
        cur.clear();
      }
      _ => cur.push(ch),
    }
  }
  out.push(cur.trim().to_string());

  out
}

/// Non-blank lines of `text` with their 1-based line numbers.
pub(crate) fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
  let text = text.strip_prefix('\u{feff}').unwrap_or(text);
  text
    .split('\n')
    .enumerate()
    .filter(|(_, line)| !line.trim().is_empty())
    .map(|(i, line)| (i + 1, line))
}
