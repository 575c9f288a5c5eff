//! Line-oriented comment stripping, run once over the whole source before
//! any byte-level scanning happens.
//!
//! A line whose first non-whitespace character is `/` or `*` is dropped in
//! its entirety: this catches `//` line comments, `/*`/`*/` block-comment
//! delimiters, and `*`-prefixed continuation lines, as long as each starts
//! its own line. An inline block comment that opens mid-line
//! (`foo(); /* note */`) is not recognized — matching the source system's
//! documented limitation rather than adding a proper comment-aware scanner.

/// Flatten `source` into a single buffer with comment lines and blank lines
/// removed and a trailing `//` truncated from any surviving line.
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for raw_line in source.lines() {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('/') || trimmed.starts_with('*') {
            continue;
        }
        let line = match trimmed.find("//") {
            Some(idx) if idx > 0 => &trimmed[..idx],
            _ => trimmed,
        };
        out.push_str(line);
        out.push('\n');
    }
    out
}
