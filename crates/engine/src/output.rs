//! Best-effort extraction of the rendered poster path from worker logs.
//!
//! The worker does not report its output file through any structured
//! channel; it only mentions the path in its closing log lines. This
//! module scans the tail of the captured log for something that looks
//! like `posters/<name>.png`. A worker that rewords its final output
//! silently defeats the extraction, so callers must treat a `None` as
//! "completed, location unknown", not as a failure.

use std::sync::LazyLock;

use regex::Regex;

use atlasprint_core::job::{LogEntry, PosterResult};

/// How many trailing log entries are scanned.
const TAIL_WINDOW: usize = 10;

static POSTER_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"posters/([^\s]+\.png)").expect("valid regex"));

/// Scan the last [`TAIL_WINDOW`] log entries for an output-path mention.
///
/// Returns the first match in the joined tail text, with the public
/// URL derived from the bare filename.
pub fn extract_result(logs: &[LogEntry]) -> Option<PosterResult> {
    let start = logs.len().saturating_sub(TAIL_WINDOW);
    let tail: String = logs[start..]
        .iter()
        .map(|entry| entry.message.as_str())
        .collect();

    let captures = POSTER_PATH_RE.captures(&tail)?;
    let filename = captures.get(1)?.as_str().to_string();
    let url = format!("/posters/{filename}");

    Some(PosterResult { filename, url })
}
