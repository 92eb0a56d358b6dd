//! Control-surface helpers: listing, clearing and describing the edits
//! made on one page.

use url::Url;

use crate::{
    edit::edit_model::{EditMap, EditRecord},
    store::{KvStore, StoreError, load_edits, save_edits},
};

const PREVIEW_CHARS: usize = 50;
const UNKNOWN_ORIGINAL: &str = "Unknown original text";

/// Same hostname and path; query and fragment are ignored. Falls back to
/// exact comparison when either URL does not parse.
pub fn is_same_page(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(ua), Ok(ub)) => ua.host_str() == ub.host_str() && ua.path() == ub.path(),
        _ => a == b,
    }
}

/// `hostname + path`, or the raw string when it is not a URL.
pub fn display_location(url: &str) -> String {
    match Url::parse(url) {
        Ok(u) => format!("{}{}", u.host_str().unwrap_or_default(), u.path()),
        Err(_) => url.to_string(),
    }
}

/// Records belonging to `url`, newest first. Records without a timestamp
/// sort last.
pub fn page_edits<'a>(edits: &'a EditMap, url: &str) -> Vec<&'a EditRecord> {
    let mut page: Vec<&EditRecord> = edits
        .values()
        .filter(|r| !r.url.is_empty() && is_same_page(&r.url, url))
        .collect();
    page.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    page
}

/// Drops every record on `url` and returns how many were removed.
/// Records with no url are never considered part of a page.
pub fn clear_page_edits<S: KvStore + ?Sized>(store: &mut S, url: &str) -> Result<usize, StoreError> {
    let edits = load_edits(store)?;
    let before = edits.len();

    let remaining: EditMap = edits
        .into_iter()
        .filter(|(_, r)| r.url.is_empty() || !is_same_page(&r.url, url))
        .collect();

    let removed = before - remaining.len();
    if removed > 0 {
        save_edits(store, &remaining)?;
    }
    Ok(removed)
}

/// `text` unchanged up to `max` chars, else its first `max - 3` plus `...`.
pub fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

pub fn format_time_ago(timestamp_ms: u64, now_ms: u64) -> String {
    let seconds = now_ms.saturating_sub(timestamp_ms) / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{}d ago", days)
    } else if hours > 0 {
        format!("{}h ago", hours)
    } else if minutes > 0 {
        format!("{}m ago", minutes)
    } else {
        "Just now".to_string()
    }
}

/// One line of the page listing.
pub fn describe_edit(record: &EditRecord, now_ms: u64) -> String {
    let original = record.original_text().unwrap_or(UNKNOWN_ORIGINAL);
    let when = if record.timestamp == 0 {
        "Recently".to_string()
    } else {
        format_time_ago(record.timestamp, now_ms)
    };

    format!(
        "From: \"{}\"  To: \"{}\"  ({})",
        truncate_text(original, PREVIEW_CHARS),
        truncate_text(&record.text, PREVIEW_CHARS),
        when
    )
}

/// Listing lines for `url`, newest first.
pub fn page_listing(edits: &EditMap, url: &str, now_ms: u64) -> Vec<String> {
    page_edits(edits, url)
        .into_iter()
        .map(|record| describe_edit(record, now_ms))
        .collect()
}
