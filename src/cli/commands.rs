use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use url::Url;

use crate::agent::agent_model::AgentSettings;
use crate::agent::error::PageError;
use crate::agent::page_agent::PageAgent;
use crate::dom::{Document, Dom, query_selector};
use crate::edit::applicator::ApplyReport;
use crate::edit::session::{EditState, Key, SessionEnd};
use crate::popup::control::{clear_page_edits, display_location, page_listing};
use crate::store::{JsonFileStore, clear_all_edits, load_edits};
use crate::trace::logger::TraceLogger;

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

// ============================================================================
// apply subcommand
// ============================================================================

/// Apply every stored edit to a page snapshot and write the result.
pub fn cmd_apply(
    page_path: &str,
    output: Option<&str>,
    store_path: &str,
    trace_path: Option<&str>,
    settings: AgentSettings,
) -> Result<ApplyReport, PageError> {
    let document = read_document(page_path)?;
    let url = document.url.clone();

    let mut agent = PageAgent::new(document, &url, JsonFileStore::new(store_path), settings, now_ms())
        .with_tracer(TraceLogger::from_path(trace_path));
    let report = agent.on_load()?;

    eprintln!(
        "{}: {} applied, {} unchanged, {} unresolved",
        display_location(&url),
        report.applied(),
        report.unchanged(),
        report.unresolved()
    );

    write_document(agent.dom(), output)?;
    Ok(report)
}

// ============================================================================
// edit subcommand
// ============================================================================

/// Drive edit-mode without a pointer: click `target`, type `text`, press Enter.
pub fn cmd_edit(
    page_path: &str,
    target: &str,
    text: &str,
    output: Option<&str>,
    store_path: &str,
    settings: AgentSettings,
) -> Result<SessionEnd, PageError> {
    let document = read_document(page_path)?;
    let url = document.url.clone();
    let now = now_ms();

    let mut agent = PageAgent::new(document, &url, JsonFileStore::new(store_path), settings, now);
    let node = query_selector(agent.dom(), target)?
        .ok_or_else(|| PageError::TargetNotFound(target.to_string()))?;

    agent.enable_edit();
    agent.pointer_over(node);
    agent.click(node, now);

    let editing = match agent.session().map(|s| s.state()) {
        Some(EditState::Editing { target: edited, .. }) => Some(*edited),
        _ => None,
    };
    if let Some(edited) = editing {
        agent.dom_mut().set_text_content(edited, text);
        agent.key(Key::Enter, now)?;
    }

    let end = agent.last_session_end().cloned().unwrap_or(SessionEnd::Aborted);
    match &end {
        SessionEnd::Saved { edit_id } => println!("Saved {}", edit_id),
        other => println!("No edit saved ({:?})", other),
    }

    if output.is_some() {
        write_document(agent.dom(), output)?;
    }
    Ok(end)
}

// ============================================================================
// list / clear subcommands
// ============================================================================

pub fn cmd_list(url: &str, store_path: &str) -> Result<usize, PageError> {
    let edits = load_edits(&JsonFileStore::new(store_path))?;
    let lines = page_listing(&edits, url, now_ms());

    println!("{} ({} edits)", display_location(url), lines.len());
    if lines.is_empty() {
        println!("  No edits made on this page yet");
    }
    for line in &lines {
        println!("  {}", line);
    }
    Ok(lines.len())
}

pub fn cmd_clear(url: Option<&str>, all: bool, store_path: &str) -> Result<(), PageError> {
    let mut store = JsonFileStore::new(store_path);
    match url {
        Some(url) if !all => {
            let removed = clear_page_edits(&mut store, url)?;
            println!("Removed {} edits from {}", removed, display_location(url));
        }
        _ => {
            clear_all_edits(&mut store)?;
            println!("Removed all edits");
        }
    }
    Ok(())
}

// ============================================================================
// Page IO
// ============================================================================

fn is_html_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

/// Loads a page from a JSON snapshot, or from markup when the file ends in
/// `.html`/`.htm`. Markup pages are addressed by their `file://` URL.
pub fn read_document(path: &str) -> Result<Document, PageError> {
    let content = std::fs::read_to_string(path).map_err(|source| PageError::Io {
        path: path.into(),
        source,
    })?;
    if !is_html_path(path) {
        return Ok(Document::from_json(&content)?);
    }

    let url = std::fs::canonicalize(path)
        .ok()
        .and_then(|abs| Url::from_file_path(abs).ok())
        .map(String::from)
        .unwrap_or_else(|| path.to_string());
    Ok(Document::from_html(&url, &content))
}

fn write_document(document: &Document, output: Option<&str>) -> Result<(), PageError> {
    let rendered = match output {
        Some(path) if is_html_path(path) => document.to_html(),
        _ => document.to_json()?,
    };
    match output {
        Some(path) => std::fs::write(path, rendered).map_err(|source| PageError::Io {
            path: path.into(),
            source,
        }),
        None => {
            println!("{}", rendered);
            Ok(())
        }
    }
}
