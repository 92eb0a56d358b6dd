use edit_anchor::{
    agent::{
        agent_model::{AgentSettings, Effect, HIGHLIGHT_CLASS, Message},
        error::PageError,
        page_agent::PageAgent,
    },
    anchor::{
        anchor_model::STABLE_ID_ATTR, fingerprint::build_fingerprint, selector::build_selector,
    },
    dom::{Document, Dom, Rect},
    edit::{
        edit_model::{EditMap, EditRecord},
        session::{Key, SessionEnd},
    },
    store::{MemoryStore, load_edits, save_edits},
    watch::watcher::MutationRecord,
};

use crate::common::{
    full_store::FullStore,
    pages::{PAGE_URL, article},
};

mod common;

const T0: u64 = 1_000_000;

fn agent_with(doc: Document, records: Vec<EditRecord>) -> PageAgent<Document, MemoryStore> {
    let mut store = MemoryStore::new();
    let edits: EditMap = records.into_iter().map(|r| (r.id.clone(), r)).collect();
    save_edits(&mut store, &edits).unwrap();
    PageAgent::new(doc, PAGE_URL, store, AgentSettings::default(), T0)
}

fn lead_record(page: &common::pages::Article) -> EditRecord {
    EditRecord::new("edit-lead", "Hello Rust")
        .with_fingerprint(build_fingerprint(&page.doc, page.lead))
        .with_selector(build_selector(&page.doc, page.lead))
        .with_timestamp(T0)
        .with_url(PAGE_URL)
}

// =========================================================================
// Passes
// =========================================================================

#[test]
fn load_pass_applies_stored_edits() {
    let page = article();
    let record = lead_record(&page);
    let mut agent = agent_with(page.doc, vec![record]);

    let report = agent.on_load().unwrap();
    assert_eq!(report.applied(), 1);
    assert_eq!(agent.dom().text_content(page.lead), "Hello Rust");
    assert_eq!(agent.passes_run(), 1);
}

#[test]
fn mutation_burst_runs_one_debounced_pass() {
    let page = article();
    let record = lead_record(&page);
    let mut agent = agent_with(page.doc, vec![record]);
    agent.on_load().unwrap();

    // The page re-renders the paragraph with its original text.
    let lead = page.lead;
    agent.dom_mut().set_text_content(lead, "Hello World");
    agent.on_mutations(T0 + 100, &[MutationRecord::child_list(1, 1)]);
    agent.on_mutations(T0 + 300, &[MutationRecord::child_list(1, 0)]);

    assert_eq!(agent.tick(T0 + 700, true).unwrap(), None);
    let report = agent.tick(T0 + 800, true).unwrap().expect("debounced pass due");
    assert_eq!(report.applied(), 1);
    assert_eq!(agent.dom().text_content(lead), "Hello Rust");
    assert_eq!(agent.passes_run(), 2);

    assert_eq!(agent.tick(T0 + 900, true).unwrap(), None);
}

#[test]
fn periodic_pass_waits_for_visibility() {
    let page = article();
    let record = lead_record(&page);
    let mut agent = agent_with(page.doc, vec![record]);

    assert_eq!(agent.tick(T0 + 10_000, false).unwrap(), None);
    assert_eq!(agent.passes_run(), 0);

    let report = agent.tick(T0 + 20_000, true).unwrap().unwrap();
    assert_eq!(report.applied(), 1);
}

// =========================================================================
// Messages
// =========================================================================

#[test]
fn messages_parse_from_control_surface_json() {
    let msg: Message = serde_json::from_str(r#"{"action":"highlight-edit","editId":"edit-9"}"#).unwrap();
    assert_eq!(
        msg,
        Message::HighlightEdit {
            edit_id: "edit-9".into()
        }
    );
    let msg: Message = serde_json::from_str(r#"{"action":"enable-edit"}"#).unwrap();
    assert_eq!(msg, Message::EnableEdit);
    assert!(serde_json::from_str::<Message>(r#"{"action":"format-disk"}"#).is_err());
}

#[test]
fn highlight_flashes_and_expires() {
    let page = article();
    let record = lead_record(&page);
    let mut agent = agent_with(page.doc, vec![record]);
    agent.on_load().unwrap();

    let effects = agent
        .handle_message(
            &Message::HighlightEdit {
                edit_id: "edit-lead".into(),
            },
            T0,
        )
        .unwrap();
    assert_eq!(effects, vec![Effect::ScrollIntoView(page.lead)]);
    assert!(agent.dom().has_class(page.lead, HIGHLIGHT_CLASS));
    assert_eq!(
        agent.dom().style(page.lead, "outline").as_deref(),
        Some("3px solid #ff4444")
    );

    agent.tick(T0 + 2_999, true).unwrap();
    assert!(agent.dom().has_class(page.lead, HIGHLIGHT_CLASS));

    agent.tick(T0 + 3_000, true).unwrap();
    assert!(!agent.dom().has_class(page.lead, HIGHLIGHT_CLASS));
    assert_eq!(agent.dom().style(page.lead, "background-color"), None);
    assert_eq!(agent.highlight(), None);
}

#[test]
fn highlight_uses_stable_id_only() {
    let page = article();
    let record = lead_record(&page);
    let mut agent = agent_with(page.doc, vec![record]);

    // Not applied yet, so no element carries the id.
    let effects = agent
        .handle_message(
            &Message::HighlightEdit {
                edit_id: "edit-lead".into(),
            },
            T0,
        )
        .unwrap();
    assert!(effects.is_empty());
    assert_eq!(agent.highlight(), None);
}

#[test]
fn clear_edits_is_page_scoped() {
    let page = article();
    let here = lead_record(&page);
    let elsewhere = EditRecord::new("edit-other", "x").with_url("https://news.example.com/articles/7");
    let same_page_query = EditRecord::new("edit-q", "y").with_url(format!("{}?ref=home#top", PAGE_URL));
    let mut agent = agent_with(page.doc, vec![here, elsewhere, same_page_query]);
    agent.on_load().unwrap();
    assert!(agent.dom().attribute(page.lead, STABLE_ID_ATTR).is_some());

    let effects = agent.handle_message(&Message::ClearEdits, T0).unwrap();
    assert_eq!(effects, vec![Effect::Reload]);
    assert_eq!(agent.dom().attribute(page.lead, STABLE_ID_ATTR), None);

    let remaining = load_edits(agent.store()).unwrap();
    assert_eq!(remaining.keys().collect::<Vec<_>>(), vec!["edit-other"]);
}

#[test]
fn refresh_page_asks_host_to_reload() {
    let page = article();
    let mut agent = agent_with(page.doc, vec![]);
    assert_eq!(
        agent.handle_message(&Message::RefreshPage, T0).unwrap(),
        vec![Effect::Reload]
    );
}

// =========================================================================
// Edit-mode through the agent
// =========================================================================

#[test]
fn edit_then_reload_reapplies_on_changed_layout() {
    let page = article();
    let mut agent = agent_with(page.doc, vec![]);

    agent.handle_message(&Message::EnableEdit, T0).unwrap();
    agent.pointer_over(page.title);
    agent.click(page.title, T0);
    agent.dom_mut().set_text_content(page.title, "Annual results");
    agent.key(Key::Enter, T0).unwrap();

    assert!(agent.session().is_none());
    assert!(matches!(agent.last_session_end(), Some(SessionEnd::Saved { .. })));

    // Reload: a fresh copy of the page, shifted down by a new banner.
    let (_, store) = agent.into_parts();
    let mut fresh = article();
    let banner = fresh.doc.create_element("aside");
    fresh.doc.append_text(banner, "Sale ends today");
    fresh.doc.insert_before(fresh.body, banner, fresh.main);
    fresh.doc.set_rect(fresh.title, Rect::new(140.0, 32.0, 960.0, 40.0));

    let mut reloaded = PageAgent::new(fresh.doc, PAGE_URL, store, AgentSettings::default(), T0);
    let report = reloaded.on_load().unwrap();
    assert_eq!(report.applied(), 1);
    assert_eq!(reloaded.dom().text_content(fresh.title), "Annual results");
}

#[test]
fn button_click_leaves_agent_idle_without_record() {
    let page = article();
    let mut agent = agent_with(page.doc, vec![]);

    agent.handle_message(&Message::EnableEdit, T0).unwrap();
    agent.click(page.button, T0);

    assert!(agent.session().is_none());
    assert_eq!(agent.last_session_end(), Some(&SessionEnd::Aborted));
    assert!(load_edits(agent.store()).unwrap().is_empty());
}

#[test]
fn failed_save_surfaces_store_error_and_returns_to_idle() {
    let page = article();
    let mut agent = PageAgent::new(page.doc, PAGE_URL, FullStore::new(), AgentSettings::default(), T0);

    // Enter
    agent.handle_message(&Message::EnableEdit, T0).unwrap();
    agent.click(page.lead, T0);
    agent.dom_mut().set_text_content(page.lead, "Hello Rust");
    let err = agent.key(Key::Enter, T0).unwrap_err();
    assert!(matches!(err, PageError::Store(_)), "{err}");
    assert!(agent.session().is_none());
    assert_eq!(agent.last_session_end(), Some(&SessionEnd::SaveFailed));

    // Blur
    agent.handle_message(&Message::EnableEdit, T0).unwrap();
    agent.click(page.title, T0);
    agent.dom_mut().set_text_content(page.title, "Annual results");
    let err = agent.blur(T0).unwrap_err();
    assert!(matches!(err, PageError::Store(_)), "{err}");
    assert!(agent.session().is_none());
    assert_eq!(agent.last_session_end(), Some(&SessionEnd::SaveFailed));

    let (_, store) = agent.into_parts();
    assert_eq!(store.failed_writes, 2);
    assert!(load_edits(&store).unwrap().is_empty());
}
