use clap::Parser;
use edit_anchor::cli::commands::{cmd_apply, cmd_clear, cmd_edit, cmd_list, read_document};
use edit_anchor::cli::config::{
    AppConfig, Cli, Commands, build_agent_settings, load_config, resolve_store_path,
    resolve_trace_path,
};
use edit_anchor::dom::{Dom, query_selector};
use edit_anchor::edit::session::SessionEnd;
use edit_anchor::store::{JsonFileStore, load_edits};

const SNAPSHOT: &str = r#"{
    "url": "https://shop.example.com/item/9?ref=mail",
    "title": "Item",
    "root": {"tag": "html", "children": [
        {"tag": "body", "children": [
            {"tag": "main", "attributes": {"class": "product"}, "rect": {"top": 0, "left": 0, "width": 800, "height": 600}, "children": [
                {"tag": "h1", "rect": {"top": 20, "left": 10, "width": 700, "height": 40}, "children": ["Blue Kettle"]},
                {"tag": "p", "attributes": {"class": "price"}, "rect": {"top": 70, "left": 10, "width": 200, "height": 20}, "children": ["$39.00"]},
                {"tag": "button", "children": ["Add to cart"]}
            ]}
        ]}
    ]}
}"#;

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_apply() {
    let cli = Cli::parse_from(["edit-anchor", "apply", "--page", "page.json", "-o", "out.json", "-vv"]);
    assert_eq!(cli.verbose, 2);
    match cli.command {
        Commands::Apply { page, output } => {
            assert_eq!(page, "page.json");
            assert_eq!(output.as_deref(), Some("out.json"));
        }
        _ => panic!("Expected Apply command"),
    }
}

#[test]
fn cli_parse_clear_requires_url_or_all() {
    assert!(Cli::try_parse_from(["edit-anchor", "clear"]).is_err());
    assert!(Cli::try_parse_from(["edit-anchor", "clear", "--all", "--url", "https://a.com"]).is_err());

    let cli = Cli::parse_from(["edit-anchor", "clear", "--all", "--store", "s.json"]);
    assert_eq!(cli.store.as_deref(), Some("s.json"));
    assert!(matches!(cli.command, Commands::Clear { url: None, all: true }));
}

#[test]
fn cli_flags_override_config() {
    let config = AppConfig::default();
    let cli = Cli::parse_from(["edit-anchor", "list", "--url", "https://a.com"]);
    assert_eq!(resolve_store_path(&cli, &config), "edits.json");
    assert_eq!(resolve_trace_path(&cli, &config), None);

    let cli = Cli::parse_from([
        "edit-anchor", "list", "--url", "https://a.com", "--store", "mine.json", "--trace", "t.jsonl",
    ]);
    assert_eq!(resolve_store_path(&cli, &config), "mine.json");
    assert_eq!(resolve_trace_path(&cli, &config), Some("t.jsonl"));
}

// ============================================================================
// Config File Tests
// ============================================================================

#[test]
fn config_defaults_when_missing_or_malformed() {
    let config = load_config(Some("/definitely/not/here.yaml"));
    let settings = build_agent_settings(&config);
    assert_eq!(settings.debounce_ms, 500);
    assert_eq!(settings.interval_ms, 10_000);
    assert_eq!(settings.highlight_ms, 3_000);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "watch: [not, a, map").unwrap();
    let config = load_config(path.to_str());
    assert_eq!(config.store.path, "edits.json");
}

#[test]
fn config_partial_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("edit-anchor.yaml");
    std::fs::write(&path, "watch:\n  debounce_ms: 250\ntrace:\n  path: pass.jsonl\n").unwrap();

    let config = load_config(path.to_str());
    assert_eq!(config.watch.debounce_ms, 250);
    assert_eq!(config.watch.interval_ms, 10_000);
    assert_eq!(config.trace.path.as_deref(), Some("pass.jsonl"));
    assert_eq!(config.highlight.duration_ms, 3_000);
}

// ============================================================================
// Command Tests
// ============================================================================

#[test]
fn edit_then_apply_on_reloaded_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("page.json");
    let out = dir.path().join("out.json");
    let store = dir.path().join("edits.json");
    let trace = dir.path().join("trace.jsonl");
    std::fs::write(&page, SNAPSHOT).unwrap();

    let settings = build_agent_settings(&AppConfig::default());
    let end = cmd_edit(
        page.to_str().unwrap(),
        "p.price",
        "$29.00",
        None,
        store.to_str().unwrap(),
        settings,
    )
    .unwrap();
    assert!(matches!(end, SessionEnd::Saved { .. }));

    let edits = load_edits(&JsonFileStore::new(&store)).unwrap();
    assert_eq!(edits.len(), 1);
    assert_eq!(edits.values().next().unwrap().url, "https://shop.example.com/item/9?ref=mail");

    // The untouched snapshot stands in for a page reload.
    let report = cmd_apply(
        page.to_str().unwrap(),
        out.to_str(),
        store.to_str().unwrap(),
        trace.to_str(),
        settings,
    )
    .unwrap();
    assert_eq!(report.applied(), 1);

    let patched = read_document(out.to_str().unwrap()).unwrap();
    let price = query_selector(&patched, "p.price").unwrap().unwrap();
    assert_eq!(patched.text_content(price), "$29.00");

    let trace_lines = std::fs::read_to_string(&trace).unwrap();
    let event: serde_json::Value = serde_json::from_str(trace_lines.lines().next().unwrap()).unwrap();
    assert_eq!(event["outcome"], "applied");
    assert_eq!(event["tier"], "fingerprint");
    assert_eq!(event["trigger"], "load");

    assert_eq!(cmd_list("https://shop.example.com/item/9", store.to_str().unwrap()).unwrap(), 1);
    cmd_clear(Some("https://shop.example.com/item/9"), false, store.to_str().unwrap()).unwrap();
    assert_eq!(cmd_list("https://shop.example.com/item/9", store.to_str().unwrap()).unwrap(), 0);
}

#[test]
fn edit_on_button_saves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("page.json");
    let store = dir.path().join("edits.json");
    std::fs::write(&page, SNAPSHOT).unwrap();

    let end = cmd_edit(
        page.to_str().unwrap(),
        "button",
        "Buy now",
        None,
        store.to_str().unwrap(),
        build_agent_settings(&AppConfig::default()),
    )
    .unwrap();
    assert_eq!(end, SessionEnd::Aborted);
    assert!(load_edits(&JsonFileStore::new(&store)).unwrap().is_empty());
}

#[test]
fn edit_with_unknown_target_fails() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("page.json");
    std::fs::write(&page, SNAPSHOT).unwrap();

    let result = cmd_edit(
        page.to_str().unwrap(),
        "#missing",
        "x",
        None,
        dir.path().join("edits.json").to_str().unwrap(),
        build_agent_settings(&AppConfig::default()),
    );
    assert!(result.is_err());
}

#[test]
fn html_pages_are_read_and_written_as_markup() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("item.html");
    let out = dir.path().join("patched.html");
    let store = dir.path().join("edits.json");
    std::fs::write(
        &page,
        r#"<!DOCTYPE html><html><head><title>Item</title></head><body>
<main class="product"><h1>Blue Kettle</h1><p class="price">$39.00</p><button>Add to cart</button></main>
</body></html>"#,
    )
    .unwrap();
    let settings = build_agent_settings(&AppConfig::default());

    let end = cmd_edit(
        page.to_str().unwrap(),
        "main > h1 + p",
        "$29.00",
        None,
        store.to_str().unwrap(),
        settings,
    )
    .unwrap();
    assert!(matches!(end, SessionEnd::Saved { .. }));
    let edits = load_edits(&JsonFileStore::new(&store)).unwrap();
    let record = edits.values().next().unwrap();
    assert!(record.url.starts_with("file://"), "{}", record.url);
    assert!(record.url.ends_with("/item.html"), "{}", record.url);

    let report = cmd_apply(
        page.to_str().unwrap(),
        out.to_str(),
        store.to_str().unwrap(),
        None,
        settings,
    )
    .unwrap();
    assert_eq!(report.applied(), 1);

    let markup = std::fs::read_to_string(&out).unwrap();
    assert!(markup.starts_with("<!DOCTYPE html>"));
    let patched = read_document(out.to_str().unwrap()).unwrap();
    let price = query_selector(&patched, "p.price").unwrap().unwrap();
    assert_eq!(patched.text_content(price), "$29.00");
    assert_eq!(patched.title, "Item");
}
