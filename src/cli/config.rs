use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    agent::agent_model::{AgentSettings, DEFAULT_HIGHLIGHT_MS},
    watch::watcher::{DEFAULT_DEBOUNCE_MS, DEFAULT_INTERVAL_MS},
};

pub const DEFAULT_CONFIG_PATH: &str = "edit-anchor.yaml";
pub const DEFAULT_STORE_PATH: &str = "edits.json";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "edit-anchor",
    version,
    about = "Re-anchor saved text edits to elements of a changing page"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (only errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Edits store file (default: edits.json, or store.path from config)
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Append per-record pass traces to this JSONL file
    #[arg(long, global = true)]
    pub trace: Option<String>,

    /// Path to config file (default: edit-anchor.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply stored edits to a page snapshot
    Apply {
        /// Page snapshot JSON, or page markup (.html/.htm)
        #[arg(long)]
        page: String,

        /// Where to write the patched page, as markup for .html/.htm (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Edit one element of a page snapshot and store the edit
    Edit {
        /// Page snapshot JSON, or page markup (.html/.htm)
        #[arg(long)]
        page: String,

        /// CSS selector of the element to click
        #[arg(long)]
        target: String,

        /// Replacement text
        #[arg(long)]
        text: String,

        /// Where to write the edited snapshot
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List the edits stored for a page, newest first
    List {
        #[arg(long)]
        url: String,
    },

    /// Remove stored edits for a page, or all of them
    Clear {
        #[arg(long, required_unless_present = "all", conflicts_with = "all")]
        url: Option<String>,

        #[arg(long)]
        all: bool,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `edit-anchor.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightConfig {
    #[serde(default = "default_highlight_ms")]
    pub duration_ms: u64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_HIGHLIGHT_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_STORE_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TraceConfig {
    pub path: Option<String>,
}

// Serde default helpers
fn default_debounce_ms() -> u64 { DEFAULT_DEBOUNCE_MS }
fn default_interval_ms() -> u64 { DEFAULT_INTERVAL_MS }
fn default_highlight_ms() -> u64 { DEFAULT_HIGHLIGHT_MS }
fn default_store_path() -> String { DEFAULT_STORE_PATH.to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Reads `edit-anchor.yaml` (or `path`). A missing file means defaults; a
/// malformed one is reported and also falls back to defaults.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    let Ok(content) = std::fs::read_to_string(config_path) else {
        debug!(path = config_path, "no config file, using defaults");
        return AppConfig::default();
    };
    serde_yaml::from_str(&content).unwrap_or_else(|e| {
        warn!(path = config_path, error = %e, "ignoring malformed config file");
        AppConfig::default()
    })
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

pub fn build_agent_settings(config: &AppConfig) -> AgentSettings {
    AgentSettings {
        debounce_ms: config.watch.debounce_ms,
        interval_ms: config.watch.interval_ms,
        highlight_ms: config.highlight.duration_ms,
    }
}

/// CLI flag, else config value.
pub fn resolve_store_path<'a>(cli: &'a Cli, config: &'a AppConfig) -> &'a str {
    cli.store.as_deref().unwrap_or(&config.store.path)
}

pub fn resolve_trace_path<'a>(cli: &'a Cli, config: &'a AppConfig) -> Option<&'a str> {
    cli.trace.as_deref().or(config.trace.path.as_deref())
}
