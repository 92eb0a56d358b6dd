use serde::{Deserialize, Serialize};

use crate::{
    dom::NodeId,
    watch::watcher::{DEFAULT_DEBOUNCE_MS, DEFAULT_INTERVAL_MS},
};

pub const DEFAULT_HIGHLIGHT_MS: u64 = 3_000;

pub const HIGHLIGHT_CLASS: &str = "temp-highlight";
pub const HIGHLIGHT_OUTLINE: &str = "3px solid #ff4444";
pub const HIGHLIGHT_BACKGROUND: &str = "#ffff0033";

/// Messages the control surface sends to a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Message {
    EnableEdit,
    ClearEdits,
    HighlightEdit {
        #[serde(rename = "editId")]
        edit_id: String,
    },
    RefreshPage,
}

/// Side effects only the host can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Reload,
    ScrollIntoView(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSettings {
    pub debounce_ms: u64,
    pub interval_ms: u64,
    pub highlight_ms: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            interval_ms: DEFAULT_INTERVAL_MS,
            highlight_ms: DEFAULT_HIGHLIGHT_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub node: NodeId,
    pub expires_at_ms: u64,
}
