use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::anchor::anchor_model::Fingerprint;

/// Storage key holding the whole edits mapping.
pub const EDITS_KEY: &str = "edits";

/// Edit records keyed by edit id.
pub type EditMap = BTreeMap<String, EditRecord>;

/// One persisted edit: replacement text plus the descriptors used to find
/// its element again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Fingerprint>,
    /// Unix milliseconds of the last save; 0 when unknown.
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub url: String,
}

impl EditRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            selector: String::new(),
            fingerprint: None,
            timestamp: 0,
            url: String::new(),
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: Fingerprint) -> Self {
        self.fingerprint = Some(fingerprint);
        self
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Text the element showed before the edit, as captured in the fingerprint.
    pub fn original_text(&self) -> Option<&str> {
        self.fingerprint
            .as_ref()
            .map(|fp| fp.text_content.as_str())
            .filter(|t| !t.is_empty())
    }
}
