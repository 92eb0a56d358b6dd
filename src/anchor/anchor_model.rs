use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// A fingerprint match is trusted only above this percentage.
pub const ACCEPTANCE_THRESHOLD: f64 = 60.0;

/// Stored text is truncated to this many characters.
pub const MAX_STORED_TEXT: usize = 100;

/// Attribute written onto edited elements for last-resort lookup.
pub const STABLE_ID_ATTR: &str = "data-edit-id";

/// Attributes captured into a fingerprint, in capture order.
pub const FINGERPRINT_ATTRS: [&str; 8] = [
    "data-testid",
    "data-cy",
    "data-qa",
    "aria-label",
    "title",
    "alt",
    "role",
    "name",
];

/// Test-hook attributes the selector builder prefers over a structural path.
pub const SELECTOR_DATA_ATTRS: [&str; 3] = ["data-testid", "data-cy", "data-qa"];

// ---- Scoring budgets ----
pub const TEXT_EXACT: u32 = 30;
pub const TEXT_CONTAINS: u32 = 15;
pub const TEXT_SAME_LENGTH: u32 = 5;

pub const TAG_MATCH: u32 = 8;
pub const CLASS_MATCH: u32 = 6;
pub const ID_MATCH: u32 = 6;

pub const PARENT_TAG_MATCH: u32 = 5;
pub const PARENT_CLASS_MATCH: u32 = 5;
pub const INDEX_MATCH: u32 = 5;

pub const POSITION_NEAR: u32 = 10;
pub const POSITION_CLOSE: u32 = 5;
pub const POSITION_NEAR_PX: f64 = 50.0;
pub const POSITION_CLOSE_PX: f64 = 200.0;

pub const ATTRIBUTE_MATCH: u32 = 3;
pub const ATTRIBUTE_BUDGET: u32 = 15;

pub const SIBLING_MATCH: u32 = 5;

// ============================================================================
// Fingerprint
// ============================================================================

/// Integer-pixel layout box captured at edit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelBox {
    pub top: i64,
    pub left: i64,
    pub width: i64,
    pub height: i64,
}

/// Snapshot of an element used for fuzzy re-identification.
///
/// Field names follow the stored JSON format, so records written by earlier
/// versions load unchanged. Every field is optional on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Fingerprint {
    pub text_content: String,
    pub text_length: usize,

    pub tag_name: String,
    pub class_name: String,
    pub id: String,

    pub relative_position: PixelBox,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_sibling_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_sibling_tag: Option<String>,

    pub depth: usize,
    /// Position among the parent's element children; -1 without a parent.
    pub index_in_parent: i64,

    pub attributes: BTreeMap<String, String>,
}

impl Default for Fingerprint {
    fn default() -> Self {
        Self {
            text_content: String::new(),
            text_length: 0,
            tag_name: String::new(),
            class_name: String::new(),
            id: String::new(),
            relative_position: PixelBox::default(),
            parent_tag: None,
            parent_class: None,
            previous_sibling_tag: None,
            next_sibling_tag: None,
            depth: 0,
            index_in_parent: -1,
            attributes: BTreeMap::new(),
        }
    }
}

impl Fingerprint {
    /// Highest score this fingerprint can award to any element.
    ///
    /// Class, id and parent-class points are only reachable when the stored
    /// value is non-empty, and attribute points only for captured attributes.
    /// Percentages are therefore not comparable with scores normalised to a
    /// fixed 100 points.
    pub fn max_score(&self) -> u32 {
        let mut max = TEXT_EXACT + TAG_MATCH + PARENT_TAG_MATCH + INDEX_MATCH + POSITION_NEAR;
        max += 2 * SIBLING_MATCH;

        if !self.class_name.is_empty() {
            max += CLASS_MATCH;
        }
        if !self.id.is_empty() {
            max += ID_MATCH;
        }
        if self.parent_class.as_deref().is_some_and(|c| !c.is_empty()) {
            max += PARENT_CLASS_MATCH;
        }

        let attrs = u32::try_from(self.attributes.len()).unwrap_or(u32::MAX);
        max + attrs.saturating_mul(ATTRIBUTE_MATCH).min(ATTRIBUTE_BUDGET)
    }
}

// ============================================================================
// Match result
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub score: u32,
    pub max_score: u32,
    pub percentage: f64,
}

impl MatchResult {
    pub fn new(score: u32, max_score: u32) -> Self {
        let percentage = if max_score == 0 {
            0.0
        } else {
            f64::from(score) / f64::from(max_score) * 100.0
        };
        Self {
            score,
            max_score,
            percentage,
        }
    }

    pub fn is_acceptable(&self) -> bool {
        self.percentage > ACCEPTANCE_THRESHOLD
    }
}
