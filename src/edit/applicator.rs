use serde::Serialize;

use crate::{
    anchor::{
        anchor_model::{MatchResult, STABLE_ID_ATTR},
        locator::{LocateTier, locate},
    },
    dom::Dom,
    edit::edit_model::{EditMap, EditRecord},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    /// Element found and its text rewritten.
    Applied,
    /// Element found and already showing the edit.
    Unchanged,
    /// No tier located the element.
    Unresolved,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    pub edit_id: String,
    pub outcome: ApplyOutcome,
    pub tier: Option<LocateTier>,
    pub score: Option<MatchResult>,
}

/// Per-record results of one locate-and-apply pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    pub outcomes: Vec<RecordOutcome>,
}

impl ApplyReport {
    pub fn applied(&self) -> usize {
        self.count(ApplyOutcome::Applied)
    }

    pub fn unchanged(&self) -> usize {
        self.count(ApplyOutcome::Unchanged)
    }

    pub fn unresolved(&self) -> usize {
        self.count(ApplyOutcome::Unresolved)
    }

    fn count(&self, outcome: ApplyOutcome) -> usize {
        self.outcomes.iter().filter(|o| o.outcome == outcome).count()
    }
}

/// Writes every stored edit into the element it resolves to.
///
/// Text is only written when it differs, so repeated passes cause no DOM
/// churn. Unresolved records are skipped.
pub fn apply_edits<D: Dom + ?Sized>(dom: &mut D, edits: &EditMap) -> ApplyReport {
    let outcomes = edits
        .values()
        .map(|record| apply_record(dom, record))
        .collect();
    ApplyReport { outcomes }
}

pub fn apply_record<D: Dom + ?Sized>(dom: &mut D, record: &EditRecord) -> RecordOutcome {
    let edit_id = record.id.as_str();

    let Some(found) = locate(dom, record) else {
        return RecordOutcome {
            edit_id: edit_id.to_string(),
            outcome: ApplyOutcome::Unresolved,
            tier: None,
            score: None,
        };
    };

    let outcome = if dom.text_content(found.node) != record.text {
        dom.set_text_content(found.node, &record.text);
        ApplyOutcome::Applied
    } else {
        ApplyOutcome::Unchanged
    };

    if !edit_id.is_empty() && dom.attribute(found.node, STABLE_ID_ATTR).as_deref() != Some(edit_id) {
        dom.set_attribute(found.node, STABLE_ID_ATTR, edit_id);
    }

    RecordOutcome {
        edit_id: edit_id.to_string(),
        outcome,
        tier: Some(found.tier),
        score: found.score,
    }
}
