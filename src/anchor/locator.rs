use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::{
    anchor::{
        anchor_model::{Fingerprint, MatchResult, STABLE_ID_ATTR},
        scorer::score_element,
    },
    dom::{Dom, NodeId, query_selector},
    edit::edit_model::EditRecord,
};

/// Which fallback tier found the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocateTier {
    Fingerprint,
    Selector,
    StableId,
}

impl fmt::Display for LocateTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LocateTier::Fingerprint => "fingerprint",
            LocateTier::Selector => "selector",
            LocateTier::StableId => "stable_id",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Located {
    pub node: NodeId,
    pub tier: LocateTier,
    /// Winning score, for fingerprint matches.
    pub score: Option<MatchResult>,
}

/// Finds the live element for a stored edit.
///
/// Tiers, first success wins: best fingerprint match above the acceptance
/// threshold, then the stored selector, then the stable id attribute.
pub fn locate<D: Dom + ?Sized>(dom: &D, record: &EditRecord) -> Option<Located> {
    if let Some(fp) = &record.fingerprint {
        if let Some((node, score)) = find_by_fingerprint(dom, fp) {
            return Some(Located {
                node,
                tier: LocateTier::Fingerprint,
                score: Some(score),
            });
        }
    }

    if !record.selector.is_empty() {
        if let Some(node) = find_by_selector(dom, &record.selector) {
            return Some(Located {
                node,
                tier: LocateTier::Selector,
                score: None,
            });
        }
    }

    find_by_stable_id(dom, &record.id).map(|node| Located {
        node,
        tier: LocateTier::StableId,
        score: None,
    })
}

/// Highest-scoring element, if it clears the acceptance threshold.
/// Ties keep the earliest element in document order.
pub fn find_by_fingerprint<D: Dom + ?Sized>(
    dom: &D,
    fp: &Fingerprint,
) -> Option<(NodeId, MatchResult)> {
    let mut best: Option<(NodeId, MatchResult)> = None;

    for node in dom.elements() {
        let result = score_element(dom, node, fp);
        let better = best.is_none_or(|(_, b)| result.score > b.score);
        if better && result.score > 0 {
            best = Some((node, result));
        }
    }

    best.filter(|(_, result)| result.is_acceptable())
}

/// Stored selectors may be stale or malformed; both read as not-found.
pub fn find_by_selector<D: Dom + ?Sized>(dom: &D, selector: &str) -> Option<NodeId> {
    match query_selector(dom, selector) {
        Ok(node) => node,
        Err(e) => {
            debug!(selector, error = %e, "ignoring unusable selector");
            None
        }
    }
}

pub fn find_by_stable_id<D: Dom + ?Sized>(dom: &D, edit_id: &str) -> Option<NodeId> {
    if edit_id.is_empty() {
        return None;
    }
    dom.elements_with_attribute(STABLE_ID_ATTR, Some(edit_id))
        .into_iter()
        .next()
}
