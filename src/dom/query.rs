//! Selector lookup backed by `scraper`. The tree is serialized with a
//! handle marker on every element, parsed, matched, and the matches are
//! mapped back to [`NodeId`]s.

use std::collections::HashSet;

use scraper::{Html, Selector};

use crate::dom::{
    markup::{NODE_MARKER, marked_markup},
    tree::{Dom, NodeId},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("invalid selector `{selector}`: {reason}")]
    Syntax { selector: String, reason: String },
}

fn parse_selector(selector: &str) -> Result<Selector, SelectorError> {
    if selector.trim().is_empty() {
        return Err(SelectorError::Empty);
    }
    Selector::parse(selector).map_err(|e| SelectorError::Syntax {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// First element in document order matching `selector`.
pub fn query_selector<D: Dom + ?Sized>(
    dom: &D,
    selector: &str,
) -> Result<Option<NodeId>, SelectorError> {
    let parsed = parse_selector(selector)?;
    let page = Html::parse_document(&marked_markup(dom));

    let matched: HashSet<NodeId> = page
        .select(&parsed)
        .filter_map(|el| el.value().attr(NODE_MARKER)?.parse().ok())
        .map(NodeId)
        .collect();
    if matched.is_empty() {
        return Ok(None);
    }

    Ok(dom.elements().into_iter().find(|n| matched.contains(n)))
}
