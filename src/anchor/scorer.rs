use crate::{
    anchor::{
        anchor_model::*,
        fingerprint::{index_in_parent, truncate_chars},
    },
    dom::{Dom, NodeId},
};

/// Weighted similarity between a live element and a stored fingerprint.
///
/// Pure: reads the tree, never writes it.
pub fn score_element<D: Dom + ?Sized>(dom: &D, node: NodeId, fp: &Fingerprint) -> MatchResult {
    let score = text_score(dom, node, fp)
        + identity_score(dom, node, fp)
        + context_score(dom, node, fp)
        + position_score(dom, node, fp)
        + attribute_score(dom, node, fp)
        + sibling_score(dom, node, fp);

    MatchResult::new(score, fp.max_score())
}

fn text_score<D: Dom + ?Sized>(dom: &D, node: NodeId, fp: &Fingerprint) -> u32 {
    let raw = dom.text_content(node);
    let text = raw.trim();
    let length = text.chars().count();

    let exact = text == fp.text_content
        || (length > MAX_STORED_TEXT
            && length == fp.text_length
            && truncate_chars(text, MAX_STORED_TEXT) == fp.text_content);

    if exact {
        TEXT_EXACT
    } else if text.contains(fp.text_content.as_str()) || fp.text_content.contains(text) {
        TEXT_CONTAINS
    } else if length == fp.text_length {
        TEXT_SAME_LENGTH
    } else {
        0
    }
}

fn identity_score<D: Dom + ?Sized>(dom: &D, node: NodeId, fp: &Fingerprint) -> u32 {
    let mut score = 0;
    if dom.tag_name(node).as_deref() == Some(fp.tag_name.as_str()) {
        score += TAG_MATCH;
    }
    if !fp.class_name.is_empty() && dom.class_name(node) == fp.class_name {
        score += CLASS_MATCH;
    }
    if !fp.id.is_empty() && dom.id(node) == fp.id {
        score += ID_MATCH;
    }
    score
}

fn context_score<D: Dom + ?Sized>(dom: &D, node: NodeId, fp: &Fingerprint) -> u32 {
    let parent = dom.parent_element(node);
    let mut score = 0;

    if parent.and_then(|p| dom.tag_name(p)) == fp.parent_tag {
        score += PARENT_TAG_MATCH;
    }
    if let (Some(p), Some(stored)) = (parent, fp.parent_class.as_deref()) {
        if !stored.is_empty() && dom.class_name(p) == stored {
            score += PARENT_CLASS_MATCH;
        }
    }
    if index_in_parent(dom, node) == fp.index_in_parent {
        score += INDEX_MATCH;
    }
    score
}

fn position_score<D: Dom + ?Sized>(dom: &D, node: NodeId, fp: &Fingerprint) -> u32 {
    let rect = dom.bounding_rect(node);
    let stored = fp.relative_position;
    let distance =
        (rect.top - stored.top as f64).abs() + (rect.left - stored.left as f64).abs();

    if distance < POSITION_NEAR_PX {
        POSITION_NEAR
    } else if distance < POSITION_CLOSE_PX {
        POSITION_CLOSE
    } else {
        0
    }
}

fn attribute_score<D: Dom + ?Sized>(dom: &D, node: NodeId, fp: &Fingerprint) -> u32 {
    let matched = fp
        .attributes
        .iter()
        .filter(|(name, value)| dom.attribute(node, name).as_deref() == Some(value.as_str()))
        .count();
    let matched = u32::try_from(matched).unwrap_or(u32::MAX);
    matched.saturating_mul(ATTRIBUTE_MATCH).min(ATTRIBUTE_BUDGET)
}

fn sibling_score<D: Dom + ?Sized>(dom: &D, node: NodeId, fp: &Fingerprint) -> u32 {
    let previous = dom.previous_element_sibling(node).and_then(|s| dom.tag_name(s));
    let next = dom.next_element_sibling(node).and_then(|s| dom.tag_name(s));

    let mut score = 0;
    if previous == fp.previous_sibling_tag {
        score += SIBLING_MATCH;
    }
    if next == fp.next_sibling_tag {
        score += SIBLING_MATCH;
    }
    score
}
