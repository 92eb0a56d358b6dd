use std::collections::BTreeMap;

use crate::{
    anchor::anchor_model::{FINGERPRINT_ATTRS, Fingerprint, MAX_STORED_TEXT, PixelBox},
    dom::{Dom, NodeId},
};

/// Captures the descriptor used to find `node` again after a reload.
///
/// Missing context (no parent, no siblings) leaves the matching fields
/// absent. Never fails: a dangling handle yields an empty fingerprint.
pub fn build_fingerprint<D: Dom + ?Sized>(dom: &D, node: NodeId) -> Fingerprint {
    let text = dom.text_content(node);
    let text = text.trim();
    let rect = dom.bounding_rect(node);
    let parent = dom.parent_element(node);

    Fingerprint {
        text_content: truncate_chars(text, MAX_STORED_TEXT).to_string(),
        text_length: text.chars().count(),

        tag_name: dom.tag_name(node).unwrap_or_default(),
        class_name: dom.class_name(node),
        id: dom.id(node),

        relative_position: PixelBox {
            top: round_px(rect.top),
            left: round_px(rect.left),
            width: round_px(rect.width),
            height: round_px(rect.height),
        },

        parent_tag: parent.and_then(|p| dom.tag_name(p)),
        parent_class: parent.map(|p| dom.class_name(p)),
        previous_sibling_tag: dom
            .previous_element_sibling(node)
            .and_then(|s| dom.tag_name(s)),
        next_sibling_tag: dom.next_element_sibling(node).and_then(|s| dom.tag_name(s)),

        depth: dom.depth(node),
        index_in_parent: index_in_parent(dom, node),

        attributes: relevant_attributes(dom, node),
    }
}

/// Allow-listed attributes present on `node`.
pub fn relevant_attributes<D: Dom + ?Sized>(dom: &D, node: NodeId) -> BTreeMap<String, String> {
    FINGERPRINT_ATTRS
        .iter()
        .filter_map(|&name| dom.attribute(node, name).map(|v| (name.to_string(), v)))
        .collect()
}

/// Element index among the parent's children, or -1.
pub fn index_in_parent<D: Dom + ?Sized>(dom: &D, node: NodeId) -> i64 {
    dom.index_in_parent(node)
        .and_then(|i| i64::try_from(i).ok())
        .unwrap_or(-1)
}

/// First `max` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn round_px(value: f64) -> i64 {
    if value.is_finite() {
        value.round() as i64
    } else {
        0
    }
}
