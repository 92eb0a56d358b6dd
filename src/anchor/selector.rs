use crate::{
    anchor::anchor_model::SELECTOR_DATA_ATTRS,
    dom::{Dom, NodeId},
};

/// Segments kept from the leaf end of a structural path.
pub const MAX_PATH_SEGMENTS: usize = 4;

/// Elements with more classes than this are addressed by position instead.
const MAX_PATH_CLASSES: usize = 3;

/// Builds the fallback CSS selector stored alongside a fingerprint.
///
/// Preference: `#id`, then the first test-hook data attribute, then a
/// `tag.class:nth-child(n)` path of at most four segments. Returns an empty
/// string for handles that are not elements.
pub fn build_selector<D: Dom + ?Sized>(dom: &D, node: NodeId) -> String {
    if !dom.is_element(node) {
        return String::new();
    }

    let id = dom.id(node);
    if !id.is_empty() {
        return id_selector(&id);
    }

    for attr in SELECTOR_DATA_ATTRS {
        if let Some(value) = dom.attribute(node, attr) {
            return attribute_selector(attr, &value);
        }
    }

    structural_path(dom, node)
}

fn structural_path<D: Dom + ?Sized>(dom: &D, node: NodeId) -> String {
    let mut path = Vec::new();
    let mut current = Some(node);

    while let Some(el) = current {
        let Some(tag) = dom.tag_name(el) else {
            break;
        };
        let classes = dom.class_list(el);
        path.push(path_segment(dom, el, tag, &classes));

        if !dom.id(el).is_empty() || (!classes.is_empty() && path.len() > 2) {
            break;
        }
        current = dom.parent_element(el);
    }

    path.reverse();
    let start = path.len().saturating_sub(MAX_PATH_SEGMENTS);
    path[start..].join(" > ")
}

fn path_segment<D: Dom + ?Sized>(dom: &D, el: NodeId, tag: String, classes: &[String]) -> String {
    let mut segment = tag;

    let usable: Vec<&str> = if classes.len() <= MAX_PATH_CLASSES {
        classes
            .iter()
            .map(String::as_str)
            .filter(|c| is_plain_ident(c))
            .collect()
    } else {
        Vec::new()
    };
    for class in &usable {
        segment.push('.');
        segment.push_str(class);
    }

    if usable.is_empty() {
        if let Some(idx) = dom.index_in_parent(el) {
            segment.push_str(&format!(":nth-child({})", idx + 1));
        }
    }
    segment
}

fn id_selector(id: &str) -> String {
    if is_plain_ident(id) {
        format!("#{}", id)
    } else {
        attribute_selector("id", id)
    }
}

/// `[name="value"]` as a CSS string: quotes and backslashes escaped, line
/// breaks written as hex escapes.
pub fn attribute_selector(name: &str, value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\a "),
            '\r' => escaped.push_str("\\d "),
            '\u{c}' => escaped.push_str("\\c "),
            _ => escaped.push(c),
        }
    }
    format!("[{}=\"{}\"]", name, escaped)
}

/// Whether `s` can be written as a bare CSS identifier (`#s`, `.s`).
fn is_plain_ident(s: &str) -> bool {
    let rest = s.strip_prefix('-').unwrap_or(s);
    let Some(first) = rest.chars().next() else {
        return false;
    };
    if first.is_ascii_digit() {
        return false;
    }
    rest.chars().all(|c| {
        c.is_ascii_alphanumeric() || c == '_' || c == '-' || (!c.is_ascii() && !c.is_whitespace())
    })
}
