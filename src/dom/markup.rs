//! HTML serialization of a [`Dom`].

use crate::dom::tree::{Dom, NodeId};

/// Attribute carrying each element's handle in marked markup.
pub(crate) const NODE_MARKER: &str = "data-edit-anchor-node";

const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: [&str; 7] = [
    "script", "style", "xmp", "iframe", "noembed", "noframes", "noscript",
];

/// Markup for the whole page, doctype first.
pub fn page_markup<D: Dom + ?Sized>(dom: &D) -> String {
    render(dom, false)
}

/// Same as [`page_markup`], with every element tagged by [`NODE_MARKER`]
/// so a parsed copy can be mapped back to handles.
pub(crate) fn marked_markup<D: Dom + ?Sized>(dom: &D) -> String {
    render(dom, true)
}

fn render<D: Dom + ?Sized>(dom: &D, marked: bool) -> String {
    // The doctype keeps the parser out of quirks mode, where class and id
    // matching turn case-insensitive.
    let mut out = String::from("<!DOCTYPE html>");
    if let Some(root) = dom.document_element() {
        write_element(dom, root, marked, &mut out);
    }
    out
}

fn write_element<D: Dom + ?Sized>(dom: &D, node: NodeId, marked: bool, out: &mut String) {
    let Some(tag) = dom.tag_name(node) else {
        return;
    };
    if !is_tag_name(&tag) {
        return;
    }

    out.push('<');
    out.push_str(&tag);
    if marked {
        out.push(' ');
        out.push_str(NODE_MARKER);
        out.push_str("=\"");
        out.push_str(&node.0.to_string());
        out.push('"');
    }
    for (name, value) in dom.attributes(node) {
        if name == NODE_MARKER || !is_attribute_name(&name) {
            continue;
        }
        out.push(' ');
        out.push_str(&name);
        out.push_str("=\"");
        escape_attribute(&value, out);
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&tag.as_str()) {
        return;
    }

    // Text directly under <html> or <head> would be moved into <body>.
    let keep_text = !matches!(tag.as_str(), "html" | "head");
    let raw = RAW_TEXT_ELEMENTS.contains(&tag.as_str());
    for child in dom.child_nodes(node) {
        if dom.is_element(child) {
            write_element(dom, child, marked, out);
        } else if keep_text {
            let text = dom.text_content(child);
            if raw && !text.contains("</") {
                out.push_str(&text);
            } else {
                escape_text(&text, out);
            }
        }
    }

    out.push_str("</");
    out.push_str(&tag);
    out.push('>');
}

fn is_tag_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_alphabetic()) && is_attribute_name(name)
}

fn is_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '<' | '>' | '/' | '=')
        })
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\r' => out.push_str("&#13;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}
