use std::collections::BTreeMap;

use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};

use crate::dom::{
    markup::page_markup,
    tree::{Dom, NodeId, Rect},
};

// ============================================================================
// Page snapshot (serialized form)
// ============================================================================

/// A page as captured by the host: URL plus the element tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    #[serde(default)]
    pub title: String,
    pub root: SnapshotElement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotNode {
    Text(String),
    Element(SnapshotElement),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotElement {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub rect: Rect,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,
}

// ============================================================================
// Arena document
// ============================================================================

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        rect: Rect,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory page tree. Removed nodes stay in the arena, detached.
#[derive(Debug, Clone)]
pub struct Document {
    pub url: String,
    pub title: String,
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Document {
    /// Empty `<html><head></head><body></body></html>` document.
    pub fn new(url: &str) -> Self {
        let mut doc = Self::empty(url);
        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.append_child(html, head);
        doc.append_child(html, body);
        doc.root = Some(html);
        doc
    }

    fn empty(url: &str) -> Self {
        Document {
            url: url.to_string(),
            title: String::new(),
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Parses real page markup. Layout boxes are unknown and stay zeroed.
    pub fn from_html(url: &str, markup: &str) -> Self {
        let page = Html::parse_document(markup);
        let mut doc = Self::empty(url);
        let root = doc.import_element(page.root_element(), None);
        doc.root = Some(root);

        doc.title = doc
            .elements()
            .into_iter()
            .find(|&n| doc.tag_name(n).as_deref() == Some("title"))
            .map(|n| doc.text_content(n).trim().to_string())
            .unwrap_or_default();
        doc
    }

    /// Serializes the tree back to markup, starting with a doctype.
    pub fn to_html(&self) -> String {
        page_markup(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let snapshot: PageSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(&snapshot))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_snapshot())
    }

    /// Builds the tree from a snapshot. An `<html>` root without a `<head>`
    /// gets an empty one, as a browser would insert.
    pub fn from_snapshot(snapshot: &PageSnapshot) -> Self {
        let mut doc = Self::empty(&snapshot.url);
        doc.title = snapshot.title.clone();
        let root = doc.insert_snapshot(&snapshot.root, None);
        doc.root = Some(root);
        doc.ensure_head(root);
        doc
    }

    fn ensure_head(&mut self, root: NodeId) {
        if self.tag_name(root).as_deref() != Some("html") {
            return;
        }
        let has_head = self
            .children(root)
            .into_iter()
            .any(|c| self.tag_name(c).as_deref() == Some("head"));
        if has_head {
            return;
        }

        let head = self.create_element("head");
        match self.nodes[root.0].children.first().copied() {
            Some(first) => self.insert_before(root, head, first),
            None => self.append_child(root, head),
        }
    }

    pub fn to_snapshot(&self) -> PageSnapshot {
        let root = self
            .root
            .and_then(|r| self.snapshot_element(r))
            .unwrap_or_else(|| SnapshotElement {
                tag: "html".into(),
                attributes: BTreeMap::new(),
                rect: Rect::default(),
                children: Vec::new(),
            });

        PageSnapshot {
            url: self.url.clone(),
            title: self.title.clone(),
            root,
        }
    }

    fn import_element(&mut self, el: ElementRef<'_>, parent: Option<NodeId>) -> NodeId {
        let value = el.value();
        let id = self.push(NodeData::Element {
            tag: value.name().to_lowercase(),
            attributes: value
                .attrs()
                .map(|(name, v)| (name.to_string(), v.to_string()))
                .collect(),
            rect: Rect::default(),
        });
        if let Some(p) = parent {
            self.link(p, id);
        }

        // Inter-element whitespace under <html> and <head> is not kept.
        let keep_text = !matches!(value.name(), "html" | "head");
        for child in el.children() {
            if let Some(child_el) = ElementRef::wrap(child) {
                self.import_element(child_el, Some(id));
            } else if let Some(text) = child.value().as_text().filter(|_| keep_text) {
                self.append_text(id, &**text);
            }
        }
        id
    }

    fn insert_snapshot(&mut self, el: &SnapshotElement, parent: Option<NodeId>) -> NodeId {
        let id = self.push(NodeData::Element {
            tag: el.tag.to_lowercase(),
            attributes: el.attributes.clone(),
            rect: el.rect,
        });
        if let Some(p) = parent {
            self.append_child(p, id);
        }

        for child in &el.children {
            match child {
                SnapshotNode::Text(text) => {
                    self.append_text(id, text);
                }
                SnapshotNode::Element(child_el) => {
                    self.insert_snapshot(child_el, Some(id));
                }
            }
        }
        id
    }

    fn snapshot_element(&self, id: NodeId) -> Option<SnapshotElement> {
        let node = self.nodes.get(id.0)?;
        let NodeData::Element {
            tag,
            attributes,
            rect,
        } = &node.data
        else {
            return None;
        };

        let children = node
            .children
            .iter()
            .filter_map(|&c| match &self.nodes.get(c.0)?.data {
                NodeData::Text(t) => Some(SnapshotNode::Text(t.clone())),
                NodeData::Element { .. } => self.snapshot_element(c).map(SnapshotNode::Element),
            })
            .collect();

        Some(SnapshotElement {
            tag: tag.clone(),
            attributes: attributes.clone(),
            rect: *rect,
            children,
        })
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Appends a text node under `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.push(NodeData::Text(text.to_string()));
        self.link(parent, id);
        id
    }

    /// Creates an element, appends it under `parent`, and returns it.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.create_element(tag);
        self.append_child(parent, id);
        id
    }

    pub fn set_rect(&mut self, node: NodeId, new_rect: Rect) {
        if let Some(Node {
            data: NodeData::Element { rect, .. },
            ..
        }) = self.nodes.get_mut(node.0)
        {
            *rect = new_rect;
        }
    }

    /// Inserts `child` before `reference` among `parent`'s children.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() || parent == child {
            return;
        }
        self.detach(child);
        let pos = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == reference)
            .unwrap_or(self.nodes[parent.0].children.len());
        self.nodes[parent.0].children.insert(pos, child);
        self.nodes[child.0].parent = Some(parent);
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() || parent == child {
            return;
        }
        if !matches!(self.nodes[parent.0].data, NodeData::Element { .. }) {
            return;
        }
        // Refuse to create a cycle.
        let mut ancestor = Some(parent);
        while let Some(a) = ancestor {
            if a == child {
                return;
            }
            ancestor = self.nodes[a.0].parent;
        }

        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes.get(node.0).and_then(|n| n.parent) {
            self.nodes[parent.0].children.retain(|&c| c != node);
            self.nodes[node.0].parent = None;
        }
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.nodes.get(node.0) else {
            return;
        };
        match &n.data {
            NodeData::Text(t) => out.push_str(t),
            NodeData::Element { .. } => {
                for &c in &n.children {
                    self.collect_text(c, out);
                }
            }
        }
    }

    fn collect_elements(&self, node: NodeId, out: &mut Vec<NodeId>) {
        let Some(n) = self.nodes.get(node.0) else {
            return;
        };
        if let NodeData::Element { .. } = n.data {
            out.push(node);
            for &c in &n.children {
                self.collect_elements(c, out);
            }
        }
    }

    fn element_attributes(&self, node: NodeId) -> Option<&BTreeMap<String, String>> {
        match &self.nodes.get(node.0)?.data {
            NodeData::Element { attributes, .. } => Some(attributes),
            NodeData::Text(_) => None,
        }
    }
}

impl Dom for Document {
    fn document_element(&self) -> Option<NodeId> {
        self.root
    }

    fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            self.collect_elements(root, &mut out);
        }
        out
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        match &self.nodes.get(node.0)?.data {
            NodeData::Element { tag, .. } => Some(tag.clone()),
            NodeData::Text(_) => None,
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element_attributes(node)?.get(name).cloned()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(Node {
            data: NodeData::Element { attributes, .. },
            ..
        }) = self.nodes.get_mut(node.0)
        {
            attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(Node {
            data: NodeData::Element { attributes, .. },
            ..
        }) = self.nodes.get_mut(node.0)
        {
            attributes.remove(name);
        }
    }

    fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        self.element_attributes(node)
            .map(|attrs| attrs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        let Some(n) = self.nodes.get(node.0) else {
            return Vec::new();
        };
        n.children
            .iter()
            .copied()
            .filter(|&c| matches!(self.nodes[c.0].data, NodeData::Element { .. }))
            .collect()
    }

    fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        let Some(n) = self.nodes.get(node.0) else {
            return;
        };
        if matches!(n.data, NodeData::Text(_)) {
            self.nodes[node.0].data = NodeData::Text(text.to_string());
            return;
        }

        let old = std::mem::take(&mut self.nodes[node.0].children);
        for c in old {
            self.nodes[c.0].parent = None;
        }
        if !text.is_empty() {
            self.append_text(node, text);
        }
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        match self.nodes.get(node.0).map(|n| &n.data) {
            Some(NodeData::Element { rect, .. }) => *rect,
            _ => Rect::default(),
        }
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element {
            tag: tag.to_lowercase(),
            attributes: BTreeMap::new(),
            rect: Rect::default(),
        })
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.link(parent, child);
    }

    fn remove_node(&mut self, node: NodeId) {
        self.detach(node);
    }
}
