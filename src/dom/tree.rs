use serde::{Deserialize, Serialize};

/// Handle to a node owned by a [`Dom`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Viewport-relative layout box, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }
}

/// The live page tree as seen by the anchoring core.
///
/// Every method must tolerate a dangling or non-element `NodeId` by
/// returning an empty value (or doing nothing, for mutators).
pub trait Dom {
    /// The `<html>` element, if the document has one.
    fn document_element(&self) -> Option<NodeId>;

    /// All connected elements in document order.
    fn elements(&self) -> Vec<NodeId>;

    /// Lowercase tag name. `None` for text nodes and unknown handles.
    fn tag_name(&self, node: NodeId) -> Option<String>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    fn remove_attribute(&mut self, node: NodeId, name: &str);

    /// All attributes of an element, in a stable order.
    fn attributes(&self, node: NodeId) -> Vec<(String, String)>;

    fn parent_element(&self, node: NodeId) -> Option<NodeId>;

    /// Element children only, in order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Element and text children, in order. Text nodes answer
    /// `text_content` with their own text.
    fn child_nodes(&self, node: NodeId) -> Vec<NodeId>;

    /// Concatenated text of all descendant text nodes.
    fn text_content(&self, node: NodeId) -> String;

    /// Replaces all children with a single text node.
    fn set_text_content(&mut self, node: NodeId, text: &str);

    fn bounding_rect(&self, node: NodeId) -> Rect;

    /// Creates a detached element.
    fn create_element(&mut self, tag: &str) -> NodeId;
    fn append_child(&mut self, parent: NodeId, child: NodeId);

    /// Detaches the node (and its subtree) from the document.
    fn remove_node(&mut self, node: NodeId);

    // ---- provided ----

    fn is_element(&self, node: NodeId) -> bool {
        self.tag_name(node).is_some()
    }

    fn body(&self) -> Option<NodeId> {
        let root = self.document_element()?;
        self.children(root)
            .into_iter()
            .find(|&c| self.tag_name(c).as_deref() == Some("body"))
    }

    fn id(&self, node: NodeId) -> String {
        self.attribute(node, "id").unwrap_or_default()
    }

    /// Raw `class` attribute value.
    fn class_name(&self, node: NodeId) -> String {
        self.attribute(node, "class").unwrap_or_default()
    }

    fn class_list(&self, node: NodeId) -> Vec<String> {
        self.class_name(node)
            .split_ascii_whitespace()
            .map(str::to_string)
            .collect()
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.class_list(node).iter().any(|c| c == class)
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if !self.is_element(node) || self.has_class(node, class) {
            return;
        }
        let mut classes = self.class_list(node);
        classes.push(class.to_string());
        self.set_attribute(node, "class", &classes.join(" "));
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            return;
        }
        let classes: Vec<String> = self
            .class_list(node)
            .into_iter()
            .filter(|c| c != class)
            .collect();
        self.set_attribute(node, "class", &classes.join(" "));
    }

    fn index_in_parent(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent_element(node)?;
        self.children(parent).iter().position(|&c| c == node)
    }

    fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent_element(node)?;
        let siblings = self.children(parent);
        let idx = siblings.iter().position(|&c| c == node)?;
        idx.checked_sub(1).map(|i| siblings[i])
    }

    fn next_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent_element(node)?;
        let siblings = self.children(parent);
        let idx = siblings.iter().position(|&c| c == node)?;
        siblings.get(idx + 1).copied()
    }

    /// Number of element ancestors.
    fn depth(&self, node: NodeId) -> usize {
        let mut depth = 0;
        let mut current = node;
        while let Some(parent) = self.parent_element(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    fn elements_with_attribute(&self, name: &str, value: Option<&str>) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|&n| match (self.attribute(n, name), value) {
                (Some(v), Some(want)) => v == want,
                (Some(_), None) => true,
                (None, _) => false,
            })
            .collect()
    }

    /// Inline style property read from the `style` attribute.
    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        let style = self.attribute(node, "style")?;
        parse_inline_style(&style)
            .into_iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v)
    }

    /// Sets an inline style property. An empty value removes it.
    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if !self.is_element(node) {
            return;
        }
        let mut decls = parse_inline_style(&self.attribute(node, "style").unwrap_or_default());
        decls.retain(|(k, _)| k != property);
        if !value.is_empty() {
            decls.push((property.to_string(), value.to_string()));
        }

        if decls.is_empty() {
            self.remove_attribute(node, "style");
        } else {
            let style = decls
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join("; ");
            self.set_attribute(node, "style", &style);
        }
    }
}

fn parse_inline_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let (k, v) = (k.trim(), v.trim());
            if k.is_empty() {
                None
            } else {
                Some((k.to_lowercase(), v.to_string()))
            }
        })
        .collect()
}
