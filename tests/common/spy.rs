use edit_anchor::dom::{Document, Dom, NodeId, Rect};

/// Counts text writes made through the [`Dom`] trait.
pub struct WriteSpy {
    pub inner: Document,
    pub text_writes: usize,
    pub attribute_writes: usize,
}

impl WriteSpy {
    pub fn new(inner: Document) -> Self {
        Self {
            inner,
            text_writes: 0,
            attribute_writes: 0,
        }
    }
}

impl Dom for WriteSpy {
    fn document_element(&self) -> Option<NodeId> {
        self.inner.document_element()
    }

    fn elements(&self) -> Vec<NodeId> {
        self.inner.elements()
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.inner.tag_name(node)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.inner.attribute(node, name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.attribute_writes += 1;
        self.inner.set_attribute(node, name, value);
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        self.attribute_writes += 1;
        self.inner.remove_attribute(node, name);
    }

    fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        self.inner.attributes(node)
    }

    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.inner.parent_element(node)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner.children(node)
    }

    fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.inner.child_nodes(node)
    }

    fn text_content(&self, node: NodeId) -> String {
        self.inner.text_content(node)
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        self.text_writes += 1;
        self.inner.set_text_content(node, text);
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        self.inner.bounding_rect(node)
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.inner.create_element(tag)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.inner.append_child(parent, child);
    }

    fn remove_node(&mut self, node: NodeId) {
        self.inner.remove_node(node);
    }
}
