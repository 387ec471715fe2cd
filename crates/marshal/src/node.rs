//! Intermediate node tree.
//!
//! Nodes live for exactly one marshal call: the tree builder creates them
//! from the [`NodePool`], the encoder consumes them depth-first and hands
//! each one back as soon as it has been written.

use crate::pool::{Pool, Recycle};

/// Name of the default namespace attribute.
pub const XMLNS: &str = "xmlns";

const MAX_IDLE_NODES: usize = 4096;

/// A `name="value"` pair. Values are stored unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Element {
    pub name: String,
    /// In insertion order; duplicates are allowed.
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    /// Forces `<name/>` regardless of content.
    pub self_close: bool,
}

impl Element {
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|attr| attr.name == name)
    }

    /// Inserts an attribute ahead of all others, keeping their order.
    pub fn insert_attribute_first(&mut self, attribute: Attribute) {
        self.attributes.insert(0, attribute);
    }

    /// True if any child is an element or a non-empty text node.
    pub fn has_meaningful_children(&self) -> bool {
        self.children.iter().any(|child| match child {
            Node::Element(_) => true,
            Node::Text(text) => !text.content.is_empty(),
        })
    }
}

impl Recycle for Element {
    fn recycle(&mut self) {
        self.name.clear();
        self.attributes.clear();
        self.children.clear();
        self.self_close = false;
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Text {
    pub content: String,
}

impl Recycle for Text {
    fn recycle(&mut self) {
        self.content.clear();
    }
}

#[derive(Debug, PartialEq)]
pub enum Node {
    Element(Box<Element>),
    Text(Box<Text>),
}

impl From<Box<Element>> for Node {
    fn from(element: Box<Element>) -> Self {
        Node::Element(element)
    }
}

impl From<Box<Text>> for Node {
    fn from(text: Box<Text>) -> Self {
        Node::Text(text)
    }
}

/// Reuse pool for both node kinds.
pub struct NodePool {
    elements: Pool<Box<Element>>,
    texts: Pool<Box<Text>>,
}

impl NodePool {
    pub const fn new() -> Self {
        Self {
            elements: Pool::new(MAX_IDLE_NODES),
            texts: Pool::new(MAX_IDLE_NODES),
        }
    }

    /// Takes an empty element and names it.
    pub fn element(&self, name: &str) -> Box<Element> {
        let mut element = self.elements.take();
        element.name.push_str(name);
        element
    }

    /// Takes an empty text node; the caller fills `content`.
    pub fn text(&self) -> Box<Text> {
        self.texts.take()
    }

    /// Releases an element and, depth-first, everything below it.
    pub fn release_element(&self, mut element: Box<Element>) {
        for child in element.children.drain(..) {
            self.release(child);
        }
        self.elements.put(element);
    }

    pub fn release_text(&self, text: Box<Text>) {
        self.texts.put(text);
    }

    pub fn release(&self, node: Node) {
        match node {
            Node::Element(element) => self.release_element(element),
            Node::Text(text) => self.release_text(text),
        }
    }

    /// Idle `(elements, texts)`.
    pub fn idle(&self) -> (usize, usize) {
        (self.elements.idle(), self.texts.idle())
    }
}

impl Default for NodePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_node(pool: &NodePool, content: &str) -> Node {
        let mut text = pool.text();
        text.content.push_str(content);
        Node::Text(text)
    }

    #[test]
    fn test_meaningful_children() {
        let pool = NodePool::new();
        let mut element = pool.element("note");
        assert!(!element.has_meaningful_children());

        element.children.push(text_node(&pool, ""));
        assert!(!element.has_meaningful_children());

        element.children.push(text_node(&pool, "hi"));
        assert!(element.has_meaningful_children());

        let mut wrapper = pool.element("wrapper");
        wrapper.children.push(Node::Element(pool.element("empty")));
        assert!(wrapper.has_meaningful_children());
    }

    #[test]
    fn test_insert_attribute_first_keeps_order() {
        let pool = NodePool::new();
        let mut element = pool.element("root");
        element.attributes.push(Attribute::new("id", "1"));
        element.attributes.push(Attribute::new("kind", "x"));
        element.insert_attribute_first(Attribute::new(XMLNS, "urn:test"));

        let names: Vec<_> = element.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, [XMLNS, "id", "kind"]);
        assert!(element.has_attribute(XMLNS));
        assert!(!element.has_attribute("missing"));
    }

    #[test]
    fn test_release_is_depth_first_and_resets() {
        let pool = NodePool::new();
        let mut root = pool.element("root");
        root.self_close = true;
        root.attributes.push(Attribute::new("id", "7"));
        let mut child = pool.element("child");
        child.children.push(text_node(&pool, "leaf"));
        root.children.push(Node::Element(child));

        pool.release_element(root);
        assert_eq!(pool.idle(), (2, 1));

        let reused = pool.element("fresh");
        assert_eq!(reused.name, "fresh");
        assert!(reused.attributes.is_empty());
        assert!(reused.children.is_empty());
        assert!(!reused.self_close);
        assert!(pool.text().content.is_empty());
    }
}
