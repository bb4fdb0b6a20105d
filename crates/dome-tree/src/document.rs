use std::sync::OnceLock;

use dome_host::{HostDocument, HostError, Value};
use regex::Regex;
use tracing::debug;

use crate::node::{Node, NodeKind};

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]*$").unwrap())
}

/// An in-memory document: the root of a tree of element and text nodes.
#[derive(Debug, Clone)]
pub struct Document {
    root: Node,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            root: Node::new(NodeKind::Document, ""),
        }
    }

    /// The document node itself. Top-level elements are its children.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Creates a detached element. Tag names are case-insensitive and stored lowercase.
    pub fn create_element(&self, tag: &str) -> Result<Node, HostError> {
        if !tag_regex().is_match(tag) {
            return Err(HostError::invalid_argument(format!(
                "`{tag}` is not a valid tag name"
            )));
        }
        Ok(Node::new(
            NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
            },
            "",
        ))
    }

    pub fn create_text_node(&self, text: &str) -> Node {
        Node::new(NodeKind::Text, text)
    }

    /// Appends a top-level node.
    pub fn append_child(&self, child: &Node) -> Result<(), HostError> {
        self.root.append_child(child)
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>, HostError> {
        self.root.query_selector_all(selector)
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<Node>, HostError> {
        self.root.query_selector(selector)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<Node> {
        self.root
            .descendants()
            .into_iter()
            .find(|n| n.is_element() && n.id() == id)
    }

    pub fn to_html(&self) -> String {
        self.root.outer_html()
    }
}

impl HostDocument for Document {
    fn create_element(&self, tag: &str) -> Result<Value, HostError> {
        Document::create_element(self, tag).map(|n| n.to_value())
    }

    fn create_text_node(&self, text: &str) -> Result<Value, HostError> {
        Ok(Document::create_text_node(self, text).to_value())
    }

    fn query_all(&self, selector: &str) -> Result<Vec<Value>, HostError> {
        let found = self.query_selector_all(selector)?;
        debug!(selector, matches = found.len(), "document query");
        Ok(found.iter().map(Node::to_value).collect())
    }
}
