// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! DOM node storage and node handles

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Shared node storage of one document
pub(crate) type NodeStore = Arc<RwLock<HashMap<NodeId, NodeData>>>;

/// Unique node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Create a new unique node ID
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Node type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Element,
    Text,
    Comment,
    DocumentType,
}

/// Internal node data
#[derive(Debug)]
pub struct NodeData {
    pub node_type: NodeType,
    /// Lowercase tag name (elements only)
    pub tag_name: Option<String>,
    /// Character data (text and comment nodes)
    pub text: Option<String>,
    /// Attributes with lowercase names
    pub attributes: HashMap<String, String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl NodeData {
    fn blank(node_type: NodeType) -> Self {
        Self {
            node_type,
            tag_name: None,
            text: None,
            attributes: HashMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn element(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: Some(tag_name.into().to_lowercase()),
            ..Self::blank(NodeType::Element)
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            text: Some(content.into()),
            ..Self::blank(NodeType::Text)
        }
    }

    pub fn comment(content: impl Into<String>) -> Self {
        Self {
            text: Some(content.into()),
            ..Self::blank(NodeType::Comment)
        }
    }

    pub fn doctype() -> Self {
        Self::blank(NodeType::DocumentType)
    }

    pub fn document() -> Self {
        Self::blank(NodeType::Document)
    }
}

/// A reference to a node in a document's storage
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    nodes: NodeStore,
}

impl Node {
    pub(crate) fn new(id: NodeId, nodes: NodeStore) -> Self {
        Self { id, nodes }
    }

    pub(crate) fn store(&self) -> &NodeStore {
        &self.nodes
    }

    /// Get the node type; detached ids report `Comment` so they never match selectors
    pub fn node_type(&self) -> NodeType {
        self.nodes
            .read()
            .get(&self.id)
            .map(|n| n.node_type)
            .unwrap_or(NodeType::Comment)
    }

    /// Lowercase tag name
    pub fn local_name(&self) -> Option<String> {
        self.nodes.read().get(&self.id).and_then(|n| n.tag_name.clone())
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self) -> String {
        let nodes = self.nodes.read();
        let mut out = String::new();
        collect_text(&nodes, self.id, &mut out);
        out
    }

    /// Replace all children with a single text node
    pub fn set_text_content(&self, content: impl Into<String>) {
        let mut nodes = self.nodes.write();
        let old_children = match nodes.get_mut(&self.id) {
            Some(node) if node.node_type == NodeType::Text => {
                node.text = Some(content.into());
                return;
            }
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };

        for child in old_children {
            if let Some(data) = nodes.get_mut(&child) {
                data.parent = None;
            }
        }

        let text_id = NodeId::new();
        let mut text_data = NodeData::text(content);
        text_data.parent = Some(self.id);
        nodes.insert(text_id, text_data);
        if let Some(node) = nodes.get_mut(&self.id) {
            node.children.push(text_id);
        }
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.nodes
            .read()
            .get(&self.id)
            .and_then(|n| n.attributes.get(&name.to_lowercase()).cloned())
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        if let Some(node) = self.nodes.write().get_mut(&self.id) {
            node.attributes.insert(name.into().to_lowercase(), value.into());
        }
    }

    pub fn remove_attribute(&self, name: &str) {
        if let Some(node) = self.nodes.write().get_mut(&self.id) {
            node.attributes.remove(&name.to_lowercase());
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.nodes
            .read()
            .get(&self.id)
            .map(|n| n.attributes.contains_key(&name.to_lowercase()))
            .unwrap_or(false)
    }

    pub fn parent(&self) -> Option<Node> {
        self.nodes
            .read()
            .get(&self.id)
            .and_then(|n| n.parent)
            .map(|id| Node::new(id, self.nodes.clone()))
    }

    pub fn children(&self) -> Vec<Node> {
        self.nodes
            .read()
            .get(&self.id)
            .map(|n| {
                n.children
                    .iter()
                    .map(|&id| Node::new(id, self.nodes.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All descendants in document order, excluding self
    pub fn descendants(&self) -> Vec<Node> {
        let nodes = self.nodes.read();
        let mut ids = Vec::new();
        collect_descendants(&nodes, self.id, &mut ids);
        ids.into_iter()
            .map(|id| Node::new(id, self.nodes.clone()))
            .collect()
    }

    pub fn is_element(&self) -> bool {
        self.node_type() == NodeType::Element
    }

    /// Append a child, detaching it from any previous parent
    pub fn append_child(&self, child: &Node) {
        let mut nodes = self.nodes.write();

        if let Some(old_parent) = nodes.get(&child.id).and_then(|d| d.parent) {
            if let Some(parent) = nodes.get_mut(&old_parent) {
                parent.children.retain(|&id| id != child.id);
            }
        }

        if let Some(child_data) = nodes.get_mut(&child.id) {
            child_data.parent = Some(self.id);
        }

        if let Some(parent_data) = nodes.get_mut(&self.id) {
            parent_data.children.push(child.id);
        }
    }

    pub fn remove_child(&self, child: &Node) {
        let mut nodes = self.nodes.write();
        if let Some(parent_data) = nodes.get_mut(&self.id) {
            parent_data.children.retain(|&id| id != child.id);
        }
        if let Some(child_data) = nodes.get_mut(&child.id) {
            child_data.parent = None;
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

fn collect_text(nodes: &HashMap<NodeId, NodeData>, id: NodeId, out: &mut String) {
    let Some(node) = nodes.get(&id) else {
        return;
    };
    match node.node_type {
        NodeType::Text => out.push_str(node.text.as_deref().unwrap_or("")),
        NodeType::Element | NodeType::Document => {
            for &child in &node.children {
                collect_text(nodes, child, out);
            }
        }
        _ => {}
    }
}

fn collect_descendants(nodes: &HashMap<NodeId, NodeData>, id: NodeId, out: &mut Vec<NodeId>) {
    if let Some(node) = nodes.get(&id) {
        for &child in &node.children {
            out.push(child);
            collect_descendants(nodes, child, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(root: NodeData) -> (NodeStore, NodeId) {
        let id = NodeId::new();
        let mut map = HashMap::new();
        map.insert(id, root);
        (Arc::new(RwLock::new(map)), id)
    }

    #[test]
    fn test_node_id() {
        let id1 = NodeId::new();
        let id2 = NodeId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_text_content_and_replace() {
        let (store, root_id) = store_with(NodeData::element("p"));
        let root = Node::new(root_id, store.clone());

        let text_id = NodeId::new();
        store.write().insert(text_id, NodeData::text("Save"));
        root.append_child(&Node::new(text_id, store.clone()));
        assert_eq!(root.text_content(), "Save");

        root.set_text_content("Saved");
        assert_eq!(root.text_content(), "Saved");
        assert_eq!(root.children().len(), 1);
    }

    #[test]
    fn test_append_child_moves_node() {
        let (store, a_id) = store_with(NodeData::element("div"));
        let b_id = NodeId::new();
        let c_id = NodeId::new();
        store.write().insert(b_id, NodeData::element("div"));
        store.write().insert(c_id, NodeData::element("span"));

        let a = Node::new(a_id, store.clone());
        let b = Node::new(b_id, store.clone());
        let c = Node::new(c_id, store.clone());

        a.append_child(&c);
        b.append_child(&c);

        assert!(a.children().is_empty());
        assert_eq!(b.children(), vec![c.clone()]);
        assert_eq!(c.parent(), Some(b));
    }
}
