//! The working copy of the active chat's graph.

use std::collections::HashMap;

use super::fragment::Fragment;
use super::model::{GraphSnapshot, Link, Node, label_key};
use super::reconciler::{MergeReconciler, MergeReport};

/// Owns the node and link collections of the active chat.
///
/// Both collections keep insertion order. Two indexes are maintained next to
/// them: id → position and lower-cased label → id.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    links: Vec<Link>,
    positions: HashMap<String, usize>,
    labels: HashMap<String, String>,
}

impl GraphStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding only the root node.
    pub fn with_root() -> Self {
        Self::from_snapshot(GraphSnapshot::with_root())
    }

    pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
        let mut store = Self::new();
        store.replace_all(snapshot.nodes, snapshot.links);
        store
    }

    pub fn current_nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn current_links(&self) -> &[Link] {
        &self.links
    }

    /// Replaces both collections wholesale.
    ///
    /// The data is a prior valid snapshot, so only the indexes are rebuilt.
    pub fn replace_all(&mut self, nodes: Vec<Node>, links: Vec<Link>) {
        self.nodes = nodes;
        self.links = links;
        self.positions.clear();
        self.labels.clear();
        for (index, node) in self.nodes.iter().enumerate() {
            self.positions.entry(node.id.clone()).or_insert(index);
            self.labels
                .entry(node.label_key())
                .or_insert_with(|| node.id.clone());
        }
    }

    /// Absorbs an assistant fragment. This is the only additive mutation path.
    pub fn merge(&mut self, fragment: &Fragment) -> MergeReport {
        MergeReconciler::reconcile(self, fragment)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.positions.get(id).map(|&index| &self.nodes[index])
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Id of the node whose label matches case-insensitively.
    pub fn id_for_label(&self, label: &str) -> Option<&str> {
        self.labels.get(&label_key(label)).map(String::as_str)
    }

    /// True when a link joins `a` and `b` in either direction.
    pub fn has_link(&self, a: &str, b: &str) -> bool {
        self.links.iter().any(|link| link.connects(a, b))
    }

    /// Links with `id` as one endpoint, in insertion order.
    pub fn incident_links(&self, id: &str) -> Vec<Link> {
        self.links
            .iter()
            .filter(|link| link.touches(id))
            .cloned()
            .collect()
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            links: self.links.clone(),
        }
    }

    pub fn into_snapshot(self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes,
            links: self.links,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(super) fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        match self.positions.get(id) {
            Some(&index) => self.nodes.get_mut(index),
            None => None,
        }
    }

    pub(super) fn push_node(&mut self, node: Node) {
        self.positions.insert(node.id.clone(), self.nodes.len());
        self.labels.insert(node.label_key(), node.id.clone());
        self.nodes.push(node);
    }

    pub(super) fn push_link(&mut self, link: Link) {
        self.links.push(link);
    }
}
