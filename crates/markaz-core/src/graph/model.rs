//! Canonical node and link entities.

use serde::{Deserialize, Deserializer, Serialize};

/// Id of the synthetic root node every fresh chat starts with.
pub const ROOT_ID: &str = "root";
/// Label of the synthetic root node.
pub const ROOT_LABEL: &str = "MARKAZ";
/// Summary shown for the root node.
pub const ROOT_SUMMARY: &str = "Every concept starts from this centre";
/// Icon shown for the root node.
pub const ROOT_ICON: &str = "⭐";
/// Placeholder summary for nodes the assistant sent without one.
pub const DEFAULT_SUMMARY: &str = "Loading details...";
/// Pin glyph used when the assistant sent no icon.
pub const DEFAULT_ICON: &str = "📌";

/// A concept in the graph.
///
/// Positions are not part of the node: they belong to the force simulation
/// and are read back through [`crate::layout::ForceSimulation::node_position`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub label: String,
    pub summary: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub is_root: bool,
    /// Search-visibility flag. Carried for the render layer; never set by the engine.
    #[serde(default)]
    pub hidden: bool,
}

impl Node {
    /// Creates a regular node with the default summary and icon.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            summary: DEFAULT_SUMMARY.to_string(),
            icon: DEFAULT_ICON.to_string(),
            color: None,
            is_root: false,
            hidden: false,
        }
    }

    /// The synthetic root node of a fresh chat.
    pub fn root() -> Self {
        Self {
            id: ROOT_ID.to_string(),
            label: ROOT_LABEL.to_string(),
            summary: ROOT_SUMMARY.to_string(),
            icon: ROOT_ICON.to_string(),
            color: None,
            is_root: true,
            hidden: false,
        }
    }

    /// Lower-cased label, the natural dedup key.
    pub fn label_key(&self) -> String {
        label_key(&self.label)
    }
}

/// Normalizes a label into the key used for case-insensitive identity.
pub fn label_key(label: &str) -> String {
    label.to_lowercase()
}

/// An undirected connection between two nodes.
///
/// Links carry no id; identity is the unordered `{source, target}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    #[serde(deserialize_with = "deserialize_endpoint")]
    pub source: String,
    #[serde(deserialize_with = "deserialize_endpoint")]
    pub target: String,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// True when this link joins `a` and `b` in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }

    /// True when `id` is one of the endpoints.
    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }
}

/// The shapes a link endpoint may arrive in.
///
/// Force-layout engines replace endpoint ids with the node object in place,
/// and assistants occasionally emit numeric ids. Both collapse to a plain id.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEndpoint {
    Id(String),
    Number(serde_json::Number),
    Object { id: Box<RawEndpoint> },
}

impl RawEndpoint {
    fn into_id(self) -> String {
        match self {
            Self::Id(id) => id,
            Self::Number(n) => n.to_string(),
            Self::Object { id } => id.into_id(),
        }
    }
}

/// Deserializes an id that may be a string, a number, or an object carrying `id`.
pub fn deserialize_endpoint<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawEndpoint::deserialize(deserializer).map(RawEndpoint::into_id)
}

/// A plain copy of a graph's collections, handed to renderers and persisted
/// with each chat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl GraphSnapshot {
    /// A snapshot holding only the root node.
    pub fn with_root() -> Self {
        Self {
            nodes: vec![Node::root()],
            links: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_node_shape() {
        let root = Node::root();
        assert_eq!(root.id, "root");
        assert_eq!(root.label, "MARKAZ");
        assert!(root.is_root);
        assert!(!root.hidden);
    }

    #[test]
    fn test_link_connects_is_direction_free() {
        let link = Link::new("a", "b");
        assert!(link.connects("a", "b"));
        assert!(link.connects("b", "a"));
        assert!(!link.connects("a", "c"));
        assert!(link.touches("b"));
    }

    #[test]
    fn test_link_endpoint_shapes_normalize_to_ids() {
        let json = r#"[
            {"source": "a", "target": "b"},
            {"source": {"id": "a", "x": 1.5}, "target": {"id": "c"}},
            {"source": 7, "target": "root"}
        ]"#;
        let links: Vec<Link> = serde_json::from_str(json).unwrap();
        assert_eq!(links[0], Link::new("a", "b"));
        assert_eq!(links[1], Link::new("a", "c"));
        assert_eq!(links[2], Link::new("7", "root"));
    }

    #[test]
    fn test_node_serializes_camel_case() {
        let json = serde_json::to_value(Node::root()).unwrap();
        assert_eq!(json["isRoot"], true);
        assert!(json.get("color").is_none());
    }
}
