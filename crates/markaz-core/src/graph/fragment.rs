//! Graph fragments delivered by the assistant.
//!
//! A fragment is parsed from the `graph_data` value of a chat response. Ids
//! inside a fragment are scoped to that fragment and are reconciled against the
//! running graph by the merge reconciler.

use serde::Deserialize;
use serde_json::Value;

use super::model::deserialize_endpoint;
use crate::error::{MarkazError, Result};

/// A candidate node as sent by the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FragmentNode {
    #[serde(deserialize_with = "deserialize_endpoint")]
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl FragmentNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            summary: None,
            icon: None,
            color: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// A candidate link; endpoints reference fragment-scoped ids.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FragmentLink {
    #[serde(deserialize_with = "deserialize_endpoint")]
    pub source: String,
    #[serde(deserialize_with = "deserialize_endpoint")]
    pub target: String,
}

impl FragmentLink {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A validated batch of candidate nodes and links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub nodes: Vec<FragmentNode>,
    pub links: Vec<FragmentLink>,
}

impl Fragment {
    pub fn new(nodes: Vec<FragmentNode>, links: Vec<FragmentLink>) -> Self {
        Self { nodes, links }
    }

    /// Validates raw `graph_data` JSON.
    ///
    /// The whole value is rejected when `nodes` is missing or not a sequence,
    /// when `links` is present but not a sequence, or when any entry lacks the
    /// required fields. No partial fragment is ever returned.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| MarkazError::malformed_fragment("graph data is not an object"))?;

        let nodes = match object.get("nodes") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| FragmentNode::deserialize(item))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| MarkazError::malformed_fragment(format!("invalid node: {}", e)))?,
            Some(_) => return Err(MarkazError::malformed_fragment("`nodes` is not a sequence")),
            None => return Err(MarkazError::malformed_fragment("missing `nodes`")),
        };

        let links = match object.get("links") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| FragmentLink::deserialize(item))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| MarkazError::malformed_fragment(format!("invalid link: {}", e)))?,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => return Err(MarkazError::malformed_fragment("`links` is not a sequence")),
        };

        Ok(Self { nodes, links })
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_full_fragment() {
        let value = json!({
            "nodes": [
                {"id": "n1", "label": "Sun", "summary": "A star", "icon": "☀️", "color": "#ffd93d"},
                {"id": 2, "label": "Moon"}
            ],
            "links": [{"source": "n1", "target": 2}]
        });

        let fragment = Fragment::from_value(&value).unwrap();
        assert_eq!(fragment.nodes.len(), 2);
        assert_eq!(fragment.nodes[0].summary.as_deref(), Some("A star"));
        assert_eq!(fragment.nodes[1].id, "2");
        assert_eq!(fragment.links, vec![FragmentLink::new("n1", "2")]);
    }

    #[test]
    fn test_links_are_optional() {
        let fragment = Fragment::from_value(&json!({"nodes": []})).unwrap();
        assert!(fragment.is_empty());
    }

    #[test]
    fn test_missing_nodes_is_malformed() {
        let err = Fragment::from_value(&json!({"links": []})).unwrap_err();
        assert!(err.is_malformed_fragment());
    }

    #[test]
    fn test_non_sequence_nodes_is_malformed() {
        let err = Fragment::from_value(&json!({"nodes": "Sun"})).unwrap_err();
        assert!(err.is_malformed_fragment());
    }

    #[test]
    fn test_node_without_label_rejects_whole_fragment() {
        let err = Fragment::from_value(&json!({
            "nodes": [{"id": "n1", "label": "Sun"}, {"id": "n2"}]
        }))
        .unwrap_err();
        assert!(err.is_malformed_fragment());
    }

    #[test]
    fn test_null_graph_data_is_malformed() {
        assert!(Fragment::from_value(&Value::Null).is_err());
    }
}
