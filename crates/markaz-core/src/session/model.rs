//! Chat session record.

use serde::{Deserialize, Serialize};

use super::message::Transcript;
use crate::graph::{GraphSnapshot, Link, Node};

/// One independently persisted graph plus its transcript.
///
/// For the active chat the record is stale between switches: the live data
/// sits in the `GraphStore` and the presenter, and is written back here when
/// the user switches away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Unique chat identifier (`chat_<unix-millis>`)
    pub id: String,
    /// Timestamp when the chat was created (ISO 8601 format)
    pub created_at: String,
    /// Node collection at the last switch-away
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Link collection at the last switch-away
    #[serde(default)]
    pub links: Vec<Link>,
    /// Conversation log at the last switch-away
    #[serde(default)]
    pub transcript: Transcript,
}

impl ChatSession {
    /// A fresh chat holding exactly the root node.
    pub fn new(id: impl Into<String>) -> Self {
        let GraphSnapshot { nodes, links } = GraphSnapshot::with_root();
        Self {
            id: id.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
            nodes,
            links,
            transcript: Transcript::new(),
        }
    }

    /// The stored graph, falling back to the root-only graph when the record has no nodes.
    pub fn graph(&self) -> GraphSnapshot {
        if self.nodes.is_empty() {
            return GraphSnapshot::with_root();
        }
        GraphSnapshot {
            nodes: self.nodes.clone(),
            links: self.links.clone(),
        }
    }

    pub fn store_graph(&mut self, snapshot: GraphSnapshot) {
        self.nodes = snapshot.nodes;
        self.links = snapshot.links;
    }
}

/// Whether `id` is usable as a chat id: non-empty ASCII letters, digits, `_` and `-`.
///
/// Ids double as storage keys (file names), so anything else is refused.
pub fn is_valid_chat_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Entry of the chat picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatListing {
    pub id: String,
    pub is_active: bool,
}
