//! In-graph search.
//!
//! Search is read-only: it never touches node state. The caller decides what
//! to do with a hit (the controller focuses the camera on it).

use crate::graph::Node;

/// Outcome of a search over the active graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The term was empty or whitespace; any visual match state should be cleared.
    Cleared,
    NoMatch,
    /// First node, in collection order, whose label or summary contains the term.
    Match(Node),
}

impl SearchOutcome {
    pub fn matched(&self) -> Option<&Node> {
        match self {
            Self::Match(node) => Some(node),
            _ => None,
        }
    }
}

/// Case-insensitive substring search over `label` and `summary`.
pub fn search_nodes(nodes: &[Node], term: &str) -> SearchOutcome {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return SearchOutcome::Cleared;
    }

    nodes
        .iter()
        .find(|node| {
            node.label.to_lowercase().contains(&needle)
                || node.summary.to_lowercase().contains(&needle)
        })
        .cloned()
        .map_or(SearchOutcome::NoMatch, SearchOutcome::Match)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes() -> Vec<Node> {
        let mut sun = Node::new("n1", "Sun");
        sun.summary = "The star at the centre of the Solar System".to_string();
        vec![Node::root(), sun, Node::new("n2", "Solar wind")]
    }

    #[test]
    fn test_root_label_matches() {
        let outcome = search_nodes(&nodes(), "mark");
        assert_eq!(outcome.matched().map(|n| n.id.as_str()), Some("root"));
    }

    #[test]
    fn test_miss() {
        assert_eq!(
            search_nodes(&nodes(), "nonexistent-term-xyz"),
            SearchOutcome::NoMatch
        );
    }

    #[test]
    fn test_whitespace_clears() {
        assert_eq!(search_nodes(&nodes(), "   "), SearchOutcome::Cleared);
        assert_eq!(search_nodes(&nodes(), ""), SearchOutcome::Cleared);
    }

    #[test]
    fn test_summary_match_returns_first_in_order() {
        let outcome = search_nodes(&nodes(), "SOLAR");
        assert_eq!(outcome.matched().map(|n| n.id.as_str()), Some("n1"));
    }

    #[test]
    fn test_search_does_not_touch_hidden_flag() {
        let nodes = nodes();
        search_nodes(&nodes, "nonexistent");
        assert!(nodes.iter().all(|n| !n.hidden));
    }
}
