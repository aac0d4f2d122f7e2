//! Merge reconciliation of assistant fragments into the running graph.
//!
//! Identity is semantic: a candidate whose label matches an existing node
//! (case-insensitively) is folded into that node, whatever id the assistant
//! minted for it this turn. Links are then rewritten through the resulting id
//! mapping and deduplicated as unordered pairs.

use std::collections::HashMap;

use super::fragment::{Fragment, FragmentNode};
use super::model::{DEFAULT_ICON, DEFAULT_SUMMARY, Link, Node, label_key};
use super::store::GraphStore;

/// Why a candidate link was not added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRejection {
    /// Both endpoints resolved to the same node.
    SelfLink,
    /// The unordered pair is already linked.
    Duplicate,
    /// An endpoint does not name a node of the graph.
    DanglingEndpoint,
}

/// What a merge did, for logging and assertions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Ids of nodes appended to the graph.
    pub added_nodes: Vec<String>,
    /// Ids of existing nodes matched by label (their fields may have been refreshed).
    pub matched_nodes: Vec<String>,
    /// Fragment id → canonical id, for every label match.
    pub remapped: Vec<(String, String)>,
    /// Fragment ids dropped because the id was taken by a node with another label.
    pub dropped_nodes: Vec<String>,
    /// Links appended, after id resolution.
    pub added_links: Vec<Link>,
    /// Links dropped, after id resolution.
    pub rejected_links: Vec<(Link, LinkRejection)>,
}

impl MergeReport {
    /// True when the graph's collections did not grow.
    pub fn is_additive_noop(&self) -> bool {
        self.added_nodes.is_empty() && self.added_links.is_empty()
    }
}

pub struct MergeReconciler;

impl MergeReconciler {
    /// Absorbs `fragment` into `store`. Never removes anything.
    pub fn reconcile(store: &mut GraphStore, fragment: &Fragment) -> MergeReport {
        let mut report = MergeReport::default();
        let mut id_mapping: HashMap<&str, String> = HashMap::new();

        for candidate in &fragment.nodes {
            if let Some(existing_id) = store.id_for_label(&candidate.label).map(str::to_owned) {
                if candidate.id != existing_id {
                    report
                        .remapped
                        .push((candidate.id.clone(), existing_id.clone()));
                }
                if let Some(existing) = store.node_mut(&existing_id) {
                    refresh_node(existing, candidate);
                }
                id_mapping.insert(candidate.id.as_str(), existing_id.clone());
                report.matched_nodes.push(existing_id);
            } else if !store.contains_node(&candidate.id) {
                store.push_node(new_node(candidate));
                id_mapping.insert(candidate.id.as_str(), candidate.id.clone());
                report.added_nodes.push(candidate.id.clone());
            } else {
                tracing::debug!(
                    "[MergeReconciler] Dropping node '{}' ({}): id already used by another label",
                    candidate.id,
                    label_key(&candidate.label)
                );
                report.dropped_nodes.push(candidate.id.clone());
            }
        }

        for candidate in &fragment.links {
            let source = resolve(&id_mapping, &candidate.source);
            let target = resolve(&id_mapping, &candidate.target);
            let link = Link::new(source, target);

            let rejection = if link.source == link.target {
                Some(LinkRejection::SelfLink)
            } else if store.has_link(&link.source, &link.target) {
                Some(LinkRejection::Duplicate)
            } else if !store.contains_node(&link.source) || !store.contains_node(&link.target) {
                Some(LinkRejection::DanglingEndpoint)
            } else {
                None
            };

            match rejection {
                Some(reason) => {
                    tracing::debug!(
                        "[MergeReconciler] Rejecting link {} - {}: {:?}",
                        link.source,
                        link.target,
                        reason
                    );
                    report.rejected_links.push((link, reason));
                }
                None => {
                    store.push_link(link.clone());
                    report.added_links.push(link);
                }
            }
        }

        tracing::debug!(
            "[MergeReconciler] Merged fragment: +{} nodes, {} matched, {} dropped, +{} links, {} rejected",
            report.added_nodes.len(),
            report.matched_nodes.len(),
            report.dropped_nodes.len(),
            report.added_links.len(),
            report.rejected_links.len()
        );

        report
    }
}

fn resolve(mapping: &HashMap<&str, String>, id: &str) -> String {
    mapping
        .get(id)
        .cloned()
        .unwrap_or_else(|| id.to_string())
}

/// Later non-empty values refresh; empty or absent ones keep what is there.
fn refresh_node(existing: &mut Node, candidate: &FragmentNode) {
    if let Some(summary) = non_empty(&candidate.summary) {
        existing.summary = summary.to_string();
    }
    if let Some(icon) = non_empty(&candidate.icon) {
        existing.icon = icon.to_string();
    }
    if let Some(color) = non_empty(&candidate.color) {
        existing.color = Some(color.to_string());
    }
}

fn new_node(candidate: &FragmentNode) -> Node {
    Node {
        id: candidate.id.clone(),
        label: candidate.label.clone(),
        summary: non_empty(&candidate.summary)
            .unwrap_or(DEFAULT_SUMMARY)
            .to_string(),
        icon: non_empty(&candidate.icon).unwrap_or(DEFAULT_ICON).to_string(),
        color: non_empty(&candidate.color).map(str::to_owned),
        is_root: false,
        hidden: false,
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fragment::FragmentLink;

    fn sun_fragment() -> Fragment {
        Fragment::new(
            vec![FragmentNode::new("n1", "Sun")],
            vec![FragmentLink::new("root", "n1")],
        )
    }

    #[test]
    fn test_sun_scenario() {
        let mut store = GraphStore::with_root();

        store.merge(&sun_fragment());
        assert_eq!(store.current_nodes().len(), 2);
        assert_eq!(store.current_links().len(), 1);

        let report = store.merge(&Fragment::new(
            vec![FragmentNode::new("n2", "sun")],
            vec![FragmentLink::new("n2", "root")],
        ));

        assert_eq!(store.current_nodes().len(), 2);
        assert_eq!(store.current_links().len(), 1);
        assert_eq!(report.remapped, vec![("n2".to_string(), "n1".to_string())]);
        assert_eq!(
            report.rejected_links,
            vec![(Link::new("n1", "root"), LinkRejection::Duplicate)]
        );
    }

    #[test]
    fn test_merging_same_fragment_twice_is_idempotent() {
        let fragment = Fragment::new(
            vec![
                FragmentNode::new("a", "Cats").with_summary("Small felines"),
                FragmentNode::new("b", "Dogs"),
            ],
            vec![
                FragmentLink::new("root", "a"),
                FragmentLink::new("a", "b"),
            ],
        );

        let mut once = GraphStore::with_root();
        once.merge(&fragment);

        let mut twice = GraphStore::with_root();
        twice.merge(&fragment);
        let second = twice.merge(&fragment);

        assert_eq!(once.snapshot(), twice.snapshot());
        assert!(second.is_additive_noop());
    }

    #[test]
    fn test_label_match_updates_in_place_and_remaps_links() {
        let mut store = GraphStore::with_root();
        store.merge(&Fragment::new(
            vec![FragmentNode::new("c1", "Cats").with_icon("🐱")],
            Vec::new(),
        ));

        store.merge(&Fragment::new(
            vec![
                FragmentNode::new("x9", "cats")
                    .with_summary("Felines")
                    .with_color("#ff6b6b"),
                FragmentNode::new("m1", "Mice"),
            ],
            vec![FragmentLink::new("x9", "m1")],
        ));

        assert_eq!(store.current_nodes().len(), 3);
        let cats = store.node("c1").unwrap();
        assert_eq!(cats.label, "Cats");
        assert_eq!(cats.summary, "Felines");
        assert_eq!(cats.icon, "🐱");
        assert_eq!(cats.color.as_deref(), Some("#ff6b6b"));
        assert!(store.node("x9").is_none());
        assert!(store.has_link("c1", "m1"));
    }

    #[test]
    fn test_empty_values_do_not_overwrite() {
        let mut store = GraphStore::with_root();
        store.merge(&Fragment::new(
            vec![FragmentNode::new("n1", "Sun").with_summary("A star")],
            Vec::new(),
        ));
        store.merge(&Fragment::new(
            vec![FragmentNode::new("n1", "SUN").with_summary("").with_icon("")],
            Vec::new(),
        ));

        let sun = store.node("n1").unwrap();
        assert_eq!(sun.summary, "A star");
        assert_eq!(sun.icon, DEFAULT_ICON);
    }

    #[test]
    fn test_new_nodes_get_defaults() {
        let mut store = GraphStore::with_root();
        store.merge(&Fragment::new(
            vec![FragmentNode::new("n1", "Sun").with_summary("")],
            Vec::new(),
        ));
        let sun = store.node("n1").unwrap();
        assert_eq!(sun.summary, DEFAULT_SUMMARY);
        assert_eq!(sun.icon, DEFAULT_ICON);
        assert!(!sun.is_root);
    }

    #[test]
    fn test_self_link_rejected() {
        let mut store = GraphStore::with_root();
        let report = store.merge(&Fragment::new(
            vec![FragmentNode::new("n1", "Sun"), FragmentNode::new("n2", "sun")],
            vec![FragmentLink::new("n1", "n2"), FragmentLink::new("root", "root")],
        ));

        assert!(store.current_links().is_empty());
        assert_eq!(report.rejected_links.len(), 2);
        assert!(
            report
                .rejected_links
                .iter()
                .all(|(_, reason)| *reason == LinkRejection::SelfLink)
        );
    }

    #[test]
    fn test_reverse_link_is_duplicate() {
        let mut store = GraphStore::with_root();
        store.merge(&Fragment::new(
            vec![FragmentNode::new("A", "Alpha"), FragmentNode::new("B", "Beta")],
            vec![FragmentLink::new("B", "A")],
        ));
        store.merge(&Fragment::new(Vec::new(), vec![FragmentLink::new("A", "B")]));

        assert_eq!(store.current_links(), &[Link::new("B", "A")]);
    }

    #[test]
    fn test_id_collision_without_label_match_is_dropped() {
        let mut store = GraphStore::with_root();
        store.merge(&Fragment::new(vec![FragmentNode::new("n1", "Sun")], Vec::new()));

        let report = store.merge(&Fragment::new(
            vec![FragmentNode::new("n1", "Moon")],
            Vec::new(),
        ));

        assert_eq!(report.dropped_nodes, vec!["n1".to_string()]);
        assert_eq!(store.node("n1").unwrap().label, "Sun");
        assert!(store.id_for_label("moon").is_none());
    }

    #[test]
    fn test_dangling_link_rejected() {
        let mut store = GraphStore::with_root();
        let report = store.merge(&Fragment::new(
            Vec::new(),
            vec![FragmentLink::new("root", "ghost")],
        ));
        assert!(store.current_links().is_empty());
        assert_eq!(report.rejected_links[0].1, LinkRejection::DanglingEndpoint);
    }

    #[test]
    fn test_duplicate_labels_within_one_fragment_fold_together() {
        let mut store = GraphStore::with_root();
        store.merge(&Fragment::new(
            vec![
                FragmentNode::new("n1", "Sun"),
                FragmentNode::new("n2", "SUN").with_summary("Our star"),
            ],
            vec![FragmentLink::new("root", "n2")],
        ));

        assert_eq!(store.current_nodes().len(), 2);
        assert_eq!(store.node("n1").unwrap().summary, "Our star");
        assert!(store.has_link("root", "n1"));
    }
}
