use std::time::Duration;

use super::simulation::{DagOrientation, ForceSimulation, LayoutMode};
use crate::config::LayoutPresets;

/// A deferred zoom-to-fit the caller schedules after a mode change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecentreRequest {
    /// How long to let the reheated simulation settle first.
    pub delay: Duration,
    pub duration: Duration,
    pub padding: f64,
}

/// Result of entering a layout mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutTransition {
    pub mode: LayoutMode,
    pub recentre: Option<RecentreRequest>,
}

/// Two-state machine reparametrizing the force simulation.
///
/// There is no forced initial mode; the simulation keeps its own defaults
/// until one of the modes is entered. Entering a mode is one-shot and
/// re-entering it reapplies the same parameters.
#[derive(Debug, Clone)]
pub struct LayoutController {
    presets: LayoutPresets,
    mode: Option<LayoutMode>,
}

impl LayoutController {
    pub fn new(presets: LayoutPresets) -> Self {
        Self {
            presets,
            mode: None,
        }
    }

    pub fn mode(&self) -> Option<LayoutMode> {
        self.mode
    }

    pub fn presets(&self) -> &LayoutPresets {
        &self.presets
    }

    pub fn enable(&mut self, mode: LayoutMode, simulation: &dyn ForceSimulation) -> LayoutTransition {
        match mode {
            LayoutMode::Tree => self.enable_tree(simulation),
            LayoutMode::Network => self.enable_network(simulation),
        }
    }

    /// Top-down layering with strong repulsion, curved links and arrows.
    ///
    /// The returned transition asks the caller to zoom to fit once the
    /// simulation has had time to settle.
    pub fn enable_tree(&mut self, simulation: &dyn ForceSimulation) -> LayoutTransition {
        let tree = &self.presets.tree;
        simulation.set_dag_mode(Some(DagOrientation::TopDown));
        simulation.set_dag_level_distance(tree.level_distance);
        simulation.set_charge_strength(tree.charge_strength);
        simulation.set_link_distance(tree.link_distance);
        simulation.set_link_curvature(tree.link_curvature);
        simulation.set_link_arrow(tree.arrow_length, tree.arrow_rel_pos);
        simulation.reheat();

        self.mode = Some(LayoutMode::Tree);
        tracing::info!("[Layout] Tree mode enabled");

        LayoutTransition {
            mode: LayoutMode::Tree,
            recentre: Some(RecentreRequest {
                delay: tree.settle_delay(),
                duration: tree.zoom_duration(),
                padding: tree.zoom_padding,
            }),
        }
    }

    /// Free-floating clustering: no DAG, weak repulsion, straight links.
    pub fn enable_network(&mut self, simulation: &dyn ForceSimulation) -> LayoutTransition {
        let network = &self.presets.network;
        simulation.set_dag_mode(None);
        simulation.set_charge_strength(network.charge_strength);
        simulation.set_link_distance(network.link_distance);
        simulation.set_link_curvature(network.link_curvature);
        simulation.set_link_arrow(network.arrow_length, 0.0);
        simulation.reheat();

        self.mode = Some(LayoutMode::Network);
        tracing::info!("[Layout] Network mode enabled");

        LayoutTransition {
            mode: LayoutMode::Network,
            recentre: None,
        }
    }
}
