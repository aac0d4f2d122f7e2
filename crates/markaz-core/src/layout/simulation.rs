//! The force-simulation collaborator.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The two layout regimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Hierarchical top-down layering.
    Tree,
    /// Unconstrained organic clustering.
    Network,
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Network => "network",
        }
    }
}

/// DAG layering direction understood by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DagOrientation {
    TopDown,
}

impl DagOrientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopDown => "td",
        }
    }
}

/// A point in simulation space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Distance from the origin.
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

/// An external force-directed layout engine.
///
/// The engine owns node positions and physics. Markaz only sets its
/// coefficients and reads positions back. Implementations use interior
/// mutability so a single instance can be shared behind an `Arc`.
pub trait ForceSimulation: Send + Sync {
    /// Enables DAG layering, or removes it with `None`.
    fn set_dag_mode(&self, orientation: Option<DagOrientation>);
    fn set_dag_level_distance(&self, distance: f64);
    /// Many-body force strength; negative values repel.
    fn set_charge_strength(&self, strength: f64);
    fn set_link_distance(&self, distance: f64);
    fn set_link_curvature(&self, curvature: f64);
    /// Arrow length 0 disables directional arrows.
    fn set_link_arrow(&self, length: f64, relative_position: f64);
    /// Resumes the simulation from current positions.
    fn reheat(&self);
    fn zoom_to_fit(&self, duration: Duration, padding: f64);
    fn node_position(&self, id: &str) -> Option<Position>;
}
