//! Camera focus and link emphasis calculations.

use std::time::Duration;

use crate::config::CameraSettings;
use crate::graph::{GraphStore, Link};
use crate::layout::Position;

/// Where the camera should fly to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFocus {
    pub position: Position,
    pub look_at: Position,
    pub transition: Duration,
}

/// Places the camera on the origin→node ray, `distance` beyond the node.
///
/// A node sitting exactly at the origin has no ray, so the camera is offset
/// by `distance` along z instead.
pub fn focus_on(node: Position, distance: f64, transition: Duration) -> CameraFocus {
    let magnitude = node.magnitude();
    let position = if magnitude > f64::EPSILON {
        node.scaled(1.0 + distance / magnitude)
    } else {
        Position::new(node.x, node.y, node.z + distance)
    };

    CameraFocus {
        position,
        look_at: node,
        transition,
    }
}

/// Temporary emphasis of the links around a focused node.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkHighlight {
    pub node_id: String,
    pub links: Vec<Link>,
    pub width: f64,
    pub particle_speed: f64,
    /// Delay after which the emphasis is cleared.
    pub decay: Duration,
}

impl LinkHighlight {
    pub fn for_node(store: &GraphStore, node_id: &str, settings: &CameraSettings) -> Self {
        Self {
            node_id: node_id.to_string(),
            links: store.incident_links(node_id),
            width: settings.highlight_link_width,
            particle_speed: settings.highlight_particle_speed,
            decay: settings.highlight_decay(),
        }
    }
}
