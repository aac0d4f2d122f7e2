//! Terminal collaborators: a line-printing presenter and a stand-in simulation.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use markaz_application::Presenter;
use markaz_core::camera::{CameraFocus, LinkHighlight};
use markaz_core::config::Theme;
use markaz_core::graph::{GraphSnapshot, Node, ROOT_ID};
use markaz_core::layout::{DagOrientation, ForceSimulation, Position};
use markaz_core::session::{ChatListing, ConversationMessage, MessageRole, Transcript};

/// Prints everything the controller presents, tagging concepts with theme colors.
pub struct ConsolePresenter {
    theme: Theme,
}

impl ConsolePresenter {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    fn node_line(&self, node: &Node) -> String {
        format!(
            "  {} {} [{}] {}",
            node.icon,
            node.label,
            node.id,
            self.theme.node_color(node)
        )
    }

    fn print_message(message: &ConversationMessage) {
        let who = match message.role {
            MessageRole::User => "you",
            MessageRole::Assistant => "markaz",
            MessageRole::Error => "error",
        };
        println!("{:>8} | {}", who, message.content);
    }
}

impl Presenter for ConsolePresenter {
    fn render_graph(&self, snapshot: &GraphSnapshot) {
        println!(
            "[graph] {} concepts, {} links",
            snapshot.nodes.len(),
            snapshot.links.len()
        );
        for node in &snapshot.nodes {
            println!("{}", self.node_line(node));
        }
    }

    fn restore_transcript(&self, transcript: &Transcript) {
        for message in transcript.messages() {
            Self::print_message(message);
        }
    }

    fn append_message(&self, message: &ConversationMessage) {
        // The user's own prompt is already on screen.
        if message.role != MessageRole::User {
            Self::print_message(message);
        }
    }

    fn show_loading(&self, _request_id: &str) {
        println!("... thinking");
    }

    fn hide_loading(&self, _request_id: &str) {}

    fn focus_camera(&self, focus: &CameraFocus) {
        println!(
            "[camera] looking at ({:.1}, {:.1}, {:.1})",
            focus.look_at.x, focus.look_at.y, focus.look_at.z
        );
    }

    fn highlight_links(&self, highlight: &LinkHighlight) {
        for link in &highlight.links {
            println!(
                "[link {}] {} - {}",
                self.theme.highlight_color, link.source, link.target
            );
        }
    }

    fn clear_highlight(&self, node_id: &str) {
        tracing::debug!("[ConsolePresenter] Highlight around {} cleared", node_id);
    }

    fn clear_search(&self) {
        println!("[search] cleared");
    }

    fn notify(&self, message: &str) {
        println!("[!] {}", message);
    }

    fn sessions_changed(&self, sessions: &[ChatListing]) {
        if let Some(active) = sessions.iter().find(|s| s.is_active) {
            println!("[chat] {} ({} total)", active.id, sessions.len());
        }
    }
}

/// Records layout parameters and hands out stable positions on a
/// golden-angle spiral, root at the origin.
#[derive(Default)]
pub struct LoggingSimulation {
    positions: Mutex<HashMap<String, Position>>,
}

const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;
const SPIRAL_STEP: f64 = 40.0;

impl ForceSimulation for LoggingSimulation {
    fn set_dag_mode(&self, orientation: Option<DagOrientation>) {
        tracing::debug!(
            "[Simulation] dag mode = {}",
            orientation.map_or("none", |o| o.as_str())
        );
    }

    fn set_dag_level_distance(&self, distance: f64) {
        tracing::debug!("[Simulation] dag level distance = {}", distance);
    }

    fn set_charge_strength(&self, strength: f64) {
        tracing::debug!("[Simulation] charge = {}", strength);
    }

    fn set_link_distance(&self, distance: f64) {
        tracing::debug!("[Simulation] link distance = {}", distance);
    }

    fn set_link_curvature(&self, curvature: f64) {
        tracing::debug!("[Simulation] link curvature = {}", curvature);
    }

    fn set_link_arrow(&self, length: f64, relative_position: f64) {
        tracing::debug!(
            "[Simulation] arrows length = {} at {}",
            length,
            relative_position
        );
    }

    fn reheat(&self) {
        tracing::debug!("[Simulation] reheat");
    }

    fn zoom_to_fit(&self, duration: Duration, padding: f64) {
        tracing::debug!(
            "[Simulation] zoom to fit over {:?} with padding {}",
            duration,
            padding
        );
    }

    fn node_position(&self, id: &str) -> Option<Position> {
        let mut positions = self.positions.lock().unwrap_or_else(PoisonError::into_inner);
        let next_index = positions.len();
        let position = *positions.entry(id.to_string()).or_insert_with(|| {
            if id == ROOT_ID {
                return Position::default();
            }
            let i = (next_index + 1) as f64;
            let radius = SPIRAL_STEP * i.sqrt();
            let angle = i * GOLDEN_ANGLE;
            Position::new(radius * angle.cos(), radius * angle.sin(), 0.0)
        });
        Some(position)
    }
}
