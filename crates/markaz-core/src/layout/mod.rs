//! Layout mode domain module.
//!
//! # Module Structure
//!
//! - `simulation`: The external force-simulation collaborator (`ForceSimulation`)
//! - `controller`: Tree / network mode switching (`LayoutController`)

mod controller;
mod simulation;

pub use controller::{LayoutController, LayoutTransition, RecentreRequest};
pub use simulation::{DagOrientation, ForceSimulation, LayoutMode, Position};
