pub mod assistant;
pub mod camera;
pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod search;
pub mod session;

// Re-export common error type
pub use error::{MarkazError, Result};
