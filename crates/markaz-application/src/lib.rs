pub mod mind_map;
pub mod presenter;
mod timer;

pub use mind_map::{MindMapController, PendingRequest, RequestOutcome};
pub use presenter::Presenter;
