//! The render collaborator.

use markaz_core::camera::{CameraFocus, LinkHighlight};
use markaz_core::graph::GraphSnapshot;
use markaz_core::session::{ChatListing, ConversationMessage, Transcript};

/// Everything the controller asks of the user interface.
///
/// The presenter receives plain snapshots and never mutates engine state.
/// Methods may be called from timer tasks, hence `Send + Sync` and `&self`.
pub trait Presenter: Send + Sync {
    /// Redraws the whole graph.
    fn render_graph(&self, snapshot: &GraphSnapshot);

    /// Replaces the visible transcript (after a chat switch).
    fn restore_transcript(&self, transcript: &Transcript);

    /// Appends one entry to the visible transcript.
    fn append_message(&self, message: &ConversationMessage);

    fn show_loading(&self, request_id: &str);

    fn hide_loading(&self, request_id: &str);

    fn focus_camera(&self, focus: &CameraFocus);

    fn highlight_links(&self, highlight: &LinkHighlight);

    /// Drops the emphasis put on the links around `node_id`.
    fn clear_highlight(&self, node_id: &str);

    /// Clears any search-match state.
    fn clear_search(&self);

    /// Short user-facing notice (e.g. a search without match).
    fn notify(&self, message: &str);

    fn sessions_changed(&self, sessions: &[ChatListing]);
}
