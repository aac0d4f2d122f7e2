//! Mind-map use case.
//!
//! `MindMapController` is the single owner of the engine state: the active
//! chat's `GraphStore`, the `ChatManager`, the `LayoutController` and the live
//! transcript. Collaborators (presenter, force simulation, assistant) are
//! injected as trait objects.

use std::sync::Arc;

use markaz_core::assistant::{AskRequest, Assistant, ChatResponse};
use markaz_core::camera::{CameraFocus, LinkHighlight, focus_on};
use markaz_core::config::MarkazConfig;
use markaz_core::graph::{Fragment, GraphStore, MergeReport};
use markaz_core::layout::{ForceSimulation, LayoutController, LayoutMode, LayoutTransition};
use markaz_core::search::{SearchOutcome, search_nodes};
use markaz_core::session::{
    ChatListing, ChatManager, ChatRepository, ConversationMessage, Transcript,
};
use markaz_core::{MarkazError, Result};
use uuid::Uuid;

use crate::presenter::Presenter;
use crate::timer;

/// An assistant request in flight, tagged with the chat active at send time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub request_id: String,
    pub chat_id: String,
    pub request: AskRequest,
}

/// Where a completed request landed and what it did.
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub request_id: String,
    pub chat_id: String,
    /// True when the chat was still active and the live store was updated.
    pub landed_in_active: bool,
    /// Present when a fragment was merged.
    pub report: Option<MergeReport>,
    /// Transport or fragment failure, already reported to the user or logged.
    pub error: Option<MarkazError>,
}

/// Orchestrates the graph store, chats, layout and collaborators.
///
/// # Concurrency
///
/// The assistant call is the only asynchronous boundary. Callers that must
/// not hold the controller across that await use `begin_request`, call the
/// assistant themselves, then hand the result to `complete_request`; `ask`
/// does all three in sequence.
pub struct MindMapController {
    store: GraphStore,
    chats: ChatManager,
    layout: LayoutController,
    transcript: Transcript,
    config: MarkazConfig,
    presenter: Arc<dyn Presenter>,
    simulation: Arc<dyn ForceSimulation>,
    assistant: Arc<dyn Assistant>,
}

impl MindMapController {
    pub fn new(
        config: MarkazConfig,
        presenter: Arc<dyn Presenter>,
        simulation: Arc<dyn ForceSimulation>,
        assistant: Arc<dyn Assistant>,
    ) -> Self {
        Self {
            store: GraphStore::new(),
            chats: ChatManager::new(),
            layout: LayoutController::new(config.layout.clone()),
            transcript: Transcript::new(),
            config,
            presenter,
            simulation,
            assistant,
        }
    }

    /// Ensures a chat is active, creating the first one when needed.
    pub fn start(&mut self) -> String {
        match self.chats.active_id() {
            Some(id) => {
                let id = id.to_string();
                self.render();
                id
            }
            None => self.create_chat(),
        }
    }

    // ============================================================================
    // Chats
    // ============================================================================

    /// Creates a root-only chat and makes it active.
    pub fn create_chat(&mut self) -> String {
        let outgoing = std::mem::take(&mut self.transcript);
        let (id, restored) = self.chats.create_session(&mut self.store, outgoing);
        self.after_switch(restored);
        id
    }

    /// Switches to `chat_id`; an unknown id starts a root-only chat.
    ///
    /// Returns the id now active, which differs from `chat_id` when that id
    /// was unknown and not usable as a chat id.
    pub fn switch_chat(&mut self, chat_id: &str) -> String {
        let outgoing = std::mem::take(&mut self.transcript);
        let (id, restored) = self.chats.switch_to(chat_id, &mut self.store, outgoing);
        self.after_switch(restored);
        id
    }

    pub fn list_chats(&self) -> Vec<ChatListing> {
        self.chats.list_sessions()
    }

    pub fn active_chat_id(&self) -> Option<&str> {
        self.chats.active_id()
    }

    fn after_switch(&mut self, restored: Transcript) {
        self.transcript = restored;
        self.presenter.restore_transcript(&self.transcript);
        self.render();
        self.presenter.sessions_changed(&self.chats.list_sessions());
    }

    // ============================================================================
    // Assistant requests
    // ============================================================================

    /// Sends `prompt` to the assistant and applies the result.
    pub async fn ask(&mut self, prompt: &str) -> Result<RequestOutcome> {
        let pending = self.begin_request(prompt)?;
        let assistant = Arc::clone(&self.assistant);
        let result = assistant.ask(&pending.request).await;
        Ok(self.complete_request(pending, result))
    }

    /// Records the prompt in the active chat and shows the loading indicator.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty or whitespace prompt; nothing is
    /// recorded in that case.
    pub fn begin_request(&mut self, prompt: &str) -> Result<PendingRequest> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(MarkazError::invalid_input("Prompt must not be empty"));
        }

        let chat_id = self.start();
        let message = ConversationMessage::user(prompt);
        self.presenter.append_message(&message);
        self.transcript.push(message);

        let request_id = Uuid::new_v4().to_string();
        self.presenter.show_loading(&request_id);
        tracing::debug!(
            "[MindMapController] Request {} sent for chat {}",
            request_id,
            chat_id
        );

        Ok(PendingRequest {
            request_id,
            request: AskRequest::new(prompt, Some(chat_id.clone())),
            chat_id,
        })
    }

    /// Applies an assistant result to the chat the request was sent from.
    ///
    /// When that chat is still active the live store is merged and the graph
    /// re-rendered; otherwise the chat's stored snapshot is merged. The text
    /// answer, or an error notice, goes to the same chat's transcript.
    pub fn complete_request(
        &mut self,
        pending: PendingRequest,
        result: Result<ChatResponse>,
    ) -> RequestOutcome {
        self.presenter.hide_loading(&pending.request_id);
        let landed_in_active = self.chats.is_active(&pending.chat_id);

        let mut outcome = RequestOutcome {
            request_id: pending.request_id,
            chat_id: pending.chat_id,
            landed_in_active,
            report: None,
            error: None,
        };

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(
                    "[MindMapController] Request {} failed: {}",
                    outcome.request_id,
                    err
                );
                let notice = ConversationMessage::error(format!("Error: {}", err));
                self.deliver_message(&outcome.chat_id, notice);
                outcome.error = Some(err);
                return outcome;
            }
        };

        match response.fragment() {
            Ok(fragment) => {
                outcome.report = self.deliver_fragment(&outcome.chat_id, &fragment);
            }
            Err(err) => {
                tracing::warn!(
                    "[MindMapController] Ignoring graph data of request {}: {}",
                    outcome.request_id,
                    err
                );
                outcome.error = Some(err);
            }
        }

        if !response.text_answer.is_empty() {
            let answer = ConversationMessage::assistant(response.text_answer);
            self.deliver_message(&outcome.chat_id, answer);
        }

        outcome
    }

    fn deliver_fragment(&mut self, chat_id: &str, fragment: &Fragment) -> Option<MergeReport> {
        if self.chats.is_active(chat_id) {
            let report = self.store.merge(fragment);
            self.render();
            return Some(report);
        }

        match self.chats.merge_into_stored(chat_id, fragment) {
            Ok(report) => {
                tracing::info!(
                    "[MindMapController] Merged late answer into inactive chat {}",
                    chat_id
                );
                Some(report)
            }
            Err(err) => {
                tracing::warn!("[MindMapController] Dropping answer for {}: {}", chat_id, err);
                None
            }
        }
    }

    fn deliver_message(&mut self, chat_id: &str, message: ConversationMessage) {
        if self.chats.is_active(chat_id) {
            self.presenter.append_message(&message);
            self.transcript.push(message);
        } else if let Err(err) = self.chats.append_to_stored(chat_id, message) {
            tracing::warn!("[MindMapController] Dropping message for {}: {}", chat_id, err);
        }
    }

    // ============================================================================
    // Search and camera
    // ============================================================================

    /// Searches the active graph and focuses the first match.
    pub fn search(&mut self, term: &str) -> SearchOutcome {
        let outcome = search_nodes(self.store.current_nodes(), term);
        match &outcome {
            SearchOutcome::Cleared => self.presenter.clear_search(),
            SearchOutcome::NoMatch => {
                self.presenter
                    .notify(&format!("No concept matches \"{}\"", term.trim()));
            }
            SearchOutcome::Match(node) => {
                let id = node.id.clone();
                self.focus_node(&id);
            }
        }
        outcome
    }

    /// Flies the camera to a node and briefly emphasizes its links.
    ///
    /// Returns `None` when the node is unknown or the simulation has not
    /// positioned it yet.
    pub fn focus_node(&self, node_id: &str) -> Option<CameraFocus> {
        if !self.store.contains_node(node_id) {
            tracing::debug!("[MindMapController] Cannot focus unknown node {}", node_id);
            return None;
        }
        let Some(position) = self.simulation.node_position(node_id) else {
            tracing::debug!("[MindMapController] Node {} has no position yet", node_id);
            return None;
        };

        let camera = &self.config.camera;
        let focus = focus_on(position, camera.focus_distance, camera.transition());
        self.presenter.focus_camera(&focus);

        let highlight = LinkHighlight::for_node(&self.store, node_id, camera);
        self.presenter.highlight_links(&highlight);

        let presenter = Arc::clone(&self.presenter);
        let node_id = node_id.to_string();
        timer::schedule("highlight decay", highlight.decay, move || {
            presenter.clear_highlight(&node_id);
        });

        Some(focus)
    }

    // ============================================================================
    // Layout
    // ============================================================================

    pub fn enable_tree(&mut self) -> LayoutTransition {
        self.enable_layout(LayoutMode::Tree)
    }

    pub fn enable_network(&mut self) -> LayoutTransition {
        self.enable_layout(LayoutMode::Network)
    }

    pub fn layout_mode(&self) -> Option<LayoutMode> {
        self.layout.mode()
    }

    fn enable_layout(&mut self, mode: LayoutMode) -> LayoutTransition {
        let transition = self.layout.enable(mode, self.simulation.as_ref());
        if let Some(recentre) = transition.recentre {
            let simulation = Arc::clone(&self.simulation);
            timer::schedule("recentre", recentre.delay, move || {
                simulation.zoom_to_fit(recentre.duration, recentre.padding);
            });
        }
        transition
    }

    // ============================================================================
    // Persistence
    // ============================================================================

    /// Writes every chat and the active chat id to `repository`.
    ///
    /// A chat that fails to save does not stop the others or the active id
    /// from being written.
    ///
    /// # Errors
    ///
    /// Returns the first failure after everything else has been attempted.
    pub async fn persist(&mut self, repository: &dyn ChatRepository) -> Result<()> {
        self.chats
            .snapshot_active(&self.store, self.transcript.clone());

        let mut first_error = None;
        let mut saved = 0;
        for chat in self.chats.chats() {
            match repository.save(chat).await {
                Ok(()) => saved += 1,
                Err(err) => {
                    tracing::warn!(
                        "[MindMapController] Failed to save chat {}: {}",
                        chat.id,
                        err
                    );
                    keep_first(&mut first_error, err);
                }
            }
        }

        let active = match self.chats.active_id() {
            Some(id) => repository.set_active_chat_id(id).await,
            None => repository.clear_active_chat_id().await,
        };
        if let Err(err) = active {
            tracing::warn!("[MindMapController] Failed to save the active chat id: {}", err);
            keep_first(&mut first_error, err);
        }

        tracing::info!(
            "[MindMapController] Persisted {} of {} chats",
            saved,
            self.chats.len()
        );
        first_error.map_or(Ok(()), Err)
    }

    /// Replaces all chats with those stored in `repository` and reactivates
    /// the saved active chat (or the most recent one).
    ///
    /// Returns the number of chats loaded. With an empty repository the
    /// current state is left as is.
    pub async fn restore(&mut self, repository: &dyn ChatRepository) -> Result<usize> {
        let records = repository.list_all().await?;
        if records.is_empty() {
            return Ok(0);
        }
        let saved_active = repository.get_active_chat_id().await?;

        self.chats = ChatManager::from_records(records);
        self.store = GraphStore::new();
        self.transcript = Transcript::new();

        let target = saved_active
            .filter(|id| self.chats.get(id).is_some())
            .or_else(|| self.chats.chats().last().map(|chat| chat.id.clone()));
        if let Some(id) = target {
            self.switch_chat(&id);
        }

        tracing::info!("[MindMapController] Restored {} chats", self.chats.len());
        Ok(self.chats.len())
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn chats(&self) -> &ChatManager {
        &self.chats
    }

    /// Live transcript of the active chat.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn config(&self) -> &MarkazConfig {
        &self.config
    }

    pub fn assistant(&self) -> Arc<dyn Assistant> {
        Arc::clone(&self.assistant)
    }

    fn render(&self) {
        if self.store.is_empty() {
            return;
        }
        self.presenter.render_graph(&self.store.snapshot());
    }
}

fn keep_first(slot: &mut Option<MarkazError>, err: MarkazError) {
    if slot.is_none() {
        *slot = Some(err);
    }
}
