use super::message::{ConversationMessage, Transcript};
use super::model::{ChatListing, ChatSession, is_valid_chat_id};
use crate::error::{MarkazError, Result};
use crate::graph::{Fragment, GraphStore, MergeReport};

const CHAT_ID_PREFIX: &str = "chat_";

/// Manages the set of chats and which one is active.
///
/// `ChatManager` is responsible for:
/// - Creating new chats (root-only graph, empty transcript)
/// - Switching between chats, writing the live working set back first
/// - Listing chats for the picker
/// - Applying late assistant results to chats that are no longer active
///
/// The live graph of the active chat is owned by the caller's `GraphStore`
/// and the live transcript by the presenter; both are passed in on every
/// switch so the manager never holds a second live copy.
#[derive(Debug, Default)]
pub struct ChatManager {
    /// Chats in creation order
    chats: Vec<ChatSession>,
    /// Id of the active chat, if any
    active_id: Option<String>,
    /// Millisecond stamp of the last id handed out
    last_issued_millis: i64,
}

impl ChatManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a manager from persisted chats. No chat is active afterwards;
    /// the caller switches to the one it wants to resume.
    pub fn from_records(mut chats: Vec<ChatSession>) -> Self {
        chats.sort_by(|a, b| {
            chat_millis(&a.id)
                .cmp(&chat_millis(&b.id))
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        let last_issued_millis = chats
            .iter()
            .filter_map(|chat| chat_millis(&chat.id))
            .max()
            .unwrap_or(0);

        Self {
            chats,
            active_id: None,
            last_issued_millis,
        }
    }

    /// Creates a new chat and switches to it.
    ///
    /// # Arguments
    ///
    /// * `store` - The live graph of the currently active chat (if any)
    /// * `transcript` - The live transcript of the currently active chat
    ///
    /// # Returns
    ///
    /// The new chat id and the transcript the presenter should now show.
    pub fn create_session(
        &mut self,
        store: &mut GraphStore,
        transcript: Transcript,
    ) -> (String, Transcript) {
        let id = self.next_id();
        self.chats.push(ChatSession::new(id.clone()));
        tracing::info!("[ChatManager] Created chat {}", id);

        self.switch_to(&id, store, transcript)
    }

    /// Switches the active chat.
    ///
    /// The active chat's graph and transcript are written back into its
    /// record, then the target's stored graph is loaded into `store`. A
    /// target that does not exist is created as a root-only chat; when its id
    /// is not a valid chat id (see [`is_valid_chat_id`]) the new chat gets a
    /// generated id instead.
    ///
    /// # Returns
    ///
    /// The id that is now active and its transcript, for the presenter to restore.
    pub fn switch_to(
        &mut self,
        id: &str,
        store: &mut GraphStore,
        transcript: Transcript,
    ) -> (String, Transcript) {
        self.snapshot_active(store, transcript);

        let target = match self.position(id) {
            Some(index) => index,
            None => {
                let new_id = if is_valid_chat_id(id) {
                    id.to_string()
                } else {
                    let generated = self.next_id();
                    tracing::warn!(
                        "[ChatManager] '{}' is not a valid chat id, using {}",
                        id,
                        generated
                    );
                    generated
                };
                tracing::warn!(
                    "[ChatManager] Chat {} not found, starting it with the root node",
                    new_id
                );
                self.chats.push(ChatSession::new(new_id));
                self.chats.len() - 1
            }
        };

        let chat = &self.chats[target];
        let graph = chat.graph();
        store.replace_all(graph.nodes, graph.links);
        let restored = chat.transcript.clone();
        let active_id = chat.id.clone();
        self.active_id = Some(active_id.clone());

        tracing::info!("[ChatManager] Switched to chat {}", active_id);
        (active_id, restored)
    }

    /// Writes the live working set back into the active chat's record
    /// without switching. Does nothing when no chat is active.
    pub fn snapshot_active(&mut self, store: &GraphStore, transcript: Transcript) {
        let Some(active_id) = self.active_id.clone() else {
            return;
        };
        if let Some(chat) = self.chat_mut(&active_id) {
            chat.store_graph(store.snapshot());
            chat.transcript = transcript;
        }
    }

    /// Chats in creation order, each flagged when active.
    pub fn list_sessions(&self) -> Vec<ChatListing> {
        self.chats
            .iter()
            .map(|chat| ChatListing {
                id: chat.id.clone(),
                is_active: self.active_id.as_deref() == Some(chat.id.as_str()),
            })
            .collect()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active_id.as_deref() == Some(id)
    }

    pub fn get(&self, id: &str) -> Option<&ChatSession> {
        self.chats.iter().find(|chat| chat.id == id)
    }

    /// Stored records. The active chat's record reflects its last write-back.
    pub fn chats(&self) -> &[ChatSession] {
        &self.chats
    }

    pub fn len(&self) -> usize {
        self.chats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }

    /// Merges a fragment into a stored (inactive) chat.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no chat has this id.
    pub fn merge_into_stored(&mut self, id: &str, fragment: &Fragment) -> Result<MergeReport> {
        let chat = self
            .chat_mut(id)
            .ok_or_else(|| MarkazError::not_found("chat", id))?;

        let mut store = GraphStore::from_snapshot(chat.graph());
        let report = store.merge(fragment);
        chat.store_graph(store.into_snapshot());
        Ok(report)
    }

    /// Appends a message to a stored (inactive) chat's transcript.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no chat has this id.
    pub fn append_to_stored(&mut self, id: &str, message: ConversationMessage) -> Result<()> {
        let chat = self
            .chat_mut(id)
            .ok_or_else(|| MarkazError::not_found("chat", id))?;
        chat.transcript.push(message);
        Ok(())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.chats.iter().position(|chat| chat.id == id)
    }

    fn chat_mut(&mut self, id: &str) -> Option<&mut ChatSession> {
        self.chats.iter_mut().find(|chat| chat.id == id)
    }

    /// Timestamp-derived id, bumped when two chats land on the same millisecond.
    fn next_id(&mut self) -> String {
        let now = chrono::Utc::now().timestamp_millis();
        let mut millis = now.max(self.last_issued_millis + 1);
        while self.position(&format!("{CHAT_ID_PREFIX}{millis}")).is_some() {
            millis += 1;
        }
        self.last_issued_millis = millis;
        format!("{CHAT_ID_PREFIX}{millis}")
    }
}

fn chat_millis(id: &str) -> Option<i64> {
    id.strip_prefix(CHAT_ID_PREFIX)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FragmentLink, FragmentNode, Node};

    fn fragment(nodes: &[(&str, &str)], links: &[(&str, &str)]) -> Fragment {
        Fragment::new(
            nodes
                .iter()
                .map(|(id, label)| FragmentNode::new(*id, *label))
                .collect(),
            links
                .iter()
                .map(|(s, t)| FragmentLink::new(*s, *t))
                .collect(),
        )
    }

    fn labels(store: &GraphStore) -> Vec<String> {
        store
            .current_nodes()
            .iter()
            .map(|n| n.label.clone())
            .collect()
    }

    #[test]
    fn test_create_session_starts_with_root_only() {
        let mut manager = ChatManager::new();
        let mut store = GraphStore::new();

        let (id, transcript) = manager.create_session(&mut store, Transcript::new());

        assert!(id.starts_with("chat_"));
        assert!(transcript.is_empty());
        assert_eq!(manager.active_id(), Some(id.as_str()));
        assert_eq!(store.current_nodes(), &[Node::root()]);
        assert!(store.current_links().is_empty());
    }

    #[test]
    fn test_ids_are_unique_within_a_run() {
        let mut manager = ChatManager::new();
        let mut store = GraphStore::new();

        let ids: Vec<String> = (0..5)
            .map(|_| manager.create_session(&mut store, Transcript::new()).0)
            .collect();

        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(ids, deduped);
        assert_eq!(manager.len(), 5);
    }

    #[test]
    fn test_session_isolation() {
        let mut manager = ChatManager::new();
        let mut store = GraphStore::new();

        let (s1, _) = manager.create_session(&mut store, Transcript::new());
        store.merge(&fragment(&[("n1", "Sun")], &[("root", "n1")]));
        let mut s1_transcript = Transcript::new();
        s1_transcript.push(ConversationMessage::user("tell me about the sun"));

        let (s2, restored) = manager.create_session(&mut store, s1_transcript.clone());
        assert!(restored.is_empty());
        store.merge(&fragment(&[("m1", "Moon")], &[("root", "m1")]));
        assert_eq!(labels(&store), vec!["MARKAZ", "Moon"]);

        let (_, restored) = manager.switch_to(&s1, &mut store, Transcript::new());
        assert_eq!(labels(&store), vec!["MARKAZ", "Sun"]);
        assert_eq!(restored, s1_transcript);

        manager.switch_to(&s2, &mut store, restored);
        assert_eq!(labels(&store), vec!["MARKAZ", "Moon"]);
    }

    #[test]
    fn test_list_sessions_marks_active() {
        let mut manager = ChatManager::new();
        let mut store = GraphStore::new();
        let (first, _) = manager.create_session(&mut store, Transcript::new());
        let (second, _) = manager.create_session(&mut store, Transcript::new());

        let listing = manager.list_sessions();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].id, first);
        assert!(!listing[0].is_active);
        assert_eq!(listing[1].id, second);
        assert!(listing[1].is_active);
    }

    #[test]
    fn test_switch_to_missing_chat_defaults_to_root() {
        let mut manager = ChatManager::new();
        let mut store = GraphStore::new();
        manager.create_session(&mut store, Transcript::new());
        store.merge(&fragment(&[("n1", "Sun")], &[]));

        let (id, transcript) = manager.switch_to("chat_unknown", &mut store, Transcript::new());

        assert_eq!(id, "chat_unknown");
        assert!(transcript.is_empty());
        assert_eq!(store.current_nodes(), &[Node::root()]);
        assert_eq!(manager.active_id(), Some("chat_unknown"));
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_switch_to_unusable_id_generates_one() {
        let mut manager = ChatManager::new();
        let mut store = GraphStore::new();
        manager.create_session(&mut store, Transcript::new());

        let (id, transcript) = manager.switch_to("my chat", &mut store, Transcript::new());

        assert_ne!(id, "my chat");
        assert!(id.starts_with("chat_"));
        assert!(transcript.is_empty());
        assert_eq!(manager.active_id(), Some(id.as_str()));
        assert!(manager.get("my chat").is_none());
        assert!(manager.chats().iter().all(|chat| is_valid_chat_id(&chat.id)));
    }

    #[test]
    fn test_record_without_nodes_loads_root() {
        let mut chat = ChatSession::new("chat_1");
        chat.nodes.clear();
        let mut manager = ChatManager::from_records(vec![chat]);
        let mut store = GraphStore::new();

        manager.switch_to("chat_1", &mut store, Transcript::new());
        assert_eq!(store.current_nodes(), &[Node::root()]);
    }

    #[test]
    fn test_merge_into_stored_leaves_active_store_alone() {
        let mut manager = ChatManager::new();
        let mut store = GraphStore::new();
        let (background, _) = manager.create_session(&mut store, Transcript::new());
        manager.create_session(&mut store, Transcript::new());

        let report = manager
            .merge_into_stored(&background, &fragment(&[("n1", "Sun")], &[("root", "n1")]))
            .unwrap();
        manager
            .append_to_stored(&background, ConversationMessage::assistant("The sun is a star"))
            .unwrap();

        assert_eq!(report.added_nodes, vec!["n1".to_string()]);
        assert_eq!(store.current_nodes().len(), 1);

        let (_, transcript) = manager.switch_to(&background, &mut store, Transcript::new());
        assert_eq!(labels(&store), vec!["MARKAZ", "Sun"]);
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn test_merge_into_unknown_chat_is_not_found() {
        let mut manager = ChatManager::new();
        let err = manager
            .merge_into_stored("chat_404", &Fragment::default())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_from_records_orders_by_creation_and_continues_ids() {
        let records = vec![
            ChatSession::new("chat_9999999999999"),
            ChatSession::new("chat_1000"),
        ];
        let mut manager = ChatManager::from_records(records);
        assert_eq!(manager.active_id(), None);
        assert_eq!(manager.chats()[0].id, "chat_1000");

        let mut store = GraphStore::new();
        let (id, _) = manager.create_session(&mut store, Transcript::new());
        assert_eq!(id, "chat_10000000000000");
    }
}
