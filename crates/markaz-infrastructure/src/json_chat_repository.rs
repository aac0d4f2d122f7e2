//! JSON file-based ChatRepository implementation.
//!
//! # Directory Structure
//!
//! ```text
//! <base>/
//! ├── state.json              # {"active_chat_id": "chat_..."}
//! └── chats/
//!     └── chat_1700000000000.json
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use markaz_core::session::{ChatRepository, ChatSession, is_valid_chat_id};
use markaz_core::{MarkazError, Result};
use serde::{Deserialize, Serialize};

use crate::paths::MarkazPaths;
use crate::storage::AtomicJsonFile;

/// Persisted application state next to the chat files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct RepositoryState {
    #[serde(default)]
    active_chat_id: Option<String>,
}

/// One JSON file per chat, written atomically.
#[derive(Debug, Clone)]
pub struct JsonChatRepository {
    chats_dir: PathBuf,
    state: AtomicJsonFile<RepositoryState>,
}

impl JsonChatRepository {
    /// Creates a repository rooted at `base_dir`, creating directories as needed.
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let chats_dir = base_dir.join("chats");
        tokio::fs::create_dir_all(&chats_dir).await?;

        Ok(Self {
            chats_dir,
            state: AtomicJsonFile::new(base_dir.join("state.json")),
        })
    }

    /// Creates a repository in the data directory of `paths`.
    pub async fn from_paths(paths: &MarkazPaths) -> Result<Self> {
        Self::new(paths.data_dir()?).await
    }

    fn chat_file(&self, chat_id: &str) -> Result<AtomicJsonFile<ChatSession>> {
        validate_chat_id(chat_id)?;
        Ok(AtomicJsonFile::new(
            self.chats_dir.join(format!("{}.json", chat_id)),
        ))
    }

    async fn load_state(&self) -> Result<RepositoryState> {
        Ok(self.state.load().await?.unwrap_or_default())
    }
}

/// Chat ids become file names; keep them to a safe alphabet.
fn validate_chat_id(chat_id: &str) -> Result<()> {
    if is_valid_chat_id(chat_id) {
        Ok(())
    } else {
        Err(MarkazError::invalid_input(format!(
            "chat id '{}' contains unsupported characters",
            chat_id
        )))
    }
}

#[async_trait]
impl ChatRepository for JsonChatRepository {
    async fn find_by_id(&self, chat_id: &str) -> Result<Option<ChatSession>> {
        self.chat_file(chat_id)?.load().await
    }

    async fn save(&self, chat: &ChatSession) -> Result<()> {
        self.chat_file(&chat.id)?.save(chat).await?;
        tracing::debug!("[JsonChatRepository] Saved chat {}", chat.id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<ChatSession>> {
        let mut chats = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.chats_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            match AtomicJsonFile::<ChatSession>::new(path.clone()).load().await {
                Ok(Some(chat)) => chats.push(chat),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        "[JsonChatRepository] Skipping unreadable chat file {}: {}",
                        path.display(),
                        e
                    );
                }
            }
        }

        chats.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(chats)
    }

    async fn get_active_chat_id(&self) -> Result<Option<String>> {
        Ok(self.load_state().await?.active_chat_id)
    }

    async fn set_active_chat_id(&self, chat_id: &str) -> Result<()> {
        let mut state = self.load_state().await?;
        state.active_chat_id = Some(chat_id.to_string());
        self.state.save(&state).await
    }

    async fn clear_active_chat_id(&self) -> Result<()> {
        let mut state = self.load_state().await?;
        state.active_chat_id = None;
        self.state.save(&state).await
    }
}
