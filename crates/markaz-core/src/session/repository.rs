//! Chat repository trait.
//!
//! Defines the interface for chat persistence operations.

use async_trait::async_trait;

use super::model::ChatSession;
use crate::error::Result;

/// An abstract repository for persisting chats between runs.
///
/// This trait decouples the chat manager from the storage mechanism
/// (JSON files, database, remote API).
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Finds a chat by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ChatSession))`: Chat found
    /// - `Ok(None)`: Chat not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, chat_id: &str) -> Result<Option<ChatSession>>;

    /// Saves a chat, replacing any stored version.
    async fn save(&self, chat: &ChatSession) -> Result<()>;

    /// Lists all stored chats.
    async fn list_all(&self) -> Result<Vec<ChatSession>>;

    /// Gets the ID of the chat that was active when the app last persisted.
    async fn get_active_chat_id(&self) -> Result<Option<String>>;

    /// Records the ID of the active chat.
    async fn set_active_chat_id(&self, chat_id: &str) -> Result<()>;

    /// Forgets the active chat ID.
    async fn clear_active_chat_id(&self) -> Result<()>;
}
