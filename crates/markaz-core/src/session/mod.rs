//! Chat session domain module.
//!
//! # Module Structure
//!
//! - `model`: Stored chat record (`ChatSession`) and picker entries (`ChatListing`)
//! - `message`: Transcript types (`Transcript`, `ConversationMessage`, `MessageRole`)
//! - `manager`: Create / switch / list protocol (`ChatManager`)
//! - `repository`: Repository trait for chat persistence

mod manager;
mod message;
mod model;
mod repository;

pub use manager::ChatManager;
pub use message::{ConversationMessage, MessageRole, Transcript};
pub use model::{ChatListing, ChatSession, is_valid_chat_id};
pub use repository::ChatRepository;
