pub mod config_service;
pub mod json_chat_repository;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::json_chat_repository::JsonChatRepository;
pub use crate::paths::{MarkazPaths, PathError};
