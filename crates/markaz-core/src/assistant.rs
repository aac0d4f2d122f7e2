//! Assistant collaborator contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::graph::Fragment;

/// Outbound request body: `{prompt, chat_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub prompt: String,
    pub chat_id: Option<String>,
}

impl AskRequest {
    pub fn new(prompt: impl Into<String>, chat_id: Option<String>) -> Self {
        Self {
            prompt: prompt.into(),
            chat_id,
        }
    }
}

/// Inbound response body: `{text_answer, graph_data}`.
///
/// `graph_data` is kept raw so that a malformed fragment can be rejected
/// without losing the text answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub text_answer: String,
    #[serde(default)]
    pub graph_data: Value,
}

impl ChatResponse {
    pub fn new(text_answer: impl Into<String>, graph_data: Value) -> Self {
        Self {
            text_answer: text_answer.into(),
            graph_data,
        }
    }

    /// Validates `graph_data` into a fragment.
    pub fn fragment(&self) -> Result<Fragment> {
        Fragment::from_value(&self.graph_data)
    }
}

/// Anything that turns a prompt into a text answer plus a graph fragment.
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn ask(&self, request: &AskRequest) -> Result<ChatResponse>;
}
