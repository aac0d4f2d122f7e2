//! OpenAiMindMapAgent - mind-map generation on the OpenAI Chat Completions API.
//!
//! Keeps a short per-chat history so follow-up questions can reuse node ids
//! from earlier answers. Upstream failures never surface as errors: the
//! caller receives an apology with an empty graph instead.

use std::collections::{BTreeMap, HashMap};
use std::env;

use async_trait::async_trait;
use markaz_core::assistant::{AskRequest, Assistant, ChatResponse};
use markaz_core::config::AssistantConfig;
use markaz_core::{MarkazError, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;

use crate::prompt::SYSTEM_PROMPT;

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
/// History key for requests that carry no chat id.
pub const DEFAULT_CHAT_KEY: &str = "default";
const FALLBACK_ANSWER: &str =
    "Sorry, something went wrong while contacting the AI. Please try again.";

/// Per-chat history counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub total_chats: usize,
    pub chat_ids: Vec<String>,
    pub messages_per_chat: BTreeMap<String, usize>,
}

/// Assistant that calls OpenAI directly and keeps chat histories in memory.
pub struct OpenAiMindMapAgent {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    history_window: usize,
    history_limit: usize,
    histories: Mutex<HashMap<String, Vec<ChatMessage>>>,
}

impl OpenAiMindMapAgent {
    /// Creates an agent with default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_settings(api_key, &AssistantConfig::default())
    }

    /// Creates an agent using the model and history settings of `config`.
    ///
    /// # Errors
    ///
    /// Returns `Transport` when the HTTP client cannot be built.
    pub fn with_settings(api_key: impl Into<String>, config: &AssistantConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| MarkazError::transport(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: BASE_URL.to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            history_window: config.history_window,
            history_limit: config.history_limit,
            histories: Mutex::new(HashMap::new()),
        })
    }

    /// Loads the API key from `OPENAI_API_KEY`; `OPENAI_MODEL_NAME` overrides the model.
    pub fn try_from_env(config: &AssistantConfig) -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            MarkazError::config("OPENAI_API_KEY not found in environment variables")
        })?;

        let agent = Self::with_settings(api_key, config)?;
        Ok(match env::var("OPENAI_MODEL_NAME") {
            Ok(model) if !model.trim().is_empty() => agent.with_model(model),
            _ => agent,
        })
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the chat-completions endpoint (proxies, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Snapshot of the in-memory histories.
    pub async fn stats(&self) -> HistoryStats {
        let histories = self.histories.lock().await;
        let messages_per_chat: BTreeMap<String, usize> = histories
            .iter()
            .map(|(id, messages)| (id.clone(), messages.len()))
            .collect();

        HistoryStats {
            total_chats: histories.len(),
            chat_ids: messages_per_chat.keys().cloned().collect(),
            messages_per_chat,
        }
    }

    /// Forgets the history of one chat. Returns whether there was one.
    pub async fn clear(&self, chat_id: &str) -> bool {
        let removed = self.histories.lock().await.remove(chat_id).is_some();
        if removed {
            tracing::info!("[OpenAiMindMapAgent] Cleared history of chat {}", chat_id);
        }
        removed
    }

    async fn complete(&self, key: &str, prompt: &str) -> Result<(ChatResponse, String)> {
        let messages = {
            let histories = self.histories.lock().await;
            let history = histories.get(key).map(Vec::as_slice).unwrap_or_default();
            build_messages(history, self.history_window, prompt)
        };

        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            response_format: json!({"type": "json_object"}),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let raw = self.send_request(&body).await?;
        let response = parse_answer(&raw)?;
        Ok((response, raw))
    }

    async fn send_request(&self, body: &ChatCompletionRequest) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await
            .map_err(|err| MarkazError::transport(format!("OpenAI API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenAI error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            MarkazError::transport(format!("Failed to parse OpenAI response: {err}"))
        })?;

        extract_text_response(parsed)
    }

    async fn record_exchange(&self, key: &str, prompt: &str, raw_answer: &str) {
        let mut histories = self.histories.lock().await;
        let history = histories.entry(key.to_string()).or_default();
        push_exchange(history, prompt, raw_answer, self.history_limit);
    }
}

#[async_trait]
impl Assistant for OpenAiMindMapAgent {
    async fn ask(&self, request: &AskRequest) -> Result<ChatResponse> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(MarkazError::invalid_input("Prompt must not be empty"));
        }
        let key = request.chat_id.as_deref().unwrap_or(DEFAULT_CHAT_KEY);

        match self.complete(key, prompt).await {
            Ok((response, raw)) => {
                self.record_exchange(key, prompt, &raw).await;
                Ok(response)
            }
            Err(err) => {
                tracing::warn!("[OpenAiMindMapAgent] Falling back after error: {}", err);
                Ok(fallback_response())
            }
        }
    }
}

/// Apology with an empty graph.
pub fn fallback_response() -> ChatResponse {
    ChatResponse::new(FALLBACK_ANSWER, json!({"nodes": [], "links": []}))
}

/// System prompt, the last `window` history messages, then the user prompt.
fn build_messages(history: &[ChatMessage], window: usize, prompt: &str) -> Vec<ChatMessage> {
    let start = history.len().saturating_sub(window);
    let mut messages = Vec::with_capacity(window + 2);
    messages.push(ChatMessage::new("system", SYSTEM_PROMPT));
    messages.extend_from_slice(&history[start..]);
    messages.push(ChatMessage::new("user", prompt));
    messages
}

fn push_exchange(history: &mut Vec<ChatMessage>, prompt: &str, answer: &str, limit: usize) {
    history.push(ChatMessage::new("user", prompt));
    history.push(ChatMessage::new("assistant", answer));
    if history.len() > limit {
        let excess = history.len() - limit;
        history.drain(..excess);
    }
}

fn parse_answer(raw: &str) -> Result<ChatResponse> {
    serde_json::from_str(raw).map_err(|err| {
        tracing::debug!("[OpenAiMindMapAgent] Unparseable answer: {}", raw);
        MarkazError::malformed_fragment(format!("Model answer is not valid JSON: {err}"))
    })
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: serde_json::Value,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| MarkazError::transport("OpenAI API returned no content in the response"))
}

fn map_http_error(status: StatusCode, body: String) -> MarkazError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);
    MarkazError::transport(format!("OpenAI API error {}: {}", status.as_u16(), message))
}
