//! RemoteAskClient - HTTP client for a mind-map server exposing `POST /ask`.

use std::time::Duration;

use async_trait::async_trait;
use markaz_core::assistant::{AskRequest, Assistant, ChatResponse};
use markaz_core::{MarkazError, Result};
use reqwest::Client;

/// Assistant backed by a remote mind-map server.
#[derive(Clone)]
pub struct RemoteAskClient {
    client: Client,
    base_url: String,
}

impl RemoteAskClient {
    /// Creates a client for the server at `base_url` (e.g. `http://localhost:8000`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| MarkazError::transport(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn ask_url(&self) -> String {
        format!("{}/ask", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Assistant for RemoteAskClient {
    async fn ask(&self, request: &AskRequest) -> Result<ChatResponse> {
        let url = self.ask_url();
        tracing::debug!("[RemoteAskClient] POST {} (chat {:?})", url, request.chat_id);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|err| MarkazError::transport(format!("Request to {url} failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(MarkazError::transport(format!(
                "Server answered {}: {}",
                status.as_u16(),
                body
            )));
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|err| MarkazError::transport(format!("Failed to decode chat response: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_url_ignores_trailing_slash() {
        let client = RemoteAskClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.ask_url(), "http://localhost:8000/ask");
    }
}
