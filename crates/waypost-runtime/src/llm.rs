//! [`LlmClient`] – the language-model collaborator boundary.
//!
//! Talks to any OpenAI-compatible `/v1/chat/completions` endpoint. The core
//! hands the model a small, bounded context — the top-K matched catalog
//! items, each reduced to name/price/location/category — and passes the
//! returned free text through untouched. Response-length and hallucination
//! policing belong to the collaborator, not to this core.
//!
//! # Example
//!
//! ```rust,no_run
//! use waypost_runtime::llm::{ChatMessage, LlmClient, Role, system_prompt};
//!
//! let client = LlmClient::new("http://localhost:11434", "llama3");
//! let messages = vec![
//!     ChatMessage { role: Role::System, content: system_prompt("STORE-042") },
//!     ChatMessage { role: Role::User, content: "Where can I get diesel?".into() },
//! ];
//! // Requires a running model server – skipped in unit tests.
//! // let reply = client.complete(&messages).await.unwrap();
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use waypost_types::CatalogItem;

// ─────────────────────────────────────────────────────────────────────────────
// Error type
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can arise from the LLM boundary.
#[derive(Error, Debug)]
pub enum LlmError {
    /// The HTTP request to the model server failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The response from the model server could not be parsed.
    #[error("Unexpected response format: {0}")]
    BadResponse(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Message types (OpenAI-compatible)
// ─────────────────────────────────────────────────────────────────────────────

/// The role of a participant in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal request / response shapes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

// ─────────────────────────────────────────────────────────────────────────────
// Prompt building
// ─────────────────────────────────────────────────────────────────────────────

/// System prompt for the wayfinding assistant persona.
pub fn system_prompt(store_id: &str) -> String {
    format!(
        "You are a friendly wayfinding assistant robot at {store_id}.\n\
         Answer in at most 35 words, spoken aloud to a guest standing in \
         front of you.\n\
         Only mention items from the provided context. If the context is \
         empty, offer to get a staff member."
    )
}

/// Render the top-`top_k` matched items as the bounded LLM context.
pub fn item_context(items: &[CatalogItem], top_k: usize) -> String {
    items
        .iter()
        .take(top_k)
        .map(|item| {
            format!(
                "- {} | ${:.2} | {} | {}",
                item.name, item.price, item.location, item.category
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// LlmClient
// ─────────────────────────────────────────────────────────────────────────────

/// An async client for an OpenAI-compatible chat-completions endpoint.
///
/// Construct once and reuse across interactions.
pub struct LlmClient {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl LlmClient {
    /// Create a new client pointing at `base_url`
    /// (e.g. `"http://localhost:11434"`) and using `model`.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Send `messages` to the model and return the assistant's reply text,
    /// unvalidated.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the request fails, or
    /// [`LlmError::BadResponse`] if the response shape is unexpected.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
        };

        let response: ChatResponse = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::BadResponse("empty choices array".into()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
