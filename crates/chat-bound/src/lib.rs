//! Conversational agent that keeps the chat history it sends to an LLM bounded.
//!
//! `chat-bound` runs a line-oriented chat against any OpenAI-compatible chat
//! completions endpoint (OpenRouter by default). Every user turn passes
//! through a [`HistoryBounder`](history::HistoryBounder) that decides which
//! stored turns are submitted with it, using one of two policies:
//!
//! - **Trim**: submit only the last K turns. Stored history is untouched.
//! - **Summarize**: once the stored history reaches T turns, ask the model
//!   to distill it into one summary turn and replace the stored history with
//!   that summary plus the latest user turn.
//!
//! # Getting started
//!
//! ```ignore
//! use chat_bound::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ChatError> {
//!     let api_key = std::env::var("OPENROUTER_KEY").unwrap();
//!     let client = OpenRouterClient::new(api_key)?;
//!
//!     let config = ChatConfig::new("openai/gpt-4o-mini", "You're a kind therapy assistant.")
//!         .with_policy(BoundingPolicy::Summarize { threshold: 8 });
//!     let model = OpenRouterModel::from_config(client, &config);
//!     let store = MemoryStore::new();
//!
//!     let session = ChatSession::new(&model, &store, config)?
//!         .with_event_handler(&LoggingHandler);
//!     let reply = session.send("I had a rough day.").await?;
//!     println!("{}", reply.content);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`history`] | [`Turn`](history::Turn) data model and the [`HistoryBounder`](history::HistoryBounder) with its trim and summarize policies |
//! | [`model`] | [`ChatModel`](model::ChatModel) generation seam and its OpenRouter implementation |
//! | [`store`] | [`ThreadStore`](store::ThreadStore) persistence seam with in-memory and file-backed stores |
//! | [`agent`] | [`ChatSession`](agent::ChatSession), config, and events |
//! | [`error`] | [`ChatError`](error::ChatError) |

pub mod agent;
pub mod error;
pub mod history;
pub mod model;
pub mod prelude;
pub mod store;

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

pub use error::ChatError;

// ── Constants ──────────────────────────────────────────────────────

pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// OpenAI's own chat completions endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default model for all LLM calls.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Default system instruction placed at the head of every submission.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You're a kind therapy assistant.";

// ── Request types ──────────────────────────────────────────────────

/// Chat completion request body. Only the fields this crate sets are
/// modelled; zero values are omitted from serialization.
#[derive(Serialize, Debug, Default)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub max_tokens: u32,
    pub temperature: f32,
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}

// ── Message types ──────────────────────────────────────────────────

/// Role of a message on the wire.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A message as sent to the chat completions API.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// ── Response types ─────────────────────────────────────────────────

/// Raw API response (internal deserialization target).
#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Clean return type from [`OpenRouterClient::chat()`].
#[derive(Debug)]
pub struct ChatCompletion {
    pub content: Option<String>,
    pub usage: Option<UsageInfo>,
    pub finish_reason: Option<String>,
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Parse a chat-completions response body into a [`ChatCompletion`].
fn parse_completion(text: &str) -> Result<ChatCompletion, ChatError> {
    let parsed: RawChatResponse =
        serde_json::from_str(text).map_err(|e| ChatError::Decode(e.to_string()))?;

    if let Some(err) = parsed.error {
        return Err(ChatError::Api {
            status: 200,
            body: err.message,
        });
    }

    if let Some(ref usage) = parsed.usage {
        debug!(
            "Token usage: prompt={}, completion={}, total={}",
            usage.prompt_tokens.unwrap_or(0),
            usage.completion_tokens.unwrap_or(0),
            usage.total_tokens.unwrap_or(0),
        );
    }

    match parsed.choices.and_then(|c| c.into_iter().next()) {
        Some(c) => {
            debug!(
                "LLM output: {} chars text",
                c.message.content.as_ref().map_or(0, |s| s.len())
            );
            Ok(ChatCompletion {
                content: c.message.content,
                usage: parsed.usage,
                finish_reason: c.finish_reason,
            })
        }
        None => {
            debug!("LLM output: empty (no choices)");
            Ok(ChatCompletion {
                content: None,
                usage: parsed.usage,
                finish_reason: None,
            })
        }
    }
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for an OpenAI-compatible chat completions API.
pub struct OpenRouterClient {
    pub(crate) client: reqwest::Client,
    pub(crate) api_key: String,
    pub(crate) url: String,
    pub(crate) referer: String,
    pub(crate) title: String,
}

impl OpenRouterClient {
    /// Create a new client for the OpenRouter endpoint. Sends `X-Title` only;
    /// no Referer.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ChatError> {
        Self::with_headers(api_key, "", "chat-bound")
    }

    /// Create a new client with custom Referer and X-Title headers. An empty
    /// `referer` omits the header.
    pub fn with_headers(
        api_key: impl Into<String>,
        referer: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .user_agent("chat-bound/0.1")
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            url: OPENROUTER_URL.to_string(),
            referer: referer.into(),
            title: title.into(),
        })
    }

    /// Point the client at another OpenAI-compatible chat completions URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// The chat completions URL requests are posted to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a chat completion request.
    pub async fn chat(&self, body: &ChatRequest) -> Result<ChatCompletion, ChatError> {
        debug!(
            "LLM request: model={}, messages={}, max_tokens={}, temp={}",
            body.model,
            body.messages.len(),
            body.max_tokens,
            body.temperature,
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let mut req = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("X-Title", &self.title);
        if !self.referer.is_empty() {
            req = req.header("HTTP-Referer", &self.referer);
        }
        let resp = req.json(body).send().await?;

        let status = resp.status();
        let text = resp.text().await?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(ChatError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_completion(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors() {
        let sys = Message::system("hello");
        assert_eq!(sys.role, MessageRole::System);
        assert_eq!(sys.content, "hello");

        assert_eq!(Message::user("world").role, MessageRole::User);
        assert_eq!(Message::assistant("hi").role, MessageRole::Assistant);
    }

    #[test]
    fn chat_request_serializes_lowercase_roles() {
        let req = ChatRequest {
            model: "test-model".into(),
            messages: vec![Message::system("s"), Message::user("u")],
            max_tokens: 0,
            temperature: 0.0,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert!(json.get("max_tokens").is_none());
        assert_eq!(json["temperature"], 0.0);
    }

    #[test]
    fn parse_completion_extracts_first_choice() {
        let body = r#"{
            "choices": [{"message": {"content": "Hi there"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }"#;
        let completion = parse_completion(body).unwrap();
        assert_eq!(completion.content.as_deref(), Some("Hi there"));
        assert_eq!(completion.finish_reason.as_deref(), Some("stop"));
        assert_eq!(completion.usage.unwrap().total_tokens, Some(15));
    }

    #[test]
    fn parse_completion_without_choices_is_empty() {
        let completion = parse_completion(r#"{"choices": []}"#).unwrap();
        assert!(completion.content.is_none());
    }

    #[test]
    fn parse_completion_surfaces_api_error_object() {
        let err = parse_completion(r#"{"error": {"message": "quota exceeded"}}"#).unwrap_err();
        match err {
            ChatError::Api { status, body } => {
                assert_eq!(status, 200);
                assert_eq!(body, "quota exceeded");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn parse_completion_rejects_garbage() {
        assert!(matches!(
            parse_completion("not json"),
            Err(ChatError::Decode(_))
        ));
    }

    #[test]
    fn client_url_can_be_overridden() {
        let client = OpenRouterClient::new("key")
            .unwrap()
            .with_url("http://localhost:8080/v1/chat/completions");
        assert_eq!(client.url(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn default_client_sends_no_referer() {
        let client = OpenRouterClient::new("key").unwrap();
        assert!(client.referer.is_empty());
        assert_eq!(client.title, "chat-bound");
        assert_eq!(client.url(), OPENROUTER_URL);
    }
}
