//! Configuration for a [`ChatSession`](super::session::ChatSession).
//!
//! # Examples
//!
//! ```ignore
//! let config = ChatConfig::new("openai/gpt-4o-mini", "You're a kind therapy assistant.")
//!     .with_policy(BoundingPolicy::Summarize { threshold: 8 })
//!     .with_thread_id("3");
//! ```

use crate::history::BoundingPolicy;
use crate::{DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};

/// Default thread id for interactive sessions.
pub const DEFAULT_THREAD_ID: &str = "default";

/// Settings for one chat session.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Model identifier (e.g. `"openai/gpt-4o-mini"`).
    pub model: String,
    /// System instruction placed at the head of every submission.
    pub system_prompt: String,
    /// Maximum tokens per reply. `0` leaves the limit to the provider.
    pub max_tokens: u32,
    /// Sampling temperature. Default: `0.0`.
    pub temperature: f32,
    /// How the history sent with each turn is bounded.
    pub policy: BoundingPolicy,
    /// Thread whose history this session reads and writes.
    pub thread_id: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tokens: 0,
            temperature: 0.0,
            policy: BoundingPolicy::default(),
            thread_id: DEFAULT_THREAD_ID.to_string(),
        }
    }
}

impl ChatConfig {
    pub fn new(model: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: system_prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_policy(mut self, policy: BoundingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = thread_id.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_therapy_bot() {
        let config = ChatConfig::default();
        assert_eq!(config.system_prompt, "You're a kind therapy assistant.");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.policy, BoundingPolicy::Trim { keep_last: 10 });
        assert_eq!(config.thread_id, "default");
    }

    #[test]
    fn builder_overrides() {
        let config = ChatConfig::new("m", "s")
            .with_max_tokens(512)
            .with_temperature(0.7)
            .with_policy(BoundingPolicy::Summarize { threshold: 4 })
            .with_thread_id("3");
        assert_eq!(config.model, "m");
        assert_eq!(config.system_prompt, "s");
        assert_eq!(config.max_tokens, 512);
        assert_eq!(config.policy, BoundingPolicy::Summarize { threshold: 4 });
        assert_eq!(config.thread_id, "3");
    }
}
