//! Convenience re-exports for common `chat-bound` types.
//!
//! ```ignore
//! use chat_bound::prelude::*;
//! ```

pub use crate::{ChatError, Message, OpenRouterClient};

pub use crate::agent::{
    ChatConfig, ChatEvent, ChatSession, EventHandler, FnEventHandler, LoggingHandler, NoopHandler,
};

pub use crate::history::{BoundingPolicy, HistoryBounder, Prepared, Turn, TurnId, TurnRole};

pub use crate::model::{ChatModel, OpenRouterModel};

pub use crate::store::{Commit, FileStore, MemoryStore, ThreadStore};
