//! [`ChatSession`]: one thread's request/response cycle.
//!
//! The session owns everything a turn needs (model handle, store handle,
//! thread id, history bounder, event handler), so there is no global state.
//! Each [`send`](ChatSession::send) runs strictly in sequence:
//!
//! 1. load the thread from the store;
//! 2. let the [`HistoryBounder`] build the submission (compacting if the
//!    policy says so);
//! 3. ask the model for a reply;
//! 4. commit deletions, additions and the reply in one store transaction.
//!
//! Any failure aborts the turn before step 4, leaving the thread unchanged.

use tracing::debug;

use super::config::ChatConfig;
use super::events::{ChatEvent, EventHandler, NoopHandler};
use crate::ChatError;
use crate::history::{BoundingPolicy, HistoryBounder, Turn};
use crate::model::ChatModel;
use crate::store::{ThreadStore, validate_thread_id};

/// A conversation thread bound to a model and a store.
pub struct ChatSession<'a> {
    model: &'a dyn ChatModel,
    store: &'a dyn ThreadStore,
    bounder: HistoryBounder,
    thread_id: String,
    handler: &'a dyn EventHandler,
}

impl<'a> ChatSession<'a> {
    pub fn new(
        model: &'a dyn ChatModel,
        store: &'a dyn ThreadStore,
        config: ChatConfig,
    ) -> Result<Self, ChatError> {
        validate_thread_id(&config.thread_id)?;
        let bounder = HistoryBounder::new(config.system_prompt, config.policy)?;
        Ok(Self {
            model,
            store,
            bounder,
            thread_id: config.thread_id,
            handler: &NoopHandler,
        })
    }

    pub fn with_event_handler(mut self, handler: &'a dyn EventHandler) -> Self {
        self.handler = handler;
        self
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn policy(&self) -> BoundingPolicy {
        self.bounder.policy()
    }

    /// The thread's stored turns, oldest first.
    pub fn history(&self) -> Result<Vec<Turn>, ChatError> {
        self.store.load(&self.thread_id)
    }

    /// Run one user turn and return the assistant's reply.
    pub async fn send(&self, text: &str) -> Result<Turn, ChatError> {
        let conversation = self.store.load(&self.thread_id)?;
        self.handler.on_event(&ChatEvent::TurnStarted {
            thread_id: &self.thread_id,
            stored_turns: conversation.len(),
        });

        let prepared = self
            .bounder
            .prepare(self.model, &conversation, Turn::user(text))
            .await?;

        if let Some(summary) = &prepared.summary {
            self.handler.on_event(&ChatEvent::Compacted {
                removed_turns: prepared.deletions.len(),
                summary: &summary.content,
            });
        }

        let messages = prepared.messages();
        self.handler.on_event(&ChatEvent::Submitting {
            turns: messages.len(),
        });
        let reply = Turn::assistant(self.model.complete(&messages).await?);
        self.handler.on_event(&ChatEvent::Reply(&reply.content));

        let stored_turns =
            conversation.len() - prepared.deletions.len() + prepared.additions.len() + 1;
        let commit = prepared.into_commit(reply.clone());
        self.store.commit(&self.thread_id, &commit)?;
        debug!(
            "Thread {}: -{} +{} message(s)",
            self.thread_id,
            commit.deletions.len(),
            commit.additions.len()
        );
        self.handler.on_event(&ChatEvent::Committed {
            thread_id: &self.thread_id,
            stored_turns,
        });

        Ok(reply)
    }
}
