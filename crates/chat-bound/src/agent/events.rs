//! Events emitted by a [`ChatSession`](super::session::ChatSession).
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Tests or fire-and-forget sessions |
//! | [`LoggingHandler`] | Structured logging via `tracing` |
//! | [`FnEventHandler`] | Quick closures for simple callbacks |
//! | Custom `impl EventHandler` | Anything else |

use tracing::{debug, info};

/// What happened during one chat turn, in order of occurrence.
#[derive(Debug)]
pub enum ChatEvent<'a> {
    /// A user turn arrived; `stored_turns` is the thread length before it.
    TurnStarted {
        thread_id: &'a str,
        stored_turns: usize,
    },
    /// The stored history was condensed into one summary turn.
    Compacted {
        removed_turns: usize,
        summary: &'a str,
    },
    /// The bounded submission is about to be sent for a reply.
    Submitting { turns: usize },
    /// The model replied.
    Reply(&'a str),
    /// The turn's changes were written to the store.
    Committed {
        thread_id: &'a str,
        stored_turns: usize,
    },
}

/// Handler for session events.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &ChatEvent<'_>) {
        let _ = event;
    }
}

/// Ignores every event.
pub struct NoopHandler;
impl EventHandler for NoopHandler {}

/// An event handler backed by a closure.
///
/// ```ignore
/// let handler = FnEventHandler::new(|event| {
///     if let ChatEvent::Compacted { removed_turns, .. } = event {
///         eprintln!("(compacted {removed_turns} messages)");
///     }
/// });
/// ```
pub struct FnEventHandler<F>(F)
where
    F: Fn(&ChatEvent<'_>) + Send + Sync;

impl<F> FnEventHandler<F>
where
    F: Fn(&ChatEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&ChatEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &ChatEvent<'_>) {
        (self.0)(event)
    }
}

/// Logs every event through `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &ChatEvent<'_>) {
        match event {
            ChatEvent::TurnStarted {
                thread_id,
                stored_turns,
            } => {
                debug!("[thread {thread_id}] turn started with {stored_turns} stored message(s)");
            }
            ChatEvent::Compacted {
                removed_turns,
                summary,
            } => {
                let preview: String = summary.chars().take(200).collect();
                info!(
                    "Compacted {removed_turns} message(s) into summary: {preview}{}",
                    if summary.chars().count() > 200 { "..." } else { "" }
                );
            }
            ChatEvent::Submitting { turns } => {
                debug!("Submitting {turns} message(s)");
            }
            ChatEvent::Reply(text) => {
                let preview: String = text.chars().take(200).collect();
                debug!(
                    "LLM text: {preview}{}",
                    if text.chars().count() > 200 { "..." } else { "" }
                );
            }
            ChatEvent::Committed {
                thread_id,
                stored_turns,
            } => {
                debug!("[thread {thread_id}] {stored_turns} message(s) stored");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn fn_handler_receives_events() {
        let seen = Mutex::new(Vec::new());
        let handler = FnEventHandler::new(|event| {
            if let ChatEvent::Submitting { turns } = event {
                seen.lock().unwrap().push(*turns);
            }
        });
        handler.on_event(&ChatEvent::Submitting { turns: 3 });
        handler.on_event(&ChatEvent::Reply("ignored"));
        assert_eq!(*seen.lock().unwrap(), vec![3]);
    }

    #[test]
    fn logging_handler_accepts_long_text() {
        let long = "é".repeat(500);
        LoggingHandler.on_event(&ChatEvent::Reply(&long));
        LoggingHandler.on_event(&ChatEvent::Compacted {
            removed_turns: 8,
            summary: &long,
        });
    }
}
