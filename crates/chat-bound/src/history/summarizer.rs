//! Summary generation for history compaction.
//!
//! The whole stored history is sent back to the model followed by one user
//! instruction asking for a distilled summary. The reply becomes a single
//! [`TurnRole::Summary`](super::TurnRole::Summary) turn that replaces the
//! history it condenses.

use tracing::debug;

use super::turn::{Turn, to_messages};
use crate::model::ChatModel;
use crate::{ChatError, Message};

/// Instruction appended after the history when asking for a summary.
pub const SUMMARY_INSTRUCTION: &str = "Distill the above chat messages into a single summary \
message. Include as many specific details as you can.";

/// Build the message list for a summarization call: `history` followed by
/// the summary instruction as a user message.
pub fn build_summary_request(history: &[Turn]) -> Vec<Message> {
    let mut messages = to_messages(history);
    messages.push(Message::user(SUMMARY_INSTRUCTION));
    messages
}

/// Ask `model` to condense `history` into one summary turn.
pub async fn summarize(model: &dyn ChatModel, history: &[Turn]) -> Result<Turn, ChatError> {
    let request = build_summary_request(history);
    debug!(
        "Summarizing {} turn(s) with model {}",
        history.len(),
        model.name()
    );
    let text = model.complete(&request).await?;
    debug!("Summary: {} chars", text.len());
    Ok(Turn::summary(text))
}
