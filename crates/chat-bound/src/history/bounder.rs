//! The history bounder: decides what is submitted for a reply and how the
//! stored history changes.

use tracing::{debug, info};

use super::summarizer::summarize;
use super::trim::keep_last;
use super::turn::{Turn, TurnId, TurnRole, to_messages};
use crate::model::ChatModel;
use crate::store::Commit;
use crate::{ChatError, Message};

/// Default number of turns kept by [`BoundingPolicy::Trim`].
pub const DEFAULT_KEEP_LAST: usize = 10;

/// Default stored-history length that triggers [`BoundingPolicy::Summarize`].
pub const DEFAULT_SUMMARY_THRESHOLD: usize = 8;

/// How the history sent with each user turn is bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundingPolicy {
    /// Submit only the last `keep_last` turns (the incoming turn included).
    /// Stored history is never rewritten.
    Trim { keep_last: usize },
    /// Once the stored history holds `threshold` turns or more, replace it
    /// with a model-written summary plus the latest user turn.
    Summarize { threshold: usize },
}

impl Default for BoundingPolicy {
    fn default() -> Self {
        BoundingPolicy::Trim {
            keep_last: DEFAULT_KEEP_LAST,
        }
    }
}

impl BoundingPolicy {
    /// Reject limits that would make every submission empty or compact on
    /// every turn.
    pub fn validate(&self) -> Result<(), ChatError> {
        match *self {
            BoundingPolicy::Trim { keep_last: 0 } => {
                Err(ChatError::Config("trim keep_last must be at least 1".into()))
            }
            BoundingPolicy::Summarize { threshold: 0 } => Err(ChatError::Config(
                "summarize threshold must be at least 1".into(),
            )),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for BoundingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundingPolicy::Trim { keep_last } => {
                write!(f, "Trimmed Memory - Last {keep_last} messages")
            }
            BoundingPolicy::Summarize { threshold } => {
                write!(f, "Summarization Memory - Summarizes after {threshold} messages")
            }
        }
    }
}

/// Output of [`HistoryBounder::prepare`].
#[derive(Debug, Clone)]
pub struct Prepared {
    /// Turns to send for the reply. Always starts with the system turn.
    pub submission: Vec<Turn>,
    /// Stored turns to delete.
    pub deletions: Vec<TurnId>,
    /// Turns to append to the store, before the reply.
    pub additions: Vec<Turn>,
    /// The summary turn, when this turn compacted the history.
    pub summary: Option<Turn>,
}

impl Prepared {
    /// Whether the stored history is being replaced by a summary.
    pub fn compacted(&self) -> bool {
        self.summary.is_some()
    }

    /// The submission as API messages.
    pub fn messages(&self) -> Vec<Message> {
        to_messages(&self.submission)
    }

    /// Combine the history changes with the model's reply into one store
    /// transaction.
    pub fn into_commit(self, reply: Turn) -> Commit {
        let mut additions = self.additions;
        additions.push(reply);
        Commit {
            deletions: self.deletions,
            additions,
        }
    }
}

/// Applies a [`BoundingPolicy`] to a conversation for each incoming turn.
#[derive(Debug, Clone)]
pub struct HistoryBounder {
    system: Turn,
    policy: BoundingPolicy,
}

impl HistoryBounder {
    pub fn new(system_prompt: impl Into<String>, policy: BoundingPolicy) -> Result<Self, ChatError> {
        policy.validate()?;
        Ok(Self {
            system: Turn::system(system_prompt),
            policy,
        })
    }

    pub fn policy(&self) -> BoundingPolicy {
        self.policy
    }

    /// Work out the submission and store changes for `incoming`.
    ///
    /// `conversation` is the stored history of the thread and must not
    /// already contain `incoming`. Only the summarize policy calls `model`,
    /// and only when it compacts.
    pub async fn prepare(
        &self,
        model: &dyn ChatModel,
        conversation: &[Turn],
        incoming: Turn,
    ) -> Result<Prepared, ChatError> {
        if incoming.role != TurnRole::User {
            return Err(ChatError::InvalidTurn(format!(
                "incoming turn must be a user turn, got {}",
                incoming.role
            )));
        }
        if incoming.content.trim().is_empty() {
            return Err(ChatError::EmptyInput);
        }

        match self.policy {
            BoundingPolicy::Trim { keep_last } => {
                Ok(self.prepare_trimmed(conversation, incoming, keep_last))
            }
            BoundingPolicy::Summarize { threshold } => {
                self.prepare_summarized(model, conversation, incoming, threshold)
                    .await
            }
        }
    }

    fn prepare_trimmed(&self, conversation: &[Turn], incoming: Turn, keep: usize) -> Prepared {
        let mut working = conversation.to_vec();
        working.push(incoming.clone());

        let trimmed = keep_last(&working, keep);
        debug!(
            "Trim: {} working turn(s), submitting last {}",
            working.len(),
            trimmed.len()
        );

        let mut submission = Vec::with_capacity(trimmed.len() + 1);
        submission.push(self.system.clone());
        submission.extend_from_slice(trimmed);

        Prepared {
            submission,
            deletions: Vec::new(),
            additions: vec![incoming],
            summary: None,
        }
    }

    async fn prepare_summarized(
        &self,
        model: &dyn ChatModel,
        history: &[Turn],
        incoming: Turn,
        threshold: usize,
    ) -> Result<Prepared, ChatError> {
        if history.len() < threshold {
            debug!(
                "Summarize: {} stored turn(s) below threshold {threshold}",
                history.len()
            );
            let mut submission = Vec::with_capacity(history.len() + 2);
            submission.push(self.system.clone());
            submission.extend_from_slice(history);
            submission.push(incoming.clone());
            return Ok(Prepared {
                submission,
                deletions: Vec::new(),
                additions: vec![incoming],
                summary: None,
            });
        }

        let summary = summarize(model, history).await?;
        let carried = incoming.rematerialize();
        let deletions: Vec<TurnId> = history.iter().map(|t| t.id.clone()).collect();
        info!(
            "Compacting {} stored turn(s) into a {}-char summary",
            deletions.len(),
            summary.content.len()
        );

        Ok(Prepared {
            submission: vec![self.system.clone(), summary.clone(), carried.clone()],
            deletions,
            additions: vec![summary.clone(), carried],
            summary: Some(summary),
        })
    }
}
