//! Conversation history: the turn data model and the policies that bound it.
//!
//! - [`turn`]: [`Turn`], [`TurnId`], [`TurnRole`]. Turns are immutable;
//!   the store only ever appends or deletes them by id.
//! - [`trim`]: keep the last K turns.
//! - [`summarizer`]: condense a history into one summary turn with an LLM
//!   call.
//! - [`bounder`]: [`HistoryBounder`] applies a [`BoundingPolicy`] to each
//!   incoming user turn and returns a [`Prepared`] submission plus the store
//!   changes to commit.

pub mod bounder;
pub mod summarizer;
pub mod trim;
pub mod turn;

pub use bounder::{
    BoundingPolicy, DEFAULT_KEEP_LAST, DEFAULT_SUMMARY_THRESHOLD, HistoryBounder, Prepared,
};
pub use turn::{Turn, TurnId, TurnRole};
