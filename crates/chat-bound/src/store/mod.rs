//! Persistence of conversation threads.
//!
//! A [`ThreadStore`] keeps one ordered list of [`Turn`]s per thread id and
//! changes it only through [`ThreadStore::commit`], which applies a
//! [`Commit`] (deletions by id, then appends) as one transaction. A
//! compaction therefore never leaves a thread with its old turns deleted but
//! the summary missing.
//!
//! - [`MemoryStore`]: process-local map, gone on exit.
//! - [`FileStore`]: one JSON file per thread, replaced atomically.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::collections::HashSet;

use crate::ChatError;
use crate::history::{Turn, TurnId};

/// Changes to one thread, applied together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    /// Ids of stored turns to remove.
    pub deletions: Vec<TurnId>,
    /// Turns to append, in order, after the deletions.
    pub additions: Vec<Turn>,
}

/// Keyed storage of conversation threads.
pub trait ThreadStore: Send + Sync {
    /// The stored turns of `thread_id`, oldest first. Unknown threads are
    /// empty.
    fn load(&self, thread_id: &str) -> Result<Vec<Turn>, ChatError>;

    /// Apply `commit` to `thread_id` atomically: either every deletion and
    /// addition takes effect or none does.
    fn commit(&self, thread_id: &str, commit: &Commit) -> Result<(), ChatError>;
}

/// Check that a thread id is non-empty and limited to `[A-Za-z0-9_-]`, so
/// it can double as a file name.
pub fn validate_thread_id(thread_id: &str) -> Result<(), ChatError> {
    let valid = !thread_id.is_empty()
        && thread_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ChatError::InvalidThreadId(thread_id.to_string()))
    }
}

/// Apply `commit` to `turns`. Validates everything first and leaves `turns`
/// untouched on error.
pub(crate) fn apply_commit(turns: &mut Vec<Turn>, commit: &Commit) -> Result<(), ChatError> {
    let stored: HashSet<&TurnId> = turns.iter().map(|t| &t.id).collect();
    if let Some(missing) = commit.deletions.iter().find(|id| !stored.contains(id)) {
        return Err(ChatError::Store(format!("cannot delete unknown turn {missing}")));
    }

    let deleted: HashSet<&TurnId> = commit.deletions.iter().collect();
    let mut remaining: HashSet<&TurnId> = stored.difference(&deleted).copied().collect();
    for turn in &commit.additions {
        if !remaining.insert(&turn.id) {
            return Err(ChatError::Store(format!("duplicate turn id {}", turn.id)));
        }
    }

    turns.retain(|t| !deleted.contains(&t.id));
    turns.extend(commit.additions.iter().cloned());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_id_validation() {
        assert!(validate_thread_id("3").is_ok());
        assert!(validate_thread_id("therapy_session-2").is_ok());
        assert!(validate_thread_id("").is_err());
        assert!(validate_thread_id("../etc").is_err());
        assert!(validate_thread_id("a b").is_err());
    }

    #[test]
    fn apply_commit_deletes_then_appends() {
        let a = Turn::user("a");
        let b = Turn::assistant("b");
        let c = Turn::user("c");
        let mut turns = vec![a.clone(), b.clone()];

        apply_commit(
            &mut turns,
            &Commit {
                deletions: vec![a.id.clone()],
                additions: vec![c.clone()],
            },
        )
        .unwrap();

        assert_eq!(turns, vec![b, c]);
    }

    #[test]
    fn unknown_deletion_leaves_turns_untouched() {
        let a = Turn::user("a");
        let mut turns = vec![a.clone()];
        let err = apply_commit(
            &mut turns,
            &Commit {
                deletions: vec![a.id.clone(), TurnId::from("nope")],
                additions: vec![Turn::summary("s")],
            },
        )
        .unwrap_err();
        assert!(matches!(err, ChatError::Store(_)));
        assert_eq!(turns, vec![a]);
    }

    #[test]
    fn duplicate_addition_is_rejected() {
        let a = Turn::user("a");
        let mut turns = vec![a.clone()];
        let result = apply_commit(
            &mut turns,
            &Commit {
                deletions: vec![],
                additions: vec![a.clone()],
            },
        );
        assert!(result.is_err());
        assert_eq!(turns.len(), 1);
    }

    #[test]
    fn re_adding_a_deleted_id_is_allowed() {
        let a = Turn::user("a");
        let mut turns = vec![a.clone()];
        apply_commit(
            &mut turns,
            &Commit {
                deletions: vec![a.id.clone()],
                additions: vec![a.clone()],
            },
        )
        .unwrap();
        assert_eq!(turns, vec![a]);
    }
}
