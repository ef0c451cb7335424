//! File-backed thread store.
//!
//! Each thread lives in `{dir}/{thread_id}.json`. A commit reads the file,
//! applies the changes in memory, writes the result to a temp file and
//! renames it into place, so readers see either the old or the new thread
//! and never a half-applied compaction.

use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Commit, ThreadStore, apply_commit, validate_thread_id};
use crate::ChatError;
use crate::history::Turn;

/// On-disk representation of one thread.
#[derive(Serialize, Deserialize, Debug)]
struct ThreadFile {
    thread_id: String,
    /// RFC 3339 time of the last commit.
    updated_at: String,
    turns: Vec<Turn>,
}

/// Threads stored as JSON files under one directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ChatError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn thread_path(&self, thread_id: &str) -> PathBuf {
        self.dir.join(format!("{thread_id}.json"))
    }

    fn read_thread(&self, thread_id: &str) -> Result<Vec<Turn>, ChatError> {
        let path = self.thread_path(thread_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = std::fs::read_to_string(&path)?;
        let file: ThreadFile = serde_json::from_str(&json).map_err(|e| {
            ChatError::Store(format!("failed to parse {}: {e}", path.display()))
        })?;
        Ok(file.turns)
    }

    fn write_thread(&self, thread_id: &str, turns: Vec<Turn>) -> Result<(), ChatError> {
        let final_path = self.thread_path(thread_id);
        let tmp_path = self.dir.join(format!(".{thread_id}.json.tmp"));

        let file = ThreadFile {
            thread_id: thread_id.to_string(),
            updated_at: Utc::now().to_rfc3339(),
            turns,
        };
        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }
}

impl ThreadStore for FileStore {
    fn load(&self, thread_id: &str) -> Result<Vec<Turn>, ChatError> {
        validate_thread_id(thread_id)?;
        self.read_thread(thread_id)
    }

    fn commit(&self, thread_id: &str, commit: &Commit) -> Result<(), ChatError> {
        validate_thread_id(thread_id)?;
        let mut turns = self.read_thread(thread_id)?;
        apply_commit(&mut turns, commit)?;
        debug!(
            "Committing thread {thread_id}: -{} +{} -> {} turn(s)",
            commit.deletions.len(),
            commit.additions.len(),
            turns.len()
        );
        self.write_thread(thread_id, turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn append(turns: Vec<Turn>) -> Commit {
        Commit {
            deletions: vec![],
            additions: turns,
        }
    }

    #[test]
    fn missing_thread_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert!(store.load("3").unwrap().is_empty());
    }

    #[test]
    fn commits_survive_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let user = Turn::user("hello");
        let reply = Turn::assistant("hi!");
        {
            let store = FileStore::new(dir.path()).unwrap();
            store
                .commit("3", &append(vec![user.clone(), reply.clone()]))
                .unwrap();
        }
        let reopened = FileStore::new(dir.path()).unwrap();
        assert_eq!(reopened.load("3").unwrap(), vec![user, reply]);
    }

    #[test]
    fn compaction_commit_replaces_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        let old = vec![Turn::user("a"), Turn::assistant("b")];
        store.commit("t", &append(old.clone())).unwrap();

        let summary = Turn::summary("a then b");
        let carried = Turn::user("c");
        let reply = Turn::assistant("d");
        store
            .commit(
                "t",
                &Commit {
                    deletions: old.iter().map(|t| t.id.clone()).collect(),
                    additions: vec![summary.clone(), carried.clone(), reply.clone()],
                },
            )
            .unwrap();

        assert_eq!(store.load("t").unwrap(), vec![summary, carried, reply]);
        assert!(!dir.path().join(".t.json.tmp").exists());
    }

    #[test]
    fn failed_commit_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        let first = Turn::user("a");
        store.commit("t", &append(vec![first.clone()])).unwrap();
        let before = std::fs::read_to_string(dir.path().join("t.json")).unwrap();

        let bad = Commit {
            deletions: vec!["ghost".into()],
            additions: vec![Turn::summary("s")],
        };
        assert!(store.commit("t", &bad).is_err());

        let after = std::fs::read_to_string(dir.path().join("t.json")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn corrupt_file_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert!(matches!(store.load("bad"), Err(ChatError::Store(_))));
    }

    #[test]
    fn path_traversal_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert!(matches!(
            store.commit("../escape", &Commit::default()),
            Err(ChatError::InvalidThreadId(_))
        ));
    }
}
