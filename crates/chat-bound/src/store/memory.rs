//! In-memory thread store.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{Commit, ThreadStore, apply_commit, validate_thread_id};
use crate::ChatError;
use crate::history::Turn;

/// Threads held in a process-local map. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    threads: Mutex<HashMap<String, Vec<Turn>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ThreadStore for MemoryStore {
    fn load(&self, thread_id: &str) -> Result<Vec<Turn>, ChatError> {
        validate_thread_id(thread_id)?;
        let threads = self.threads.lock().unwrap_or_else(|e| e.into_inner());
        Ok(threads.get(thread_id).cloned().unwrap_or_default())
    }

    fn commit(&self, thread_id: &str, commit: &Commit) -> Result<(), ChatError> {
        validate_thread_id(thread_id)?;
        let mut threads = self.threads.lock().unwrap_or_else(|e| e.into_inner());
        let turns = threads.entry(thread_id.to_string()).or_default();
        apply_commit(turns, commit)
    }
}
