#![forbid(unsafe_code)]

//! Structural journal snapshots.
//!
//! A snapshot captures the stack, the applied cursor, and any open
//! batches as a plain JSON-serializable structure; restoring one
//! reproduces the journal byte-for-byte. Target registration and hook
//! subscriptions are wiring, not history — collaborators re-register
//! after a restore.

use serde::{Deserialize, Serialize};

use crate::action::ActionKind;
use crate::batch::Batch;
use crate::journal::{Entry, Journal, JournalError};

/// Full structural snapshot of a [`Journal`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalSnapshot<K> {
    /// The full stack, applied prefix first.
    pub stack: Vec<Entry<K>>,
    /// Count of applied entries (`stack[..applied]` is current history).
    pub applied: usize,
    /// Batches that were open at capture time.
    pub open_batches: Vec<Batch<K>>,
}

impl<K: ActionKind> Journal<K> {
    /// Capture a snapshot of stack, cursor, and open batches.
    #[must_use]
    pub fn snapshot(&self) -> JournalSnapshot<K> {
        JournalSnapshot {
            stack: self.stack.clone(),
            applied: self.applied,
            open_batches: self.batches.clone(),
        }
    }

    /// Rebuild a journal from a snapshot.
    ///
    /// Fails with [`JournalError::InvalidSnapshot`] if the cursor lies
    /// outside the stack. The restored journal has no registered
    /// targets and no hooks; callers re-wire those.
    pub fn from_snapshot(snapshot: JournalSnapshot<K>) -> Result<Self, JournalError> {
        if snapshot.applied > snapshot.stack.len() {
            return Err(JournalError::InvalidSnapshot(format!(
                "applied cursor {} exceeds stack length {}",
                snapshot.applied,
                snapshot.stack.len()
            )));
        }
        let mut journal = Self::new();
        journal.stack = snapshot.stack;
        journal.applied = snapshot.applied;
        journal.next_batch_seq = snapshot.open_batches.len() as u64;
        journal.batches = snapshot.open_batches;
        Ok(journal)
    }
}
