#![forbid(unsafe_code)]

//! The action journal: a linear, truncating undo/redo stack.
//!
//! # Architecture
//!
//! ```text
//! apply(a4)
//! ┌───────────────────────────────────────────────┐
//! │ Stack:   [a1, a2, a3, a4]                     │
//! │ Applied:  ^^^^^^^^^^^^^^^  (applied = 4)      │
//! └───────────────────────────────────────────────┘
//!
//! undo() x2
//! ┌───────────────────────────────────────────────┐
//! │ Stack:   [a1, a2, a3, a4]                     │
//! │ Applied:  ^^^^^^          (applied = 2)       │
//! └───────────────────────────────────────────────┘
//!
//! apply(a5) — branch discard, tail is gone
//! ┌───────────────────────────────────────────────┐
//! │ Stack:   [a1, a2, a5]                         │
//! │ Applied:  ^^^^^^^^^^      (applied = 3)       │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! `applied` counts the applied prefix of the stack (the spec-level
//! `currentIndex + 1`); `stack[..applied]` is the current history.
//!
//! # Invariants
//!
//! 1. `applied <= stack.len()` after every operation.
//! 2. Pushing while `applied < stack.len()` truncates the undone tail;
//!    branch history is never kept.
//! 3. An empty committed batch leaves the stack untouched.
//! 4. `undo`/`redo` at the boundary are silent no-ops, never errors.
//! 5. While `applying` is set, incoming `apply_action` calls are
//!    ignored rather than corrupting the stack.
//!
//! # Failure Modes
//!
//! - **Handler failure mid-composite**: already-applied members are
//!   rolled back in reverse order and the error is propagated; the
//!   stack is unchanged.
//! - **Dangling replay**: prevented up front — `remove_target` refuses
//!   while any stack entry or open batch still references the id.

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionKind, ApplyError, BatchId, HandlerTable, TargetId};
use crate::batch::{Batch, BatchConfig};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced at the journal boundary.
///
/// All of these indicate a wiring bug in a collaborator, not a
/// transient condition; none are retried internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalError {
    /// The handler table declines the action's kind.
    MissingHandler(&'static str),
    /// The action's target id was never registered (or already removed).
    MissingTarget(TargetId),
    /// `begin_batch` was given an id that is already open.
    DuplicateBatch(BatchId),
    /// `commit_batch`/`cancel_batch` named a batch that is not open.
    UnknownBatch(BatchId),
    /// Attempt to unregister a target still referenced by history or an
    /// open batch.
    InUseRemoval(TargetId),
    /// A handler failed while applying or reverting.
    Apply(ApplyError),
    /// A snapshot failed structural validation.
    InvalidSnapshot(String),
}

impl fmt::Display for JournalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHandler(kind) => write!(f, "no handler for action kind '{kind}'"),
            Self::MissingTarget(id) => write!(f, "target '{id}' is not registered"),
            Self::DuplicateBatch(id) => write!(f, "batch '{id}' is already open"),
            Self::UnknownBatch(id) => write!(f, "batch '{id}' is not open"),
            Self::InUseRemoval(id) => {
                write!(f, "target '{id}' is still referenced by history or an open batch")
            }
            Self::Apply(err) => write!(f, "handler failed: {err}"),
            Self::InvalidSnapshot(msg) => write!(f, "invalid journal snapshot: {msg}"),
        }
    }
}

impl std::error::Error for JournalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Apply(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApplyError> for JournalError {
    fn from(err: ApplyError) -> Self {
        Self::Apply(err)
    }
}

// ---------------------------------------------------------------------------
// Entries and hooks
// ---------------------------------------------------------------------------

/// One stack entry: a single action or a collapsed batch.
///
/// Composites are a first-class variant — the journal itself replays
/// members forward on apply/redo and reversed on undo, each through
/// its own handler-table arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum Entry<K> {
    /// A single recorded action.
    Single(Action<K>),
    /// A committed batch, undone and redone as one unit.
    Composite {
        /// Id of the batch this entry was collapsed from.
        batch: BatchId,
        /// Member actions in recorded order.
        actions: Vec<Action<K>>,
    },
}

impl<K: ActionKind> Entry<K> {
    /// Label for logs and history UIs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Single(action) => action.kind.name(),
            Self::Composite { .. } => "composite",
        }
    }

    fn references_target(&self, id: &TargetId) -> bool {
        match self {
            Self::Single(action) => action.target == *id,
            Self::Composite { actions, .. } => actions.iter().any(|a| a.target == *id),
        }
    }
}

/// Points in the journal lifecycle hooks can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    /// Before an action or composite is applied and pushed.
    BeforeApply,
    /// After an action or composite was applied and pushed.
    AfterApply,
    /// Before an undo runs.
    BeforeUndo,
    /// After an undo ran.
    AfterUndo,
    /// Before a redo runs.
    BeforeRedo,
    /// After a redo ran.
    AfterRedo,
}

/// Handle for unsubscribing a hook callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookId(u64);

type HookFn = Box<dyn FnMut(HookPoint)>;

struct HookSubscriber {
    id: HookId,
    point: HookPoint,
    callback: HookFn,
}

/// Outcome of [`Journal::apply_action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Applied (or recorded) and pushed onto the stack.
    Pushed,
    /// Enqueued into an open batch; the stack is untouched.
    Batched,
    /// Ignored because an undo/redo was unwinding.
    Ignored,
}

/// Options for [`Journal::apply_action`].
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Route the action into this open batch if its filter matches.
    pub batch: Option<BatchId>,
    /// The caller already mutated the target; record without applying.
    pub record_only: bool,
}

impl ApplyOptions {
    /// Record an already-performed mutation without re-applying it.
    #[must_use]
    pub fn record_only() -> Self {
        Self {
            batch: None,
            record_only: true,
        }
    }

    /// Route into an open batch.
    #[must_use]
    pub fn into_batch(id: BatchId) -> Self {
        Self {
            batch: Some(id),
            record_only: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

/// Linear, truncating undo/redo stack with batching.
///
/// Generic over the domain's closed action-kind enum `K`. Handler
/// tables and target contexts are passed at call time, never stored.
pub struct Journal<K> {
    pub(crate) stack: Vec<Entry<K>>,
    pub(crate) applied: usize,
    pub(crate) batches: Vec<Batch<K>>,
    pub(crate) next_batch_seq: u64,
    targets: FxHashSet<TargetId>,
    applying: bool,
    hooks: Vec<HookSubscriber>,
    next_hook_id: u64,
}

impl<K> fmt::Debug for Journal<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Journal")
            .field("stack_len", &self.stack.len())
            .field("applied", &self.applied)
            .field("open_batches", &self.batches.len())
            .field("targets", &self.targets.len())
            .field("applying", &self.applying)
            .finish()
    }
}

impl<K> Default for Journal<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Journal<K> {
    /// Create an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            applied: 0,
            batches: Vec::new(),
            next_batch_seq: 0,
            targets: FxHashSet::default(),
            applying: false,
            hooks: Vec::new(),
            next_hook_id: 0,
        }
    }

    /// Number of entries in the current history (applied prefix).
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.applied
    }

    /// Total stack length including the undone tail.
    #[must_use]
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// Whether an undo would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    /// Whether a redo would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.applied < self.stack.len()
    }

    /// Number of currently open batches.
    #[must_use]
    pub fn open_batches(&self) -> usize {
        self.batches.len()
    }

    /// Drop all history and open batches. Registered targets survive.
    pub fn clear(&mut self) {
        self.stack.clear();
        self.applied = 0;
        self.batches.clear();
    }

    // ------------------------------------------------------------------
    // Target registration
    // ------------------------------------------------------------------

    /// Register a target id. Idempotent.
    ///
    /// Target *objects* live with the caller and are resolved through
    /// the handler context; the journal only validates that actions
    /// name a registered id.
    pub fn register_target(&mut self, id: TargetId) {
        self.targets.insert(id);
    }

    /// Whether a target id is registered.
    #[must_use]
    pub fn has_target(&self, id: &TargetId) -> bool {
        self.targets.contains(id)
    }

    /// Subscribe a callback to a lifecycle hook point.
    pub fn subscribe_hook(
        &mut self,
        point: HookPoint,
        callback: impl FnMut(HookPoint) + 'static,
    ) -> HookId {
        let id = HookId(self.next_hook_id);
        self.next_hook_id += 1;
        self.hooks.push(HookSubscriber {
            id,
            point,
            callback: Box::new(callback),
        });
        id
    }

    /// Remove a hook subscription. Returns whether it existed.
    pub fn unsubscribe_hook(&mut self, id: HookId) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|sub| sub.id != id);
        self.hooks.len() != before
    }

    fn fire(&mut self, point: HookPoint) {
        for sub in &mut self.hooks {
            if sub.point == point {
                (sub.callback)(point);
            }
        }
    }
}

impl<K: ActionKind> Journal<K> {
    /// Unregister a target id.
    ///
    /// Fails with [`JournalError::InUseRemoval`] while any stack entry
    /// or open batch still references the id — a removed target could
    /// otherwise dangle into a later replay. Unknown ids are a no-op.
    pub fn remove_target(&mut self, id: &TargetId) -> Result<(), JournalError> {
        if !self.targets.contains(id) {
            return Ok(());
        }
        let referenced = self.stack.iter().any(|e| e.references_target(id))
            || self
                .batches
                .iter()
                .any(|b| b.actions.iter().any(|a| a.target == *id));
        if referenced {
            return Err(JournalError::InUseRemoval(id.clone()));
        }
        self.targets.remove(id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Applying
    // ------------------------------------------------------------------

    /// Record (and unless deferred, apply) an action.
    ///
    /// If `opts.batch` names an open batch whose filter matches, the
    /// action is enqueued there and nothing touches the stack or the
    /// target. Otherwise the handler applies the action (skipped when
    /// `opts.record_only` — the caller already mutated the target),
    /// the undone tail is discarded, and the action is pushed.
    pub fn apply_action<C>(
        &mut self,
        mut action: Action<K>,
        opts: ApplyOptions,
        table: &impl HandlerTable<K, C>,
        ctx: &mut C,
    ) -> Result<Applied, JournalError> {
        if self.applying {
            tracing::debug!(kind = action.kind.name(), "apply ignored while unwinding");
            return Ok(Applied::Ignored);
        }
        if !table.handles(action.kind) {
            return Err(JournalError::MissingHandler(action.kind.name()));
        }
        if !self.targets.contains(&action.target) {
            return Err(JournalError::MissingTarget(action.target.clone()));
        }

        if let Some(batch_id) = &opts.batch
            && let Some(batch) = self.batches.iter_mut().find(|b| b.id == *batch_id)
            && batch.filter.matches(&action)
        {
            action.batch = Some(batch_id.clone());
            tracing::debug!(
                kind = action.kind.name(),
                batch = %batch_id,
                "action enqueued into batch"
            );
            batch.actions.push(action);
            return Ok(Applied::Batched);
        }

        self.fire(HookPoint::BeforeApply);
        if !opts.record_only {
            table.apply(&action, ctx)?;
        }
        self.push_entry(Entry::Single(action));
        self.fire(HookPoint::AfterApply);
        Ok(Applied::Pushed)
    }

    fn push_entry(&mut self, entry: Entry<K>) {
        if self.applied < self.stack.len() {
            tracing::debug!(
                discarded = self.stack.len() - self.applied,
                "discarding undone tail"
            );
            self.stack.truncate(self.applied);
        }
        tracing::debug!(label = entry.label(), "journal push");
        self.stack.push(entry);
        self.applied += 1;
    }

    // ------------------------------------------------------------------
    // Batches
    // ------------------------------------------------------------------

    /// Open a batch, returning its id.
    pub fn begin_batch(&mut self, config: BatchConfig<K>) -> Result<BatchId, JournalError> {
        let id = match config.id {
            Some(id) => {
                if self.batches.iter().any(|b| b.id == id) {
                    return Err(JournalError::DuplicateBatch(id));
                }
                id
            }
            None => loop {
                let candidate = BatchId::new(format!("batch-{}", self.next_batch_seq));
                self.next_batch_seq += 1;
                if !self.batches.iter().any(|b| b.id == candidate) {
                    break candidate;
                }
            },
        };
        tracing::debug!(batch = %id, "batch opened");
        self.batches.push(Batch::new(id.clone(), config.filter));
        Ok(id)
    }

    /// Commit a batch: apply members in recorded order, collapse into
    /// one composite stack entry.
    ///
    /// An empty batch is silently discarded without a journal entry.
    /// If a member fails to apply, already-applied members are rolled
    /// back in reverse order and the error is propagated; the batch is
    /// gone either way.
    pub fn commit_batch<C>(
        &mut self,
        id: &BatchId,
        table: &impl HandlerTable<K, C>,
        ctx: &mut C,
    ) -> Result<(), JournalError> {
        let pos = self
            .batches
            .iter()
            .position(|b| b.id == *id)
            .ok_or_else(|| JournalError::UnknownBatch(id.clone()))?;
        let batch = self.batches.remove(pos);
        if batch.is_empty() {
            tracing::debug!(batch = %id, "empty batch discarded");
            return Ok(());
        }

        self.fire(HookPoint::BeforeApply);
        for (i, action) in batch.actions.iter().enumerate() {
            if let Err(err) = table.apply(action, ctx) {
                for done in batch.actions[..i].iter().rev() {
                    if let Err(revert_err) = table.revert(done, ctx) {
                        tracing::warn!(
                            kind = done.kind.name(),
                            error = %revert_err,
                            "rollback failed while aborting batch commit"
                        );
                    }
                }
                return Err(err.into());
            }
        }
        tracing::debug!(batch = %id, members = batch.actions.len(), "batch committed");
        self.push_entry(Entry::Composite {
            batch: batch.id,
            actions: batch.actions,
        });
        self.fire(HookPoint::AfterApply);
        Ok(())
    }

    /// Discard a batch without applying or journaling anything.
    pub fn cancel_batch(&mut self, id: &BatchId) -> Result<(), JournalError> {
        let pos = self
            .batches
            .iter()
            .position(|b| b.id == *id)
            .ok_or_else(|| JournalError::UnknownBatch(id.clone()))?;
        let batch = self.batches.remove(pos);
        tracing::debug!(batch = %id, discarded = batch.len(), "batch cancelled");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Undo / redo
    // ------------------------------------------------------------------

    /// Undo the most recent applied entry.
    ///
    /// Returns `Ok(false)` (a silent no-op) at the stack boundary —
    /// repeatedly pressing undo is a normal condition, not an error.
    pub fn undo<C>(
        &mut self,
        table: &impl HandlerTable<K, C>,
        ctx: &mut C,
    ) -> Result<bool, JournalError> {
        if self.applying || self.applied == 0 {
            return Ok(false);
        }
        self.fire(HookPoint::BeforeUndo);
        self.applying = true;
        let result = Self::revert_entry(&self.stack[self.applied - 1], table, ctx);
        self.applying = false;
        result?;
        self.applied -= 1;
        tracing::debug!(applied = self.applied, "undo");
        self.fire(HookPoint::AfterUndo);
        Ok(true)
    }

    /// Redo the most recently undone entry.
    ///
    /// Symmetric to [`undo`](Self::undo); a silent no-op at the end of
    /// the stack.
    pub fn redo<C>(
        &mut self,
        table: &impl HandlerTable<K, C>,
        ctx: &mut C,
    ) -> Result<bool, JournalError> {
        if self.applying || self.applied == self.stack.len() {
            return Ok(false);
        }
        self.fire(HookPoint::BeforeRedo);
        self.applying = true;
        let result = Self::apply_entry(&self.stack[self.applied], table, ctx);
        self.applying = false;
        result?;
        self.applied += 1;
        tracing::debug!(applied = self.applied, "redo");
        self.fire(HookPoint::AfterRedo);
        Ok(true)
    }

    /// Label of the entry the next undo would revert.
    #[must_use]
    pub fn next_undo_label(&self) -> Option<&'static str> {
        self.applied
            .checked_sub(1)
            .map(|i| self.stack[i].label())
    }

    /// Label of the entry the next redo would apply.
    #[must_use]
    pub fn next_redo_label(&self) -> Option<&'static str> {
        self.stack.get(self.applied).map(Entry::label)
    }

    fn apply_entry<C>(
        entry: &Entry<K>,
        table: &impl HandlerTable<K, C>,
        ctx: &mut C,
    ) -> Result<(), JournalError> {
        match entry {
            Entry::Single(action) => table.apply(action, ctx)?,
            Entry::Composite { actions, .. } => {
                for action in actions {
                    table.apply(action, ctx)?;
                }
            }
        }
        Ok(())
    }

    fn revert_entry<C>(
        entry: &Entry<K>,
        table: &impl HandlerTable<K, C>,
        ctx: &mut C,
    ) -> Result<(), JournalError> {
        match entry {
            Entry::Single(action) => table.revert(action, ctx)?,
            Entry::Composite { actions, .. } => {
                for action in actions.iter().rev() {
                    table.revert(action, ctx)?;
                }
            }
        }
        Ok(())
    }
}
