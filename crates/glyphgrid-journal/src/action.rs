#![forbid(unsafe_code)]

//! Actions, action kinds, and the handler table seam.
//!
//! An [`Action`] is one reversible, recorded mutation: a kind tag, a
//! `before`/`after` payload pair, and the id of the target it mutates.
//! Payloads are JSON values so the journal stays domain-agnostic and
//! snapshots round-trip exactly.
//!
//! # Design Notes
//!
//! Action kinds form a **closed enum** per application domain (the
//! [`ActionKind`] trait), dispatched through a compile-time
//! [`HandlerTable`] with an exhaustive match — there is no runtime
//! type→handler registry. Targets stay genuinely open-ended: the table
//! resolves them out of a context value `C` the caller passes at call
//! time, so the journal never stores a pointer to anything it does not
//! own.
//!
//! # Invariants
//!
//! - An [`Action`] is immutable once recorded.
//! - `table.apply(a)` followed by `table.revert(a)` restores the
//!   target's prior state exactly (handler contract).

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a mutable object actions are applied against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    /// Create a target id from a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The underlying name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a batch (open or already collapsed into a composite).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(String);

impl BatchId {
    /// Create a batch id from a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The underlying name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A domain's closed set of action kinds.
///
/// Implemented on a fieldless enum; `name()` supplies the stable label
/// used in logs and snapshots.
pub trait ActionKind:
    Copy + Eq + std::hash::Hash + fmt::Debug + Serialize + DeserializeOwned + 'static
{
    /// Stable, human-readable label for this kind.
    fn name(&self) -> &'static str;
}

/// One reversible, recorded mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action<K> {
    /// Which handler-table arm applies this action.
    pub kind: K,
    /// Target state before the mutation (JSON-shaped).
    pub before: Value,
    /// Target state after the mutation (JSON-shaped).
    pub after: Value,
    /// The object this action mutates.
    pub target: TargetId,
    /// Batch the action was recorded into, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<BatchId>,
}

impl<K> Action<K> {
    /// Create a new action.
    #[must_use]
    pub fn new(kind: K, target: TargetId, before: Value, after: Value) -> Self {
        Self {
            kind,
            before,
            after,
            target,
            batch: None,
        }
    }
}

/// Error raised by a handler while applying or reverting an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// The target id did not resolve in the handler context.
    TargetNotFound(TargetId),
    /// A payload failed to decode into the handler's expected shape.
    Payload(String),
    /// The target exists but is in a state the action cannot act on.
    InvalidState(String),
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetNotFound(id) => write!(f, "target '{id}' not found in handler context"),
            Self::Payload(msg) => write!(f, "payload decode failed: {msg}"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
        }
    }
}

impl std::error::Error for ApplyError {}

impl From<serde_json::Error> for ApplyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Payload(err.to_string())
    }
}

/// Compile-time handler table for a domain's action kinds.
///
/// One table instance serves every action of the domain; `C` is the
/// capability bundle the caller passes at call time (target arena,
/// surface store, metrics — whatever the domain's handlers need).
pub trait HandlerTable<K, C> {
    /// Whether this table can apply the given kind.
    ///
    /// Defaults to `true`; returning `false` surfaces
    /// [`MissingHandler`](crate::JournalError::MissingHandler) at the
    /// journal boundary.
    fn handles(&self, kind: K) -> bool {
        let _ = kind;
        true
    }

    /// Apply the action's `after` state to its target.
    fn apply(&self, action: &Action<K>, ctx: &mut C) -> Result<(), ApplyError>;

    /// Restore the action's `before` state on its target.
    fn revert(&self, action: &Action<K>, ctx: &mut C) -> Result<(), ApplyError>;
}
