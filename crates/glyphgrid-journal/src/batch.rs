#![forbid(unsafe_code)]

//! Batches: named, filterable action queues.
//!
//! A batch accumulates actions matching its optional filter while a
//! multi-step gesture runs, then collapses into a single composite
//! stack entry on commit so one undo reverts the whole gesture.
//!
//! # Invariants
//!
//! 1. A batch only ever contains actions its filter accepted.
//! 2. Member actions are kept in recorded order; commit replays them in
//!    that order and undo replays them reversed.
//! 3. An empty batch never produces a stack entry.

use serde::{Deserialize, Serialize};

use crate::action::{Action, BatchId, TargetId};

/// Optional constraints on which actions a batch accepts.
// The explicit bound keeps `default` on the optional fields from
// dragging a `K: Default` requirement into the derived impl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "K: serde::Deserialize<'de>"))]
pub struct BatchFilter<K> {
    /// Accept only actions against this target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetId>,
    /// Accept only actions of this kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<K>,
}

// Manual impl: a derived Default would demand `K: Default`.
impl<K> Default for BatchFilter<K> {
    fn default() -> Self {
        Self {
            target: None,
            kind: None,
        }
    }
}

impl<K: PartialEq> BatchFilter<K> {
    /// Whether an action satisfies the filter.
    #[must_use]
    pub fn matches(&self, action: &Action<K>) -> bool {
        if let Some(target) = &self.target
            && *target != action.target
        {
            return false;
        }
        if let Some(kind) = &self.kind
            && *kind != action.kind
        {
            return false;
        }
        true
    }
}

/// Configuration for opening a batch.
#[derive(Debug, Clone)]
pub struct BatchConfig<K> {
    /// Explicit id; auto-generated when `None`.
    pub id: Option<BatchId>,
    /// Filter the batch applies to incoming actions.
    pub filter: BatchFilter<K>,
}

impl<K> Default for BatchConfig<K> {
    fn default() -> Self {
        Self {
            id: None,
            filter: BatchFilter::default(),
        }
    }
}

impl<K> BatchConfig<K> {
    /// Configuration with an explicit id and no filter constraints.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(BatchId::new(id)),
            filter: BatchFilter::default(),
        }
    }
}

/// An open batch: id, filter, and accumulated actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch<K> {
    /// The batch's id.
    pub id: BatchId,
    /// Filter incoming actions must satisfy.
    pub filter: BatchFilter<K>,
    /// Accumulated actions in recorded order.
    pub actions: Vec<Action<K>>,
}

impl<K> Batch<K> {
    /// Open a new, empty batch.
    #[must_use]
    pub fn new(id: BatchId, filter: BatchFilter<K>) -> Self {
        Self {
            id,
            filter,
            actions: Vec::new(),
        }
    }

    /// Number of accumulated actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the batch has accumulated nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    enum Kind {
        A,
        B,
    }

    fn action(kind: Kind, target: &str) -> Action<Kind> {
        Action::new(kind, TargetId::new(target), json!(null), json!(null))
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = BatchFilter::<Kind>::default();
        assert!(filter.matches(&action(Kind::A, "x")));
        assert!(filter.matches(&action(Kind::B, "y")));
    }

    #[test]
    fn test_target_filter() {
        let filter = BatchFilter {
            target: Some(TargetId::new("x")),
            kind: None,
        };
        assert!(filter.matches(&action(Kind::A, "x")));
        assert!(!filter.matches(&action(Kind::A, "y")));
    }

    #[test]
    fn test_kind_filter() {
        let filter = BatchFilter {
            target: None,
            kind: Some(Kind::A),
        };
        assert!(filter.matches(&action(Kind::A, "x")));
        assert!(!filter.matches(&action(Kind::B, "x")));
    }

    #[test]
    fn test_combined_filter_requires_both() {
        let filter = BatchFilter {
            target: Some(TargetId::new("x")),
            kind: Some(Kind::A),
        };
        assert!(filter.matches(&action(Kind::A, "x")));
        assert!(!filter.matches(&action(Kind::B, "x")));
        assert!(!filter.matches(&action(Kind::A, "y")));
    }

    #[test]
    fn test_batch_serde_without_default_kind() {
        // `Kind` implements no `Default`; the filter's optional fields
        // must still deserialize, present or absent.
        let filter: BatchFilter<Kind> = serde_json::from_str("{}").unwrap();
        assert_eq!(filter, BatchFilter::default());

        let mut batch = Batch::new(BatchId::new("b"), BatchFilter::<Kind>::default());
        batch.actions.push(action(Kind::A, "x"));
        let json = serde_json::to_string(&batch).unwrap();
        let back: Batch<Kind> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, batch);
    }

    #[test]
    fn test_batch_accumulates_in_order() {
        let mut batch = Batch::new(BatchId::new("b"), BatchFilter::<Kind>::default());
        assert!(batch.is_empty());
        batch.actions.push(action(Kind::A, "x"));
        batch.actions.push(action(Kind::B, "x"));
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.actions[0].kind, Kind::A);
    }
}
