//! Property-based invariant tests for the action journal.
//!
//! These tests verify the journal's structural invariants:
//!
//! 1. Undoing the whole history then redoing it reproduces the exact
//!    target state (byte-equal serialized context)
//! 2. Applying after an undo discards the tail: redo is a no-op
//! 3. The applied cursor never exceeds the stack length
//! 4. A committed batch is one entry; an empty batch is none
//! 5. No panics on arbitrary operation sequences

use std::collections::BTreeMap;

use glyphgrid_journal::{
    Action, ActionKind, Applied, ApplyError, ApplyOptions, BatchConfig, HandlerTable, Journal,
    TargetId,
};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;

// ── Model ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
enum Kind {
    Set,
}

impl ActionKind for Kind {
    fn name(&self) -> &'static str {
        "set"
    }
}

/// Target arena: one integer register per target name.
type Registers = BTreeMap<String, i64>;

struct Table;

impl HandlerTable<Kind, Registers> for Table {
    fn apply(&self, action: &Action<Kind>, ctx: &mut Registers) -> Result<(), ApplyError> {
        let value: i64 = serde_json::from_value(action.after.clone())?;
        ctx.insert(action.target.as_str().to_string(), value);
        Ok(())
    }

    fn revert(&self, action: &Action<Kind>, ctx: &mut Registers) -> Result<(), ApplyError> {
        let value: i64 = serde_json::from_value(action.before.clone())?;
        ctx.insert(action.target.as_str().to_string(), value);
        Ok(())
    }
}

const TARGETS: &[&str] = &["a", "b", "c"];

/// Operations driven against the journal.
#[derive(Debug, Clone)]
enum Op {
    Apply { target: usize, value: i64 },
    Undo,
    Redo,
    /// Open a batch, enqueue the given values, then commit it.
    Batch { target: usize, values: Vec<i64> },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0usize..TARGETS.len(), any::<i64>()).prop_map(|(target, value)| Op::Apply {
            target,
            value
        }),
        2 => Just(Op::Undo),
        2 => Just(Op::Redo),
        1 => (0usize..TARGETS.len(), prop::collection::vec(any::<i64>(), 0..4))
            .prop_map(|(target, values)| Op::Batch { target, values }),
    ]
}

fn new_journal() -> Journal<Kind> {
    let mut journal = Journal::new();
    for name in TARGETS {
        journal.register_target(TargetId::new(*name));
    }
    journal
}

/// Build a truthful action: `before` read from the live registers.
fn set_action(ctx: &Registers, target: usize, value: i64) -> Action<Kind> {
    let name = TARGETS[target];
    let before = ctx.get(name).copied().unwrap_or(0);
    Action::new(Kind::Set, TargetId::new(name), json!(before), json!(value))
}

fn drive(journal: &mut Journal<Kind>, ctx: &mut Registers, ops: &[Op]) {
    for op in ops {
        match op {
            Op::Apply { target, value } => {
                let action = set_action(ctx, *target, *value);
                journal
                    .apply_action(action, ApplyOptions::default(), &Table, ctx)
                    .unwrap();
            }
            Op::Undo => {
                journal.undo(&Table, ctx).unwrap();
            }
            Op::Redo => {
                journal.redo(&Table, ctx).unwrap();
            }
            Op::Batch { target, values } => {
                let id = journal.begin_batch(BatchConfig::default()).unwrap();
                let mut shadow = ctx.get(TARGETS[*target]).copied().unwrap_or(0);
                for value in values {
                    // Batched actions defer their mutation to commit, so
                    // `before` chains off the previous member, not the
                    // live register.
                    let action = Action::new(
                        Kind::Set,
                        TargetId::new(TARGETS[*target]),
                        json!(shadow),
                        json!(*value),
                    );
                    shadow = *value;
                    let applied = journal
                        .apply_action(action, ApplyOptions::into_batch(id.clone()), &Table, ctx)
                        .unwrap();
                    assert_eq!(applied, Applied::Batched);
                }
                journal.commit_batch(&id, &Table, ctx).unwrap();
            }
        }
        assert!(
            journal.history_len() <= journal.stack_len(),
            "cursor escaped the stack"
        );
    }
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn undo_all_redo_all_round_trips(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut journal = new_journal();
        let mut ctx = Registers::new();
        drive(&mut journal, &mut ctx, &ops);

        let end_state = serde_json::to_string(&ctx).unwrap();
        let depth = journal.history_len();

        for _ in 0..depth {
            prop_assert!(journal.undo(&Table, &mut ctx).unwrap());
        }
        prop_assert!(!journal.undo(&Table, &mut ctx).unwrap());

        for _ in 0..depth {
            prop_assert!(journal.redo(&Table, &mut ctx).unwrap());
        }
        prop_assert_eq!(serde_json::to_string(&ctx).unwrap(), end_state);
    }

    #[test]
    fn apply_after_undo_discards_tail(
        ops in prop::collection::vec(op_strategy(), 1..30),
        undo_steps in 0usize..10,
        value in any::<i64>(),
    ) {
        let mut journal = new_journal();
        let mut ctx = Registers::new();
        drive(&mut journal, &mut ctx, &ops);

        for _ in 0..undo_steps {
            journal.undo(&Table, &mut ctx).unwrap();
        }
        let action = set_action(&ctx, 0, value);
        journal
            .apply_action(action, ApplyOptions::default(), &Table, &mut ctx)
            .unwrap();

        prop_assert!(!journal.can_redo());
        prop_assert!(!journal.redo(&Table, &mut ctx).unwrap());
        prop_assert_eq!(journal.history_len(), journal.stack_len());
    }

    #[test]
    fn committed_batch_is_single_entry(
        target in 0usize..TARGETS.len(),
        values in prop::collection::vec(any::<i64>(), 0..8),
    ) {
        let mut journal = new_journal();
        let mut ctx = Registers::new();
        let before_len = journal.stack_len();

        drive(&mut journal, &mut ctx, &[Op::Batch { target, values: values.clone() }]);

        let expected = usize::from(!values.is_empty());
        prop_assert_eq!(journal.stack_len() - before_len, expected);

        if let Some(&last) = values.last() {
            prop_assert_eq!(ctx[TARGETS[target]], last);
            journal.undo(&Table, &mut ctx).unwrap();
            prop_assert_eq!(ctx.get(TARGETS[target]).copied().unwrap_or(0), 0);
        }
    }

    #[test]
    fn snapshot_round_trip_any_history(ops in prop::collection::vec(op_strategy(), 0..25)) {
        let mut journal = new_journal();
        let mut ctx = Registers::new();
        drive(&mut journal, &mut ctx, &ops);

        let snap = journal.snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let back = serde_json::from_str(&json).unwrap();
        let restored = Journal::<Kind>::from_snapshot(back).unwrap();
        prop_assert_eq!(restored.snapshot(), snap);
    }
}
