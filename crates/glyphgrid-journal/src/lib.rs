#![forbid(unsafe_code)]

//! Transactional action journal: undo/redo with batching.
//!
//! # Role in GlyphGrid
//! `glyphgrid-journal` is the history engine. Every user-visible
//! mutation in the editor is recorded here as a reversible [`Action`];
//! multi-step gestures open a [batch](batch) that collapses into one
//! composite stack entry, so one undo reverts the whole gesture.
//!
//! # Primary responsibilities
//! - **Journal**: linear, truncating undo/redo stack with an applied
//!   cursor and branch discard.
//! - **Actions**: kind-tagged before/after records with JSON payloads.
//! - **Batches**: named, filterable action queues.
//! - **Hooks**: before/after subscriber lists around apply/undo/redo.
//! - **Snapshots**: exact structural serialization of the whole state.
//!
//! # How it fits in the system
//! The journal is domain-agnostic. `glyphgrid-session` defines the
//! select-domain action kinds and handler table and registers the
//! session manager as the journal's target; the mode machine pushes
//! actions as gestures complete.

pub mod action;
pub mod batch;
pub mod journal;
pub mod snapshot;

pub use action::{Action, ActionKind, ApplyError, BatchId, HandlerTable, TargetId};
pub use batch::{Batch, BatchConfig, BatchFilter};
pub use journal::{Applied, ApplyOptions, Entry, HookId, HookPoint, Journal, JournalError};
pub use snapshot::JournalSnapshot;
