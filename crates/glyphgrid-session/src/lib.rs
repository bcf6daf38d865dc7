#![forbid(unsafe_code)]

//! Selection/transform sessions and the select action domain.
//!
//! # Role in GlyphGrid
//! This crate owns everything between "the user started dragging a
//! marquee" and "the content landed back on a surface":
//!
//! ```text
//!   modes (gestures)                journal (history)
//!        │                                ▲
//!        ▼                                │ record_only
//!   commands ───► SessionManager ───► SelectKind actions
//!                      │                  │ undo/redo
//!                      ▼                  ▼
//!                  Session ◄───────── SelectHandlers
//!                      │
//!                      ▼
//!              SurfaceStore (overlay + layers)
//! ```
//!
//! # Primary responsibilities
//! - **Session**: detached content on a transient overlay, with
//!   commit/cancel resolution.
//! - **Manager**: single-active-session ownership and replacement.
//! - **Transforms**: quarter-turn rotation with pivot re-centering.
//! - **Actions**: the select domain's journal kinds, payloads, and
//!   handler table.
//! - **Commands**: gesture-level operations that mutate live state and
//!   record truthful history entries.

pub mod actions;
pub mod commands;
pub mod content;
pub mod manager;
pub mod session;
pub mod transform;

pub use actions::{SelectCtx, SelectHandlers, SelectKind, SelectPayload, select_target};
pub use commands::CommandError;
pub use content::SelectedContent;
pub use manager::{ManagerEvent, SessionManager};
pub use session::{CommitOutcome, Session, SessionEvent, SessionId, SessionSnapshot};
