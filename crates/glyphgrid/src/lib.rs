#![forbid(unsafe_code)]

//! GlyphGrid public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for hosts
//! embedding the selection/history engine. It re-exports common types
//! from the internal crates and offers a lightweight prelude for
//! day-to-day usage.
//!
//! A minimal host loop looks like:
//!
//! ```no_run
//! use glyphgrid::prelude::*;
//!
//! # fn host(store: &mut dyn SurfaceStore, viewport: &dyn Viewport, event: InputEvent) {
//! let mut manager = SessionManager::new();
//! let mut journal = Journal::<SelectKind>::new();
//! journal.register_target(select_target());
//! let mut machine = ModeContext::new();
//!
//! let mut env = ModeEnv {
//!     manager: &mut manager,
//!     journal: &mut journal,
//!     store,
//!     viewport,
//!     metrics: CellMetrics::new(8.0, 16.0),
//!     layer: SurfaceId::new("layer:base"),
//! };
//! machine.handle_event(&event, &mut env);
//! # }
//! ```

// --- Core re-exports -------------------------------------------------------

pub use glyphgrid_core::{
    CellMetrics, CellRect, GridSurface, InputEvent, KeyCode, KeyEvent, Modifiers, PointerButton,
    PointerEvent, Rect, SurfaceId, SurfaceStore, Viewport,
};

// --- Journal re-exports ----------------------------------------------------

pub use glyphgrid_journal::{
    Action, ActionKind, Applied, ApplyError, ApplyOptions, Batch, BatchConfig, BatchFilter,
    BatchId, Entry, HandlerTable, HookId, HookPoint, Journal, JournalError, JournalSnapshot,
    TargetId,
};

// --- Session re-exports ----------------------------------------------------

pub use glyphgrid_session::{
    CommandError, CommitOutcome, ManagerEvent, SelectCtx, SelectHandlers, SelectKind,
    SelectPayload, SelectedContent, Session, SessionEvent, SessionId, SessionManager,
    SessionSnapshot, commands, select_target,
};

// --- Modes re-exports ------------------------------------------------------

pub use glyphgrid_modes::{HANDLE_HITBOX_PX, HitZone, Mode, ModeContext, ModeEnv, hit_test};

// --- Prelude ---------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CellMetrics, CellRect, CommandError, GridSurface, InputEvent, Journal, JournalError,
        KeyCode, KeyEvent, Mode, ModeContext, ModeEnv, Modifiers, PointerEvent, Rect, SelectCtx,
        SelectKind, SelectedContent, SessionManager, SurfaceId, SurfaceStore, Viewport, commands,
        select_target,
    };

    pub use crate::{core, journal, modes, session};
}

pub use glyphgrid_core as core;
pub use glyphgrid_journal as journal;
pub use glyphgrid_modes as modes;
pub use glyphgrid_session as session;
