#![forbid(unsafe_code)]

//! Select-domain commands.
//!
//! Commands are the write API the mode machine calls as gestures
//! resolve. Each one mutates the live state directly and then records
//! a [`record_only`](ApplyOptions::record_only) action, so the journal
//! holds a truthful before/after pair without re-running the mutation.
//! Replay (undo/redo) goes the other way: the journal drives
//! [`SelectHandlers`] against a caller-assembled [`SelectCtx`].
//!
//! # Edge Cases
//!
//! - A session with no content never reaches the journal: committing
//!   or cancelling one is a plain teardown with no stack entry.
//! - Populating a blank region leaves the session unpopulated and
//!   records nothing.
//! - Rotation requests that are not a multiple of 90° are rejected
//!   before any state changes.

use std::fmt;

use tracing::debug;

use glyphgrid_core::{Rect, SurfaceId};
use glyphgrid_journal::{Action, ApplyOptions, Journal, JournalError};

use crate::actions::{SelectCtx, SelectHandlers, SelectKind, SelectPayload, select_target};
use crate::content::SelectedContent;
use crate::session::{CommitOutcome, SessionId, SessionSnapshot};
use crate::transform;

/// Errors surfaced by select-domain commands.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// Rotation degrees were not a multiple of 90.
    RotationNotQuantized(i32),
    /// A session vanished mid-command; state is consistent but the
    /// command did not complete.
    NoActiveSession,
    /// A payload could not be serialized for recording.
    Encode(String),
    /// The journal rejected the record.
    Journal(JournalError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RotationNotQuantized(deg) => {
                write!(f, "rotation of {deg}° is not a multiple of 90°")
            }
            Self::NoActiveSession => write!(f, "no active session"),
            Self::Encode(msg) => write!(f, "payload encode failed: {msg}"),
            Self::Journal(err) => write!(f, "journal rejected record: {err}"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Journal(err) => Some(err),
            _ => None,
        }
    }
}

impl From<JournalError> for CommandError {
    fn from(err: JournalError) -> Self {
        Self::Journal(err)
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encode(err.to_string())
    }
}

fn record(
    journal: &mut Journal<SelectKind>,
    ctx: &mut SelectCtx<'_>,
    kind: SelectKind,
    before: SelectPayload,
    after: SelectPayload,
) -> Result<(), CommandError> {
    let action = Action::new(
        kind,
        select_target(),
        serde_json::to_value(before)?,
        serde_json::to_value(after)?,
    );
    journal.apply_action(action, ApplyOptions::record_only(), &SelectHandlers, ctx)?;
    Ok(())
}

/// Lift the characters under the session's region off its source
/// surface onto the overlay.
///
/// Returns `false` (recording nothing) when there is no active
/// session, no region, or the region covers only blanks.
pub fn populate_region_from_surface(
    journal: &mut Journal<SelectKind>,
    ctx: &mut SelectCtx<'_>,
) -> Result<bool, CommandError> {
    let Some(session) = ctx.manager.active() else {
        return Ok(false);
    };
    let Some(region) = session.region() else {
        return Ok(false);
    };
    let cells = ctx.metrics.rect_to_cells(&region);
    if cells.width <= 0 || cells.height <= 0 {
        return Ok(false);
    }
    let source_id = session.source().clone();
    let Some(source) = ctx.store.surface(&source_id) else {
        return Ok(false);
    };
    let text = source.read_region(cells.x, cells.y, cells.width, cells.height);
    let content = SelectedContent::new(cells.x, cells.y, &text);
    if content.is_blank() {
        debug!(region = ?cells, "populate skipped, region is blank");
        return Ok(false);
    }

    if let Some(source) = ctx.store.surface_mut(&source_id) {
        source.clear_region(cells.x, cells.y, cells.width, cells.height);
    }
    let (snapshot, overlay_id) = {
        let session = ctx.manager.active_mut().ok_or(CommandError::NoActiveSession)?;
        session.set_region(Some(ctx.metrics.cells_to_rect(&cells)));
        session.set_content(Some(content.clone()));
        (session.snapshot(), session.overlay().clone())
    };
    if let Some(overlay) = ctx.store.surface_mut(&overlay_id) {
        overlay.set_to_region(content.region.x, content.region.y, &content.data);
    }

    record(
        journal,
        ctx,
        SelectKind::SessionExtract,
        SelectPayload::session(None),
        SelectPayload::session(Some(snapshot)),
    )?;
    Ok(true)
}

/// Shift the session's content and region by a cell offset.
///
/// A live-drag step: mutates state but records nothing. Callers
/// journal the whole drag once with [`record_session_change`].
pub fn move_session_by(ctx: &mut SelectCtx<'_>, dx: i32, dy: i32) {
    let Some(session) = ctx.manager.active_mut() else {
        return;
    };
    if let Some(content) = session.content().cloned() {
        let moved = SelectedContent {
            region: content.region.translate(dx, dy),
            data: content.data,
        };
        let overlay_id = session.overlay().clone();
        if let Some(overlay) = ctx.store.surface_mut(&overlay_id) {
            let r = content.region;
            overlay.clear_region(r.x, r.y, r.width, r.height);
            overlay.set_to_region(moved.region.x, moved.region.y, &moved.data);
        }
        if let Some(session) = ctx.manager.active_mut() {
            session.set_content(Some(moved));
        }
    }
    if let Some(session) = ctx.manager.active_mut()
        && let Some(region) = session.region()
    {
        let (wx, wy) = (
            dx as f32 * ctx.metrics.cell_width,
            dy as f32 * ctx.metrics.cell_height,
        );
        session.set_region(Some(region.translate(wx, wy)));
    }
}

/// Rotate the session's content by quarter turns about a pivot.
///
/// `degrees` must be a multiple of 90; positive is clockwise. `pivot`
/// is in fractional cell coordinates and defaults to the content's own
/// center. The whole rotation is journaled as one session change.
pub fn rotate_session(
    journal: &mut Journal<SelectKind>,
    ctx: &mut SelectCtx<'_>,
    degrees: i32,
    pivot: Option<(f32, f32)>,
) -> Result<(), CommandError> {
    let turns =
        transform::quarter_turns(degrees).ok_or(CommandError::RotationNotQuantized(degrees))?;
    let Some(session) = ctx.manager.active() else {
        return Ok(());
    };
    let Some(content) = session.content().cloned() else {
        return Ok(());
    };
    if turns == 0 {
        return Ok(());
    }

    let before = session.snapshot();
    let overlay_id = session.overlay().clone();
    let pivot = pivot.unwrap_or_else(|| transform::footprint_center(&content.region));
    let rotated = transform::rotate_content(&content, turns, pivot);
    debug!(
        session = %session.id(),
        degrees,
        from = ?content.region,
        to = ?rotated.region,
        "rotating session content"
    );

    if let Some(overlay) = ctx.store.surface_mut(&overlay_id) {
        let r = content.region;
        overlay.clear_region(r.x, r.y, r.width, r.height);
        overlay.set_to_region(rotated.region.x, rotated.region.y, &rotated.data);
    }
    let after = {
        let session = ctx.manager.active_mut().ok_or(CommandError::NoActiveSession)?;
        session.set_region(Some(ctx.metrics.cells_to_rect(&rotated.region)));
        session.set_content(Some(rotated));
        session.snapshot()
    };

    record(
        journal,
        ctx,
        SelectKind::SessionChange,
        SelectPayload::session(Some(before)),
        SelectPayload::session(Some(after)),
    )
}

/// Start a session pre-populated with given content (paste-like entry).
///
/// Any active session is resolved first; the whole swap is journaled
/// as one session change from the old state to the new.
pub fn create_and_replace(
    journal: &mut Journal<SelectKind>,
    ctx: &mut SelectCtx<'_>,
    source: SurfaceId,
    content: SelectedContent,
) -> Result<SessionId, CommandError> {
    let before = ctx.manager.snapshot_active();
    if ctx.manager.has_active() {
        // The swap is journaled wholesale below; tear the old session
        // down without a stack entry of its own.
        ctx.manager.restore(None, ctx.store);
    }
    let id = ctx.manager.begin_session(ctx.store, source);
    let (snapshot, overlay_id) = {
        let session = ctx.manager.active_mut().ok_or(CommandError::NoActiveSession)?;
        session.set_region(Some(ctx.metrics.cells_to_rect(&content.region)));
        session.set_content(Some(content.clone()));
        (session.snapshot(), session.overlay().clone())
    };
    if let Some(overlay) = ctx.store.surface_mut(&overlay_id) {
        overlay.set_to_region(content.region.x, content.region.y, &content.data);
    }

    record(
        journal,
        ctx,
        SelectKind::SessionChange,
        SelectPayload::session(before),
        SelectPayload::session(Some(snapshot)),
    )?;
    Ok(id)
}

/// Record a session change from a caller-captured prior state.
///
/// Used at drag end: the mode captured `before` when the drag started,
/// mutated live through [`move_session_by`] or region updates, and now
/// journals the whole gesture as one entry.
pub fn record_session_change(
    journal: &mut Journal<SelectKind>,
    ctx: &mut SelectCtx<'_>,
    before: Option<SessionSnapshot>,
) -> Result<(), CommandError> {
    let after = ctx.manager.snapshot_active();
    record(
        journal,
        ctx,
        SelectKind::SessionChange,
        SelectPayload::session(before),
        SelectPayload::session(after),
    )
}

/// Commit the active session and journal the resolution.
///
/// An empty session tears down without a stack entry. A commit whose
/// target is gone degrades to a cancel and is journaled as one.
pub fn commit_session(
    journal: &mut Journal<SelectKind>,
    ctx: &mut SelectCtx<'_>,
    target: Option<&SurfaceId>,
) -> Result<(), CommandError> {
    let Some(before) = ctx.manager.snapshot_active() else {
        return Ok(());
    };
    let Some(content) = &before.content else {
        ctx.manager.cancel_active(ctx.store);
        return Ok(());
    };
    // Capture what the write is about to cover, for revert.
    let target_id = target.unwrap_or(&before.source);
    let overwritten = ctx.store.surface(target_id).map(|surface| {
        let r = content.region;
        surface.read_region(r.x, r.y, r.width, r.height)
    });
    match ctx.manager.commit_active(ctx.store, target) {
        Some(CommitOutcome::Committed(target)) => record(
            journal,
            ctx,
            SelectKind::SessionCommit,
            SelectPayload::session(Some(before)),
            SelectPayload::committed(target, overwritten),
        ),
        Some(CommitOutcome::Cancelled) => record(
            journal,
            ctx,
            SelectKind::SessionCancel,
            SelectPayload::session(Some(before)),
            SelectPayload::session(None),
        ),
        None => Ok(()),
    }
}

/// Cancel the active session and journal the resolution.
///
/// An empty session tears down without a stack entry.
pub fn cancel_session(
    journal: &mut Journal<SelectKind>,
    ctx: &mut SelectCtx<'_>,
) -> Result<(), CommandError> {
    let Some(before) = ctx.manager.snapshot_active() else {
        return Ok(());
    };
    let had_content = before.content.is_some();
    ctx.manager.cancel_active(ctx.store);
    if !had_content {
        return Ok(());
    }
    record(
        journal,
        ctx,
        SelectKind::SessionCancel,
        SelectPayload::session(Some(before)),
        SelectPayload::session(None),
    )
}

/// Update the marquee region of the active session, if any.
///
/// Live-drag step during selecting; records nothing.
pub fn set_session_region(ctx: &mut SelectCtx<'_>, region: Option<Rect>) {
    if let Some(session) = ctx.manager.active_mut() {
        session.set_region(region);
    }
}
