#![forbid(unsafe_code)]

//! Event dispatch: one input event in, one mode transition out.
//!
//! [`ModeContext`] is the single entry point the host shell feeds
//! translated input events into. Every transition of the machine in
//! the module diagram of [`mode`](crate::mode) happens here, and every
//! mutation goes through the select command layer so journaling stays
//! consistent with direct command use.
//!
//! # Failure Modes
//!
//! A command failure mid-gesture (journal wiring broken, serialization
//! failure) degrades to a session cancel and a return to `Idle`, with
//! a `tracing::warn!` — the machine never panics and never parks in a
//! state it cannot leave.

use tracing::{debug, warn};

use glyphgrid_core::{
    CellMetrics, InputEvent, KeyCode, PointerEvent, Rect, SurfaceId, SurfaceStore, Viewport,
};
use glyphgrid_journal::Journal;
use glyphgrid_session::{
    CommandError, SelectCtx, SelectKind, SessionManager, SessionSnapshot, commands, transform,
};

use crate::hit::{self, HitZone};
use crate::mode::{Mode, MoveGesture, ResizeGesture, RotateGesture, SelectingGesture};

/// Capability bundle the mode machine runs against.
///
/// Assembled by the host per event; nothing in it is stored.
pub struct ModeEnv<'a> {
    /// Owner of the active session.
    pub manager: &'a mut SessionManager,
    /// History for the select domain.
    pub journal: &'a mut Journal<SelectKind>,
    /// Resolves surface handles.
    pub store: &'a mut dyn SurfaceStore,
    /// Screen↔world conversion.
    pub viewport: &'a dyn Viewport,
    /// World size of one character cell.
    pub metrics: CellMetrics,
    /// Surface new selections lift content from.
    pub layer: SurfaceId,
}

impl ModeEnv<'_> {
    fn world(&self, p: &PointerEvent) -> (f32, f32) {
        self.viewport.screen_to_world(p.x, p.y)
    }

    /// Split the env into the journal and a select context.
    fn select(&mut self) -> (&mut Journal<SelectKind>, SelectCtx<'_>) {
        (
            self.journal,
            SelectCtx {
                manager: self.manager,
                store: self.store,
                metrics: self.metrics,
            },
        )
    }
}

/// The interaction machine.
#[derive(Debug, Default)]
pub struct ModeContext {
    mode: Mode,
}

impl ModeContext {
    /// Create a machine in `Idle`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Feed one input event through the machine.
    pub fn handle_event(&mut self, event: &InputEvent, env: &mut ModeEnv<'_>) {
        let mode = std::mem::take(&mut self.mode);
        let from = mode.name();
        self.mode = match dispatch(mode, event, env) {
            Ok(next) => next,
            Err(err) => {
                warn!(error = %err, mode = from, "gesture failed, cancelling session");
                env.manager.cancel_active(env.store);
                Mode::Idle
            }
        };
        if self.mode.name() != from {
            debug!(from, to = self.mode.name(), "mode transition");
        }
    }
}

fn dispatch(
    mode: Mode,
    event: &InputEvent,
    env: &mut ModeEnv<'_>,
) -> Result<Mode, CommandError> {
    match (mode, event) {
        (Mode::Idle, InputEvent::PointerDown(p)) => Ok(start_marquee(env, p)),

        (Mode::Selecting(g), InputEvent::PointerMove(p)) => {
            let (wx, wy) = env.world(p);
            let region = Rect::new(g.anchor.0, g.anchor.1, wx - g.anchor.0, wy - g.anchor.1);
            let (_, mut ctx) = env.select();
            commands::set_session_region(&mut ctx, Some(region));
            Ok(Mode::Selecting(g))
        }
        (Mode::Selecting(_), InputEvent::PointerUp(_)) => {
            let (journal, mut ctx) = env.select();
            if commands::populate_region_from_surface(journal, &mut ctx)? {
                Ok(Mode::Selected)
            } else {
                // Nothing under the marquee: empty sessions resolve
                // silently, nothing reaches the journal.
                env.manager.cancel_active(env.store);
                Ok(Mode::Idle)
            }
        }

        (Mode::Selected, InputEvent::PointerDown(p)) => selected_pointer_down(env, p),

        (Mode::Moving(mut g), InputEvent::PointerMove(p)) => {
            let (wx, wy) = env.world(p);
            let cell = env.metrics.point_to_cell(wx, wy);
            let (dx, dy) = (cell.0 - g.last_cell.0, cell.1 - g.last_cell.1);
            if dx != 0 || dy != 0 {
                let (_, mut ctx) = env.select();
                commands::move_session_by(&mut ctx, dx, dy);
                g.last_cell = cell;
            }
            Ok(Mode::Moving(g))
        }
        (Mode::Moving(g), InputEvent::PointerUp(_)) => {
            finish_gesture(env, g.start)?;
            Ok(Mode::Selected)
        }

        (Mode::Resizing(g), InputEvent::PointerMove(p)) => {
            let (wx, wy) = env.world(p);
            let region = Rect::new(g.anchor.0, g.anchor.1, wx - g.anchor.0, wy - g.anchor.1);
            let (_, mut ctx) = env.select();
            commands::set_session_region(&mut ctx, Some(region));
            Ok(Mode::Resizing(g))
        }
        (Mode::Resizing(g), InputEvent::PointerUp(_)) => {
            // Snap to whole cells, at least 1×1.
            if let Some(session) = env.manager.active()
                && let Some(region) = session.region()
            {
                let cells = env.metrics.rect_to_cells(&region).clamp_min_size();
                let snapped = env.metrics.cells_to_rect(&cells);
                let (_, mut ctx) = env.select();
                commands::set_session_region(&mut ctx, Some(snapped));
            }
            finish_gesture(env, g.start)?;
            Ok(Mode::Selected)
        }

        (Mode::Rotating(g), InputEvent::PointerMove(p)) => {
            Ok(Mode::Rotating(rotate_step(env, g, p)?))
        }
        (Mode::Rotating(_), InputEvent::PointerUp(_)) => Ok(Mode::Selected),

        (mode, InputEvent::Key(k)) => key(mode, k.code, env),

        // Stray pointer events outside their gesture are ignored.
        (mode, _) => Ok(mode),
    }
}

fn selected_pointer_down(
    env: &mut ModeEnv<'_>,
    p: &PointerEvent,
) -> Result<Mode, CommandError> {
    let (wx, wy) = env.world(p);
    let Some(session) = env.manager.active() else {
        // Session vanished underneath us; behave like Idle.
        return Ok(start_marquee(env, p));
    };
    let Some(region) = session.region() else {
        return Ok(start_marquee(env, p));
    };

    let mut zone = hit::hit_test(&region, wx, wy, env.viewport.scale());
    if matches!(zone, HitZone::RotationCorner(_)) {
        // A single cell has no orientation; its rotation band is dead
        // space that behaves like a miss.
        let rotatable = session
            .content()
            .is_some_and(|c| c.width() > 1 || c.height() > 1);
        if !rotatable {
            zone = HitZone::Outside;
        }
    }

    match zone {
        HitZone::RotationCorner(corner) => {
            let content = session.content().ok_or(CommandError::NoActiveSession)?;
            let pivot_cells = transform::footprint_center(&content.region);
            let pivot_world = (
                pivot_cells.0 * env.metrics.cell_width,
                pivot_cells.1 * env.metrics.cell_height,
            );
            let start = env.manager.snapshot_active();
            Ok(Mode::Rotating(RotateGesture {
                corner,
                pivot_cells,
                pivot_world,
                last_angle: pointer_angle(pivot_world, (wx, wy)),
                accumulated: 0.0,
                start,
            }))
        }
        HitZone::ResizeHandle(corner) => {
            let anchor = hit::corners(&region)[hit::opposite_corner(corner) as usize];
            Ok(Mode::Resizing(ResizeGesture {
                corner,
                anchor,
                start: env.manager.snapshot_active(),
            }))
        }
        HitZone::Interior => Ok(Mode::Moving(MoveGesture {
            start: env.manager.snapshot_active(),
            last_cell: env.metrics.point_to_cell(wx, wy),
        })),
        HitZone::Outside => {
            // A new drag resolves the live session first.
            let (journal, mut ctx) = env.select();
            commands::commit_session(journal, &mut ctx, None)?;
            Ok(start_marquee(env, p))
        }
    }
}

fn rotate_step(
    env: &mut ModeEnv<'_>,
    mut g: RotateGesture,
    p: &PointerEvent,
) -> Result<RotateGesture, CommandError> {
    let world = env.world(p);
    let angle = pointer_angle(g.pivot_world, world);
    g.accumulated += angle_delta(angle, g.last_angle);
    g.last_angle = angle;

    // Quantize at each ±90° crossing and snap the remainder back, so
    // an N-crossing drag lands exactly N quarter turns.
    while g.accumulated >= 90.0 {
        let (journal, mut ctx) = env.select();
        commands::rotate_session(journal, &mut ctx, 90, Some(g.pivot_cells))?;
        g.accumulated -= 90.0;
        g.corner = hit::remap_corner_cw(g.corner);
    }
    while g.accumulated <= -90.0 {
        let (journal, mut ctx) = env.select();
        commands::rotate_session(journal, &mut ctx, -90, Some(g.pivot_cells))?;
        g.accumulated += 90.0;
        g.corner = hit::remap_corner_ccw(g.corner);
    }
    Ok(g)
}

fn key(mode: Mode, code: KeyCode, env: &mut ModeEnv<'_>) -> Result<Mode, CommandError> {
    match (mode, code) {
        (_, KeyCode::Escape) if env.manager.has_active() => {
            let (journal, mut ctx) = env.select();
            commands::cancel_session(journal, &mut ctx)?;
            Ok(Mode::Idle)
        }
        (_, KeyCode::Escape) => Ok(Mode::Idle),
        (Mode::Selected, KeyCode::Delete | KeyCode::Backspace) => {
            let (journal, mut ctx) = env.select();
            commands::cancel_session(journal, &mut ctx)?;
            Ok(Mode::Idle)
        }
        // Enter resolves the selection in place: the same commit path
        // an outside click takes, without moving the pointer.
        (Mode::Selected, KeyCode::Enter) => {
            let (journal, mut ctx) = env.select();
            commands::commit_session(journal, &mut ctx, None)?;
            Ok(Mode::Idle)
        }
        (mode, _) => Ok(mode),
    }
}

/// Begin a fresh marquee drag at the pointer.
fn start_marquee(env: &mut ModeEnv<'_>, p: &PointerEvent) -> Mode {
    let anchor = env.world(p);
    let layer = env.layer.clone();
    env.manager.begin_session(env.store, layer);
    let (_, mut ctx) = env.select();
    commands::set_session_region(&mut ctx, Some(Rect::new(anchor.0, anchor.1, 0.0, 0.0)));
    Mode::Selecting(SelectingGesture { anchor })
}

/// Journal a finished drag as one session change, unless it was a
/// no-op.
fn finish_gesture(
    env: &mut ModeEnv<'_>,
    start: Option<SessionSnapshot>,
) -> Result<(), CommandError> {
    if env.manager.snapshot_active() == start {
        return Ok(());
    }
    let (journal, mut ctx) = env.select();
    commands::record_session_change(journal, &mut ctx, start)
}

/// Pointer angle about a pivot, in degrees.
fn pointer_angle(pivot: (f32, f32), point: (f32, f32)) -> f32 {
    (point.1 - pivot.1).atan2(point.0 - pivot.0).to_degrees()
}

/// Shortest signed angular distance from `from` to `to`, in degrees.
fn angle_delta(to: f32, from: f32) -> f32 {
    (to - from + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_delta_wraps() {
        assert_eq!(angle_delta(170.0, -170.0), -20.0);
        assert_eq!(angle_delta(-170.0, 170.0), 20.0);
        assert_eq!(angle_delta(10.0, 0.0), 10.0);
    }

    #[test]
    fn test_pointer_angle_quadrants() {
        let pivot = (0.0, 0.0);
        assert_eq!(pointer_angle(pivot, (1.0, 0.0)), 0.0);
        assert!((pointer_angle(pivot, (0.0, 1.0)) - 90.0).abs() < 1e-3);
        assert!((pointer_angle(pivot, (-1.0, 0.0)) - 180.0).abs() < 1e-3);
    }
}
