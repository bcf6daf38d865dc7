#![forbid(unsafe_code)]

//! The interaction mode as an explicit value type.
//!
//! Each mode variant carries exactly the state its gesture needs, and
//! nothing else: a transition drops the old variant wholesale, so no
//! gesture state can leak across modes through forgotten cleanup.
//!
//! ```text
//!           pointer-down                 pointer-up (content)
//!   Idle ───────────────► Selecting ───────────────► Selected
//!    ▲                        │                       │  │  │
//!    │   pointer-up (blank)   │         interior down │  │  │ corner down
//!    ├────────────────────────┘                       │  │  │
//!    │                                                ▼  ▼  ▼
//!    │◄── Escape / Delete / commit ──── Moving  Resizing  Rotating
//! ```

use glyphgrid_session::SessionSnapshot;

/// Marquee drag state while selecting.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectingGesture {
    /// Drag origin in world units.
    pub anchor: (f32, f32),
}

/// Content drag state while moving.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveGesture {
    /// Session state at drag start; the whole drag journals as one
    /// change against this.
    pub start: Option<SessionSnapshot>,
    /// Cell the pointer was over at the last step.
    pub last_cell: (i32, i32),
}

/// Corner drag state while resizing the marquee.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeGesture {
    /// Corner being dragged, `0..4` clockwise from top-left.
    pub corner: u8,
    /// World position of the opposite corner, held fixed.
    pub anchor: (f32, f32),
    /// Session state at drag start.
    pub start: Option<SessionSnapshot>,
}

/// Angular drag state while rotating content.
#[derive(Debug, Clone, PartialEq)]
pub struct RotateGesture {
    /// Corner the drag started on; remapped as quarter turns land so
    /// it keeps naming the same physical corner.
    pub corner: u8,
    /// Rotation pivot in fractional cell coordinates, fixed for the
    /// whole gesture so repeated quarter turns recenter exactly.
    pub pivot_cells: (f32, f32),
    /// The same pivot in world units, for pointer angle measurement.
    pub pivot_world: (f32, f32),
    /// Pointer angle about the pivot at the last step, in degrees.
    pub last_angle: f32,
    /// Unquantized rotation accumulated since the last quarter turn.
    pub accumulated: f32,
    /// Session state when the gesture started.
    pub start: Option<SessionSnapshot>,
}

/// Interaction state of the drawing surface.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Mode {
    /// No session; pointer-down starts a marquee.
    #[default]
    Idle,
    /// Dragging a marquee over the source surface.
    Selecting(SelectingGesture),
    /// A populated session is live, no drag in flight.
    Selected,
    /// Dragging the session's content to a new position.
    Moving(MoveGesture),
    /// Dragging a corner to resize the marquee.
    Resizing(ResizeGesture),
    /// Dragging in the rotation band around a corner.
    Rotating(RotateGesture),
}

impl Mode {
    /// Stable label for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Selecting(_) => "selecting",
            Self::Selected => "selected",
            Self::Moving(_) => "moving",
            Self::Resizing(_) => "resizing",
            Self::Rotating(_) => "rotating",
        }
    }

    /// Whether a drag gesture is currently in flight.
    #[must_use]
    pub const fn in_gesture(&self) -> bool {
        matches!(
            self,
            Self::Selecting(_) | Self::Moving(_) | Self::Resizing(_) | Self::Rotating(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names() {
        assert_eq!(Mode::Idle.name(), "idle");
        assert_eq!(Mode::Selected.name(), "selected");
        assert_eq!(
            Mode::Selecting(SelectingGesture { anchor: (0.0, 0.0) }).name(),
            "selecting"
        );
    }

    #[test]
    fn test_in_gesture() {
        assert!(!Mode::Idle.in_gesture());
        assert!(!Mode::Selected.in_gesture());
        assert!(
            Mode::Moving(MoveGesture {
                start: None,
                last_cell: (0, 0)
            })
            .in_gesture()
        );
    }
}
