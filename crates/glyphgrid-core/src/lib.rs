#![forbid(unsafe_code)]

//! Core: geometry, input events, and collaborator capabilities.
//!
//! # Role in GlyphGrid
//! `glyphgrid-core` is the foundation layer. It owns the world/cell
//! geometry types, the normalized input events the interaction machine
//! consumes, and the capability traits through which the engine reaches
//! its collaborators (character-grid surfaces, the surface store, the
//! pan/zoom viewport).
//!
//! # Primary responsibilities
//! - **Rect / CellRect / CellMetrics**: continuous world units, integer
//!   character-cell units, and the conversion between them.
//! - **InputEvent**: canonical pointer and key events.
//! - **GridSurface / SurfaceStore / Viewport**: interfaces to the
//!   storage engine, layer registry, and camera. Implemented elsewhere;
//!   this crate only ships in-memory fakes behind `test-helpers`.
//!
//! # How it fits in the system
//! The journal (`glyphgrid-journal`) is independent of this crate's
//! collaborators; the session engine (`glyphgrid-session`) and the mode
//! machine (`glyphgrid-modes`) consume these types to mutate surfaces
//! and interpret pointer gestures.

pub mod event;
pub mod geometry;
pub mod surface;
pub mod viewport;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use event::{InputEvent, KeyCode, KeyEvent, Modifiers, PointerButton, PointerEvent};
pub use geometry::{CellMetrics, CellRect, Rect};
pub use surface::{GridSurface, SurfaceId, SurfaceStore};
pub use viewport::Viewport;
