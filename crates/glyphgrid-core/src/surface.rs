#![forbid(unsafe_code)]

//! Capability traits for character-grid storage.
//!
//! The engine never owns a surface. Sessions hold opaque [`SurfaceId`]
//! handles and every read or write goes through a [`SurfaceStore`]
//! capability passed at call time, so a stale session can never keep a
//! destroyed layer alive or dangle into one.
//!
//! # Region text convention
//!
//! Region content travels as a single `String`: rows joined by `\n`,
//! one `char` per cell, blanks as spaces. `set_to_region` splits on
//! `\n` and writes every character including spaces (a lifted blank
//! overwrites what is underneath); `clear_region` removes cells
//! entirely.

use serde::{Deserialize, Serialize};

use crate::geometry::CellRect;

/// Opaque handle naming a surface inside a [`SurfaceStore`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(String);

impl SurfaceId {
    /// Create a surface id from a name.
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

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A character-grid storage surface.
///
/// Implemented by the (out-of-scope) sparse tile store; this crate only
/// ships the in-memory fake in [`testing`](crate::testing).
pub trait GridSurface {
    /// Read a rectangular region as row-major text.
    ///
    /// Always returns exactly `h` lines of exactly `w` characters,
    /// joined by `\n`, with absent cells rendered as spaces.
    fn read_region(&self, x: i32, y: i32, w: i32, h: i32) -> String;

    /// Write row-major text with its top-left corner at `(x, y)`.
    ///
    /// Every character is written, spaces included.
    fn set_to_region(&mut self, x: i32, y: i32, text: &str);

    /// Remove all cells in a rectangular region.
    fn clear_region(&mut self, x: i32, y: i32, w: i32, h: i32);

    /// Check whether the surface holds no cells at all.
    fn is_empty(&self) -> bool;

    /// Bounding cell rectangle of all populated cells, if any.
    fn content_bounds(&self) -> Option<CellRect>;
}

/// Arena capability resolving [`SurfaceId`] handles to surfaces.
///
/// `add_overlay`/`remove_overlay` manage the transient overlay surfaces
/// a selection session draws its detached content on.
pub trait SurfaceStore {
    /// Resolve a surface for reading.
    fn surface(&self, id: &SurfaceId) -> Option<&dyn GridSurface>;

    /// Resolve a surface for writing.
    fn surface_mut(&mut self, id: &SurfaceId) -> Option<&mut dyn GridSurface>;

    /// Create a transient overlay surface and return its handle.
    fn add_overlay(&mut self) -> SurfaceId;

    /// Destroy a transient overlay surface.
    ///
    /// Unknown ids are ignored; an overlay may already have been torn
    /// down by a snapshot restore.
    fn remove_overlay(&mut self, id: &SurfaceId);
}
