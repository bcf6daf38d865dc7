#![forbid(unsafe_code)]

//! In-memory collaborator fakes for tests.
//!
//! Gated behind the `test-helpers` feature so downstream crates can
//! drive the engine against a real (if tiny) storage implementation
//! without pulling in the host shell.

use std::collections::HashMap;

use crate::geometry::CellRect;
use crate::surface::{GridSurface, SurfaceId, SurfaceStore};
use crate::viewport::Viewport;

/// Sparse in-memory character grid.
///
/// Cells are stored per coordinate; a space written through
/// [`set_to_region`](GridSurface::set_to_region) removes the cell, so
/// lifted blanks overwrite what was underneath.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    cells: HashMap<(i32, i32), char>,
}

impl MemorySurface {
    /// Create an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a surface pre-populated from row-major text at an origin.
    #[must_use]
    pub fn with_text(x: i32, y: i32, text: &str) -> Self {
        let mut s = Self::new();
        s.set_to_region(x, y, text);
        s
    }

    /// Number of populated cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Read a single cell, `None` if blank.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<char> {
        self.cells.get(&(x, y)).copied()
    }
}

impl GridSurface for MemorySurface {
    fn read_region(&self, x: i32, y: i32, w: i32, h: i32) -> String {
        let mut rows = Vec::with_capacity(h.max(0) as usize);
        for row in y..y + h.max(0) {
            let mut line = String::with_capacity(w.max(0) as usize);
            for col in x..x + w.max(0) {
                line.push(self.cells.get(&(col, row)).copied().unwrap_or(' '));
            }
            rows.push(line);
        }
        rows.join("\n")
    }

    fn set_to_region(&mut self, x: i32, y: i32, text: &str) {
        for (dy, line) in text.split('\n').enumerate() {
            for (dx, ch) in line.chars().enumerate() {
                let pos = (x + dx as i32, y + dy as i32);
                if ch == ' ' {
                    self.cells.remove(&pos);
                } else {
                    self.cells.insert(pos, ch);
                }
            }
        }
    }

    fn clear_region(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.cells
            .retain(|&(cx, cy), _| !(cx >= x && cx < x + w && cy >= y && cy < y + h));
    }

    fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn content_bounds(&self) -> Option<CellRect> {
        let mut iter = self.cells.keys();
        let &(x0, y0) = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
        for &(x, y) in iter {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(CellRect::new(
            min_x,
            min_y,
            max_x - min_x + 1,
            max_y - min_y + 1,
        ))
    }
}

/// In-memory surface store with overlay allocation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    surfaces: HashMap<SurfaceId, MemorySurface>,
    next_overlay: u64,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named layer surface, returning its handle.
    pub fn add_layer(&mut self, name: &str, surface: MemorySurface) -> SurfaceId {
        let id = SurfaceId::new(name);
        self.surfaces.insert(id.clone(), surface);
        id
    }

    /// Typed access to a surface for assertions.
    #[must_use]
    pub fn memory_surface(&self, id: &SurfaceId) -> Option<&MemorySurface> {
        self.surfaces.get(id)
    }

    /// Whether a surface with this handle exists.
    #[must_use]
    pub fn contains(&self, id: &SurfaceId) -> bool {
        self.surfaces.contains_key(id)
    }
}

impl SurfaceStore for MemoryStore {
    fn surface(&self, id: &SurfaceId) -> Option<&dyn GridSurface> {
        self.surfaces.get(id).map(|s| s as &dyn GridSurface)
    }

    fn surface_mut(&mut self, id: &SurfaceId) -> Option<&mut dyn GridSurface> {
        self.surfaces.get_mut(id).map(|s| s as &mut dyn GridSurface)
    }

    fn add_overlay(&mut self) -> SurfaceId {
        let id = SurfaceId::new(format!("overlay:{}", self.next_overlay));
        self.next_overlay += 1;
        self.surfaces.insert(id.clone(), MemorySurface::new());
        id
    }

    fn remove_overlay(&mut self, id: &SurfaceId) {
        self.surfaces.remove(id);
    }
}

/// Viewport with a fixed scale and no pan.
#[derive(Debug, Clone, Copy)]
pub struct FixedViewport {
    /// Screen units per world unit.
    pub scale: f32,
}

impl FixedViewport {
    /// Identity viewport (scale 1.0).
    #[must_use]
    pub const fn identity() -> Self {
        Self { scale: 1.0 }
    }

    /// Viewport with the given scale.
    #[must_use]
    pub const fn with_scale(scale: f32) -> Self {
        Self { scale }
    }
}

impl Viewport for FixedViewport {
    fn screen_to_world(&self, x: f32, y: f32) -> (f32, f32) {
        (x / self.scale, y / self.scale)
    }

    fn world_to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale, y * self.scale)
    }

    fn scale(&self) -> f32 {
        self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_region_pads_blanks() {
        let s = MemorySurface::with_text(0, 0, "AB\nC");
        assert_eq!(s.read_region(0, 0, 3, 2), "AB \nC  ");
    }

    #[test]
    fn test_set_region_space_clears() {
        let mut s = MemorySurface::with_text(0, 0, "XX");
        s.set_to_region(0, 0, " Y");
        assert_eq!(s.cell(0, 0), None);
        assert_eq!(s.cell(1, 0), Some('Y'));
    }

    #[test]
    fn test_clear_region() {
        let mut s = MemorySurface::with_text(0, 0, "ABC\nDEF");
        s.clear_region(1, 0, 2, 2);
        assert_eq!(s.read_region(0, 0, 3, 2), "A  \nD  ");
    }

    #[test]
    fn test_content_bounds() {
        let s = MemorySurface::with_text(2, 3, "AB\nCD");
        assert_eq!(s.content_bounds(), Some(CellRect::new(2, 3, 2, 2)));
        assert_eq!(MemorySurface::new().content_bounds(), None);
    }

    #[test]
    fn test_overlay_lifecycle() {
        let mut store = MemoryStore::new();
        let id = store.add_overlay();
        assert!(store.contains(&id));
        store.remove_overlay(&id);
        assert!(!store.contains(&id));
        // Removing twice is a no-op.
        store.remove_overlay(&id);
    }

    #[test]
    fn test_fixed_viewport_round_trip() {
        let vp = FixedViewport::with_scale(2.0);
        let (wx, wy) = vp.screen_to_world(10.0, 4.0);
        assert_eq!((wx, wy), (5.0, 2.0));
        assert_eq!(vp.world_to_screen(wx, wy), (10.0, 4.0));
    }
}
