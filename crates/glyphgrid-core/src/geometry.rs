#![forbid(unsafe_code)]

//! Geometric primitives in world and cell units.
//!
//! Two coordinate spaces coexist:
//!
//! - **World units** ([`Rect`]): continuous `f32` coordinates, the space
//!   selection drags live in. Negative spans are legal as input (a drag
//!   up-and-left) and are folded into the start coordinate by
//!   [`Rect::normalized`].
//! - **Cell units** ([`CellRect`]): integer character-cell coordinates,
//!   the space grid content lives in.
//!
//! [`CellMetrics`] carries the world size of one character cell and owns
//! the conversion in both directions.
//!
//! # Invariants
//!
//! 1. A normalized [`Rect`] has non-negative width and height.
//! 2. `cells_to_rect` followed by `rect_to_cells` is the identity for
//!    any [`CellRect`] and non-degenerate metrics.

use serde::{Deserialize, Serialize};

/// A rectangle in continuous world units.
///
/// `start_x`/`start_y` name the drag origin, not necessarily the
/// top-left corner: width and height may be negative until
/// [`normalized`](Rect::normalized) folds them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// X of the drag origin.
    pub start_x: f32,
    /// Y of the drag origin.
    pub start_y: f32,
    /// Horizontal span; may be negative before normalization.
    pub width: f32,
    /// Vertical span; may be negative before normalization.
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    #[must_use]
    pub const fn new(start_x: f32, start_y: f32, width: f32, height: f32) -> Self {
        Self {
            start_x,
            start_y,
            width,
            height,
        }
    }

    /// Fold negative spans into the start coordinate.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let (start_x, width) = if self.width < 0.0 {
            (self.start_x + self.width, -self.width)
        } else {
            (self.start_x, self.width)
        };
        let (start_y, height) = if self.height < 0.0 {
            (self.start_y + self.height, -self.height)
        } else {
            (self.start_y, self.height)
        };
        Self {
            start_x,
            start_y,
            width,
            height,
        }
    }

    /// Right edge (exclusive). Meaningful on normalized rectangles.
    #[inline]
    #[must_use]
    pub fn right(&self) -> f32 {
        self.start_x + self.width
    }

    /// Bottom edge (exclusive). Meaningful on normalized rectangles.
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.start_y + self.height
    }

    /// Center point.
    #[inline]
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (
            self.start_x + self.width / 2.0,
            self.start_y + self.height / 2.0,
        )
    }

    /// Check if a world point is inside the rectangle.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let r = self.normalized();
        x >= r.start_x && x < r.right() && y >= r.start_y && y < r.bottom()
    }

    /// Shift by a world-unit offset.
    #[must_use]
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            start_x: self.start_x + dx,
            start_y: self.start_y + dy,
            ..*self
        }
    }

    /// Smallest rectangle containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let a = self.normalized();
        let b = other.normalized();
        let start_x = a.start_x.min(b.start_x);
        let start_y = a.start_y.min(b.start_y);
        Rect {
            start_x,
            start_y,
            width: a.right().max(b.right()) - start_x,
            height: a.bottom().max(b.bottom()) - start_y,
        }
    }
}

/// A rectangle in integer character-cell units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellRect {
    /// Left column (inclusive).
    pub x: i32,
    /// Top row (inclusive).
    pub y: i32,
    /// Width in cells.
    pub width: i32,
    /// Height in cells.
    pub height: i32,
}

impl CellRect {
    /// Create a new cell rectangle.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right column (exclusive).
    #[inline]
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom row (exclusive).
    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Check if a cell is inside the rectangle.
    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Shift by a cell offset.
    #[must_use]
    pub const fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            width: self.width,
            height: self.height,
        }
    }

    /// Clamp width and height to at least one cell.
    #[must_use]
    pub fn clamp_min_size(&self) -> Self {
        Self {
            width: self.width.max(1),
            height: self.height.max(1),
            ..*self
        }
    }
}

/// World size of one character cell.
///
/// All world↔cell conversions in the engine go through this value, so a
/// single metrics instance keeps the selection region, the overlay
/// footprint, and hit testing in agreement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellMetrics {
    /// Width of one cell in world units.
    pub cell_width: f32,
    /// Height of one cell in world units.
    pub cell_height: f32,
}

impl CellMetrics {
    /// Create new metrics. Both dimensions must be positive.
    #[must_use]
    pub const fn new(cell_width: f32, cell_height: f32) -> Self {
        Self {
            cell_width,
            cell_height,
        }
    }

    /// Convert a world point to the cell containing it.
    #[must_use]
    pub fn point_to_cell(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_width).floor() as i32,
            (y / self.cell_height).floor() as i32,
        )
    }

    /// World coordinates of a cell's top-left corner.
    #[must_use]
    pub fn cell_to_point(&self, cx: i32, cy: i32) -> (f32, f32) {
        (cx as f32 * self.cell_width, cy as f32 * self.cell_height)
    }

    /// Convert a world rectangle to the cell rectangle covering it.
    ///
    /// The origin is floored to the containing cell and the span rounds
    /// up so a partially covered cell is included. A degenerate
    /// rectangle (zero width or height) covers nothing and maps to a
    /// zero-size cell rectangle: a click without a drag selects no
    /// cells.
    #[must_use]
    pub fn rect_to_cells(&self, rect: &Rect) -> CellRect {
        let r = rect.normalized();
        let (x, y) = self.point_to_cell(r.start_x, r.start_y);
        if r.width == 0.0 || r.height == 0.0 {
            return CellRect::new(x, y, 0, 0);
        }
        let right = (r.right() / self.cell_width).ceil() as i32;
        let bottom = (r.bottom() / self.cell_height).ceil() as i32;
        CellRect {
            x,
            y,
            width: (right - x).max(0),
            height: (bottom - y).max(0),
        }
    }

    /// Convert a cell rectangle to its exact world rectangle.
    #[must_use]
    pub fn cells_to_rect(&self, cells: &CellRect) -> Rect {
        Rect {
            start_x: cells.x as f32 * self.cell_width,
            start_y: cells.y as f32 * self.cell_height,
            width: cells.width as f32 * self.cell_width,
            height: cells.height as f32 * self.cell_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METRICS: CellMetrics = CellMetrics::new(8.0, 16.0);

    #[test]
    fn test_normalized_folds_negative_width() {
        let r = Rect::new(10.0, 5.0, -4.0, 3.0).normalized();
        assert_eq!(r, Rect::new(6.0, 5.0, 4.0, 3.0));
    }

    #[test]
    fn test_normalized_folds_negative_height() {
        let r = Rect::new(10.0, 5.0, 4.0, -3.0).normalized();
        assert_eq!(r, Rect::new(10.0, 2.0, 4.0, 3.0));
    }

    #[test]
    fn test_normalized_identity_on_positive_spans() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(r.normalized(), r);
    }

    #[test]
    fn test_contains_handles_unnormalized_input() {
        let r = Rect::new(10.0, 10.0, -10.0, -10.0);
        assert!(r.contains(5.0, 5.0));
        assert!(!r.contains(10.5, 5.0));
    }

    #[test]
    fn test_center() {
        let r = Rect::new(0.0, 0.0, 10.0, 4.0);
        assert_eq!(r.center(), (5.0, 2.0));
    }

    #[test]
    fn test_union_covers_both() {
        let a = Rect::new(0.0, 0.0, 2.0, 2.0);
        let b = Rect::new(4.0, 4.0, 2.0, 2.0);
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 6.0, 6.0));
    }

    #[test]
    fn test_cell_rect_contains() {
        let c = CellRect::new(2, 3, 4, 2);
        assert!(c.contains(2, 3));
        assert!(c.contains(5, 4));
        assert!(!c.contains(6, 3));
        assert!(!c.contains(2, 5));
    }

    #[test]
    fn test_cell_rect_clamp_min_size() {
        assert_eq!(
            CellRect::new(1, 1, 0, -3).clamp_min_size(),
            CellRect::new(1, 1, 1, 1)
        );
        let ok = CellRect::new(0, 0, 2, 2);
        assert_eq!(ok.clamp_min_size(), ok);
    }

    #[test]
    fn test_point_to_cell_floors() {
        assert_eq!(METRICS.point_to_cell(7.9, 15.9), (0, 0));
        assert_eq!(METRICS.point_to_cell(8.0, 16.0), (1, 1));
        assert_eq!(METRICS.point_to_cell(-0.1, -0.1), (-1, -1));
    }

    #[test]
    fn test_rect_to_cells_rounds_span_up() {
        let r = Rect::new(0.0, 0.0, 9.0, 17.0);
        assert_eq!(METRICS.rect_to_cells(&r), CellRect::new(0, 0, 2, 2));
    }

    #[test]
    fn test_rect_to_cells_degenerate_covers_nothing() {
        // A point mid-cell would otherwise floor to cell 0 and ceil
        // past it, fabricating a 1×1 coverage out of zero area.
        let click = Rect::new(5.0, 5.0, 0.0, 0.0);
        assert_eq!(METRICS.rect_to_cells(&click), CellRect::new(0, 0, 0, 0));
        let line = Rect::new(0.0, 0.0, 0.0, 17.0);
        assert_eq!(METRICS.rect_to_cells(&line).width, 0);
    }

    #[test]
    fn test_cells_round_trip() {
        let c = CellRect::new(-3, 2, 5, 7);
        assert_eq!(METRICS.rect_to_cells(&METRICS.cells_to_rect(&c)), c);
    }

    #[test]
    fn test_rect_serde_round_trip() {
        let r = Rect::new(1.5, -2.0, 3.0, 4.5);
        let json = serde_json::to_string(&r).unwrap();
        let back: Rect = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
