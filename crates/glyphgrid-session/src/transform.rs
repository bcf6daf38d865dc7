#![forbid(unsafe_code)]

//! Quarter-turn rotation of detached content.
//!
//! Character content only rotates in 90° steps: a cell grid has no
//! sub-cell geometry, so free-angle rotation is meaningless here. A
//! rotation request is quantized to quarter turns, the data matrix is
//! rotated step by step, and the footprint is re-centered on a pivot so
//! the block visually spins in place instead of orbiting its old
//! top-left corner.
//!
//! # Invariants
//!
//! 1. Four clockwise quarter turns are the identity on the data.
//! 2. Re-centering on a fixed pivot is exact over any sequence of
//!    turns summing to a multiple of 360°: the footprint returns to
//!    its original origin.

use crate::content::SelectedContent;
use glyphgrid_core::CellRect;

/// Quantize a rotation in degrees to clockwise quarter turns.
///
/// Returns `None` when `degrees` is not a multiple of 90. The result is
/// normalized into `0..4`; a counter-clockwise turn is three clockwise
/// ones.
#[must_use]
pub fn quarter_turns(degrees: i32) -> Option<u32> {
    if degrees % 90 != 0 {
        return None;
    }
    Some((degrees / 90).rem_euclid(4) as u32)
}

/// Rotate a row-major block of characters one quarter turn clockwise.
///
/// Ragged rows are padded with spaces before rotating, so the result is
/// always a full `w × h` block (transposed to `h × w`).
#[must_use]
pub fn rotate_block_cw(data: &str) -> String {
    let rows: Vec<Vec<char>> = data.split('\n').map(|l| l.chars().collect()).collect();
    let height = rows.len();
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);

    let cell = |r: usize, c: usize| rows[r].get(c).copied().unwrap_or(' ');

    // Output row r' is input column r' read bottom-to-top.
    (0..width)
        .map(|out_row| {
            (0..height)
                .map(|out_col| cell(height - 1 - out_col, out_row))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Footprint of `content` after `turns` clockwise quarter turns,
/// re-centered on a pivot given in fractional cell coordinates.
///
/// The new origin is `round(pivot - size / 2)` per axis. With a pivot
/// held fixed across calls this is exact: turns summing to 0 (mod 360°)
/// land back on the original origin.
#[must_use]
pub fn rotated_footprint(region: &CellRect, turns: u32, pivot: (f32, f32)) -> CellRect {
    let (width, height) = if turns % 2 == 0 {
        (region.width, region.height)
    } else {
        (region.height, region.width)
    };
    CellRect::new(
        (pivot.0 - width as f32 / 2.0).round() as i32,
        (pivot.1 - height as f32 / 2.0).round() as i32,
        width,
        height,
    )
}

/// Center of a cell footprint in fractional cell coordinates.
///
/// This is the default rotation pivot.
#[must_use]
pub fn footprint_center(region: &CellRect) -> (f32, f32) {
    (
        region.x as f32 + region.width as f32 / 2.0,
        region.y as f32 + region.height as f32 / 2.0,
    )
}

/// Rotate content by some clockwise quarter turns about a pivot.
#[must_use]
pub fn rotate_content(content: &SelectedContent, turns: u32, pivot: (f32, f32)) -> SelectedContent {
    let mut data = content.data.clone();
    for _ in 0..turns % 4 {
        data = rotate_block_cw(&data);
    }
    let region = rotated_footprint(&content.region, turns, pivot);
    SelectedContent {
        region,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_turns_quantization() {
        assert_eq!(quarter_turns(0), Some(0));
        assert_eq!(quarter_turns(90), Some(1));
        assert_eq!(quarter_turns(-90), Some(3));
        assert_eq!(quarter_turns(360), Some(0));
        assert_eq!(quarter_turns(-270), Some(1));
        assert_eq!(quarter_turns(45), None);
        assert_eq!(quarter_turns(91), None);
    }

    #[test]
    fn test_rotate_block_cw_rectangular() {
        assert_eq!(rotate_block_cw("ABC\nDEF"), "DA\nEB\nFC");
    }

    #[test]
    fn test_rotate_block_pads_ragged_rows() {
        assert_eq!(rotate_block_cw("AB\nC"), "CA\n B");
    }

    #[test]
    fn test_four_turns_are_identity() {
        let block = "ab \ncde\n f ";
        let mut data = block.to_string();
        for _ in 0..4 {
            data = rotate_block_cw(&data);
        }
        assert_eq!(data, block);
    }

    #[test]
    fn test_uniform_block_invariant_under_turn() {
        let c = SelectedContent::new(0, 0, "AAA\nAAA\nAAA");
        let pivot = footprint_center(&c.region);
        let turned = rotate_content(&c, 1, pivot);
        assert_eq!(turned, c);
    }

    #[test]
    fn test_fixed_pivot_round_trip_non_square() {
        // 3×2 block: a full 360° about a fixed pivot restores region
        // and data exactly, odd/even sizes included.
        let c = SelectedContent::new(0, 0, "ABC\nDEF");
        let pivot = footprint_center(&c.region);
        let mut turned = c.clone();
        for _ in 0..4 {
            turned = rotate_content(&turned, 1, pivot);
        }
        assert_eq!(turned, c);
    }

    #[test]
    fn test_cw_then_ccw_is_identity() {
        let c = SelectedContent::new(5, -2, "xy\nz.\n..");
        let pivot = footprint_center(&c.region);
        let there = rotate_content(&c, 1, pivot);
        let back = rotate_content(&there, 3, pivot);
        assert_eq!(back, c);
    }

    #[test]
    fn test_footprint_swaps_axes_on_odd_turns() {
        let region = CellRect::new(0, 0, 4, 2);
        let f = rotated_footprint(&region, 1, (2.0, 1.0));
        assert_eq!(f, CellRect::new(1, -1, 2, 4));
    }
}
