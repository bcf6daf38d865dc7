#![forbid(unsafe_code)]

//! Hit testing against a selected region.
//!
//! Handles live at the region's four corners, indexed clockwise from
//! the top-left:
//!
//! ```text
//!   0 ─────── 1
//!   │         │
//!   │interior │
//!   │         │
//!   3 ─────── 2
//! ```
//!
//! The hitbox is a fixed size on screen ([`HANDLE_HITBOX_PX`]); the
//! viewport scale converts it to world units, so handles stay
//! grabbable at any zoom. The rotation zone is a band just outside
//! each corner, beyond the resize box and outside the region, so the
//! three zones never overlap.

use glyphgrid_core::Rect;

/// Side length of a corner handle's hitbox, in screen pixels.
pub const HANDLE_HITBOX_PX: f32 = 8.0;

/// What a pointer-down over a selected region landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitZone {
    /// The rotation band outside corner `0..4`.
    RotationCorner(u8),
    /// The resize handle straddling corner `0..4`.
    ResizeHandle(u8),
    /// Inside the region, away from any handle.
    Interior,
    /// Outside the region and its handle zones.
    Outside,
}

/// World coordinates of a region's four corners, clockwise from
/// top-left.
#[must_use]
pub fn corners(region: &Rect) -> [(f32, f32); 4] {
    let r = region.normalized();
    [
        (r.start_x, r.start_y),
        (r.right(), r.start_y),
        (r.right(), r.bottom()),
        (r.start_x, r.bottom()),
    ]
}

/// Classify a world-space point against a selected region.
///
/// Zone order is rotation corner, then resize handle, then interior;
/// the zones are constructed disjoint so the order is a statement of
/// precedence, not a tie-break.
#[must_use]
pub fn hit_test(region: &Rect, x: f32, y: f32, scale: f32) -> HitZone {
    let half = HANDLE_HITBOX_PX / scale / 2.0;
    let corners = corners(region);
    let inside = region.contains(x, y);

    if !inside {
        for (i, (cx, cy)) in corners.iter().enumerate() {
            let d = (x - cx).abs().max((y - cy).abs());
            if d > half && d <= half * 3.0 {
                return HitZone::RotationCorner(i as u8);
            }
        }
    }
    for (i, (cx, cy)) in corners.iter().enumerate() {
        let d = (x - cx).abs().max((y - cy).abs());
        if d <= half {
            return HitZone::ResizeHandle(i as u8);
        }
    }
    if inside {
        HitZone::Interior
    } else {
        HitZone::Outside
    }
}

/// Corner index tracking a physical corner through one clockwise
/// quarter turn.
#[must_use]
pub const fn remap_corner_cw(corner: u8) -> u8 {
    (corner + 1) % 4
}

/// Corner index tracking a physical corner through one
/// counter-clockwise quarter turn.
#[must_use]
pub const fn remap_corner_ccw(corner: u8) -> u8 {
    (corner + 3) % 4
}

/// Corner diagonally opposite the given one.
///
/// The anchor a resize drag holds fixed.
#[must_use]
pub const fn opposite_corner(corner: u8) -> u8 {
    (corner + 2) % 4
}

#[cfg(test)]
mod tests {
    use super::*;

    // 20×20 world-unit region at scale 1.0: half-hitbox is 4.0.
    const REGION: Rect = Rect::new(0.0, 0.0, 20.0, 20.0);

    #[test]
    fn test_interior_away_from_handles() {
        assert_eq!(hit_test(&REGION, 10.0, 10.0, 1.0), HitZone::Interior);
    }

    #[test]
    fn test_resize_handles_clockwise_indexing() {
        assert_eq!(hit_test(&REGION, 0.0, 0.0, 1.0), HitZone::ResizeHandle(0));
        assert_eq!(hit_test(&REGION, 20.0, 0.5, 1.0), HitZone::ResizeHandle(1));
        assert_eq!(hit_test(&REGION, 20.0, 20.0, 1.0), HitZone::ResizeHandle(2));
        assert_eq!(hit_test(&REGION, 0.5, 20.0, 1.0), HitZone::ResizeHandle(3));
    }

    #[test]
    fn test_handle_straddles_corner_outside_region() {
        // Just outside the region but within the resize box.
        assert_eq!(hit_test(&REGION, -1.0, -1.0, 1.0), HitZone::ResizeHandle(0));
    }

    #[test]
    fn test_rotation_band_outside_corner() {
        // Outside the region, past the resize box, within the band.
        assert_eq!(
            hit_test(&REGION, -6.0, -6.0, 1.0),
            HitZone::RotationCorner(0)
        );
        assert_eq!(
            hit_test(&REGION, 26.0, -5.0, 1.0),
            HitZone::RotationCorner(1)
        );
        assert_eq!(
            hit_test(&REGION, 26.0, 26.0, 1.0),
            HitZone::RotationCorner(2)
        );
        assert_eq!(
            hit_test(&REGION, -6.0, 26.0, 1.0),
            HitZone::RotationCorner(3)
        );
    }

    #[test]
    fn test_outside_beyond_all_zones() {
        assert_eq!(hit_test(&REGION, 50.0, 50.0, 1.0), HitZone::Outside);
        assert_eq!(hit_test(&REGION, -13.0, 10.0, 1.0), HitZone::Outside);
    }

    #[test]
    fn test_scale_shrinks_world_hitbox() {
        // At scale 4.0 the half-hitbox is 1.0 world unit: a point 2
        // units in from the corner is no longer on the handle.
        assert_eq!(hit_test(&REGION, 2.0, 2.0, 4.0), HitZone::Interior);
        assert_eq!(hit_test(&REGION, 0.5, 0.5, 4.0), HitZone::ResizeHandle(0));
    }

    #[test]
    fn test_unnormalized_region_hits_like_normalized() {
        let flipped = Rect::new(20.0, 20.0, -20.0, -20.0);
        assert_eq!(hit_test(&flipped, 0.0, 0.0, 1.0), HitZone::ResizeHandle(0));
        assert_eq!(hit_test(&flipped, 10.0, 10.0, 1.0), HitZone::Interior);
    }

    #[test]
    fn test_corner_remap_round_trips() {
        for corner in 0..4u8 {
            assert_eq!(remap_corner_ccw(remap_corner_cw(corner)), corner);
            let mut c = corner;
            for _ in 0..4 {
                c = remap_corner_cw(c);
            }
            assert_eq!(c, corner);
        }
    }

    #[test]
    fn test_opposite_corner() {
        assert_eq!(opposite_corner(0), 2);
        assert_eq!(opposite_corner(1), 3);
        assert_eq!(opposite_corner(3), 1);
    }
}
