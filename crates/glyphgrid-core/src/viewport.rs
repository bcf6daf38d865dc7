#![forbid(unsafe_code)]

//! Camera capability: screen↔world coordinate conversion.
//!
//! The pan/zoom camera lives outside this engine. The mode machine only
//! needs the two conversions and the current scale (to size fixed
//! screen-pixel hitboxes in world units), so that is all the trait
//! exposes.

/// Coordinate provider for the active camera.
pub trait Viewport {
    /// Convert a screen point to world coordinates.
    fn screen_to_world(&self, x: f32, y: f32) -> (f32, f32);

    /// Convert a world point to screen coordinates.
    fn world_to_screen(&self, x: f32, y: f32) -> (f32, f32);

    /// Current zoom scale (screen units per world unit).
    fn scale(&self) -> f32;
}
