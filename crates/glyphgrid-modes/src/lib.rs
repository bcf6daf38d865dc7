#![forbid(unsafe_code)]

//! Interaction machine for GlyphGrid: modes, gestures, hit testing.
//!
//! # Role in GlyphGrid
//! The host shell translates platform input into
//! [`InputEvent`](glyphgrid_core::InputEvent)s and feeds them to a
//! [`ModeContext`]; this crate turns them into select-domain commands
//! at the right moments — marquee drags populate sessions, content
//! drags move and rotate them, Escape/Delete/Enter resolve them.
//!
//! # Primary responsibilities
//! - **Mode**: the six-state interaction FSM as an explicit value type
//!   with per-gesture state.
//! - **Dispatch**: the transition table, including journaling policy
//!   (live drags mutate, gesture ends record).
//! - **Hit testing**: corner handles, rotation bands, and the
//!   zoom-independent hitbox.

pub mod context;
pub mod hit;
pub mod mode;

pub use context::{ModeContext, ModeEnv};
pub use hit::{HANDLE_HITBOX_PX, HitZone, hit_test};
pub use mode::Mode;
