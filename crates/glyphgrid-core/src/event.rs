#![forbid(unsafe_code)]

//! Canonical input event types.
//!
//! The interaction machine consumes these instead of platform-level
//! pointer/keyboard events; the host shell is responsible for the
//! translation. Pointer coordinates are **screen** units — the mode
//! machine converts them to world units through the active
//! [`Viewport`](crate::viewport::Viewport).
//!
//! All events derive `Clone` and `PartialEq` for use in tests and
//! pattern matching.

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE = 0;
        /// Shift key.
        const SHIFT = 1 << 0;
        /// Control key.
        const CTRL = 1 << 1;
        /// Alt/Option key.
        const ALT = 1 << 2;
        /// Super/Command/Windows key.
        const SUPER = 1 << 3;
    }
}

/// Pointer button involved in a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    /// Primary (usually left) button.
    #[default]
    Primary,
    /// Secondary (usually right) button.
    Secondary,
    /// Middle button.
    Middle,
}

/// A pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Screen X.
    pub x: f32,
    /// Screen Y.
    pub y: f32,
    /// Button involved (for move events: the button held, if any).
    pub button: PointerButton,
    /// Modifier keys held.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Create a primary-button pointer event with no modifiers.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }
}

/// Key codes the interaction machine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// Escape key.
    Escape,
    /// Forward delete.
    Delete,
    /// Backspace.
    Backspace,
    /// Enter/Return.
    Enter,
    /// A printable character.
    Char(char),
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key that was pressed.
    pub code: KeyCode,
    /// Modifier keys held.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a key event with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }
}

/// Canonical input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer button pressed.
    PointerDown(PointerEvent),
    /// Pointer moved (button may or may not be held).
    PointerMove(PointerEvent),
    /// Pointer button released.
    PointerUp(PointerEvent),
    /// Key pressed.
    Key(KeyEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_event_defaults() {
        let ev = PointerEvent::new(3.0, 4.0);
        assert_eq!(ev.button, PointerButton::Primary);
        assert_eq!(ev.modifiers, Modifiers::NONE);
    }

    #[test]
    fn test_modifiers_combine() {
        let mods = Modifiers::SHIFT | Modifiers::CTRL;
        assert!(mods.contains(Modifiers::SHIFT));
        assert!(!mods.contains(Modifiers::ALT));
    }

    #[test]
    fn test_key_event_pattern_match() {
        let ev = InputEvent::Key(KeyEvent::new(KeyCode::Escape));
        assert!(matches!(
            ev,
            InputEvent::Key(KeyEvent {
                code: KeyCode::Escape,
                ..
            })
        ));
    }
}
