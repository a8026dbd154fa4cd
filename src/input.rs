//! Per-tick input snapshots.
//!
//! The host owns the platform event loop and condenses it into these
//! snapshots before each `ControlTree::update`. Edge flags (pressed /
//! released / clicked) are relative to the previous tick; [`CursorState::step`]
//! derives them when the host only tracks held state.

use crate::geometry::Point;

/// Cursor snapshot for one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorState {
    pub position: Point,
    /// False while the pointer is outside the window; nothing hit-tests.
    pub on_screen: bool,
    /// Whether the position changed since the previous tick.
    pub moved: bool,
    /// Held state of the primary button.
    pub left_down: bool,
    pub right_down: bool,
    /// Down edges this tick.
    pub left_pressed: bool,
    pub right_pressed: bool,
    /// Up edges this tick.
    pub left_released: bool,
    pub right_released: bool,
    /// Wheel steps this tick; positive scrolls up.
    pub wheel: i32,
}

impl CursorState {
    /// Builds the next snapshot from held state, deriving edges against the
    /// previous one.
    pub fn step(
        previous: &CursorState,
        position: Point,
        on_screen: bool,
        left_down: bool,
        right_down: bool,
        wheel: i32,
    ) -> CursorState {
        CursorState {
            position,
            on_screen,
            moved: position != previous.position,
            left_down,
            right_down,
            left_pressed: left_down && !previous.left_down,
            right_pressed: right_down && !previous.right_down,
            left_released: !left_down && previous.left_down,
            right_released: !right_down && previous.right_down,
            wheel,
        }
    }

    pub fn down(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left_down,
            MouseButton::Right => self.right_down,
        }
    }

    pub fn pressed(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left_pressed,
            MouseButton::Right => self.right_pressed,
        }
    }

    pub fn released(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left_released,
            MouseButton::Right => self.right_released,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub logo: bool,
}

/// Named keys for hotkeys and special handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    /// Function keys F1..=F12.
    F(u8),
    /// Character input (includes A-Z for hotkeys).
    Char(char),
}

/// Keyboard snapshot for one tick: the keys that went down plus modifiers.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    pressed: Vec<Key>,
    pub modifiers: Modifiers,
}

impl KeyboardState {
    pub fn press(&mut self, key: Key) {
        self.pressed.push(key);
    }

    pub fn was_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    pub fn pressed(&self) -> &[Key] {
        &self.pressed
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
        self.modifiers = Modifiers::default();
    }
}

/// Standard cursor icons a hovered control may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorIcon {
    /// The default arrow cursor.
    #[default]
    Default,
    /// Text selection cursor (I-beam).
    Text,
    /// Pointer/hand cursor for clickable elements.
    Pointer,
    /// Crosshair cursor.
    Crosshair,
    /// Move/drag cursor.
    Move,
    /// Not allowed cursor.
    NotAllowed,
    /// Grab cursor (open hand).
    Grab,
    /// Grabbing cursor (closed hand).
    Grabbing,
}
