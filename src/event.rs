//! Control events and observers.
//!
//! Events are dispatched from inside the update traversal. For each event
//! the control's behavior hook runs first, then the external observers in
//! subscription order. Observers are notifications only; code that needs to
//! mutate the tree in response schedules a callback instead (see
//! [`crate::callback`]).

use crate::geometry::{Point, Rect};
use crate::input::MouseButton;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    /// One-time initialization completed.
    Initialized,
    MouseEnter,
    MouseLeave,
    /// Cursor moved while on the control.
    MouseMove { position: Point },
    /// Fired every tick the cursor spends on the control.
    MouseOnControl,
    /// Button down-edge on the control.
    Pressed { button: MouseButton },
    /// Button up-edge completing a press that began on the control.
    Click { button: MouseButton },
    /// Second left click within the double-click window; replaces the
    /// `Click` it would otherwise have been.
    DoubleClick,
    /// Wheel steps while on the control; positive scrolls up.
    Scroll { delta: i32 },
    /// Global selection moved onto (`true`) or off (`false`) this control.
    SelectedChanged { selected: bool },
    /// Position or size changed.
    AreaChanged { area: Rect },
    UpdateOrderChanged,
    DrawOrderChanged,
    /// Trackbar value committed.
    ValueChanged { value: i32 },
    /// Checkbox toggled.
    CheckedChanged { checked: bool },
}

/// External per-control event observer.
pub type Observer = Box<dyn FnMut(&ControlEvent)>;
