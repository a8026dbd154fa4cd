//! Per-control state.
//!
//! A [`Control`] is the engine-owned half of a tree node: identity,
//! geometry, flags, render mode, input bookkeeping, observers, and the
//! cross-thread callback queue. The widget-specific half is the behavior
//! object stored next to it (see [`crate::widgets::Behavior`]).
//!
//! Plain visual state has setters here; anything with structural or
//! surface side effects (size, orders, visibility, scale, draw mode) goes
//! through [`crate::tree::ControlTree`] so the side effects happen in one
//! place.

use std::sync::{Arc, Mutex};

use bitflags::bitflags;

use crate::callback::CallbackQueue;
use crate::color::Color;
use crate::event::{ControlEvent, Observer};
use crate::geometry::Rect;
use crate::input::CursorIcon;
use crate::kind::{ControlKind, CONTROL};
use crate::render::SurfaceId;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ControlFlags: u16 {
        const VISIBLE            = 1 << 0;
        const ENABLED            = 1 << 1;
        const INPUT_ENABLED      = 1 << 2;
        /// Counts as hit in active-child selection regardless of hover.
        const FOCUSED            = 1 << 3;
        /// Part of the active branch this tick.
        const ACTIVE             = 1 << 4;
        /// Top-level for input and draw while keeping its parent link.
        const DETACHED           = 1 << 5;
        const KILLED             = 1 << 6;
        const INITIALIZED        = 1 << 7;
        /// Suppresses surface recreation during batched size changes.
        const CHANGING_SIZE      = 1 << 8;
        /// Skips input for this subtree for one tick, then self-clears.
        const IGNORE_INPUT_FRAME = 1 << 9;
        /// A child consumed input this tick; read one level up only.
        const CHILD_HANDLED_INPUT = 1 << 10;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    /// Draw into whatever target the parent chain established.
    Direct,
    /// Draw into a private surface, composited with scaling.
    Surface,
}

/// A live private surface and the logical size it was created at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ControlSurface {
    pub id: SurfaceId,
    pub width: i32,
    pub height: i32,
}

pub struct Control {
    pub(crate) name: Option<String>,
    /// Stamped from the behavior's declared kind at registration.
    pub(crate) kind: &'static ControlKind,
    pub(crate) area: Rect,
    pub(crate) flags: ControlFlags,
    pub(crate) update_order: i32,
    pub(crate) draw_order: i32,
    pub(crate) draw_mode: DrawMode,
    pub(crate) scale: i32,
    /// Scale captured at init; lowering below it afterwards is a usage
    /// error.
    pub(crate) init_scale: i32,
    pub(crate) alpha: f32,
    pub(crate) remap_color: Color,
    pub(crate) cursor_icon: Option<CursorIcon>,
    pub(crate) surface: Option<ControlSurface>,
    pub(crate) hovered: bool,
    pub(crate) left_press_began: bool,
    pub(crate) right_press_began: bool,
    pub(crate) seconds_since_click: f32,
    pub(crate) callbacks: Arc<Mutex<CallbackQueue>>,
    pub(crate) observers: Vec<Observer>,
}

impl Control {
    pub fn new() -> Self {
        Control {
            name: None,
            kind: &CONTROL,
            area: Rect::default(),
            flags: ControlFlags::VISIBLE | ControlFlags::ENABLED | ControlFlags::INPUT_ENABLED,
            update_order: 0,
            draw_order: 0,
            draw_mode: DrawMode::Direct,
            scale: 1,
            init_scale: 1,
            alpha: 1.0,
            remap_color: Color::WHITE,
            cursor_icon: None,
            surface: None,
            hovered: false,
            left_press_began: false,
            right_press_began: false,
            // Far past the double-click window.
            seconds_since_click: f32::MAX,
            callbacks: Arc::new(Mutex::new(CallbackQueue::default())),
            observers: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.area.x = x;
        self.area.y = y;
        self
    }

    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.area.width = width;
        self.area.height = height;
        self
    }

    pub fn with_area(mut self, area: Rect) -> Self {
        self.area = area;
        self
    }

    pub fn with_draw_mode(mut self, mode: DrawMode) -> Self {
        self.draw_mode = mode;
        self
    }

    /// Scaling requires a private surface; set the draw mode first.
    ///
    /// # Panics
    ///
    /// If the factor is below 1 or the control draws directly.
    pub fn with_scale(mut self, scale: i32) -> Self {
        assert!(scale >= 1, "scale factor must be at least 1");
        assert!(
            self.draw_mode == DrawMode::Surface,
            "scaling requires DrawMode::Surface"
        );
        self.scale = scale;
        self
    }

    pub fn with_update_order(mut self, order: i32) -> Self {
        self.update_order = order;
        self
    }

    pub fn with_draw_order(mut self, order: i32) -> Self {
        self.draw_order = order;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.flags.set(ControlFlags::VISIBLE, visible);
        self
    }

    pub fn with_input_enabled(mut self, enabled: bool) -> Self {
        self.flags.set(ControlFlags::INPUT_ENABLED, enabled);
        self
    }

    pub fn with_cursor_icon(mut self, icon: CursorIcon) -> Self {
        self.cursor_icon = Some(icon);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> &'static ControlKind {
        self.kind
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn flags(&self) -> ControlFlags {
        self.flags
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(ControlFlags::VISIBLE)
    }

    pub fn is_enabled(&self) -> bool {
        self.flags.contains(ControlFlags::ENABLED)
    }

    pub fn is_input_enabled(&self) -> bool {
        self.flags.contains(ControlFlags::INPUT_ENABLED)
    }

    pub fn is_focused(&self) -> bool {
        self.flags.contains(ControlFlags::FOCUSED)
    }

    /// Whether the control sits on the active input branch this tick.
    pub fn is_active(&self) -> bool {
        self.flags.contains(ControlFlags::ACTIVE)
    }

    pub fn is_detached(&self) -> bool {
        self.flags.contains(ControlFlags::DETACHED)
    }

    pub fn is_killed(&self) -> bool {
        self.flags.contains(ControlFlags::KILLED)
    }

    pub fn is_initialized(&self) -> bool {
        self.flags.contains(ControlFlags::INITIALIZED)
    }

    /// Whether the cursor was on the control last tick.
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn update_order(&self) -> i32 {
        self.update_order
    }

    pub fn draw_order(&self) -> i32 {
        self.draw_order
    }

    pub fn remap_color(&self) -> Color {
        self.remap_color
    }

    pub fn cursor_icon(&self) -> Option<CursorIcon> {
        self.cursor_icon
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn set_remap_color(&mut self, color: Color) {
        self.remap_color = color;
    }

    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.flags.set(ControlFlags::INPUT_ENABLED, enabled);
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.flags.set(ControlFlags::FOCUSED, focused);
    }

    pub fn set_cursor_icon(&mut self, icon: Option<CursorIcon>) {
        self.cursor_icon = icon;
    }

    /// Swallows input for this subtree on the next tick.
    pub fn ignore_input_this_frame(&mut self) {
        self.flags.insert(ControlFlags::IGNORE_INPUT_FRAME);
    }

    /// Registers an observer; dispatch order is subscription order.
    pub fn observe(&mut self, observer: impl FnMut(&ControlEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Runs the external observers. The behavior hook is dispatched by the
    /// tree before this.
    pub(crate) fn notify_observers(&mut self, event: &ControlEvent) {
        for observer in &mut self.observers {
            observer(event);
        }
    }
}

impl Default for Control {
    fn default() -> Self {
        Self::new()
    }
}
