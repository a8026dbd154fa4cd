//! The shared context threaded through update, draw, and populate.
//!
//! Everything toolkits of this kind usually reach for through
//! singletons lives here instead: the config resolver, the collaborator
//! trait objects, input snapshots, the frame clock, theme defaults, and
//! the globally selected control. The host owns it and passes `&mut` into
//! the tree once per tick.

use crate::assets::{AssetLoader, SoundHandle};
use crate::color::Color;
use crate::config::ConfigResolver;
use crate::input::{CursorIcon, CursorState, KeyboardState};
use crate::render::TextMetrics;
use crate::strings::StringSource;
use crate::tree::ControlId;

/// Compiled-in defaults for properties configuration leaves unset.
#[derive(Debug, Clone)]
pub struct Theme {
    pub text_idle: Color,
    pub text_hover: Color,
    pub text_disabled: Color,
    pub panel_border: Color,
    pub font: String,
    pub font_size: u32,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            text_idle: Color::WHITE,
            text_hover: Color::rgb(255, 255, 160),
            text_disabled: Color::rgb(128, 128, 128),
            panel_border: Color::WHITE,
            font: "default".to_string(),
            font_size: 14,
        }
    }
}

/// Frame timing: seconds since the previous tick plus a running total.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickClock {
    pub delta: f32,
    pub total: f64,
}

impl TickClock {
    pub fn advance(&mut self, delta: f32) {
        self.delta = delta;
        self.total += delta as f64;
    }
}

pub struct UiContext {
    pub resolver: ConfigResolver,
    pub assets: Box<dyn AssetLoader>,
    pub strings: Box<dyn StringSource>,
    pub metrics: Box<dyn TextMetrics>,
    pub theme: Theme,
    pub cursor: CursorState,
    pub keyboard: KeyboardState,
    pub clock: TickClock,
    selected: Option<ControlId>,
    hot: Option<ControlId>,
    cursor_icon: Option<CursorIcon>,
    sounds: Vec<SoundHandle>,
}

impl UiContext {
    pub fn new(
        resolver: ConfigResolver,
        assets: Box<dyn AssetLoader>,
        strings: Box<dyn StringSource>,
        metrics: Box<dyn TextMetrics>,
    ) -> Self {
        UiContext {
            resolver,
            assets,
            strings,
            metrics,
            theme: Theme::default(),
            cursor: CursorState::default(),
            keyboard: KeyboardState::default(),
            clock: TickClock::default(),
            selected: None,
            hot: None,
            cursor_icon: None,
            sounds: Vec::new(),
        }
    }

    /// Installs the new tick's input snapshots and advances the clock.
    /// Call once before `ControlTree::update`.
    pub fn begin_tick(&mut self, delta: f32, cursor: CursorState, keyboard: KeyboardState) {
        self.clock.advance(delta);
        self.cursor = cursor;
        self.keyboard = keyboard;
        self.hot = None;
        self.cursor_icon = None;
    }

    /// The globally selected control, last to take a click.
    pub fn selected(&self) -> Option<ControlId> {
        self.selected
    }

    pub(crate) fn set_selected(&mut self, id: Option<ControlId>) {
        self.selected = id;
    }

    /// The deepest control the active branch reached this tick.
    pub fn hot(&self) -> Option<ControlId> {
        self.hot
    }

    pub(crate) fn note_hot(&mut self, id: ControlId) {
        self.hot = Some(id);
    }

    /// The cursor icon the hovered control asked for this tick, if any.
    pub fn requested_cursor_icon(&self) -> Option<CursorIcon> {
        self.cursor_icon
    }

    pub(crate) fn request_cursor_icon(&mut self, icon: CursorIcon) {
        self.cursor_icon = Some(icon);
    }

    /// Queues a sound for the host to start after this update.
    pub fn play_sound(&mut self, sound: SoundHandle) {
        self.sounds.push(sound);
    }

    /// Drains the sounds queued since the last call.
    pub fn take_sounds(&mut self) -> Vec<SoundHandle> {
        std::mem::take(&mut self.sounds)
    }
}
