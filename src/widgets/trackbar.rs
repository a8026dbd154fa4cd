//! Trackbar: a draggable value slider on a panel body.
//!
//! The track is a full panel (background, border, fade), with a thumb
//! texture drawn on top. Pressing anywhere on the track jumps the value to
//! the notch under the cursor and starts a drag; the drag keeps following
//! the cursor until the button is released, even outside the control.

use log::warn;

use crate::assets::{SoundHandle, TextureHandle, PLACEHOLDER_TEXTURE};
use crate::color::Color;
use crate::config::{Semantic, Value};
use crate::context::UiContext;
use crate::control::Control;
use crate::event::ControlEvent;
use crate::geometry::Rect;
use crate::input::MouseButton;
use crate::kind::ControlKind;
use crate::render::Frame;
use crate::tree::{ControlId, ControlTree};

use super::panel::PANEL;
use super::{apply_bindings, Behavior, Binding, Panel, PopulateScope};

pub static TRACKBAR: ControlKind = ControlKind {
    name: "Trackbar",
    base: Some(&PANEL),
};

pub struct Trackbar {
    /// The track body; its configuration falls through the kind chain.
    pub panel: Panel,
    pub click_sound: Option<SoundHandle>,
    pub thumb: Option<TextureHandle>,
    thumb_size: (i32, i32),
    min: i32,
    max: i32,
    value: i32,
    held: bool,
    announce: bool,
}

static BINDINGS: &[Binding<Trackbar>] = &[
    Binding {
        property: "MinValue",
        semantic: Semantic::Int,
        apply: |trackbar, _, _, value| {
            if let Value::Int(v) = value {
                trackbar.min = v as i32;
            }
        },
    },
    Binding {
        property: "MaxValue",
        semantic: Semantic::Int,
        apply: |trackbar, _, _, value| {
            if let Value::Int(v) = value {
                trackbar.max = v as i32;
            }
        },
    },
    // After the range, so the configured value clamps against it.
    Binding {
        property: "Value",
        semantic: Semantic::Int,
        apply: |trackbar, _, _, value| {
            if let Value::Int(v) = value {
                trackbar.value = trackbar.clamp(v as i32);
            }
        },
    },
    Binding {
        property: "ClickSound",
        semantic: Semantic::Sound,
        apply: |trackbar, _, scope, value| {
            if let Value::Sound(name) = value {
                trackbar.click_sound = scope.assets().sound(&name);
            }
        },
    },
    Binding {
        property: "ButtonTexture",
        semantic: Semantic::Texture,
        apply: |trackbar, control, scope, value| {
            if let Value::Texture(spec) = value {
                let handle = scope.assets().texture(&spec);
                let (width, height) = scope.assets().texture_size(handle);
                trackbar.thumb = Some(handle);
                trackbar.thumb_size = (width as i32, height as i32);
                if control.area().height == 0 {
                    control.area.height = height as i32;
                }
            }
        },
    },
];

impl Trackbar {
    pub fn new() -> Self {
        Trackbar {
            panel: Panel::new(),
            click_sound: None,
            thumb: None,
            thumb_size: (0, 0),
            min: 0,
            max: 10,
            value: 0,
            held: false,
            announce: false,
        }
    }

    pub fn with_range(mut self, min: i32, max: i32) -> Self {
        self.min = min;
        self.max = max;
        self.value = self.clamp(self.value);
        self
    }

    pub fn with_value(mut self, value: i32) -> Self {
        self.value = self.clamp(value);
        self
    }

    /// Sets the thumb with its logical size, which positioning needs.
    pub fn with_thumb(mut self, texture: TextureHandle, size: (i32, i32)) -> Self {
        self.thumb = Some(texture);
        self.thumb_size = size;
        self
    }

    pub fn with_click_sound(mut self, sound: SoundHandle) -> Self {
        self.click_sound = Some(sound);
        self
    }

    pub fn with_panel(mut self, panel: Panel) -> Self {
        self.panel = panel;
        self
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    /// Changes the value without a click; `ValueChanged` fires on the next
    /// tick when the clamped value actually changed.
    pub fn set_value(&mut self, value: i32) {
        let clamped = self.clamp(value);
        if clamped != self.value {
            self.value = clamped;
            self.announce = true;
        }
    }

    pub fn set_range(&mut self, min: i32, max: i32) {
        self.min = min;
        self.max = max;
        let clamped = self.clamp(self.value);
        if clamped != self.value {
            self.value = clamped;
            self.announce = true;
        }
    }

    // max wins over min if the range is inverted; never panics.
    fn clamp(&self, value: i32) -> i32 {
        value.max(self.min).min(self.max)
    }

    /// Commits a new value with the click sound and `ValueChanged`.
    fn commit(&mut self, tree: &mut ControlTree, id: ControlId, ctx: &mut UiContext, value: i32) {
        let value = self.clamp(value);
        if value == self.value {
            return;
        }
        if let Some(sound) = self.click_sound {
            ctx.play_sound(sound);
        }
        self.value = value;
        tree.fire(id, ctx, ControlEvent::ValueChanged { value });
    }

    /// The notch under the cursor: the track divides into one column per
    /// value, and the cursor's column wins. Off the left end pins to the
    /// minimum, off the right end to the maximum.
    fn scroll_to_cursor(&mut self, tree: &mut ControlTree, id: ControlId, ctx: &mut UiContext) {
        if self.max < self.min {
            return;
        }
        let x_offset = tree.local_cursor(id, ctx.cursor.position).x;
        let width = tree.control(id).area().width;
        let tab_count = self.max - self.min + 1;
        let pixels_per_tab = width / tab_count;

        let mut current = 0;
        for i in 0..=tab_count {
            if i * pixels_per_tab < x_offset {
                current = i;
            } else {
                self.commit(tree, id, ctx, current + self.min);
                return;
            }
        }
        self.commit(tree, id, ctx, self.max);
    }
}

impl Default for Trackbar {
    fn default() -> Self {
        Trackbar::new()
    }
}

impl Behavior for Trackbar {
    fn kind(&self) -> &'static ControlKind {
        &TRACKBAR
    }

    fn init(&mut self, tree: &mut ControlTree, id: ControlId, ctx: &mut UiContext) {
        if self.thumb.is_none() {
            warn!("trackbar has no thumb texture, using the placeholder");
            let (width, height) = ctx.assets.texture_size(PLACEHOLDER_TEXTURE);
            self.thumb = Some(PLACEHOLDER_TEXTURE);
            self.thumb_size = (width as i32, height as i32);
        }
        self.panel.init(tree, id, ctx);
    }

    fn update(&mut self, tree: &mut ControlTree, id: ControlId, ctx: &mut UiContext, dt: f32) {
        self.panel.update(tree, id, ctx, dt);
        if self.announce {
            self.announce = false;
            tree.fire(id, ctx, ControlEvent::ValueChanged { value: self.value });
        }
        if self.held {
            if !ctx.cursor.left_down {
                self.held = false;
                return;
            }
            self.scroll_to_cursor(tree, id, ctx);
        }
    }

    fn on_event(
        &mut self,
        tree: &mut ControlTree,
        id: ControlId,
        ctx: &mut UiContext,
        event: &ControlEvent,
    ) {
        match event {
            ControlEvent::Pressed {
                button: MouseButton::Left,
            } => {
                self.held = true;
                tree.select(Some(id), ctx);
            }
            ControlEvent::Click {
                button: MouseButton::Left,
            }
            | ControlEvent::DoubleClick => {
                self.held = true;
                self.scroll_to_cursor(tree, id, ctx);
            }
            ControlEvent::Scroll { delta } => {
                let target = self.value + delta;
                self.commit(tree, id, ctx, target);
            }
            _ => {}
        }
    }

    fn draw(&self, tree: &ControlTree, id: ControlId, ctx: &UiContext, frame: &mut Frame<'_>) {
        self.panel.draw(tree, id, ctx, frame);
    }

    fn draw_overlay(&self, tree: &ControlTree, id: ControlId, ctx: &UiContext, frame: &mut Frame<'_>) {
        self.panel.draw_overlay(tree, id, ctx, frame);

        let Some(thumb) = self.thumb else {
            return;
        };
        let control = tree.control(id);
        let area = control.area();
        let (thumb_w, _) = self.thumb_size;
        let tabs = (self.max - self.min).max(1);
        let pixels_per_tab = (area.width - thumb_w) / tabs;
        let x = (self.value - self.min) * pixels_per_tab;
        frame.draw_texture(
            thumb,
            Rect::new(x, 0, thumb_w, area.height),
            Color::WHITE.mul_alpha(control.alpha()),
        );
    }

    fn populate(&mut self, control: &mut Control, scope: &mut PopulateScope<'_>) {
        self.panel.populate(control, scope);
        apply_bindings(self, BINDINGS, control, scope);
    }
}
