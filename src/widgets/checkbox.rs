//! CheckBox: a toggle drawn as a crossfading box with a side label.
//!
//! The checked mark fades in and out over the clear box instead of
//! swapping abruptly. Layout is driven by the box texture: the control
//! sizes itself to the box plus the padded text, and whichever of the two
//! is shorter gets centered against the taller one.

use crate::assets::{FontHandle, SoundHandle, TextureHandle};
use crate::color::Color;
use crate::config::{Semantic, Value};
use crate::context::UiContext;
use crate::control::Control;
use crate::event::ControlEvent;
use crate::geometry::{Point, Rect};
use crate::input::MouseButton;
use crate::kind::{ControlKind, CONTROL};
use crate::render::{Frame, TextMetrics};
use crate::tree::{ControlId, ControlTree};

use super::{apply_bindings, resolve_font, Behavior, Binding, PopulateScope};

pub static CHECKBOX: ControlKind = ControlKind {
    name: "CheckBox",
    base: Some(&CONTROL),
};

const TEXT_PADDING: i32 = 5;

pub struct CheckBox {
    pub checked_texture: Option<TextureHandle>,
    pub clear_texture: Option<TextureHandle>,
    /// Drawn instead of the normal pair while checking is disallowed;
    /// `None` falls back to the normal pair.
    pub disabled_checked_texture: Option<TextureHandle>,
    pub disabled_clear_texture: Option<TextureHandle>,
    pub check_sound: Option<SoundHandle>,
    pub hover_sound: Option<SoundHandle>,
    /// Mark crossfade speed in alpha per second.
    pub fade_rate: f32,
    pub text_padding: i32,
    pub idle_color: Option<Color>,
    pub highlight_color: Option<Color>,
    box_size: (i32, i32),
    text: String,
    font: Option<FontHandle>,
    checked: bool,
    checked_alpha: f32,
    allow_checking: bool,
    text_y: i32,
    needs_layout: bool,
    announce: bool,
}

static BINDINGS: &[Binding<CheckBox>] = &[
    Binding {
        property: "Checked",
        semantic: Semantic::Bool,
        apply: |checkbox, _, _, value| {
            if let Value::Bool(v) = value {
                checkbox.checked = v;
                // Configured state starts settled, not mid-fade.
                checkbox.checked_alpha = if v { 1.0 } else { 0.0 };
            }
        },
    },
    Binding {
        property: "AllowChecking",
        semantic: Semantic::Bool,
        apply: |checkbox, _, _, value| {
            if let Value::Bool(v) = value {
                checkbox.allow_checking = v;
            }
        },
    },
    Binding {
        property: "AlphaRate",
        semantic: Semantic::Float,
        apply: |checkbox, _, _, value| {
            if let Value::Float(v) = value {
                checkbox.fade_rate = v as f32;
            }
        },
    },
    Binding {
        property: "IdleColor",
        semantic: Semantic::Color,
        apply: |checkbox, _, _, value| {
            if let Value::Color(v) = value {
                checkbox.idle_color = Some(v);
            }
        },
    },
    Binding {
        property: "HighlightColor",
        semantic: Semantic::Color,
        apply: |checkbox, _, _, value| {
            if let Value::Color(v) = value {
                checkbox.highlight_color = Some(v);
            }
        },
    },
    Binding {
        property: "CheckedTexture",
        semantic: Semantic::Texture,
        apply: |checkbox, _, scope, value| {
            if let Value::Texture(spec) = value {
                let handle = scope.assets().texture(&spec);
                let (width, height) = scope.assets().texture_size(handle);
                checkbox.checked_texture = Some(handle);
                checkbox.box_size = (width as i32, height as i32);
            }
        },
    },
    Binding {
        property: "ClearTexture",
        semantic: Semantic::Texture,
        apply: |checkbox, _, scope, value| {
            if let Value::Texture(spec) = value {
                checkbox.clear_texture = Some(scope.assets().texture(&spec));
            }
        },
    },
    Binding {
        property: "DisabledCheckedTexture",
        semantic: Semantic::Texture,
        apply: |checkbox, _, scope, value| {
            if let Value::Texture(spec) = value {
                checkbox.disabled_checked_texture = Some(scope.assets().texture(&spec));
            }
        },
    },
    Binding {
        property: "DisabledClearTexture",
        semantic: Semantic::Texture,
        apply: |checkbox, _, scope, value| {
            if let Value::Texture(spec) = value {
                checkbox.disabled_clear_texture = Some(scope.assets().texture(&spec));
            }
        },
    },
];

impl CheckBox {
    pub fn new() -> Self {
        CheckBox {
            checked_texture: None,
            clear_texture: None,
            disabled_checked_texture: None,
            disabled_clear_texture: None,
            check_sound: None,
            hover_sound: None,
            fade_rate: 10.0,
            text_padding: TEXT_PADDING,
            idle_color: None,
            highlight_color: None,
            box_size: (0, 0),
            text: String::new(),
            font: None,
            checked: false,
            checked_alpha: 0.0,
            allow_checking: true,
            text_y: 0,
            needs_layout: false,
            announce: false,
        }
    }

    /// Sets the box pair with its logical size, which layout needs.
    pub fn with_box_textures(
        mut self,
        checked: TextureHandle,
        clear: TextureHandle,
        size: (i32, i32),
    ) -> Self {
        self.checked_texture = Some(checked);
        self.clear_texture = Some(clear);
        self.box_size = size;
        self
    }

    pub fn with_disabled_textures(mut self, checked: TextureHandle, clear: TextureHandle) -> Self {
        self.disabled_checked_texture = Some(checked);
        self.disabled_clear_texture = Some(clear);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_check_sound(mut self, sound: SoundHandle) -> Self {
        self.check_sound = Some(sound);
        self
    }

    pub fn with_hover_sound(mut self, sound: SoundHandle) -> Self {
        self.hover_sound = Some(sound);
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    /// Changes the state without a click; `CheckedChanged` fires on the
    /// next tick when this was an actual change.
    pub fn set_checked(&mut self, checked: bool) {
        if self.checked != checked {
            self.checked = checked;
            self.announce = true;
        }
    }

    pub fn allow_checking(&self) -> bool {
        self.allow_checking
    }

    /// A disallowed checkbox keeps its state, draws the disabled pair,
    /// and stays silent.
    pub fn set_allow_checking(&mut self, allow: bool) {
        self.allow_checking = allow;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Changes the label; the control re-sizes on the next tick.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.needs_layout = true;
    }

    /// The control size for the current box and text. Also records the
    /// text's vertical offset against the box; a negative offset means the
    /// text is the taller of the two.
    fn layout_size(&mut self, metrics: &dyn TextMetrics) -> Option<(i32, i32)> {
        self.checked_texture?;
        let (box_w, box_h) = self.box_size;
        if self.text.is_empty() {
            self.text_y = 0;
            return Some((box_w, box_h));
        }
        let font = self.font?;
        let (text_w, text_h) = metrics.measure(&self.text, font);
        self.text_y = (box_h - text_h) / 2 - 1;
        Some((box_w + self.text_padding + text_w, text_h.max(box_h)))
    }

    fn relayout(&mut self, tree: &mut ControlTree, id: ControlId, ctx: &mut UiContext) {
        if let Some((width, height)) = self.layout_size(ctx.metrics.as_ref()) {
            tree.set_size(id, width, height, ctx);
        }
    }
}

impl Default for CheckBox {
    fn default() -> Self {
        CheckBox::new()
    }
}

impl Behavior for CheckBox {
    fn kind(&self) -> &'static ControlKind {
        &CHECKBOX
    }

    fn init(&mut self, tree: &mut ControlTree, id: ControlId, ctx: &mut UiContext) {
        if self.font.is_none() {
            self.font = Some(ctx.assets.font(&ctx.theme.font, ctx.theme.font_size));
        }
        if self.checked {
            self.checked_alpha = 1.0;
        }
        self.relayout(tree, id, ctx);
    }

    fn update(&mut self, tree: &mut ControlTree, id: ControlId, ctx: &mut UiContext, dt: f32) {
        if self.needs_layout {
            self.relayout(tree, id, ctx);
            self.needs_layout = false;
        }
        if self.announce {
            self.announce = false;
            tree.fire(
                id,
                ctx,
                ControlEvent::CheckedChanged {
                    checked: self.checked,
                },
            );
        }
        let rate = self.fade_rate * dt;
        if self.checked {
            self.checked_alpha = (self.checked_alpha + rate).min(1.0);
        } else {
            self.checked_alpha = (self.checked_alpha - rate).max(0.0);
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
            ControlEvent::MouseEnter => {
                if self.allow_checking {
                    if let Some(sound) = self.hover_sound {
                        ctx.play_sound(sound);
                    }
                }
            }
            ControlEvent::Click {
                button: MouseButton::Left,
            }
            | ControlEvent::DoubleClick => {
                if self.allow_checking {
                    self.checked = !self.checked;
                    tree.fire(
                        id,
                        ctx,
                        ControlEvent::CheckedChanged {
                            checked: self.checked,
                        },
                    );
                    if let Some(sound) = self.check_sound {
                        ctx.play_sound(sound);
                    }
                }
            }
            _ => {}
        }
    }

    fn draw(&self, tree: &ControlTree, id: ControlId, ctx: &UiContext, frame: &mut Frame<'_>) {
        let control = tree.control(id);
        let alpha = control.alpha();
        let (clear, checked) = if self.allow_checking {
            (self.clear_texture, self.checked_texture)
        } else {
            (
                self.disabled_clear_texture.or(self.clear_texture),
                self.disabled_checked_texture.or(self.checked_texture),
            )
        };

        let (box_w, box_h) = self.box_size;
        // Text taller than the box pushes the box down instead.
        let (box_y, text_y) = if self.text_y < 0 {
            (-self.text_y, 0)
        } else {
            (0, self.text_y)
        };

        if let (Some(clear), Some(checked)) = (clear, checked) {
            let dest = Rect::new(0, box_y, box_w, box_h);
            if self.checked_alpha <= 0.0 {
                frame.draw_texture(clear, dest, Color::WHITE.mul_alpha(alpha));
            } else if self.checked_alpha >= 1.0 {
                frame.draw_texture(checked, dest, Color::WHITE.mul_alpha(alpha));
            } else {
                frame.draw_texture(clear, dest, Color::WHITE.mul_alpha(alpha));
                frame.draw_texture(
                    checked,
                    dest,
                    Color::WHITE.mul_alpha(self.checked_alpha).mul_alpha(alpha),
                );
            }
        }

        if self.text.is_empty() {
            return;
        }
        let Some(font) = self.font else {
            return;
        };
        let color = if !self.allow_checking {
            ctx.theme.text_disabled
        } else if control.is_active() {
            self.highlight_color.unwrap_or(ctx.theme.text_hover)
        } else {
            self.idle_color.unwrap_or(ctx.theme.text_idle)
        };
        frame.draw_text_shadowed(
            &self.text,
            font,
            Point::new(box_w + self.text_padding, text_y),
            color,
        );
    }

    fn populate(&mut self, control: &mut Control, scope: &mut PopulateScope<'_>) {
        apply_bindings(self, BINDINGS, control, scope);
        if let Some(text) = scope.locale("Text") {
            self.text = text.to_string();
        }
        self.font = Some(resolve_font(scope));
        if let Some((width, height)) = self.layout_size(scope.metrics) {
            control.area.width = width;
            control.area.height = height;
        }
    }
}
