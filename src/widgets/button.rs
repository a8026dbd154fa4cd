//! Button: idle/hover textures with an alpha crossfade.
//!
//! Hovering snaps the two texture alphas to a midpoint and then fades
//! them the rest of the way each tick, so fast pointer passes still read
//! as a highlight. Text is centered adaptively; when it is wider than the
//! button it centers negatively and overhangs both sides evenly.

use crate::assets::{FontHandle, SoundHandle, TextureHandle};
use crate::color::Color;
use crate::config::{Semantic, Value};
use crate::context::UiContext;
use crate::control::Control;
use crate::event::ControlEvent;
use crate::geometry::{Point, Rect};
use crate::input::{Key, MouseButton};
use crate::kind::{ControlKind, CONTROL};
use crate::render::{Frame, TextMetrics};
use crate::tree::{ControlId, ControlTree};

use super::{apply_bindings, resolve_font, Behavior, Binding, PopulateScope};

pub static BUTTON: ControlKind = ControlKind {
    name: "Button",
    base: Some(&CONTROL),
};

/// Which way the texture crossfade is heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fade {
    /// Toward the hover texture.
    Highlight,
    /// Back toward the idle texture.
    Return,
}

pub struct Button {
    pub idle: Option<TextureHandle>,
    pub hover: Option<TextureHandle>,
    pub hover_sound: Option<SoundHandle>,
    pub click_sound: Option<SoundHandle>,
    /// Crossfade speed in alpha per second.
    pub fade_rate: f32,
    pub hotkey: Option<Key>,
    pub text_color_idle: Option<Color>,
    pub text_color_hover: Option<Color>,
    pub text_color_disabled: Option<Color>,
    pub adaptive_text: bool,
    text: String,
    font: Option<FontHandle>,
    text_x: i32,
    text_y: i32,
    needs_placement: bool,
    idle_alpha: f32,
    hover_alpha: f32,
    fade: Fade,
    cursor_on: bool,
    hover_colored: bool,
    allow_click: bool,
}

static BINDINGS: &[Binding<Button>] = &[
    Binding {
        property: "Text",
        semantic: Semantic::Text,
        apply: |button, _, _, value| {
            if let Value::Text(v) = value {
                button.text = v;
            }
        },
    },
    Binding {
        property: "TextColorIdle",
        semantic: Semantic::Color,
        apply: |button, _, _, value| {
            if let Value::Color(v) = value {
                button.text_color_idle = Some(v);
            }
        },
    },
    Binding {
        property: "TextColorHover",
        semantic: Semantic::Color,
        apply: |button, _, _, value| {
            if let Value::Color(v) = value {
                button.text_color_hover = Some(v);
            }
        },
    },
    Binding {
        property: "TextColorDisabled",
        semantic: Semantic::Color,
        apply: |button, _, _, value| {
            if let Value::Color(v) = value {
                button.text_color_disabled = Some(v);
            }
        },
    },
    Binding {
        property: "HoverSoundEffect",
        semantic: Semantic::Sound,
        apply: |button, _, scope, value| {
            if let Value::Sound(name) = value {
                button.hover_sound = scope.assets().sound(&name);
            }
        },
    },
    Binding {
        property: "ClickSoundEffect",
        semantic: Semantic::Sound,
        apply: |button, _, scope, value| {
            if let Value::Sound(name) = value {
                button.click_sound = scope.assets().sound(&name);
            }
        },
    },
    Binding {
        property: "AdaptiveText",
        semantic: Semantic::Bool,
        apply: |button, _, _, value| {
            if let Value::Bool(v) = value {
                button.adaptive_text = v;
            }
        },
    },
    Binding {
        property: "AlphaRate",
        semantic: Semantic::Float,
        apply: |button, _, _, value| {
            if let Value::Float(v) = value {
                button.fade_rate = v as f32;
            }
        },
    },
    Binding {
        property: "IdleTexture",
        semantic: Semantic::Texture,
        apply: |button, control, scope, value| {
            if let Value::Texture(spec) = value {
                let handle = scope.assets().texture(&spec);
                button.idle = Some(handle);
                // A button without an explicit size takes the texture's.
                if control.area().width == 0 && control.area().height == 0 {
                    let (width, height) = scope.assets().texture_size(handle);
                    control.area.width = width as i32;
                    control.area.height = height as i32;
                }
            }
        },
    },
    Binding {
        property: "HoverTexture",
        semantic: Semantic::Texture,
        apply: |button, _, scope, value| {
            if let Value::Texture(spec) = value {
                button.hover = Some(scope.assets().texture(&spec));
            }
        },
    },
];

impl Button {
    pub fn new() -> Self {
        Button {
            idle: None,
            hover: None,
            hover_sound: None,
            click_sound: None,
            fade_rate: 1.0,
            hotkey: None,
            text_color_idle: None,
            text_color_hover: None,
            text_color_disabled: None,
            adaptive_text: true,
            text: String::new(),
            font: None,
            text_x: 0,
            text_y: 0,
            needs_placement: false,
            idle_alpha: 1.0,
            hover_alpha: 0.0,
            fade: Fade::Return,
            cursor_on: false,
            hover_colored: false,
            allow_click: true,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_idle_texture(mut self, texture: TextureHandle) -> Self {
        self.idle = Some(texture);
        self
    }

    pub fn with_hover_texture(mut self, texture: TextureHandle) -> Self {
        self.hover = Some(texture);
        self
    }

    pub fn with_hover_sound(mut self, sound: SoundHandle) -> Self {
        self.hover_sound = Some(sound);
        self
    }

    pub fn with_click_sound(mut self, sound: SoundHandle) -> Self {
        self.click_sound = Some(sound);
        self
    }

    /// Fires the click path when this key goes down while the parent is
    /// on the active branch.
    pub fn with_hotkey(mut self, key: Key) -> Self {
        self.hotkey = Some(key);
        self
    }

    pub fn with_fade_rate(mut self, rate: f32) -> Self {
        self.fade_rate = rate;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Changes the label; the text is re-centered on the next tick.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.needs_placement = true;
    }

    pub fn allow_click(&self) -> bool {
        self.allow_click
    }

    /// A disallowed button still hit-tests and hovers, but draws its text
    /// disabled, stays silent, and drops hotkey presses.
    pub fn set_allow_click(&mut self, allow: bool) {
        self.allow_click = allow;
        self.fade = if allow && self.cursor_on {
            Fade::Highlight
        } else {
            Fade::Return
        };
    }

    pub fn idle_alpha(&self) -> f32 {
        self.idle_alpha
    }

    pub fn hover_alpha(&self) -> f32 {
        self.hover_alpha
    }

    pub fn text_position(&self) -> (i32, i32) {
        (self.text_x, self.text_y)
    }

    /// Centers the text in `area`; text larger than the button centers
    /// negatively.
    fn place_text(&mut self, area: Rect, metrics: &dyn TextMetrics) {
        if !self.adaptive_text {
            return;
        }
        let Some(font) = self.font else {
            return;
        };
        let (text_w, text_h) = metrics.measure(&self.text, font);
        self.text_x = (area.width - text_w) / 2;
        self.text_y = (area.height - text_h) / 2;
    }
}

impl Default for Button {
    fn default() -> Self {
        Button::new()
    }
}

impl Behavior for Button {
    fn kind(&self) -> &'static ControlKind {
        &BUTTON
    }

    fn init(&mut self, tree: &mut ControlTree, id: ControlId, ctx: &mut UiContext) {
        if self.font.is_none() {
            self.font = Some(ctx.assets.font(&ctx.theme.font, ctx.theme.font_size));
        }
        if let Some(idle) = self.idle {
            let area = tree.control(id).area();
            if area.width == 0 && area.height == 0 {
                let (width, height) = ctx.assets.texture_size(idle);
                tree.set_size(id, width as i32, height as i32, ctx);
            }
        }
        self.place_text(tree.control(id).area(), ctx.metrics.as_ref());
    }

    fn update(&mut self, tree: &mut ControlTree, id: ControlId, ctx: &mut UiContext, dt: f32) {
        if self.needs_placement {
            self.place_text(tree.control(id).area(), ctx.metrics.as_ref());
            self.needs_placement = false;
        }

        let rate = self.fade_rate * dt;
        match self.fade {
            Fade::Highlight => {
                self.idle_alpha = (self.idle_alpha - rate).max(0.0);
                self.hover_alpha = (self.hover_alpha + rate).min(1.0);
            }
            Fade::Return => {
                self.hover_alpha = (self.hover_alpha - rate).max(0.0);
                self.idle_alpha = (self.idle_alpha + rate).min(1.0);
            }
        }

        let Some(key) = self.hotkey else {
            return;
        };
        if !self.allow_click || !ctx.keyboard.was_pressed(key) {
            return;
        }
        let parent_active = tree
            .parent(id)
            .is_some_and(|parent| tree.control(parent).is_active());
        if parent_active {
            // The click path below reaches observers only, so the sound
            // this behavior would play from its hook is played here.
            if let Some(sound) = self.click_sound {
                ctx.play_sound(sound);
            }
            tree.click(id, MouseButton::Left, ctx);
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
                self.cursor_on = true;
                // Dragging back onto the button keeps the idle look until
                // release.
                if ctx.cursor.left_down {
                    return;
                }
                self.hover_colored = true;
                if !self.allow_click {
                    return;
                }
                if let Some(sound) = self.hover_sound {
                    ctx.play_sound(sound);
                }
                if self.hover.is_some() {
                    self.idle_alpha = 0.5;
                    self.hover_alpha = 0.75;
                    self.fade = Fade::Highlight;
                }
            }
            ControlEvent::MouseLeave => {
                self.cursor_on = false;
                self.hover_colored = false;
                if !self.allow_click {
                    return;
                }
                if self.hover.is_some() {
                    self.idle_alpha = 0.75;
                    self.hover_alpha = 0.5;
                    self.fade = Fade::Return;
                }
            }
            ControlEvent::Click {
                button: MouseButton::Left,
            }
            | ControlEvent::DoubleClick => {
                if self.allow_click {
                    if let Some(sound) = self.click_sound {
                        ctx.play_sound(sound);
                    }
                }
            }
            ControlEvent::AreaChanged { .. } => {
                self.place_text(tree.control(id).area(), ctx.metrics.as_ref());
            }
            _ => {}
        }
    }

    fn draw(&self, tree: &ControlTree, id: ControlId, ctx: &UiContext, frame: &mut Frame<'_>) {
        let control = tree.control(id);
        let area = control.area();
        let alpha = control.alpha();
        let remap = control.remap_color();

        if let Some(idle) = self.idle {
            if self.idle_alpha > 0.0 {
                frame.draw_texture(
                    idle,
                    Rect::new(0, 0, area.width, area.height),
                    remap.mul_alpha(self.idle_alpha).mul_alpha(alpha),
                );
            }
            if let Some(hover) = self.hover {
                if self.hover_alpha > 0.0 {
                    frame.draw_texture(
                        hover,
                        Rect::new(0, 0, area.width, area.height),
                        remap.mul_alpha(self.hover_alpha).mul_alpha(alpha),
                    );
                }
            }
        }

        if self.text.is_empty() {
            return;
        }
        let Some(font) = self.font else {
            return;
        };
        let color = if !control.is_enabled() || !self.allow_click {
            self.text_color_disabled.unwrap_or(ctx.theme.text_disabled)
        } else if self.hover_colored {
            self.text_color_hover.unwrap_or(ctx.theme.text_hover)
        } else {
            self.text_color_idle.unwrap_or(ctx.theme.text_idle)
        };
        frame.draw_text_shadowed(&self.text, font, Point::new(self.text_x, self.text_y), color);
    }

    fn populate(&mut self, control: &mut Control, scope: &mut PopulateScope<'_>) {
        apply_bindings(self, BINDINGS, control, scope);
        if let Some(text) = scope.locale("Text") {
            self.text = text.to_string();
        }
        self.font = Some(resolve_font(scope));
        self.place_text(control.area(), scope.metrics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::NullAssets;
    use crate::config::{ConfigNode, ConfigResolver};
    use crate::input::CursorState;
    use crate::render::{DrawOp, FixedMetrics, RecordingRenderer};
    use crate::strings::StringTable;

    use std::cell::RefCell;
    use std::rc::Rc;

    fn context_with(config: ConfigNode, assets: NullAssets) -> UiContext {
        UiContext::new(
            ConfigResolver::new(config),
            Box::new(assets),
            Box::new(StringTable::new()),
            Box::new(FixedMetrics::default()),
        )
    }

    fn context() -> UiContext {
        context_with(ConfigNode::mapping(), NullAssets::new())
    }

    fn cursor_at(previous: &CursorState, x: i32, y: i32, left: bool) -> CursorState {
        CursorState::step(previous, Point::new(x, y), true, left, false, 0)
    }

    fn tick(tree: &mut ControlTree, ctx: &mut UiContext, cursor: CursorState, dt: f32) {
        let keyboard = std::mem::take(&mut ctx.keyboard);
        ctx.begin_tick(dt, cursor, keyboard);
        tree.update(ctx);
    }

    fn alphas(tree: &ControlTree, id: ControlId) -> (f32, f32) {
        let button: &Button = tree.behavior(id).unwrap();
        (button.idle_alpha(), button.hover_alpha())
    }

    #[test]
    fn test_hover_crossfade_cycle() {
        let mut ctx = context();
        let mut tree = ControlTree::new();
        let button = Button::new()
            .with_idle_texture(TextureHandle(1))
            .with_hover_texture(TextureHandle(2));
        let id = tree.register(Control::new().with_size(40, 20), button);
        tree.add_root(id, &mut ctx);

        // Enter snaps to the midpoint, then the same tick's fade step runs.
        let mut cursor = cursor_at(&CursorState::default(), 5, 5, false);
        tick(&mut tree, &mut ctx, cursor, 0.1);
        let (idle, hover) = alphas(&tree, id);
        assert!((idle - 0.4).abs() < 1e-5);
        assert!((hover - 0.85).abs() < 1e-5);

        tick(&mut tree, &mut ctx, cursor, 0.1);
        let (idle, hover) = alphas(&tree, id);
        assert!((idle - 0.3).abs() < 1e-5);
        assert!((hover - 0.95).abs() < 1e-5);

        // Leaving snaps to the return midpoint and fades back.
        cursor = cursor_at(&cursor, 200, 200, false);
        tick(&mut tree, &mut ctx, cursor, 0.1);
        let (idle, hover) = alphas(&tree, id);
        assert!((idle - 0.85).abs() < 1e-5);
        assert!((hover - 0.4).abs() < 1e-5);

        for _ in 0..8 {
            tick(&mut tree, &mut ctx, cursor, 0.1);
        }
        assert_eq!(alphas(&tree, id), (1.0, 0.0));
    }

    #[test]
    fn test_enter_with_button_held_stays_idle() {
        let mut ctx = context();
        let mut tree = ControlTree::new();
        let button = Button::new()
            .with_idle_texture(TextureHandle(1))
            .with_hover_texture(TextureHandle(2));
        let id = tree.register(Control::new().with_size(40, 20), button);
        tree.add_root(id, &mut ctx);

        // Press off the control, then drag onto it while held.
        let mut cursor = cursor_at(&CursorState::default(), 200, 200, true);
        tick(&mut tree, &mut ctx, cursor, 0.1);
        cursor = cursor_at(&cursor, 5, 5, true);
        tick(&mut tree, &mut ctx, cursor, 0.1);

        let button: &Button = tree.behavior(id).unwrap();
        assert!(!button.hover_colored);
        assert_eq!(button.fade, Fade::Return);
        assert_eq!(alphas(&tree, id), (1.0, 0.0));
    }

    #[test]
    fn test_hover_and_click_queue_sounds() {
        let assets = NullAssets::new().with_sound("over").with_sound("go");
        let over = assets.sound_handle("over").unwrap();
        let go = assets.sound_handle("go").unwrap();
        let mut ctx = context_with(ConfigNode::mapping(), assets);

        let mut tree = ControlTree::new();
        let button = Button::new().with_hover_sound(over).with_click_sound(go);
        let id = tree.register(Control::new().with_size(40, 20), button);
        tree.add_root(id, &mut ctx);

        let mut cursor = cursor_at(&CursorState::default(), 5, 5, false);
        tick(&mut tree, &mut ctx, cursor, 0.1);
        assert_eq!(ctx.take_sounds(), vec![over]);

        cursor = cursor_at(&cursor, 5, 5, true);
        tick(&mut tree, &mut ctx, cursor, 0.1);
        assert!(ctx.take_sounds().is_empty());

        cursor = cursor_at(&cursor, 5, 5, false);
        tick(&mut tree, &mut ctx, cursor, 0.1);
        assert_eq!(ctx.take_sounds(), vec![go]);
    }

    #[test]
    fn test_disallowed_button_is_quiet() {
        let assets = NullAssets::new().with_sound("over");
        let over = assets.sound_handle("over").unwrap();
        let mut ctx = context_with(ConfigNode::mapping(), assets);

        let mut tree = ControlTree::new();
        let button = Button::new()
            .with_hover_sound(over)
            .with_hover_texture(TextureHandle(2));
        let id = tree.register(Control::new().with_size(40, 20), button);
        tree.add_root(id, &mut ctx);
        tree.behavior_mut::<Button>(id)
            .unwrap()
            .set_allow_click(false);

        let cursor = cursor_at(&CursorState::default(), 5, 5, false);
        tick(&mut tree, &mut ctx, cursor, 0.1);

        assert!(ctx.take_sounds().is_empty());
        assert_eq!(alphas(&tree, id), (1.0, 0.0));
        // The text still hover-colors; the draw pass overrides it with the
        // disabled color while clicking is disallowed.
        assert!(tree.behavior::<Button>(id).unwrap().hover_colored);
    }

    #[test]
    fn test_hotkey_clicks_while_parent_active() {
        let assets = NullAssets::new().with_sound("go");
        let go = assets.sound_handle("go").unwrap();
        let mut ctx = context_with(ConfigNode::mapping(), assets);

        let mut tree = ControlTree::new();
        let parent = tree.register(Control::new().with_size(100, 100), crate::widgets::Base);
        let button = Button::new().with_hotkey(Key::Char('o')).with_click_sound(go);
        let id = tree.register(
            Control::new().with_position(10, 10).with_size(30, 15),
            button,
        );
        tree.add_root(parent, &mut ctx);
        tree.add_child(parent, id, &mut ctx);

        let clicks = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&clicks);
        tree.observe(id, move |event| {
            if let ControlEvent::Click { button } = event {
                log.borrow_mut().push(*button);
            }
        });

        // Cursor over the parent but not the button keeps the parent
        // active; the hotkey still fires the click path.
        let cursor = cursor_at(&CursorState::default(), 90, 90, false);
        ctx.keyboard.press(Key::Char('o'));
        tick(&mut tree, &mut ctx, cursor, 0.1);

        assert_eq!(*clicks.borrow(), vec![MouseButton::Left]);
        assert_eq!(ctx.take_sounds(), vec![go]);
        assert_eq!(ctx.selected(), Some(id));
    }

    #[test]
    fn test_hotkey_needs_active_parent() {
        let mut ctx = context();
        let mut tree = ControlTree::new();
        let parent = tree.register(Control::new().with_size(100, 100), crate::widgets::Base);
        let id = tree.register(
            Control::new().with_size(30, 15),
            Button::new().with_hotkey(Key::Enter),
        );
        tree.add_root(parent, &mut ctx);
        tree.add_child(parent, id, &mut ctx);

        let clicks = Rc::new(RefCell::new(0));
        let count = Rc::clone(&clicks);
        tree.observe(id, move |event| {
            if matches!(event, ControlEvent::Click { .. }) {
                *count.borrow_mut() += 1;
            }
        });

        // Cursor off screen: the parent never becomes active.
        let cursor = CursorState::default();
        ctx.keyboard.press(Key::Enter);
        tick(&mut tree, &mut ctx, cursor, 0.1);

        assert_eq!(*clicks.borrow(), 0);
    }

    #[test]
    fn test_auto_size_and_text_centering_at_init() {
        let assets = NullAssets::new().with_texture("btn", (80, 24));
        let idle = assets.texture_handle("btn").unwrap();
        let mut ctx = context_with(ConfigNode::mapping(), assets);

        let mut tree = ControlTree::new();
        let id = tree.register(
            Control::new(),
            Button::new().with_idle_texture(idle).with_text("OK"),
        );
        tree.add_root(id, &mut ctx);

        let area = tree.control(id).area();
        assert_eq!((area.width, area.height), (80, 24));
        // Fixed metrics: 8x16 per glyph.
        assert_eq!(tree.behavior::<Button>(id).unwrap().text_position(), (32, 4));
    }

    #[test]
    fn test_wide_text_centers_negatively() {
        let mut ctx = context();
        let mut tree = ControlTree::new();
        let id = tree.register(
            Control::new().with_size(40, 20),
            Button::new().with_text("editor"),
        );
        tree.add_root(id, &mut ctx);

        // 6 glyphs at 8px is 48 wide against a 40-wide button.
        assert_eq!(tree.behavior::<Button>(id).unwrap().text_position(), (-4, 2));
    }

    #[test]
    fn test_draw_skips_faded_out_textures(){
        let mut ctx = context();
        let mut tree = ControlTree::new();
        let button = Button::new()
            .with_idle_texture(TextureHandle(1))
            .with_hover_texture(TextureHandle(2));
        let id = tree.register(Control::new().with_size(40, 20), button);
        tree.add_root(id, &mut ctx);

        let mut renderer = RecordingRenderer::new();
        tree.draw(&ctx, &mut renderer);

        // Idle at full alpha, hover at zero: only the idle texture lands.
        assert_eq!(
            renderer.ops,
            vec![DrawOp::Texture {
                texture: TextureHandle(1),
                dest: Rect::new(0, 0, 40, 20),
                tint: Color::WHITE,
            }]
        );
    }

    #[test]
    fn test_populate_reads_config_and_locale_wins() {
        let mut config = ConfigNode::mapping();
        config.set("okBtn.IdleTexture", "btn_idle");
        config.set("okBtn.HoverTexture", "btn_hover");
        config.set("okBtn.Text", "From config");
        config.set("Button.TextColorIdle", "10,20,30");
        let assets = NullAssets::new()
            .with_texture("btn_idle", (40, 20))
            .with_texture("btn_hover", (40, 20));
        let idle = assets.texture_handle("btn_idle").unwrap();
        let hover = assets.texture_handle("btn_hover").unwrap();
        let mut ctx = context_with(config, assets);
        let mut strings = StringTable::new();
        strings.insert("UI.okBtn.Text", "OK");
        ctx.strings = Box::new(strings);

        let mut tree = ControlTree::new();
        let id = tree.register(Control::new().with_name("okBtn"), Button::new());
        tree.add_root(id, &mut ctx);
        tree.populate(id, &mut ctx);

        let area = tree.control(id).area();
        assert_eq!((area.width, area.height), (40, 20));
        let button: &Button = tree.behavior(id).unwrap();
        assert_eq!(button.idle, Some(idle));
        assert_eq!(button.hover, Some(hover));
        assert_eq!(button.text(), "OK");
        assert_eq!(button.text_color_idle, Some(Color::rgb(10, 20, 30)));
        // "OK" at 8x16 centered in 40x20.
        assert_eq!(button.text_position(), (12, 2));
    }

    #[test]
    fn test_set_text_recenters_next_tick() {
        let mut ctx = context();
        let mut tree = ControlTree::new();
        let id = tree.register(
            Control::new().with_size(40, 20),
            Button::new().with_text("OK"),
        );
        tree.add_root(id, &mut ctx);
        assert_eq!(tree.behavior::<Button>(id).unwrap().text_position(), (12, 2));

        tree.behavior_mut::<Button>(id).unwrap().set_text("long label");
        tick(&mut tree, &mut ctx, CursorState::default(), 0.1);

        // 10 glyphs at 8px is 80 wide against a 40-wide button.
        assert_eq!(tree.behavior::<Button>(id).unwrap().text_position(), (-20, 2));
    }
}
