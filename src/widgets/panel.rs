//! Panel: a background-drawing container.
//!
//! The background texture fills the panel in one of three layouts, and an
//! optional one-pixel border is drawn over the children so it stays
//! visible when child content reaches the edges.

use crate::assets::TextureHandle;
use crate::color::Color;
use crate::config::{Semantic, Value};
use crate::context::UiContext;
use crate::control::Control;
use crate::geometry::Rect;
use crate::kind::{ControlKind, CONTROL};
use crate::render::{Frame, Sampler};
use crate::tree::{ControlId, ControlTree};

use super::{apply_bindings, Behavior, Binding, PopulateScope};

pub static PANEL: ControlKind = ControlKind {
    name: "Panel",
    base: Some(&CONTROL),
};

/// How the background texture fills the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundLayout {
    /// Repeat from the top-left, clipping the partial tiles at the right
    /// and bottom edges.
    Tiled,
    /// Center without scaling; a texture larger than the panel is clipped
    /// symmetrically.
    Centered,
    /// Scale to the panel's size.
    Stretched,
}

impl BackgroundLayout {
    /// Configuration spelling; anything unrecognized is `Stretched`.
    pub fn parse(raw: &str) -> BackgroundLayout {
        if raw.trim().eq_ignore_ascii_case("tiled") {
            BackgroundLayout::Tiled
        } else if raw.trim().eq_ignore_ascii_case("centered") {
            BackgroundLayout::Centered
        } else {
            BackgroundLayout::Stretched
        }
    }
}

pub struct Panel {
    pub background: Option<TextureHandle>,
    background_size: (i32, i32),
    pub layout: BackgroundLayout,
    pub draw_border: bool,
    /// `None` falls back to the theme's panel border color.
    pub border_color: Option<Color>,
    /// Alpha gained per second while fading in; zero disables the fade.
    pub fade_rate: f32,
}

static BINDINGS: &[Binding<Panel>] = &[
    Binding {
        property: "BackgroundTexture",
        semantic: Semantic::Texture,
        apply: |panel, _, scope, value| {
            if let Value::Texture(spec) = value {
                let handle = scope.assets().texture(&spec);
                let (width, height) = scope.assets().texture_size(handle);
                panel.background = Some(handle);
                panel.background_size = (width as i32, height as i32);
            }
        },
    },
    Binding {
        property: "BackgroundMode",
        semantic: Semantic::Text,
        apply: |panel, _, _, value| {
            if let Value::Text(raw) = value {
                panel.layout = BackgroundLayout::parse(&raw);
            }
        },
    },
    Binding {
        property: "DrawBorders",
        semantic: Semantic::Bool,
        apply: |panel, _, _, value| {
            if let Value::Bool(v) = value {
                panel.draw_border = v;
            }
        },
    },
    Binding {
        property: "BorderColor",
        semantic: Semantic::Color,
        apply: |panel, _, _, value| {
            if let Value::Color(v) = value {
                panel.border_color = Some(v);
            }
        },
    },
    Binding {
        property: "AlphaRate",
        semantic: Semantic::Float,
        apply: |panel, _, _, value| {
            if let Value::Float(v) = value {
                panel.fade_rate = v as f32;
            }
        },
    },
];

impl Panel {
    pub fn new() -> Self {
        Panel {
            background: None,
            background_size: (0, 0),
            layout: BackgroundLayout::Stretched,
            draw_border: true,
            border_color: None,
            fade_rate: 0.0,
        }
    }

    /// Sets the background with its logical size, which tiled and centered
    /// layouts need.
    pub fn with_background(mut self, texture: TextureHandle, size: (i32, i32)) -> Self {
        self.background = Some(texture);
        self.background_size = size;
        self
    }

    pub fn with_layout(mut self, layout: BackgroundLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_border_color(mut self, color: Color) -> Self {
        self.border_color = Some(color);
        self
    }

    pub fn without_border(mut self) -> Self {
        self.draw_border = false;
        self
    }

    pub fn with_fade_rate(mut self, rate: f32) -> Self {
        self.fade_rate = rate;
        self
    }

    fn draw_tiled(&self, texture: TextureHandle, area: Rect, tint: Color, frame: &mut Frame<'_>) {
        // A wrap sampler repeats in hardware; one full-size quad covers it.
        let sampler = frame.renderer().settings().sampler;
        if matches!(sampler, Sampler::LinearWrap | Sampler::NearestWrap) {
            frame.draw_texture(texture, Rect::new(0, 0, area.width, area.height), tint);
            return;
        }

        let (tex_w, tex_h) = self.background_size;
        if tex_w <= 0 || tex_h <= 0 {
            return;
        }
        let mut x = 0;
        while x < area.width {
            let tile_w = tex_w.min(area.width - x);
            let mut y = 0;
            while y < area.height {
                let tile_h = tex_h.min(area.height - y);
                if tile_w == tex_w && tile_h == tex_h {
                    frame.draw_texture(texture, Rect::new(x, y, tex_w, tex_h), tint);
                } else {
                    frame.draw_texture_region(
                        texture,
                        Rect::new(0, 0, tile_w, tile_h),
                        Rect::new(x, y, tile_w, tile_h),
                        tint,
                    );
                }
                y += tex_h;
            }
            x += tex_w;
        }
    }

    fn draw_centered(&self, texture: TextureHandle, area: Rect, tint: Color, frame: &mut Frame<'_>) {
        let (tex_w, tex_h) = self.background_size;
        let x = (area.width - tex_w) / 2;
        let y = (area.height - tex_h) / 2;
        // Per axis: center inside the panel, or clip the source so the
        // texture's center shows when it is the larger one.
        let (source_x, dest_x, draw_w) = if x >= 0 { (0, x, tex_w) } else { (-x, 0, area.width) };
        let (source_y, dest_y, draw_h) = if y >= 0 { (0, y, tex_h) } else { (-y, 0, area.height) };
        frame.draw_texture_region(
            texture,
            Rect::new(source_x, source_y, draw_w, draw_h),
            Rect::new(dest_x, dest_y, draw_w, draw_h),
            tint,
        );
    }
}

impl Default for Panel {
    fn default() -> Self {
        Panel::new()
    }
}

impl Behavior for Panel {
    fn kind(&self) -> &'static ControlKind {
        &PANEL
    }

    fn update(&mut self, tree: &mut ControlTree, id: ControlId, _ctx: &mut UiContext, dt: f32) {
        if self.fade_rate != 0.0 {
            let control = tree.control_mut(id);
            control.set_alpha(control.alpha() + self.fade_rate * dt);
        }
    }

    fn draw(&self, tree: &ControlTree, id: ControlId, _ctx: &UiContext, frame: &mut Frame<'_>) {
        let Some(texture) = self.background else {
            return;
        };
        let control = tree.control(id);
        let area = control.area();
        let tint = control.remap_color().mul_alpha(control.alpha());
        match self.layout {
            BackgroundLayout::Stretched => {
                frame.draw_texture(texture, Rect::new(0, 0, area.width, area.height), tint);
            }
            BackgroundLayout::Tiled => self.draw_tiled(texture, area, tint, frame),
            BackgroundLayout::Centered => self.draw_centered(texture, area, tint, frame),
        }
    }

    fn draw_overlay(&self, tree: &ControlTree, id: ControlId, ctx: &UiContext, frame: &mut Frame<'_>) {
        if !self.draw_border {
            return;
        }
        let control = tree.control(id);
        let area = control.area();
        let color = self.border_color.unwrap_or(ctx.theme.panel_border);
        frame.draw_rect(
            Rect::new(0, 0, area.width, area.height),
            color.mul_alpha(control.alpha()),
            1,
        );
    }

    fn populate(&mut self, control: &mut Control, scope: &mut PopulateScope<'_>) {
        apply_bindings(self, BINDINGS, control, scope);
    }
}
