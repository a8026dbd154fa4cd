//! Drawing abstraction.
//!
//! The engine never talks to a GPU. The draw traversal issues operations
//! through the [`Renderer`] trait and the host supplies the backend. Two
//! stacks are part of the contract:
//!
//! - a settings stack (`push_settings`/`pop_settings`) so a nested scaled
//!   composite can switch to a nearest-neighbor sampler and restore the
//!   previous settings afterwards, and
//! - a surface stack (`push_surface`/`pop_surface`) redirecting draw
//!   operations into a control's private surface.
//!
//! Behaviors never see the renderer directly; they draw in local
//! coordinates through a [`Frame`] that offsets by the control's draw
//! origin.

pub mod recording;

pub use recording::{DrawOp, RecordingRenderer};

use crate::assets::{FontHandle, TextureHandle};
use crate::color::Color;
use crate::geometry::{Point, Rect};

/// Host-allocated handle for a private render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    Deferred,
    Immediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    AlphaBlend,
    NonPremultiplied,
    Additive,
    Opaque,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampler {
    LinearClamp,
    LinearWrap,
    /// Nearest-neighbor, the sampler integer upscales composite with.
    NearestClamp,
    NearestWrap,
}

/// The batch settings draw operations run under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawSettings {
    pub sort: SortMode,
    pub blend: BlendMode,
    pub sampler: Sampler,
}

impl Default for DrawSettings {
    fn default() -> Self {
        DrawSettings {
            sort: SortMode::Deferred,
            blend: BlendMode::AlphaBlend,
            sampler: Sampler::LinearClamp,
        }
    }
}

impl DrawSettings {
    /// The settings pushed around an integer-scaled composite.
    pub fn scaled_composite() -> Self {
        DrawSettings {
            sort: SortMode::Deferred,
            blend: BlendMode::AlphaBlend,
            sampler: Sampler::NearestClamp,
        }
    }
}

pub trait Renderer {
    fn settings(&self) -> DrawSettings;
    fn push_settings(&mut self, settings: DrawSettings);
    fn pop_settings(&mut self);
    /// Replaces the current settings without pushing.
    fn change_settings(&mut self, settings: DrawSettings);

    fn create_surface(&mut self, width: u32, height: u32) -> SurfaceId;
    fn destroy_surface(&mut self, surface: SurfaceId);
    fn push_surface(&mut self, surface: SurfaceId);
    fn pop_surface(&mut self);
    /// Clears the current target.
    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, rect: Rect, color: Color);
    /// Outline of `rect`, `thickness` pixels inward.
    fn draw_rect(&mut self, rect: Rect, color: Color, thickness: i32);
    fn draw_line(&mut self, from: Point, to: Point, color: Color, thickness: i32);
    fn draw_texture(&mut self, texture: TextureHandle, dest: Rect, tint: Color);
    fn draw_texture_region(&mut self, texture: TextureHandle, source: Rect, dest: Rect, tint: Color);
    /// Composites a private surface region into the current target.
    fn draw_surface(&mut self, surface: SurfaceId, source: Rect, dest: Rect, tint: Color);
    fn draw_text(&mut self, text: &str, font: FontHandle, position: Point, color: Color);

    /// Text with a 1px drop shadow. The default offsets black at the text
    /// color's alpha.
    fn draw_text_shadowed(&mut self, text: &str, font: FontHandle, position: Point, color: Color) {
        let shadow = Color::BLACK.with_alpha(color.a);
        self.draw_text(text, font, Point::new(position.x + 1, position.y + 1), shadow);
        self.draw_text(text, font, position, color);
    }
}

/// Single-line text measurement, available outside the draw pass.
///
/// Label auto-sizing and button text placement run during update, before
/// any renderer is around, so measurement is its own collaborator.
pub trait TextMetrics {
    /// Width and height of `text` in logical pixels.
    fn measure(&self, text: &str, font: FontHandle) -> (i32, i32);
}

/// Fixed-cell metrics for tests and demos: every glyph is `glyph` pixels.
#[derive(Debug, Clone, Copy)]
pub struct FixedMetrics {
    pub glyph: (i32, i32),
}

impl Default for FixedMetrics {
    fn default() -> Self {
        FixedMetrics { glyph: (8, 16) }
    }
}

impl TextMetrics for FixedMetrics {
    fn measure(&self, text: &str, _font: FontHandle) -> (i32, i32) {
        let chars = text.chars().count() as i32;
        (chars * self.glyph.0, self.glyph.1)
    }
}

/// Local-coordinate drawing surface for one control.
///
/// The compositor decides where the control lands (accumulated render
/// position, private surface origin, or scratch surface origin) and hands
/// the behavior a frame anchored there.
pub struct Frame<'a> {
    renderer: &'a mut dyn Renderer,
    origin: Point,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(renderer: &'a mut dyn Renderer, origin: Point) -> Self {
        Frame { renderer, origin }
    }

    /// Where local (0, 0) lands in the current target.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Escape hatch to the raw renderer; coordinates are not offset.
    pub fn renderer(&mut self) -> &mut dyn Renderer {
        self.renderer
    }

    fn place(&self, rect: Rect) -> Rect {
        rect.offset(self.origin)
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let dest = self.place(rect);
        self.renderer.fill_rect(dest, color);
    }

    pub fn draw_rect(&mut self, rect: Rect, color: Color, thickness: i32) {
        let dest = self.place(rect);
        self.renderer.draw_rect(dest, color, thickness);
    }

    pub fn draw_line(&mut self, from: Point, to: Point, color: Color, thickness: i32) {
        self.renderer
            .draw_line(from + self.origin, to + self.origin, color, thickness);
    }

    pub fn draw_texture(&mut self, texture: TextureHandle, dest: Rect, tint: Color) {
        let dest = self.place(dest);
        self.renderer.draw_texture(texture, dest, tint);
    }

    pub fn draw_texture_region(
        &mut self,
        texture: TextureHandle,
        source: Rect,
        dest: Rect,
        tint: Color,
    ) {
        let dest = self.place(dest);
        self.renderer.draw_texture_region(texture, source, dest, tint);
    }

    pub fn draw_text(&mut self, text: &str, font: FontHandle, position: Point, color: Color) {
        self.renderer
            .draw_text(text, font, position + self.origin, color);
    }

    pub fn draw_text_shadowed(
        &mut self,
        text: &str,
        font: FontHandle,
        position: Point,
        color: Color,
    ) {
        self.renderer
            .draw_text_shadowed(text, font, position + self.origin, color);
    }
}
