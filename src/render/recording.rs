//! A renderer that records operations instead of drawing them.
//!
//! Tests assert against the recorded op list; demos print it. Surface and
//! settings stacks behave like a real backend so compositor ordering bugs
//! (unbalanced push/pop, draws into the wrong target) show up in the log.

use rustc_hash::FxHashMap;

use super::{DrawSettings, Renderer, SurfaceId};
use crate::assets::{FontHandle, TextureHandle};
use crate::color::Color;
use crate::geometry::{Point, Rect};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Color),
    FillRect(Rect, Color),
    DrawRect(Rect, Color, i32),
    Line(Point, Point, Color, i32),
    Texture {
        texture: TextureHandle,
        dest: Rect,
        tint: Color,
    },
    TextureRegion {
        texture: TextureHandle,
        source: Rect,
        dest: Rect,
        tint: Color,
    },
    Surface {
        surface: SurfaceId,
        source: Rect,
        dest: Rect,
        tint: Color,
    },
    Text {
        text: String,
        position: Point,
        color: Color,
    },
    PushSettings(DrawSettings),
    PopSettings,
    ChangeSettings(DrawSettings),
    CreateSurface(SurfaceId, u32, u32),
    DestroySurface(SurfaceId),
    PushSurface(SurfaceId),
    PopSurface,
}

#[derive(Default)]
pub struct RecordingRenderer {
    pub ops: Vec<DrawOp>,
    /// Live surfaces and their dimensions.
    pub surfaces: FxHashMap<SurfaceId, (u32, u32)>,
    settings_stack: Vec<DrawSettings>,
    surface_stack: Vec<SurfaceId>,
    next_surface: u32,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        RecordingRenderer::default()
    }

    /// The surface draws currently land in, if any.
    pub fn current_surface(&self) -> Option<SurfaceId> {
        self.surface_stack.last().copied()
    }

    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    /// Index of the first recorded op matching `predicate`.
    pub fn find(&self, predicate: impl Fn(&DrawOp) -> bool) -> Option<usize> {
        self.ops.iter().position(predicate)
    }
}

impl Renderer for RecordingRenderer {
    fn settings(&self) -> DrawSettings {
        self.settings_stack.last().copied().unwrap_or_default()
    }

    fn push_settings(&mut self, settings: DrawSettings) {
        self.settings_stack.push(settings);
        self.ops.push(DrawOp::PushSettings(settings));
    }

    fn pop_settings(&mut self) {
        assert!(
            self.settings_stack.pop().is_some(),
            "settings stack underflow"
        );
        self.ops.push(DrawOp::PopSettings);
    }

    fn change_settings(&mut self, settings: DrawSettings) {
        match self.settings_stack.last_mut() {
            Some(top) => *top = settings,
            None => self.settings_stack.push(settings),
        }
        self.ops.push(DrawOp::ChangeSettings(settings));
    }

    fn create_surface(&mut self, width: u32, height: u32) -> SurfaceId {
        let id = SurfaceId(self.next_surface);
        self.next_surface += 1;
        self.surfaces.insert(id, (width, height));
        self.ops.push(DrawOp::CreateSurface(id, width, height));
        id
    }

    fn destroy_surface(&mut self, surface: SurfaceId) {
        assert!(
            self.surfaces.remove(&surface).is_some(),
            "destroying unknown surface {surface:?}"
        );
        self.ops.push(DrawOp::DestroySurface(surface));
    }

    fn push_surface(&mut self, surface: SurfaceId) {
        assert!(
            self.surfaces.contains_key(&surface),
            "pushing unknown surface {surface:?}"
        );
        self.surface_stack.push(surface);
        self.ops.push(DrawOp::PushSurface(surface));
    }

    fn pop_surface(&mut self) {
        assert!(self.surface_stack.pop().is_some(), "surface stack underflow");
        self.ops.push(DrawOp::PopSurface);
    }

    fn clear(&mut self, color: Color) {
        self.ops.push(DrawOp::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::FillRect(rect, color));
    }

    fn draw_rect(&mut self, rect: Rect, color: Color, thickness: i32) {
        self.ops.push(DrawOp::DrawRect(rect, color, thickness));
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color, thickness: i32) {
        self.ops.push(DrawOp::Line(from, to, color, thickness));
    }

    fn draw_texture(&mut self, texture: TextureHandle, dest: Rect, tint: Color) {
        self.ops.push(DrawOp::Texture {
            texture,
            dest,
            tint,
        });
    }

    fn draw_texture_region(&mut self, texture: TextureHandle, source: Rect, dest: Rect, tint: Color) {
        self.ops.push(DrawOp::TextureRegion {
            texture,
            source,
            dest,
            tint,
        });
    }

    fn draw_surface(&mut self, surface: SurfaceId, source: Rect, dest: Rect, tint: Color) {
        self.ops.push(DrawOp::Surface {
            surface,
            source,
            dest,
            tint,
        });
    }

    fn draw_text(&mut self, text: &str, _font: FontHandle, position: Point, color: Color) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            position,
            color,
        });
    }
}
