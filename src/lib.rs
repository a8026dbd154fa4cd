//! Retained-mode control tree for real-time rendered interfaces.
//!
//! A [`tree::ControlTree`] owns every control in a generational arena and
//! runs the per-tick loop: route the cursor, dispatch events, tick each
//! behavior, then draw. Rendering and asset loading stay behind the
//! [`render::Renderer`] and [`assets::AssetLoader`] traits, so the engine
//! never talks to a backend directly; widgets read their settings from a
//! cascading [`config::ConfigResolver`] when they are populated.

pub mod assets;
pub mod callback;
pub mod color;
pub mod config;
pub mod context;
pub mod control;
pub mod event;
pub mod geometry;
pub mod input;
pub mod kind;
pub mod render;
pub mod strings;
pub mod tree;
pub mod widgets;

pub mod prelude {
    pub use crate::assets::{
        AssetLoader, FontHandle, NullAssets, SoundHandle, TextureHandle, TextureSpec,
    };
    pub use crate::callback::CallbackHandle;
    pub use crate::color::Color;
    pub use crate::config::{ConfigNode, ConfigResolver, FromConfig, Semantic, Value};
    pub use crate::context::{Theme, TickClock, UiContext};
    pub use crate::control::{Control, DrawMode};
    pub use crate::event::ControlEvent;
    pub use crate::geometry::{Point, Rect};
    pub use crate::input::{CursorIcon, CursorState, Key, KeyboardState, Modifiers, MouseButton};
    pub use crate::kind::{ControlKind, CONTROL};
    pub use crate::render::{
        DrawOp, FixedMetrics, Frame, RecordingRenderer, Renderer, Sampler, SortMode, SurfaceId,
        TextMetrics,
    };
    pub use crate::strings::{StringSource, StringTable};
    pub use crate::tree::{ControlId, ControlTree};
    pub use crate::widgets::{
        BackgroundLayout, Base, Behavior, Binding, Button, CheckBox, Label, LabelAnchor, Panel,
        PopulateScope, Trackbar, BUTTON, CHECKBOX, LABEL, PANEL, TRACKBAR,
    };
}
