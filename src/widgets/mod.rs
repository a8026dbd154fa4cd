//! Widget behaviors and the populate machinery.
//!
//! A behavior is the widget-specific half of a tree node: a boxed trait
//! object the tree dispatches lifecycle hooks into. Hooks that take
//! `&mut ControlTree` run with the behavior temporarily moved out of its
//! node, so they can freely add children, fire events, or kill controls;
//! an event fired at the control currently being dispatched reaches its
//! observers but not its own hook.
//!
//! Configuration flows in through [`Behavior::populate`]: each widget
//! declares a static [`Binding`] table mapping property names to semantics
//! and setter thunks, and [`apply_bindings`] walks it against the resolver.

pub mod button;
pub mod checkbox;
pub mod label;
pub mod panel;
pub mod trackbar;

pub use button::{Button, BUTTON};
pub use checkbox::{CheckBox, CHECKBOX};
pub use label::{Label, LabelAnchor, LABEL};
pub use panel::{BackgroundLayout, Panel, PANEL};
pub use trackbar::{Trackbar, TRACKBAR};

use std::any::Any;

use crate::assets::{AssetLoader, FontHandle, SoundHandle, TextureHandle, TextureSpec};
use crate::config::{ConfigResolver, FromConfig, ScopeLevel, Semantic, Value};
use crate::context::{Theme, UiContext};
use crate::control::Control;
use crate::event::ControlEvent;
use crate::kind::{ControlKind, CONTROL};
use crate::render::{Frame, TextMetrics};
use crate::strings::{ui_string, StringSource};
use crate::tree::{ControlId, ControlTree};

pub trait Behavior: Any {
    /// The control kind this behavior implements; drives config fallback
    /// and locale lookup.
    fn kind(&self) -> &'static ControlKind;

    /// Runs once, after the control has been populated and attached.
    fn init(&mut self, tree: &mut ControlTree, id: ControlId, ctx: &mut UiContext) {
        let _ = (tree, id, ctx);
    }

    /// Per-tick logic, after input routing for this control.
    fn update(&mut self, tree: &mut ControlTree, id: ControlId, ctx: &mut UiContext, dt: f32) {
        let _ = (tree, id, ctx, dt);
    }

    /// Draws the control in local coordinates. Children are drawn by the
    /// tree, after this.
    fn draw(&self, tree: &ControlTree, id: ControlId, ctx: &UiContext, frame: &mut Frame<'_>) {
        let _ = (tree, id, ctx, frame);
    }

    /// Draws on top of the control's children: borders, drag thumbs.
    fn draw_overlay(
        &self,
        tree: &ControlTree,
        id: ControlId,
        ctx: &UiContext,
        frame: &mut Frame<'_>,
    ) {
        let _ = (tree, id, ctx, frame);
    }

    /// First receiver of every event on the control, before observers.
    fn on_event(
        &mut self,
        tree: &mut ControlTree,
        id: ControlId,
        ctx: &mut UiContext,
        event: &ControlEvent,
    ) {
        let _ = (tree, id, ctx, event);
    }

    /// Applies configuration to the control and the widget state.
    fn populate(&mut self, control: &mut Control, scope: &mut PopulateScope<'_>) {
        let _ = (control, scope);
    }

    /// Whether hiding the control keeps its private surface alive.
    fn keep_surface_when_hidden(&self) -> bool {
        false
    }

    /// Runs when the control is killed, before the node is dropped.
    fn release(&mut self) {}
}

/// A control with no widget behavior, useful as a plain grouping parent.
/// Also stands in for a behavior that is out of its node mid-dispatch.
pub struct Base;

impl Behavior for Base {
    fn kind(&self) -> &'static ControlKind {
        &CONTROL
    }
}

/// One populate-time property: where it comes from and how it lands.
pub struct Binding<W> {
    pub property: &'static str,
    pub semantic: Semantic,
    pub apply: fn(&mut W, &mut Control, &mut PopulateScope<'_>, Value),
}

/// Resolves each binding's property and applies the hits. A property the
/// cascade does not find keeps whatever the widget already had.
pub fn apply_bindings<W>(
    widget: &mut W,
    bindings: &[Binding<W>],
    control: &mut Control,
    scope: &mut PopulateScope<'_>,
) {
    for binding in bindings {
        if let Some(value) = scope.value(binding.property, binding.semantic) {
            (binding.apply)(widget, control, scope, value);
        }
    }
}

/// Font for text-drawing widgets: the `Font` / `FontSize` properties,
/// falling back to the theme.
pub(crate) fn resolve_font(scope: &mut PopulateScope<'_>) -> FontHandle {
    let name: String = scope
        .get("Font")
        .unwrap_or_else(|| scope.theme().font.clone());
    let size: u32 = scope.get("FontSize").unwrap_or(scope.theme().font_size);
    scope.font(&name, size)
}

/// Everything a populate pass may consult, borrowed from the context for
/// one control: the resolver plus that control's scope chain, the asset
/// loader, locale strings, and theme defaults.
pub struct PopulateScope<'a> {
    pub(crate) resolver: &'a mut ConfigResolver,
    pub(crate) chain: &'a [ScopeLevel],
    pub(crate) assets: &'a mut dyn AssetLoader,
    pub(crate) strings: &'a dyn StringSource,
    pub(crate) theme: &'a Theme,
    pub(crate) metrics: &'a dyn TextMetrics,
}

impl<'a> PopulateScope<'a> {
    /// Typed property lookup through the cascade.
    pub fn get<T: FromConfig>(&mut self, property: &str) -> Option<T> {
        self.resolver.resolve(self.chain, property)
    }

    pub fn value(&mut self, property: &str, semantic: Semantic) -> Option<Value> {
        self.resolver.resolve_value(self.chain, property, semantic)
    }

    /// Resolves a texture property straight to a handle.
    pub fn texture(&mut self, property: &str) -> Option<TextureHandle> {
        let spec: TextureSpec = self.get(property)?;
        Some(self.assets.texture(&spec))
    }

    pub fn sound(&mut self, property: &str) -> Option<SoundHandle> {
        match self.value(property, Semantic::Sound)? {
            Value::Sound(name) => self.assets.sound(&name),
            _ => None,
        }
    }

    pub fn font(&mut self, name: &str, size: u32) -> FontHandle {
        self.assets.font(name, size)
    }

    /// Locale string for this control, keyed by its name and then its
    /// kind chain. Takes precedence over config-sourced text.
    pub fn locale(&self, property: &str) -> Option<&'a str> {
        let leaf = self.chain.last()?;
        ui_string(self.strings, leaf.name.as_deref(), leaf.kind, property)
    }

    pub fn theme(&self) -> &Theme {
        self.theme
    }

    /// Direct loader access, for sizes of already-resolved handles.
    pub fn assets(&mut self) -> &mut dyn AssetLoader {
        self.assets
    }

    /// Text measurement, for auto-sizing during populate.
    pub fn measure(&self, text: &str, font: FontHandle) -> (i32, i32) {
        self.metrics.measure(text, font)
    }
}
