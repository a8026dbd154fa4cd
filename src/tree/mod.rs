//! The control tree: storage, structure, lifecycle, and geometry.
//!
//! [`ControlTree`] owns every control together with its behavior object.
//! Structural mutation goes through the tree so the deferred-mutation
//! contract holds: while a parent is traversing its children, adds and
//! removes are queued and applied right after the traversal, in FIFO
//! order, adds before removes.
//!
//! Per-tick input routing lives in the `update` sibling module and
//! surface compositing in `draw`; both are `impl ControlTree` blocks over
//! the same state.

mod arena;
mod draw;
mod update;

pub use arena::ControlId;

use std::sync::Arc;

use log::debug;

use crate::callback::CallbackHandle;
use crate::config::{ScopeLevel, Semantic, Value};
use crate::context::UiContext;
use crate::control::{Control, ControlFlags, ControlSurface, DrawMode};
use crate::event::ControlEvent;
use crate::geometry::{Point, Rect};
use crate::input::MouseButton;
use crate::render::{Renderer, SurfaceId};
use crate::widgets::{Base, Behavior, PopulateScope};

use arena::{Arena, Node};

/// Seconds within which a second left click counts as a double click.
pub const DOUBLE_CLICK_WINDOW: f32 = 1.0;

pub struct ControlTree {
    arena: Arena,
    /// Top-level controls added explicitly by the host.
    roots: Vec<ControlId>,
    /// Detached controls; they join the top-level passes while keeping
    /// their parent link for geometry.
    detached: Vec<ControlId>,
    /// Surfaces whose controls no longer need them, destroyed on the next
    /// draw.
    retired_surfaces: Vec<SurfaceId>,
    /// Shared scratch surface for detached direct-mode scaled draws.
    scratch: Option<ControlSurface>,
}

impl ControlTree {
    pub fn new() -> Self {
        ControlTree {
            arena: Arena::new(),
            roots: Vec::new(),
            detached: Vec::new(),
            retired_surfaces: Vec::new(),
            scratch: None,
        }
    }

    /// Adds a control to the tree's storage without wiring it anywhere.
    /// Attach it with [`add_root`](Self::add_root) or
    /// [`add_child`](Self::add_child). The control's kind tag is stamped
    /// from the behavior.
    pub fn register(&mut self, mut control: Control, behavior: impl Behavior) -> ControlId {
        control.kind = behavior.kind();
        self.arena.register(control, Box::new(behavior))
    }

    pub fn contains(&self, id: ControlId) -> bool {
        self.arena.contains(id)
    }

    pub fn control_count(&self) -> usize {
        self.arena.len()
    }

    /// # Panics
    ///
    /// If the id is stale or was never registered.
    pub fn control(&self, id: ControlId) -> &Control {
        &self.node(id).control
    }

    pub fn control_mut(&mut self, id: ControlId) -> &mut Control {
        &mut self.node_mut(id).control
    }

    /// Downcast access to the widget state behind a control.
    pub fn behavior<T: Behavior>(&self, id: ControlId) -> Option<&T> {
        let behavior: &dyn std::any::Any = self.arena.get(id)?.behavior.as_ref();
        behavior.downcast_ref::<T>()
    }

    pub fn behavior_mut<T: Behavior>(&mut self, id: ControlId) -> Option<&mut T> {
        let behavior: &mut dyn std::any::Any = self.arena.get_mut(id)?.behavior.as_mut();
        behavior.downcast_mut::<T>()
    }

    pub fn parent(&self, id: ControlId) -> Option<ControlId> {
        self.arena.get(id).and_then(|node| node.parent)
    }

    /// Children in insertion order. May contain ids freed mid-traversal;
    /// filter with [`contains`](Self::contains) when holding the result.
    pub fn children(&self, id: ControlId) -> Vec<ControlId> {
        self.arena
            .get(id)
            .map(|node| node.children.to_vec())
            .unwrap_or_default()
    }

    pub fn roots(&self) -> &[ControlId] {
        &self.roots
    }

    pub fn detached(&self) -> &[ControlId] {
        &self.detached
    }

    /// Cloneable cross-thread scheduling handle for one control.
    pub fn callback_handle(&self, id: ControlId) -> CallbackHandle {
        CallbackHandle {
            queue: Arc::clone(&self.node(id).control.callbacks),
            id,
        }
    }

    /// Registers an external observer on a control's events.
    pub fn observe(&mut self, id: ControlId, observer: impl FnMut(&ControlEvent) + 'static) {
        self.node_mut(id).control.observe(observer);
    }

    // ----- structure -----

    /// Makes a control top-level, initializing it first.
    ///
    /// # Panics
    ///
    /// If the control already has a parent or is already a root.
    pub fn add_root(&mut self, id: ControlId, ctx: &mut UiContext) {
        self.assert_unparented(id);
        assert!(
            !self.roots.contains(&id),
            "control is already a top-level root"
        );
        self.initialize(id, ctx);
        self.roots.push(id);
    }

    pub fn remove_root(&mut self, id: ControlId) {
        self.roots.retain(|&root| root != id);
    }

    /// Parents `child` under `parent`, initializing it on application.
    ///
    /// If `parent` is mid-traversal the add is queued and applied right
    /// after the traversal; the parent link is claimed immediately either
    /// way, so a second add of the same child fails fast.
    ///
    /// # Panics
    ///
    /// If `child` already has a parent or is a top-level root.
    pub fn add_child(&mut self, parent: ControlId, child: ControlId, ctx: &mut UiContext) {
        assert!(parent != child, "a control cannot be its own parent");
        self.assert_unparented(child);
        assert!(
            !self.roots.contains(&child),
            "a top-level root cannot become a child"
        );
        self.node_mut(child).parent = Some(parent);

        let parent_node = self.node_mut(parent);
        if parent_node.iterating {
            parent_node.pending_adds.push(child);
        } else {
            self.apply_add(parent, child, ctx);
        }
    }

    /// [`add_child`](Self::add_child) without the automatic
    /// initialization, for wiring subtrees up before attaching them.
    ///
    /// # Panics
    ///
    /// Additionally panics if `parent` is mid-traversal; a queued add
    /// always initializes.
    pub fn add_child_skip_init(&mut self, parent: ControlId, child: ControlId) {
        assert!(parent != child, "a control cannot be its own parent");
        self.assert_unparented(child);
        assert!(
            !self.roots.contains(&child),
            "a top-level root cannot become a child"
        );
        assert!(
            !self.node(parent).iterating,
            "cannot skip initialization for an add queued mid-traversal"
        );
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
        self.recompute_views(parent);
    }

    /// Unparents `child`, queued if `parent` is mid-traversal. The child
    /// stays registered and keeps its state.
    pub fn remove_child(&mut self, parent: ControlId, child: ControlId) {
        let parent_node = self.node_mut(parent);
        if parent_node.iterating {
            parent_node.pending_removes.push(child);
        } else {
            self.apply_remove(parent, child);
        }
    }

    fn assert_unparented(&self, id: ControlId) {
        assert!(
            self.node(id).parent.is_none(),
            "a control cannot be shared between two parents"
        );
    }

    fn apply_add(&mut self, parent: ControlId, child: ControlId, ctx: &mut UiContext) {
        if !self.arena.contains(child) {
            debug!("dropping queued add of freed control {child:?}");
            return;
        }
        if !self.arena.contains(parent) {
            // The parent went away while the add was queued; orphan the
            // child back out so it can be re-homed.
            self.node_mut(child).parent = None;
            return;
        }
        self.initialize(child, ctx);
        self.node_mut(parent).children.push(child);
        self.recompute_views(parent);
    }

    fn apply_remove(&mut self, parent: ControlId, child: ControlId) {
        let Some(parent_node) = self.arena.get_mut(parent) else {
            return;
        };
        parent_node.children.retain(|c| *c != child);
        self.recompute_views(parent);
        if let Some(child_node) = self.arena.get_mut(child) {
            // Only clear a link that still points here; the child may have
            // been re-homed while the remove sat queued.
            if child_node.parent == Some(parent) {
                child_node.parent = None;
            }
        }
    }

    /// Rebuilds the parent's ordered views from its children: update list
    /// by descending update order, draw list ascending by draw order.
    /// Both sorts are stable, so ties keep insertion order.
    fn recompute_views(&mut self, id: ControlId) {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        let children = node.children.clone();

        let mut update_list = children.clone();
        update_list.sort_by_key(|&c| {
            std::cmp::Reverse(self.arena.get(c).map_or(0, |n| n.control.update_order))
        });
        let mut draw_list = children;
        draw_list.sort_by_key(|&c| self.arena.get(c).map_or(0, |n| n.control.draw_order));

        if let Some(node) = self.arena.get_mut(id) {
            node.update_list = update_list;
            node.draw_list = draw_list;
        }
    }

    /// Applies a parent's queued adds, then its queued removes, in the
    /// order they were requested.
    pub(crate) fn drain_pending(&mut self, id: ControlId, ctx: &mut UiContext) {
        loop {
            let Some(node) = self.arena.get_mut(id) else {
                return;
            };
            let adds = std::mem::take(&mut node.pending_adds);
            let removes = std::mem::take(&mut node.pending_removes);
            if adds.is_empty() && removes.is_empty() {
                return;
            }
            for child in adds {
                self.apply_add(id, child, ctx);
            }
            for child in removes {
                self.apply_remove(id, child);
            }
            // Initialization hooks may have queued more work.
        }
    }

    // ----- lifecycle -----

    /// One-time initialization: children first, then the behavior's init
    /// hook, then the `Initialized` event. Captures the scale floor that
    /// later lowering is checked against. No-op if already initialized.
    pub fn initialize(&mut self, id: ControlId, ctx: &mut UiContext) {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        if node.control.is_initialized() {
            return;
        }
        let children = node.children.clone();
        for child in children {
            self.initialize(child, ctx);
        }
        self.with_behavior(id, |behavior, tree| behavior.init(tree, id, ctx));
        self.fire(id, ctx, ControlEvent::Initialized);
        if let Some(node) = self.arena.get_mut(id) {
            node.control.flags.insert(ControlFlags::INITIALIZED);
            node.control.init_scale = node.control.scale;
        }
    }

    /// Marks the subtree killed depth-first, retiring private surfaces
    /// and running each behavior's release hook. Does not detach the
    /// subtree from its parent; killing twice is a caller error.
    pub fn kill(&mut self, id: ControlId) {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        let children = node.children.clone();
        for child in children {
            self.kill(child);
        }
        if let Some(node) = self.arena.get_mut(id) {
            node.control.flags.insert(ControlFlags::KILLED);
            if let Some(surface) = node.control.surface.take() {
                self.retired_surfaces.push(surface.id);
            }
            node.behavior.release();
        }
    }

    /// Removes a control and its whole subtree from the tree, freeing
    /// their slots. Behaviors not already killed get their release hook.
    pub fn unregister(&mut self, id: ControlId) {
        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id);
        }
        self.roots.retain(|&root| root != id);
        self.detached.retain(|&d| d != id);
        self.free_subtree(id);
    }

    fn free_subtree(&mut self, id: ControlId) {
        let Some(node) = self.arena.unregister(id) else {
            return;
        };
        let Node {
            control,
            mut behavior,
            children,
            pending_adds,
            ..
        } = node;
        for child in children.into_iter().chain(pending_adds) {
            self.free_subtree(child);
        }
        if let Some(surface) = control.surface {
            self.retired_surfaces.push(surface.id);
        }
        if !control.flags.contains(ControlFlags::KILLED) {
            behavior.release();
        }
    }

    /// Moves a control to the top level for input and draw while keeping
    /// its parent link for geometry, for overlays that escape the parent.
    ///
    /// # Panics
    ///
    /// If the control is already detached.
    pub fn detach(&mut self, id: ControlId) {
        let node = self.node_mut(id);
        assert!(
            !node.control.flags.contains(ControlFlags::DETACHED),
            "control is already detached"
        );
        node.control.flags.insert(ControlFlags::DETACHED);
        self.detached.push(id);
    }

    /// Returns a detached control to its place under its parent.
    pub fn attach(&mut self, id: ControlId) {
        self.node_mut(id)
            .control
            .flags
            .remove(ControlFlags::DETACHED);
        self.detached.retain(|&d| d != id);
    }

    // ----- events -----

    /// Dispatches an event: the behavior hook first, then the external
    /// observers in subscription order.
    pub fn fire(&mut self, id: ControlId, ctx: &mut UiContext, event: ControlEvent) {
        let dispatched = self.with_behavior(id, |behavior, tree| {
            behavior.on_event(tree, id, ctx, &event);
        });
        if dispatched.is_none() {
            return;
        }
        if let Some(node) = self.arena.get_mut(id) {
            node.control.notify_observers(&event);
        }
    }

    /// Moves the global selection, firing `SelectedChanged` on the old
    /// control (false) and then the new one (true). No-op if unchanged.
    pub fn select(&mut self, id: Option<ControlId>, ctx: &mut UiContext) {
        let previous = ctx.selected();
        if previous == id {
            return;
        }
        ctx.set_selected(id);
        if let Some(old) = previous {
            self.fire(old, ctx, ControlEvent::SelectedChanged { selected: false });
        }
        if let Some(new) = id {
            self.fire(new, ctx, ControlEvent::SelectedChanged { selected: true });
        }
    }

    /// Delivers a click to a control the way the router would: a left
    /// click takes the selection and is classified against the
    /// double-click window, which resets on every left click.
    pub fn click(&mut self, id: ControlId, button: MouseButton, ctx: &mut UiContext) {
        match button {
            MouseButton::Left => {
                self.select(Some(id), ctx);
                let Some(node) = self.arena.get_mut(id) else {
                    return;
                };
                let double = node.control.seconds_since_click < DOUBLE_CLICK_WINDOW;
                node.control.seconds_since_click = 0.0;
                if double {
                    self.fire(id, ctx, ControlEvent::DoubleClick);
                } else {
                    self.fire(id, ctx, ControlEvent::Click { button });
                }
            }
            MouseButton::Right => self.fire(id, ctx, ControlEvent::Click { button }),
        }
    }

    /// Runs a closure with the control's behavior temporarily moved out
    /// of its node, so the closure gets full tree access. Events fired at
    /// `id` from inside reach observers but not the hook itself.
    fn with_behavior<R>(
        &mut self,
        id: ControlId,
        f: impl FnOnce(&mut dyn Behavior, &mut ControlTree) -> R,
    ) -> Option<R> {
        let mut behavior = {
            let node = self.arena.get_mut(id)?;
            std::mem::replace(&mut node.behavior, Box::new(Base))
        };
        let result = f(behavior.as_mut(), self);
        // The closure may have freed the node; only a live one gets its
        // behavior back.
        if let Some(node) = self.arena.get_mut(id) {
            node.behavior = behavior;
        }
        Some(result)
    }

    // ----- geometry -----

    /// Absolute top-left within the window, scaling each hop by the
    /// ancestors' cumulative factor. Input space; for drawing see
    /// [`render_point`](Self::render_point).
    pub fn window_point(&self, id: ControlId) -> Point {
        let node = self.node(id);
        let position = node.control.area.position();
        match node.parent {
            Some(parent) if self.arena.contains(parent) => {
                position.scaled(self.total_scale(parent)) + self.window_point(parent)
            }
            _ => position,
        }
    }

    /// Product of the control's scale factor and all its ancestors'.
    pub fn total_scale(&self, id: ControlId) -> i32 {
        let node = self.node(id);
        match node.parent {
            Some(parent) if self.arena.contains(parent) => {
                node.control.scale * self.total_scale(parent)
            }
            _ => node.control.scale,
        }
    }

    /// The control's hit-test rectangle: window point plus its logical
    /// size times the cumulative scale.
    pub fn window_rect(&self, id: ControlId) -> Rect {
        let point = self.window_point(id);
        let area = self.node(id).control.area;
        let scale = self.total_scale(id);
        Rect::new(point.x, point.y, area.width * scale, area.height * scale)
    }

    /// Top-left within the current render target: window coordinates for
    /// detached controls, the local position when the parent draws into a
    /// private surface, otherwise the accumulated parent offset.
    pub fn render_point(&self, id: ControlId) -> Point {
        let node = self.node(id);
        let position = node.control.area.position();
        if node.control.is_detached() {
            return self.window_point(id);
        }
        match node.parent {
            Some(parent) if self.arena.contains(parent) => {
                if self.node(parent).control.draw_mode == DrawMode::Surface {
                    position
                } else {
                    position + self.render_point(parent)
                }
            }
            _ => position,
        }
    }

    /// The cursor position in the control's local logical coordinates.
    pub fn local_cursor(&self, id: ControlId, cursor: Point) -> Point {
        let window = self.window_point(id);
        let scale = self.total_scale(id);
        Point::new(
            (cursor.x - window.x) / scale,
            (cursor.y - window.y) / scale,
        )
    }

    /// Whether the control and every ancestor report active this tick.
    /// Detached controls answer for themselves only.
    pub fn is_active_chain(&self, id: ControlId) -> bool {
        let Some(node) = self.arena.get(id) else {
            return false;
        };
        if !node.control.flags.contains(ControlFlags::ACTIVE) {
            return false;
        }
        if node.control.is_detached() {
            return true;
        }
        match node.parent {
            Some(parent) if self.arena.contains(parent) => self.is_active_chain(parent),
            _ => true,
        }
    }

    // ----- geometry setters -----

    pub fn set_position(&mut self, id: ControlId, x: i32, y: i32, ctx: &mut UiContext) {
        let area = self.node(id).control.area;
        self.set_area(id, Rect::new(x, y, area.width, area.height), ctx);
    }

    pub fn set_size(&mut self, id: ControlId, width: i32, height: i32, ctx: &mut UiContext) {
        let area = self.node(id).control.area;
        self.set_area(id, Rect::new(area.x, area.y, width, height), ctx);
    }

    /// Sets position and size together, firing one `AreaChanged`. A size
    /// change outside a batch retires a stale private surface so the next
    /// draw recreates it at the new dimensions.
    pub fn set_area(&mut self, id: ControlId, area: Rect, ctx: &mut UiContext) {
        let (old, size_changed) = {
            let control = &mut self.node_mut(id).control;
            let old = control.area;
            control.area = area;
            (
                old,
                old.width != area.width || old.height != area.height,
            )
        };
        if old == area {
            return;
        }
        if size_changed {
            self.handle_size_change(id);
        }
        self.fire(id, ctx, ControlEvent::AreaChanged { area });
    }

    fn handle_size_change(&mut self, id: ControlId) {
        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        let control = &mut node.control;
        if control.flags.contains(ControlFlags::CHANGING_SIZE)
            || !control.is_initialized()
            || control.draw_mode != DrawMode::Surface
        {
            return;
        }
        if let Some(surface) = control.surface.take() {
            self.retired_surfaces.push(surface.id);
        }
    }

    /// Positions the control so its scaled footprint is centered in its
    /// parent. No-op for top-level controls.
    pub fn center_on_parent(&mut self, id: ControlId, ctx: &mut UiContext) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if !self.arena.contains(parent) {
            return;
        }
        let parent_area = self.node(parent).control.area;
        let control = &self.node(id).control;
        let scaled_width = control.area.width * control.scale;
        let scaled_height = control.area.height * control.scale;
        self.set_position(
            id,
            (parent_area.width - scaled_width) / 2,
            (parent_area.height - scaled_height) / 2,
            ctx,
        );
    }

    /// Opens a size-change batch: surface recreation is held off until
    /// [`end_size_change`](Self::end_size_change) reconciles once.
    pub fn begin_size_change(&mut self, id: ControlId) {
        self.node_mut(id)
            .control
            .flags
            .insert(ControlFlags::CHANGING_SIZE);
    }

    pub fn end_size_change(&mut self, id: ControlId) {
        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        let control = &mut node.control;
        control.flags.remove(ControlFlags::CHANGING_SIZE);
        if control.draw_mode != DrawMode::Surface {
            return;
        }
        if let Some(surface) = control.surface {
            if surface.width != control.area.width || surface.height != control.area.height {
                control.surface = None;
                self.retired_surfaces.push(surface.id);
            }
        }
    }

    // ----- flags and orders -----

    /// Shows or hides the control. Hiding retires the private surface
    /// unless the behavior asks to keep it warm.
    pub fn set_visible(&mut self, id: ControlId, visible: bool) {
        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        if node.control.is_visible() == visible {
            return;
        }
        node.control.flags.set(ControlFlags::VISIBLE, visible);
        if !visible && !node.behavior.keep_surface_when_hidden() {
            if let Some(surface) = node.control.surface.take() {
                self.retired_surfaces.push(surface.id);
            }
        }
    }

    /// Enables and shows the control together.
    pub fn enable(&mut self, id: ControlId) {
        self.node_mut(id).control.flags.insert(ControlFlags::ENABLED);
        self.set_visible(id, true);
    }

    /// Disables and hides the control together. Parent enablement already
    /// gates child updates, so neither direction recurses.
    pub fn disable(&mut self, id: ControlId) {
        self.node_mut(id).control.flags.remove(ControlFlags::ENABLED);
        self.set_visible(id, false);
    }

    pub fn set_update_order(&mut self, id: ControlId, order: i32, ctx: &mut UiContext) {
        {
            let control = &mut self.node_mut(id).control;
            if control.update_order == order {
                return;
            }
            control.update_order = order;
        }
        if let Some(parent) = self.parent(id) {
            self.recompute_views(parent);
        }
        self.fire(id, ctx, ControlEvent::UpdateOrderChanged);
    }

    pub fn set_draw_order(&mut self, id: ControlId, order: i32, ctx: &mut UiContext) {
        {
            let control = &mut self.node_mut(id).control;
            if control.draw_order == order {
                return;
            }
            control.draw_order = order;
        }
        if let Some(parent) = self.parent(id) {
            self.recompute_views(parent);
        }
        self.fire(id, ctx, ControlEvent::DrawOrderChanged);
    }

    /// Changes the integer scale factor. The private surface keeps its
    /// logical size; only the composite changes.
    ///
    /// # Panics
    ///
    /// If the factor is below 1, the control draws directly, or the
    /// control is initialized and the factor is below its value at
    /// initialization.
    pub fn set_scale(&mut self, id: ControlId, scale: i32) {
        assert!(scale >= 1, "scale factor must be at least 1");
        let control = &mut self.node_mut(id).control;
        assert!(
            control.draw_mode == DrawMode::Surface,
            "scaling requires DrawMode::Surface"
        );
        if control.is_initialized() {
            assert!(
                scale >= control.init_scale,
                "scale cannot drop below its initialization value"
            );
        }
        control.scale = scale;
    }

    /// # Panics
    ///
    /// If the control is already initialized; draw mode is fixed from
    /// then on.
    pub fn set_draw_mode(&mut self, id: ControlId, mode: DrawMode) {
        let control = &mut self.node_mut(id).control;
        assert!(
            !control.is_initialized(),
            "draw mode cannot change after initialization"
        );
        control.draw_mode = mode;
    }

    // ----- configuration -----

    /// The resolver scope chain for a control, root ancestor first.
    pub fn scope_chain(&self, id: ControlId) -> Vec<ScopeLevel> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(id) = current {
            let Some(node) = self.arena.get(id) else {
                break;
            };
            chain.push(scope_level(&node.control));
            current = node.parent;
        }
        chain.reverse();
        chain
    }

    /// Applies configuration to the control and its subtree: base
    /// properties, then the behavior's bindings, then children. Wrapped
    /// in a size-change batch so composite position/size forms land
    /// atomically; coalesced change events fire after the batch closes.
    pub fn populate(&mut self, id: ControlId, ctx: &mut UiContext) {
        let chain = self.scope_chain(id);
        self.populate_control(id, &chain, ctx);
    }

    fn populate_control(&mut self, id: ControlId, chain: &[ScopeLevel], ctx: &mut UiContext) {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        let before = node.control.area;
        self.begin_size_change(id);

        let mut outcome = BaseOutcome::default();
        {
            let mut scope = PopulateScope {
                resolver: &mut ctx.resolver,
                chain,
                assets: ctx.assets.as_mut(),
                strings: ctx.strings.as_ref(),
                theme: &ctx.theme,
                metrics: ctx.metrics.as_ref(),
            };
            if let Some(node) = self.arena.get_mut(id) {
                let Node {
                    control, behavior, ..
                } = node;
                outcome = apply_base_properties(control, &mut scope);
                behavior.populate(control, &mut scope);
            }
        }
        if let Some(visible) = outcome.visible {
            self.set_visible(id, visible);
        }

        let children = self.children(id);
        for child in children {
            if !self.arena.contains(child) {
                continue;
            }
            let mut child_chain = chain.to_vec();
            child_chain.push(scope_level(&self.node(child).control));
            self.populate_control(child, &child_chain, ctx);
        }

        self.end_size_change(id);

        if outcome.orders_changed() {
            if let Some(parent) = self.parent(id) {
                self.recompute_views(parent);
            }
        }
        let Some(node) = self.arena.get(id) else {
            return;
        };
        let after = node.control.area;
        if after != before {
            self.fire(id, ctx, ControlEvent::AreaChanged { area: after });
        }
        if outcome.update_order_changed {
            self.fire(id, ctx, ControlEvent::UpdateOrderChanged);
        }
        if outcome.draw_order_changed {
            self.fire(id, ctx, ControlEvent::DrawOrderChanged);
        }
    }

    // ----- surfaces -----

    /// Destroys surfaces retired since the last call. Runs automatically
    /// at the start of [`draw`](Self::draw).
    pub fn flush_retired(&mut self, renderer: &mut dyn Renderer) {
        for surface in self.retired_surfaces.drain(..) {
            renderer.destroy_surface(surface);
        }
    }

    // ----- internals shared with update/draw -----

    fn node(&self, id: ControlId) -> &Node {
        match self.arena.get(id) {
            Some(node) => node,
            None => panic!("control id is stale or unregistered"),
        }
    }

    fn node_mut(&mut self, id: ControlId) -> &mut Node {
        match self.arena.get_mut(id) {
            Some(node) => node,
            None => panic!("control id is stale or unregistered"),
        }
    }

    /// Roots plus detached controls, each once, in insertion order.
    fn top_level_snapshot(&self) -> Vec<ControlId> {
        let mut top: Vec<ControlId> = self
            .roots
            .iter()
            .copied()
            .filter(|&id| self.arena.contains(id))
            .collect();
        for &id in &self.detached {
            if self.arena.contains(id) && !top.contains(&id) {
                top.push(id);
            }
        }
        top
    }
}

impl Default for ControlTree {
    fn default() -> Self {
        Self::new()
    }
}

fn scope_level(control: &Control) -> ScopeLevel {
    match control.name() {
        Some(name) => ScopeLevel::named(name, control.kind()),
        None => ScopeLevel::anonymous(control.kind()),
    }
}

#[derive(Default)]
struct BaseOutcome {
    visible: Option<bool>,
    update_order_changed: bool,
    draw_order_changed: bool,
}

impl BaseOutcome {
    fn orders_changed(&self) -> bool {
        self.update_order_changed || self.draw_order_changed
    }
}

/// The property set every control understands, applied before the
/// behavior's own bindings.
fn apply_base_properties(control: &mut Control, scope: &mut PopulateScope<'_>) -> BaseOutcome {
    let mut outcome = BaseOutcome::default();

    if let Some(v) = scope.get::<i32>("X") {
        control.area.x = v;
    }
    if let Some(v) = scope.get::<i32>("Y") {
        control.area.y = v;
    }
    if let Some(v) = scope.get::<i32>("Width") {
        control.area.width = v;
    }
    if let Some(v) = scope.get::<i32>("Height") {
        control.area.height = v;
    }
    for alias in ["Location", "Position"] {
        if let Some(Value::Point(p)) = scope.value(alias, Semantic::Point) {
            control.area.x = p.x;
            control.area.y = p.y;
        }
    }
    if let Some(Value::Point(p)) = scope.value("Size", Semantic::Point) {
        control.area.width = p.x;
        control.area.height = p.y;
    }
    if let Some(v) = scope.get::<bool>("Enabled") {
        control.flags.set(ControlFlags::ENABLED, v);
    }
    // A configured visibility drives enablement with it.
    if let Some(v) = scope.get::<bool>("Visible") {
        control.flags.set(ControlFlags::ENABLED, v);
        outcome.visible = Some(v);
    }
    if let Some(v) = scope.get::<i32>("UpdateOrder") {
        if control.update_order != v {
            control.update_order = v;
            outcome.update_order_changed = true;
        }
    }
    if let Some(v) = scope.get::<i32>("DrawOrder") {
        if control.draw_order != v {
            control.draw_order = v;
            outcome.draw_order_changed = true;
        }
    }

    outcome
}
