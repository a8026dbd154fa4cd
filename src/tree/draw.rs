//! Surface compositing and the draw traversal.
//!
//! [`ControlTree::draw`] walks top-level controls in ascending draw order.
//! Direct-mode controls draw straight into the current target at an
//! origin accumulated from their ancestors' positions. Surface-mode
//! controls render their subtree into a private surface at logical size
//! and composite it out scaled by their own integer factor, switching to
//! the nearest-neighbor sampler so upscaled pixels stay crisp. Detached
//! direct-mode controls under an inherited scale borrow one shared
//! scratch surface for the same render-then-composite trick.
//!
//! Behaviors draw through a [`Frame`] and receive the tree immutably, so
//! the structure cannot change mid-traversal and no mutation queues are
//! involved here.

use crate::color::Color;
use crate::context::UiContext;
use crate::control::{ControlSurface, DrawMode};
use crate::geometry::{Point, Rect};
use crate::render::{DrawSettings, Frame, Renderer, Sampler};

use super::{ControlId, ControlTree};

impl ControlTree {
    /// Draws every visible top-level control, ascending draw order.
    /// Surfaces retired since the last frame are destroyed first.
    pub fn draw(&mut self, ctx: &UiContext, renderer: &mut dyn Renderer) {
        self.flush_retired(renderer);

        let mut top = self.top_level_snapshot();
        top.sort_by_key(|&id| self.arena.get(id).map_or(0, |n| n.control.draw_order));

        for id in top {
            let Some(node) = self.arena.get(id) else {
                continue;
            };
            let control = &node.control;
            if !control.is_visible() || control.is_killed() {
                continue;
            }
            let origin = self.render_point(id);
            self.draw_control(id, ctx, renderer, origin);
        }
    }

    /// Draws one control subtree with its top-left at `origin` in the
    /// current target.
    fn draw_control(
        &mut self,
        id: ControlId,
        ctx: &UiContext,
        renderer: &mut dyn Renderer,
        origin: Point,
    ) {
        let control = &self.node(id).control;
        let detached = control.is_detached();
        match control.draw_mode {
            DrawMode::Surface => self.draw_with_surface(id, ctx, renderer, origin),
            DrawMode::Direct if detached && self.total_scale(id) > 1 => {
                self.draw_detached_scaled(id, ctx, renderer, origin)
            }
            DrawMode::Direct => {
                self.draw_content(id, ctx, renderer, origin);
            }
        }
    }

    /// The behavior's draw hook, the children back-to-front, then the
    /// behavior's overlay hook, all at offsets from `origin`.
    fn draw_content(
        &mut self,
        id: ControlId,
        ctx: &UiContext,
        renderer: &mut dyn Renderer,
        origin: Point,
    ) {
        if let Some(node) = self.arena.get(id) {
            let mut frame = Frame::new(renderer, origin);
            node.behavior.draw(self, id, ctx, &mut frame);
        }

        let children: Vec<ControlId> = self.node(id).draw_list.to_vec();
        for child in children {
            let Some(node) = self.arena.get(child) else {
                continue;
            };
            let control = &node.control;
            if !control.is_visible() || control.is_detached() || control.is_killed() {
                continue;
            }
            let child_origin = origin + control.area.position();
            self.draw_control(child, ctx, renderer, child_origin);
        }

        if let Some(node) = self.arena.get(id) {
            let mut frame = Frame::new(renderer, origin);
            node.behavior.draw_overlay(self, id, ctx, &mut frame);
        }
    }

    /// Renders the subtree into the control's private surface and
    /// composites it at `origin`, scaled by the control's own factor.
    fn draw_with_surface(
        &mut self,
        id: ControlId,
        ctx: &UiContext,
        renderer: &mut dyn Renderer,
        origin: Point,
    ) {
        let area = self.node(id).control.area;
        let width = surface_axis(area.width);
        let height = surface_axis(area.height);

        let surface = match self.node(id).control.surface {
            Some(existing) if existing.width == width && existing.height == height => existing,
            stale => {
                if let Some(old) = stale {
                    self.retired_surfaces.push(old.id);
                }
                let created = ControlSurface {
                    id: renderer.create_surface(width as u32, height as u32),
                    width,
                    height,
                };
                self.node_mut(id).control.surface = Some(created);
                created
            }
        };

        renderer.push_surface(surface.id);
        renderer.clear(Color::TRANSPARENT);
        self.draw_content(id, ctx, renderer, Point::ZERO);
        renderer.pop_surface();

        let control = &self.node(id).control;
        let scale = control.scale;
        let dest = Rect::new(origin.x, origin.y, area.width * scale, area.height * scale);
        let source = Rect::new(0, 0, area.width, area.height);
        let tint = Color::WHITE.mul_alpha(control.alpha);

        let switch_sampler = scale > 1 && renderer.settings().sampler != Sampler::NearestClamp;
        if switch_sampler {
            renderer.push_settings(DrawSettings::scaled_composite());
        }
        renderer.draw_surface(surface.id, source, dest, tint);
        if switch_sampler {
            renderer.pop_settings();
        }
    }

    /// A detached direct-mode control under an inherited scale factor
    /// cannot rely on an ancestor surface to apply the scale, so it
    /// renders into the shared scratch surface and composites that.
    /// The scratch grows to the largest control that needed it.
    fn draw_detached_scaled(
        &mut self,
        id: ControlId,
        ctx: &UiContext,
        renderer: &mut dyn Renderer,
        origin: Point,
    ) {
        let area = self.node(id).control.area;
        let total = self.total_scale(id);
        let need_width = surface_axis(area.width);
        let need_height = surface_axis(area.height);

        let scratch = match self.scratch {
            Some(existing) if existing.width >= need_width && existing.height >= need_height => {
                existing
            }
            existing => {
                let width = existing.map_or(need_width, |s| s.width.max(need_width));
                let height = existing.map_or(need_height, |s| s.height.max(need_height));
                if let Some(old) = existing {
                    self.retired_surfaces.push(old.id);
                }
                let created = ControlSurface {
                    id: renderer.create_surface(width as u32, height as u32),
                    width,
                    height,
                };
                self.scratch = Some(created);
                created
            }
        };

        renderer.push_surface(scratch.id);
        renderer.clear(Color::TRANSPARENT);
        self.draw_content(id, ctx, renderer, Point::ZERO);
        renderer.pop_surface();

        let alpha = self.node(id).control.alpha;
        let dest = Rect::new(origin.x, origin.y, area.width * total, area.height * total);
        let source = Rect::new(0, 0, area.width, area.height);

        let switch_sampler = renderer.settings().sampler != Sampler::NearestClamp;
        if switch_sampler {
            renderer.push_settings(DrawSettings::scaled_composite());
        }
        renderer.draw_surface(scratch.id, source, dest, Color::WHITE.mul_alpha(alpha));
        if switch_sampler {
            renderer.pop_settings();
        }
    }
}

/// Surfaces for degenerate controls still need a positive size.
fn surface_axis(logical: i32) -> i32 {
    if logical <= 0 {
        2
    } else {
        logical
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::assets::NullAssets;
    use crate::config::{ConfigNode, ConfigResolver};
    use crate::control::Control;
    use crate::kind::CONTROL;
    use crate::render::{DrawOp, FixedMetrics, RecordingRenderer};
    use crate::strings::StringTable;
    use crate::widgets::{Base, Behavior};

    fn context() -> UiContext {
        UiContext::new(
            ConfigResolver::new(ConfigNode::mapping()),
            Box::new(NullAssets::new()),
            Box::new(StringTable::new()),
            Box::new(FixedMetrics::default()),
        )
    }

    /// Records the frame origin it was drawn at.
    struct OriginProbe {
        seen: Rc<RefCell<Vec<Point>>>,
    }

    impl Behavior for OriginProbe {
        fn kind(&self) -> &'static crate::kind::ControlKind {
            &CONTROL
        }

        fn draw(&self, _tree: &ControlTree, _id: ControlId, _ctx: &UiContext, frame: &mut Frame<'_>) {
            self.seen.borrow_mut().push(frame.origin());
        }
    }

    fn probe(tree: &mut ControlTree, control: Control) -> (ControlId, Rc<RefCell<Vec<Point>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let id = tree.register(
            control,
            OriginProbe {
                seen: Rc::clone(&seen),
            },
        );
        (id, seen)
    }

    #[test]
    fn test_direct_origins_accumulate() {
        let mut tree = ControlTree::new();
        let mut ctx = context();
        let (root, root_seen) = probe(&mut tree, Control::new().with_position(7, 9).with_size(50, 50));
        let (child, child_seen) = probe(&mut tree, Control::new().with_position(5, 5).with_size(10, 10));
        tree.add_child(root, child, &mut ctx);
        tree.add_root(root, &mut ctx);

        let mut renderer = RecordingRenderer::new();
        tree.draw(&ctx, &mut renderer);

        assert_eq!(*root_seen.borrow(), vec![Point::new(7, 9)]);
        assert_eq!(*child_seen.borrow(), vec![Point::new(12, 14)]);
        assert!(renderer.ops.is_empty());
    }

    #[test]
    fn test_surface_created_once_and_composited() {
        let mut tree = ControlTree::new();
        let mut ctx = context();
        let id = tree.register(
            Control::new()
                .with_position(3, 4)
                .with_size(10, 8)
                .with_draw_mode(DrawMode::Surface),
            Base,
        );
        tree.add_root(id, &mut ctx);

        let mut renderer = RecordingRenderer::new();
        tree.draw(&ctx, &mut renderer);
        tree.draw(&ctx, &mut renderer);

        let creates = renderer
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::CreateSurface(..)))
            .count();
        assert_eq!(creates, 1);

        let surface = tree.control(id).surface.unwrap();
        assert_eq!((surface.width, surface.height), (10, 8));
        assert!(renderer.ops.contains(&DrawOp::Surface {
            surface: surface.id,
            source: Rect::new(0, 0, 10, 8),
            dest: Rect::new(3, 4, 10, 8),
            tint: Color::WHITE,
        }));
        // Unscaled composite keeps the current sampler.
        assert!(!renderer
            .ops
            .iter()
            .any(|op| matches!(op, DrawOp::PushSettings(_))));
    }

    #[test]
    fn test_surface_content_renders_inside_target() {
        let mut tree = ControlTree::new();
        let mut ctx = context();
        let parent = tree.register(
            Control::new()
                .with_position(20, 20)
                .with_size(40, 40)
                .with_draw_mode(DrawMode::Surface),
            Base,
        );
        let (child, child_seen) = probe(
            &mut tree,
            Control::new().with_position(6, 7).with_size(4, 4),
        );
        tree.add_child(parent, child, &mut ctx);
        tree.add_root(parent, &mut ctx);

        let mut renderer = RecordingRenderer::new();
        tree.draw(&ctx, &mut renderer);

        // Children land at local offsets inside the private surface.
        assert_eq!(*child_seen.borrow(), vec![Point::new(6, 7)]);

        let surface = tree.control(parent).surface.unwrap().id;
        let push = renderer
            .find(|op| *op == DrawOp::PushSurface(surface))
            .unwrap();
        let clear = renderer
            .find(|op| *op == DrawOp::Clear(Color::TRANSPARENT))
            .unwrap();
        let pop = renderer.find(|op| *op == DrawOp::PopSurface).unwrap();
        let composite = renderer
            .find(|op| matches!(op, DrawOp::Surface { .. }))
            .unwrap();
        assert!(push < clear && clear < pop && pop < composite);
    }

    #[test]
    fn test_degenerate_surface_axis_is_two() {
        let mut tree = ControlTree::new();
        let mut ctx = context();
        let id = tree.register(
            Control::new()
                .with_size(0, 12)
                .with_draw_mode(DrawMode::Surface),
            Base,
        );
        tree.add_root(id, &mut ctx);

        let mut renderer = RecordingRenderer::new();
        tree.draw(&ctx, &mut renderer);

        assert!(renderer
            .ops
            .iter()
            .any(|op| matches!(op, DrawOp::CreateSurface(_, 2, 12))));
    }

    #[test]
    fn test_scaled_composite_switches_sampler() {
        let mut tree = ControlTree::new();
        let mut ctx = context();
        let id = tree.register(
            Control::new()
                .with_position(1, 1)
                .with_size(8, 8)
                .with_draw_mode(DrawMode::Surface)
                .with_scale(3),
            Base,
        );
        tree.add_root(id, &mut ctx);

        let mut renderer = RecordingRenderer::new();
        tree.draw(&ctx, &mut renderer);

        let surface = tree.control(id).surface.unwrap();
        assert_eq!((surface.width, surface.height), (8, 8));

        let push = renderer
            .find(|op| *op == DrawOp::PushSettings(DrawSettings::scaled_composite()))
            .unwrap();
        let composite = renderer
            .find(|op| matches!(op, DrawOp::Surface { dest, .. } if *dest == Rect::new(1, 1, 24, 24)))
            .unwrap();
        let pop = renderer.find(|op| *op == DrawOp::PopSettings).unwrap();
        assert!(push < composite && composite < pop);
    }

    #[test]
    fn test_sampler_untouched_when_already_nearest() {
        let mut tree = ControlTree::new();
        let mut ctx = context();
        let id = tree.register(
            Control::new()
                .with_size(8, 8)
                .with_draw_mode(DrawMode::Surface)
                .with_scale(2),
            Base,
        );
        tree.add_root(id, &mut ctx);

        let mut renderer = RecordingRenderer::new();
        renderer.push_settings(DrawSettings::scaled_composite());
        renderer.take_ops();
        tree.draw(&ctx, &mut renderer);

        assert!(!renderer
            .ops
            .iter()
            .any(|op| matches!(op, DrawOp::PushSettings(_))));
    }

    #[test]
    fn test_resize_recreates_surface_on_next_draw() {
        let mut tree = ControlTree::new();
        let mut ctx = context();
        let id = tree.register(
            Control::new()
                .with_size(10, 10)
                .with_draw_mode(DrawMode::Surface),
            Base,
        );
        tree.add_root(id, &mut ctx);

        let mut renderer = RecordingRenderer::new();
        tree.draw(&ctx, &mut renderer);
        let first = tree.control(id).surface.unwrap().id;

        tree.set_size(id, 16, 16, &mut ctx);
        assert!(tree.control(id).surface.is_none());

        tree.draw(&ctx, &mut renderer);
        let second = tree.control(id).surface.unwrap();
        assert_ne!(second.id, first);
        assert_eq!((second.width, second.height), (16, 16));
        // The old surface was destroyed by the retired-list flush.
        assert!(renderer.ops.contains(&DrawOp::DestroySurface(first)));
    }

    #[test]
    fn test_hidden_killed_and_detached_children_skipped() {
        let mut tree = ControlTree::new();
        let mut ctx = context();
        let parent = tree.register(Control::new().with_size(50, 50), Base);
        let (hidden, hidden_seen) = probe(&mut tree, Control::new().with_size(5, 5));
        let (killed, killed_seen) = probe(&mut tree, Control::new().with_size(5, 5));
        let (floating, floating_seen) = probe(
            &mut tree,
            Control::new().with_position(2, 2).with_size(5, 5),
        );
        for child in [hidden, killed, floating] {
            tree.add_child(parent, child, &mut ctx);
        }
        tree.add_root(parent, &mut ctx);

        tree.set_visible(hidden, false);
        tree.kill(killed);
        tree.detach(floating);

        let mut renderer = RecordingRenderer::new();
        tree.draw(&ctx, &mut renderer);

        assert!(hidden_seen.borrow().is_empty());
        assert!(killed_seen.borrow().is_empty());
        // Drawn once, by the top-level pass, at its window position.
        assert_eq!(*floating_seen.borrow(), vec![Point::new(2, 2)]);
    }

    /// Pushes its tag into a shared log when drawn.
    struct TagProbe {
        tag: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Behavior for TagProbe {
        fn kind(&self) -> &'static crate::kind::ControlKind {
            &CONTROL
        }

        fn draw(&self, _tree: &ControlTree, _id: ControlId, _ctx: &UiContext, _frame: &mut Frame<'_>) {
            self.log.borrow_mut().push(self.tag);
        }
    }

    #[test]
    fn test_draw_order_sorts_top_level_and_children() {
        let mut tree = ControlTree::new();
        let mut ctx = context();
        let log = Rc::new(RefCell::new(Vec::new()));
        let tag = |log: &Rc<RefCell<Vec<&'static str>>>, tag| TagProbe {
            tag,
            log: Rc::clone(log),
        };

        let late = tree.register(
            Control::new().with_size(5, 5).with_draw_order(9),
            tag(&log, "late"),
        );
        let early = tree.register(
            Control::new().with_size(5, 5).with_draw_order(1),
            tag(&log, "early"),
        );
        let back = tree.register(
            Control::new().with_size(2, 2).with_draw_order(0),
            tag(&log, "back"),
        );
        let front = tree.register(
            Control::new().with_size(2, 2).with_draw_order(5),
            tag(&log, "front"),
        );
        // Added front-first to prove the sort, not insertion order, wins.
        tree.add_child(early, front, &mut ctx);
        tree.add_child(early, back, &mut ctx);
        tree.add_root(late, &mut ctx);
        tree.add_root(early, &mut ctx);

        let mut renderer = RecordingRenderer::new();
        tree.draw(&ctx, &mut renderer);

        assert_eq!(*log.borrow(), vec!["early", "back", "front", "late"]);
    }

    #[test]
    fn test_detached_scaled_uses_growing_scratch() {
        let mut tree = ControlTree::new();
        let mut ctx = context();
        let parent = tree.register(
            Control::new()
                .with_position(10, 10)
                .with_size(60, 60)
                .with_draw_mode(DrawMode::Surface)
                .with_scale(2),
            Base,
        );
        let (overlay, overlay_seen) = probe(
            &mut tree,
            Control::new().with_position(5, 5).with_size(12, 6),
        );
        tree.add_child(parent, overlay, &mut ctx);
        tree.add_root(parent, &mut ctx);
        tree.detach(overlay);

        let mut renderer = RecordingRenderer::new();
        tree.draw(&ctx, &mut renderer);

        // Content rendered at the scratch origin.
        assert_eq!(*overlay_seen.borrow(), vec![Point::ZERO]);

        let scratch = tree.scratch.unwrap();
        assert_eq!((scratch.width, scratch.height), (12, 6));
        // Composite lands at the window point, scaled by the inherited
        // factor.
        assert!(renderer.ops.contains(&DrawOp::Surface {
            surface: scratch.id,
            source: Rect::new(0, 0, 12, 6),
            dest: Rect::new(20, 20, 24, 12),
            tint: Color::WHITE,
        }));

        // A second, larger detached control grows the scratch; the old one
        // is retired and destroyed on the next frame.
        let (big, _) = probe(
            &mut tree,
            Control::new().with_position(0, 0).with_size(8, 30),
        );
        tree.add_child(parent, big, &mut ctx);
        tree.detach(big);

        tree.draw(&ctx, &mut renderer);
        let grown = tree.scratch.unwrap();
        assert_eq!((grown.width, grown.height), (12, 30));
        assert_ne!(grown.id, scratch.id);

        tree.draw(&ctx, &mut renderer);
        assert!(renderer.ops.contains(&DrawOp::DestroySurface(scratch.id)));
    }

    #[test]
    fn test_detached_unscaled_draws_plain() {
        let mut tree = ControlTree::new();
        let mut ctx = context();
        let parent = tree.register(Control::new().with_position(4, 4).with_size(30, 30), Base);
        let (overlay, overlay_seen) = probe(
            &mut tree,
            Control::new().with_position(3, 3).with_size(6, 6),
        );
        tree.add_child(parent, overlay, &mut ctx);
        tree.add_root(parent, &mut ctx);
        tree.detach(overlay);

        let mut renderer = RecordingRenderer::new();
        tree.draw(&ctx, &mut renderer);

        // Unit total scale: no scratch involved, drawn at the window point.
        assert!(tree.scratch.is_none());
        assert_eq!(*overlay_seen.borrow(), vec![Point::new(7, 7)]);
        assert!(renderer.ops.is_empty());
    }

    #[test]
    fn test_surface_release_on_hide_destroys_next_frame() {
        let mut tree = ControlTree::new();
        let mut ctx = context();
        let id = tree.register(
            Control::new()
                .with_size(10, 10)
                .with_draw_mode(DrawMode::Surface),
            Base,
        );
        tree.add_root(id, &mut ctx);

        let mut renderer = RecordingRenderer::new();
        tree.draw(&ctx, &mut renderer);
        let surface = tree.control(id).surface.unwrap().id;

        tree.set_visible(id, false);
        assert!(tree.control(id).surface.is_none());

        tree.draw(&ctx, &mut renderer);
        assert!(renderer.ops.contains(&DrawOp::DestroySurface(surface)));
        assert!(renderer.surfaces.is_empty());
    }

    struct KeepWarm;

    impl Behavior for KeepWarm {
        fn kind(&self) -> &'static crate::kind::ControlKind {
            &CONTROL
        }

        fn keep_surface_when_hidden(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_keep_surface_when_hidden_hook() {
        let mut tree = ControlTree::new();
        let mut ctx = context();
        let id = tree.register(
            Control::new()
                .with_size(10, 10)
                .with_draw_mode(DrawMode::Surface),
            KeepWarm,
        );
        tree.add_root(id, &mut ctx);

        let mut renderer = RecordingRenderer::new();
        tree.draw(&ctx, &mut renderer);
        assert!(tree.control(id).surface.is_some());

        tree.set_visible(id, false);
        assert!(tree.control(id).surface.is_some());
    }
}
