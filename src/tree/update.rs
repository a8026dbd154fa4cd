//! Per-tick input routing.
//!
//! [`ControlTree::update`] walks top-level controls in descending update
//! order; each control drains its scheduled callbacks, hit-tests the
//! cursor against the window rectangle it had at the start of its tick,
//! fires the mouse events, elects at most one active child, and then
//! updates its children. The active-control chain decides who may handle
//! clicks: a control only classifies a click itself when none of its
//! children claimed the cursor.

use std::sync::Arc;

use crate::context::UiContext;
use crate::control::ControlFlags;
use crate::event::ControlEvent;
use crate::input::MouseButton;

use super::{ControlId, ControlTree};

impl ControlTree {
    /// Runs one input tick over every top-level control.
    ///
    /// Call [`UiContext::begin_tick`] first so the cursor snapshot, the
    /// clock, and the per-tick hot/icon state are fresh. Detached
    /// controls take part here directly, ahead of their parents when
    /// their update order says so.
    pub fn update(&mut self, ctx: &mut UiContext) {
        let mut top = self.top_level_snapshot();
        top.sort_by_key(|&id| {
            std::cmp::Reverse(self.arena.get(id).map_or(0, |n| n.control.update_order))
        });

        // One top-level control claims the cursor (or the keyboard, via
        // focus); everyone else is explicitly deactivated so stale flags
        // from earlier ticks cannot linger.
        let cursor = ctx.cursor;
        let mut claimed = false;
        for &id in &top {
            let Some(node) = self.arena.get(id) else {
                continue;
            };
            let control = &node.control;
            let hit = !claimed
                && control.is_visible()
                && (control.is_focused()
                    || (control.is_input_enabled()
                        && cursor.on_screen
                        && self.window_rect(id).contains(cursor.position)));
            let Some(node) = self.arena.get_mut(id) else {
                continue;
            };
            if hit {
                claimed = true;
                node.control.flags.insert(ControlFlags::ACTIVE);
                ctx.note_hot(id);
            } else {
                node.control.flags.remove(ControlFlags::ACTIVE);
            }
        }

        for id in top {
            let Some(node) = self.arena.get(id) else {
                continue;
            };
            if node.control.is_enabled() {
                self.update_control(id, ctx);
            }
        }
    }

    fn update_control(&mut self, id: ControlId, ctx: &mut UiContext) {
        // The rectangle from the start of the tick is what input is
        // tested against, even if a callback moves the control.
        let rect = self.window_rect(id);

        {
            let control = &mut self.node_mut(id).control;
            control.seconds_since_click += ctx.clock.delta;
        }

        // Drain the snapshot under the lock, invoke outside it: a
        // callback may schedule onto this same queue.
        let callbacks = Arc::clone(&self.node(id).control.callbacks);
        let drained = callbacks.lock().unwrap().drain_snapshot();
        for callback in drained {
            callback(self, ctx);
        }
        let Some(node) = self.arena.get_mut(id) else {
            return;
        };

        if node.control.flags.contains(ControlFlags::IGNORE_INPUT_FRAME) {
            node.control.flags.remove(ControlFlags::IGNORE_INPUT_FRAME);
            return;
        }

        let cursor = ctx.cursor;
        let mut active_child: Option<ControlId> = None;

        let hit = cursor.on_screen && self.is_active_chain(id) && rect.contains(cursor.position);
        if hit {
            if !self.node(id).control.hovered {
                self.fire(id, ctx, ControlEvent::MouseEnter);
                let Some(node) = self.arena.get_mut(id) else {
                    return;
                };
                node.control.hovered = true;
            }

            // Elect the first child under the cursor (or holding focus)
            // in update order; it becomes the active control this tick.
            self.node_mut(id).iterating = true;
            let scan: Vec<ControlId> = self.node(id).update_list.to_vec();
            for child in scan {
                let Some(node) = self.arena.get(child) else {
                    continue;
                };
                let control = &node.control;
                if !control.is_visible() || control.is_detached() {
                    continue;
                }
                let claims = control.is_focused()
                    || (control.is_input_enabled()
                        && self.window_rect(child).contains(cursor.position));
                if claims {
                    self.node_mut(child)
                        .control
                        .flags
                        .insert(ControlFlags::ACTIVE);
                    ctx.note_hot(child);
                    active_child = Some(child);
                    break;
                }
            }
            self.node_mut(id).iterating = false;

            if let Some(icon) = self.node(id).control.cursor_icon() {
                ctx.request_cursor_icon(icon);
            }

            self.fire(id, ctx, ControlEvent::MouseOnControl);
            if !self.arena.contains(id) {
                return;
            }
            if cursor.moved {
                let position = self.local_cursor(id, cursor.position);
                self.fire(id, ctx, ControlEvent::MouseMove { position });
                if !self.arena.contains(id) {
                    return;
                }
            }

            let handle_click = active_child.is_none();

            if cursor.left_pressed {
                self.fire(
                    id,
                    ctx,
                    ControlEvent::Pressed {
                        button: MouseButton::Left,
                    },
                );
                let Some(node) = self.arena.get_mut(id) else {
                    return;
                };
                node.control.left_press_began = true;
            } else if cursor.left_released && self.node(id).control.left_press_began {
                if handle_click {
                    self.click(id, MouseButton::Left, ctx);
                }
                let Some(node) = self.arena.get_mut(id) else {
                    return;
                };
                node.control.left_press_began = false;
            }

            if cursor.right_pressed {
                self.fire(
                    id,
                    ctx,
                    ControlEvent::Pressed {
                        button: MouseButton::Right,
                    },
                );
                let Some(node) = self.arena.get_mut(id) else {
                    return;
                };
                node.control.right_press_began = true;
            } else if cursor.right_released && self.node(id).control.right_press_began {
                if handle_click {
                    self.click(id, MouseButton::Right, ctx);
                }
                let Some(node) = self.arena.get_mut(id) else {
                    return;
                };
                node.control.right_press_began = false;
            }

            if cursor.wheel != 0 {
                self.fire(id, ctx, ControlEvent::Scroll { delta: cursor.wheel });
                if !self.arena.contains(id) {
                    return;
                }
            }
        } else if self.node(id).control.hovered {
            self.fire(id, ctx, ControlEvent::MouseLeave);
            let Some(node) = self.arena.get_mut(id) else {
                return;
            };
            // A left press survives leaving so that dragging off and back
            // onto the control can still complete a click.
            node.control.hovered = false;
            node.control.right_press_began = false;
        } else {
            let control = &mut self.node_mut(id).control;
            if control.left_press_began && cursor.left_released {
                control.left_press_began = false;
            }
            if control.right_press_began && cursor.right_released {
                control.right_press_began = false;
            }
        }

        self.node_mut(id).iterating = true;
        let children: Vec<ControlId> = self.node(id).update_list.to_vec();
        for child in children {
            let Some(node) = self.arena.get_mut(child) else {
                continue;
            };
            // Detached children tick in the top-level pass and manage
            // their own active flag there.
            if node.control.is_detached() {
                continue;
            }
            if Some(child) != active_child {
                node.control.flags.remove(ControlFlags::ACTIVE);
            }
            if node.control.is_enabled() {
                self.update_control(child, ctx);
            }
        }
        if let Some(node) = self.arena.get_mut(id) {
            node.iterating = false;
        } else {
            return;
        }
        self.drain_pending(id, ctx);

        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        node.control
            .flags
            .set(ControlFlags::CHILD_HANDLED_INPUT, active_child.is_some());

        let delta = ctx.clock.delta;
        self.with_behavior(id, |behavior, tree| behavior.update(tree, id, ctx, delta));
    }
}
