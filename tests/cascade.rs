//! Configuration cascade exercised through whole-tree populates.

use trellis::prelude::*;

fn context_with(config: ConfigNode) -> UiContext {
    UiContext::new(
        ConfigResolver::new(config),
        Box::new(NullAssets::new()),
        Box::new(StringTable::new()),
        Box::new(FixedMetrics::default()),
    )
}

/// app > side > okBtn, all named.
fn nested(tree: &mut ControlTree, ctx: &mut UiContext) -> (ControlId, ControlId) {
    let app = tree.register(Control::new().with_name("app"), Panel::new());
    let side = tree.register(Control::new().with_name("side"), Panel::new());
    let ok = tree.register(Control::new().with_name("okBtn"), Button::new());
    tree.add_root(app, ctx);
    tree.add_child(app, side, ctx);
    tree.add_child(side, ok, ctx);
    (app, ok)
}

#[test]
fn test_populate_resolves_most_specific_path_first() {
    let mut config = ConfigNode::mapping();
    config.set("app.side.okBtn.Width", "120");
    config.set("side.okBtn.Height", "30");
    config.set("okBtn.X", "5");
    config.set("Button.Y", "7");
    // Shadowed by the deeper paths above.
    config.set("Button.Width", "999");
    config.set("okBtn.Height", "999");
    let mut ctx = context_with(config);

    let mut tree = ControlTree::new();
    let (app, ok) = nested(&mut tree, &mut ctx);
    tree.populate(app, &mut ctx);

    assert_eq!(tree.control(ok).area(), Rect::new(5, 7, 120, 30));
}

#[test]
fn test_trackbar_kind_chain_reaches_panel_settings() {
    // The trackbar is unnamed; only kind substitution can find these.
    let mut config = ConfigNode::mapping();
    config.set("Panel.BorderColor", "#102030");
    config.set("Panel.BackgroundMode", "Tiled");
    let mut ctx = context_with(config);

    let mut tree = ControlTree::new();
    let root = tree.register(Control::new().with_name("app"), Panel::new());
    let slider = tree.register(Control::new().with_size(80, 16), Trackbar::new());
    tree.add_root(root, &mut ctx);
    tree.add_child(root, slider, &mut ctx);
    tree.populate(root, &mut ctx);

    let trackbar: &Trackbar = tree.behavior(slider).unwrap();
    assert_eq!(
        trackbar.panel.border_color,
        Some(Color::rgb(0x10, 0x20, 0x30))
    );
    assert_eq!(trackbar.panel.layout, BackgroundLayout::Tiled);
}

#[test]
fn test_control_kind_is_the_last_fallback() {
    let mut config = ConfigNode::mapping();
    config.set("Control.Width", "64");
    config.set("app.Width", "100");
    let mut ctx = context_with(config);

    let mut tree = ControlTree::new();
    let root = tree.register(Control::new().with_name("app"), Panel::new());
    let plain = tree.register(Control::new(), Base);
    tree.add_root(root, &mut ctx);
    tree.add_child(root, plain, &mut ctx);
    tree.populate(root, &mut ctx);

    // Every kind chains up to Control, so the bare child finds the
    // fallback while the root's own literal path shadows it.
    assert_eq!(tree.control(plain).area().width, 64);
    assert_eq!(tree.control(root).area().width, 100);
}

#[test]
fn test_anonymous_levels_drop_from_literal_paths() {
    let mut config = ConfigNode::mapping();
    config.set("app.okBtn.Width", "90");
    let mut ctx = context_with(config);

    let mut tree = ControlTree::new();
    let app = tree.register(Control::new().with_name("app"), Panel::new());
    let middle = tree.register(Control::new(), Panel::new());
    let ok = tree.register(Control::new().with_name("okBtn"), Button::new());
    tree.add_root(app, &mut ctx);
    tree.add_child(app, middle, &mut ctx);
    tree.add_child(middle, ok, &mut ctx);
    tree.populate(app, &mut ctx);

    assert_eq!(tree.control(ok).area().width, 90);
}

#[test]
fn test_location_and_size_aliases() {
    let mut config = ConfigNode::mapping();
    config.set("okBtn.Location", "12,34");
    config.set("okBtn.Size", "(50,20)");
    let mut ctx = context_with(config);

    let mut tree = ControlTree::new();
    let ok = tree.register(Control::new().with_name("okBtn"), Button::new());
    tree.add_root(ok, &mut ctx);
    tree.populate(ok, &mut ctx);

    assert_eq!(tree.control(ok).area(), Rect::new(12, 34, 50, 20));
}

#[test]
fn test_repopulate_with_fresh_resolver_picks_up_changes() {
    let mut config = ConfigNode::mapping();
    config.set("okBtn.Width", "40");
    let mut ctx = context_with(config);

    let mut tree = ControlTree::new();
    let ok = tree.register(Control::new().with_name("okBtn"), Button::new());
    tree.add_root(ok, &mut ctx);
    tree.populate(ok, &mut ctx);
    assert_eq!(tree.control(ok).area().width, 40);

    // Edited configuration means a fresh resolver; the stale cache goes
    // with the old one.
    let mut edited = ConfigNode::mapping();
    edited.set("okBtn.Width", "80");
    ctx.resolver = ConfigResolver::new(edited);
    tree.populate(ok, &mut ctx);
    assert_eq!(tree.control(ok).area().width, 80);
}

#[test]
fn test_cache_stabilizes_across_repeated_populates() {
    let mut config = ConfigNode::mapping();
    config.set("app.Width", "100");
    config.set("app.side.okBtn.Width", "50");
    let mut ctx = context_with(config);

    let mut tree = ControlTree::new();
    let (app, _) = nested(&mut tree, &mut ctx);
    tree.populate(app, &mut ctx);
    let settled = ctx.resolver.cache_len();
    assert!(settled >= 2);

    tree.populate(app, &mut ctx);
    assert_eq!(ctx.resolver.cache_len(), settled);
}

#[test]
fn test_update_order_from_config_rewires_input_priority() {
    let mut config = ConfigNode::mapping();
    for name in ["below", "above"] {
        config.set(&format!("app.{name}.X"), "10");
        config.set(&format!("app.{name}.Y"), "10");
        config.set(&format!("app.{name}.Width"), "30");
        config.set(&format!("app.{name}.Height"), "30");
    }
    config.set("app.above.UpdateOrder", "5");
    let mut ctx = context_with(config);

    let mut tree = ControlTree::new();
    let app = tree.register(
        Control::new().with_name("app").with_size(100, 100),
        Panel::new(),
    );
    let below = tree.register(Control::new().with_name("below"), Base);
    let above = tree.register(Control::new().with_name("above"), Base);
    tree.add_root(app, &mut ctx);
    tree.add_child(app, below, &mut ctx);
    tree.add_child(app, above, &mut ctx);
    tree.populate(app, &mut ctx);

    let cursor = CursorState::step(
        &CursorState::default(),
        Point::new(20, 20),
        true,
        false,
        false,
        0,
    );
    ctx.begin_tick(0.016, cursor, KeyboardState::default());
    tree.update(&mut ctx);

    // The configured order moved "above" to the front of the scan.
    assert_eq!(ctx.hot(), Some(above));
    assert!(tree.control(above).is_active());
    assert!(!tree.control(below).is_active());
}
