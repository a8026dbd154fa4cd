//! Watches the configuration cascade at work: one property name, four
//! controls, a different winning path for each.
//!
//! The resolver walks from the most specific scoped path down to the bare
//! property, substituting control kinds along the way. Run with
//! `RUST_LOG=debug` to see every candidate it tries.

use log::info;
use trellis::prelude::*;

fn main() {
    env_logger::init();

    let mut config = ConfigNode::mapping();
    // Global default, a per-kind override, and a per-control override.
    config.set("TextColor", "#808080");
    config.set("Button.TextColor", "#ffffff");
    config.set("hud.okBtn.TextColor", "#00ff88");
    config.set("hud.Width", "320");
    config.set("hud.Height", "200");
    config.set("hud.okBtn.Location", "8,170");
    config.set("hud.cancelBtn.Location", "120,170");

    let mut ctx = UiContext::new(
        ConfigResolver::new(config),
        Box::new(NullAssets::new()),
        Box::new(StringTable::new()),
        Box::new(FixedMetrics::default()),
    );

    let mut tree = ControlTree::new();
    let hud = tree.register(Control::new().with_name("hud"), Panel::new());
    let ok = tree.register(Control::new().with_name("okBtn"), Button::new());
    let cancel = tree.register(Control::new().with_name("cancelBtn"), Button::new());
    // Unnamed: only kind and bare-property paths can reach it.
    let badge = tree.register(Control::new(), Label::new());
    tree.add_root(hud, &mut ctx);
    for child in [ok, cancel, badge] {
        tree.add_child(hud, child, &mut ctx);
    }
    tree.populate(hud, &mut ctx);

    for (label, id) in [
        ("hud (panel)", hud),
        ("okBtn (button)", ok),
        ("cancelBtn (button)", cancel),
        ("unnamed label", badge),
    ] {
        let chain = tree.scope_chain(id);
        let color: Option<Color> = ctx.resolver.resolve(&chain, "TextColor");
        info!("{label:>16}: TextColor = {color:?}");
    }
    info!("resolver cached {} lookups", ctx.resolver.cache_len());

    // Editing configuration means building a fresh resolver; the cache is
    // append-only and never invalidated in place.
    let mut edited = ConfigNode::mapping();
    edited.set("TextColor", "#808080");
    edited.set("Button.TextColor", "#ff4040");
    edited.set("hud.Width", "320");
    edited.set("hud.Height", "200");
    ctx.resolver = ConfigResolver::new(edited);
    tree.populate(hud, &mut ctx);

    let color: Option<Color> = ctx.resolver.resolve(&tree.scope_chain(ok), "TextColor");
    info!("after reload, okBtn falls back to the kind path: {color:?}");
}
