//! The full widget set wired together and driven headlessly: an options
//! dialog populated from configuration and locale strings, a scripted
//! mouse session, and one recorded frame dumped at the end.
//!
//! Run with `RUST_LOG=debug` to watch the resolver pick a path for every
//! property.

use log::info;
use trellis::prelude::*;

fn main() {
    env_logger::init();

    let mut config = ConfigNode::mapping();
    config.set("options.X", "10");
    config.set("options.Y", "10");
    config.set("options.Width", "200");
    config.set("options.Height", "150");
    config.set("options.BackgroundTexture", "dialog_bg");
    config.set("options.BorderColor", "64,64,64");
    config.set("options.title.TextAnchor", "Center");
    config.set("options.title.AnchorPoint", "100,12");
    config.set("options.okBtn.X", "10");
    config.set("options.okBtn.Y", "120");
    config.set("options.okBtn.IdleTexture", "btn_idle");
    config.set("options.okBtn.HoverTexture", "btn_hover");
    config.set("options.okBtn.HoverSoundEffect", "over");
    config.set("options.okBtn.ClickSoundEffect", "go");
    config.set("options.sound.X", "10");
    config.set("options.sound.Y", "40");
    config.set("options.sound.CheckedTexture", "check_on");
    config.set("options.sound.ClearTexture", "check_off");
    config.set("options.sound.Checked", "yes");
    config.set("options.volume.X", "10");
    config.set("options.volume.Y", "70");
    config.set("options.volume.Width", "110");
    config.set("options.volume.Height", "20");
    config.set("options.volume.MaxValue", "10");
    config.set("options.volume.Value", "3");
    config.set("options.volume.ButtonTexture", "thumb");
    config.set("options.volume.ClickSound", "slide");
    config.set("options.volume.DrawBorders", "no");

    let assets = NullAssets::new()
        .with_texture("dialog_bg", (200, 150))
        .with_texture("btn_idle", (48, 20))
        .with_texture("btn_hover", (48, 20))
        .with_texture("check_on", (16, 16))
        .with_texture("check_off", (16, 16))
        .with_texture("thumb", (10, 20))
        .with_sound("over")
        .with_sound("go")
        .with_sound("slide")
        .with_sound("toggle");
    let toggle = assets.sound_handle("toggle").unwrap();

    let mut strings = StringTable::new();
    strings.insert("UI.title.Text", "Options");
    strings.insert("UI.okBtn.Text", "OK");
    strings.insert("UI.sound.Text", "Sounds");

    let mut ctx = UiContext::new(
        ConfigResolver::new(config),
        Box::new(assets),
        Box::new(strings),
        Box::new(FixedMetrics::default()),
    );

    let mut tree = ControlTree::new();
    let root = tree.register(Control::new().with_name("options"), Panel::new());
    let title = tree.register(Control::new().with_name("title"), Label::new());
    let ok = tree.register(
        Control::new().with_name("okBtn"),
        Button::new().with_hotkey(Key::Enter),
    );
    let sound = tree.register(
        Control::new().with_name("sound"),
        CheckBox::new().with_check_sound(toggle),
    );
    let volume = tree.register(Control::new().with_name("volume"), Trackbar::new());
    tree.add_root(root, &mut ctx);
    for child in [title, ok, sound, volume] {
        tree.add_child(root, child, &mut ctx);
    }
    tree.populate(root, &mut ctx);

    tree.observe(ok, |event| {
        if let ControlEvent::Click { button } = event {
            info!("okBtn clicked with {button:?}");
        }
    });
    tree.observe(sound, |event| {
        if let ControlEvent::CheckedChanged { checked } = event {
            info!("sound checkbox now {checked}");
        }
    });
    tree.observe(volume, |event| {
        if let ControlEvent::ValueChanged { value } = event {
            info!("volume moved to {value}");
        }
    });

    // (x, y, left button held, wheel steps) per tick.
    let script: &[(i32, i32, bool, i32)] = &[
        (150, 60, false, 0),
        (30, 140, false, 0),
        (30, 140, true, 0),
        (30, 140, false, 0),
        (25, 55, false, 0),
        (25, 55, true, 0),
        (25, 55, false, 0),
        (70, 90, false, 0),
        (70, 90, false, 1),
        (70, 90, false, 1),
        (25, 85, true, 0),
        (115, 85, true, 0),
        (115, 85, false, 0),
    ];
    let mut cursor = CursorState::default();
    for &(x, y, left, wheel) in script {
        cursor = CursorState::step(&cursor, Point::new(x, y), true, left, false, wheel);
        ctx.begin_tick(1.0 / 60.0, cursor, KeyboardState::default());
        tree.update(&mut ctx);
        for queued in ctx.take_sounds() {
            info!("sound queued: {queued:?}");
        }
    }

    info!(
        "session done: volume={}, sound={}, selected={:?}",
        tree.behavior::<Trackbar>(volume).unwrap().value(),
        tree.behavior::<CheckBox>(sound).unwrap().checked(),
        ctx.selected(),
    );

    let mut renderer = RecordingRenderer::new();
    tree.draw(&ctx, &mut renderer);
    println!("one frame, back to front:");
    for op in renderer.take_ops() {
        println!("  {op:?}");
    }
}
