//! Label: static shadowed text that sizes itself.
//!
//! A label's area follows its text: whenever the text changes, the control
//! is resized to the measured dimensions and repositioned around its
//! anchor point. An empty label keeps whatever area it had.

use crate::assets::FontHandle;
use crate::color::Color;
use crate::config::{Semantic, Value};
use crate::context::UiContext;
use crate::control::Control;
use crate::geometry::{Point, Rect};
use crate::kind::{ControlKind, CONTROL};
use crate::render::{Frame, TextMetrics};
use crate::tree::{ControlId, ControlTree};

use super::{apply_bindings, resolve_font, Behavior, Binding, PopulateScope};

pub static LABEL: ControlKind = ControlKind {
    name: "Label",
    base: Some(&CONTROL),
};

/// Which part of the text sits on the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelAnchor {
    /// No anchoring; the label keeps its position and only resizes.
    #[default]
    None,
    /// The text ends at the anchor point.
    Left,
    /// The text is centered on the anchor point.
    Center,
    /// The text begins at the anchor point.
    Right,
}

impl LabelAnchor {
    /// Configuration spelling; anything unrecognized is `None`.
    pub fn parse(raw: &str) -> LabelAnchor {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("left") {
            LabelAnchor::Left
        } else if raw.eq_ignore_ascii_case("center") {
            LabelAnchor::Center
        } else if raw.eq_ignore_ascii_case("right") {
            LabelAnchor::Right
        } else {
            LabelAnchor::None
        }
    }
}

pub struct Label {
    /// `None` falls back to the theme's idle text color.
    pub color: Option<Color>,
    text: String,
    font: Option<FontHandle>,
    anchor: LabelAnchor,
    anchor_point: Point,
    needs_placement: bool,
}

static BINDINGS: &[Binding<Label>] = &[
    Binding {
        property: "Text",
        semantic: Semantic::Text,
        apply: |label, _, _, value| {
            if let Value::Text(v) = value {
                label.text = v;
            }
        },
    },
    Binding {
        property: "TextColor",
        semantic: Semantic::Color,
        apply: |label, _, _, value| {
            if let Value::Color(v) = value {
                label.color = Some(v);
            }
        },
    },
    Binding {
        property: "AnchorPoint",
        semantic: Semantic::Point,
        apply: |label, _, _, value| {
            if let Value::Point(v) = value {
                label.anchor_point = v;
            }
        },
    },
    Binding {
        property: "TextAnchor",
        semantic: Semantic::Text,
        apply: |label, _, _, value| {
            if let Value::Text(raw) = value {
                label.anchor = LabelAnchor::parse(&raw);
            }
        },
    },
];

impl Label {
    pub fn new() -> Self {
        Label {
            color: None,
            text: String::new(),
            font: None,
            anchor: LabelAnchor::None,
            anchor_point: Point::ZERO,
            needs_placement: false,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_anchor(mut self, anchor: LabelAnchor, point: Point) -> Self {
        self.anchor = anchor;
        self.anchor_point = point;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Changes the text; the control re-places itself on the next tick.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.needs_placement = true;
    }

    pub fn set_anchor(&mut self, anchor: LabelAnchor, point: Point) {
        self.anchor = anchor;
        self.anchor_point = point;
        self.needs_placement = true;
    }

    /// The area the label should occupy for its current text, or `None`
    /// when there is nothing to place.
    fn placed_area(&self, current: Rect, metrics: &dyn TextMetrics) -> Option<Rect> {
        if self.text.is_empty() {
            return None;
        }
        let font = self.font?;
        let (width, height) = metrics.measure(&self.text, font);
        let area = match self.anchor {
            LabelAnchor::Center => Rect::new(
                self.anchor_point.x - width / 2,
                self.anchor_point.y - height / 2,
                width,
                height,
            ),
            LabelAnchor::Right => {
                Rect::new(self.anchor_point.x, self.anchor_point.y, width, height)
            }
            LabelAnchor::Left => Rect::new(
                self.anchor_point.x - width,
                self.anchor_point.y,
                width,
                height,
            ),
            LabelAnchor::None => Rect::new(current.x, current.y, width, height),
        };
        Some(area)
    }

    fn place(&mut self, tree: &mut ControlTree, id: ControlId, ctx: &mut UiContext) {
        let current = tree.control(id).area();
        if let Some(area) = self.placed_area(current, ctx.metrics.as_ref()) {
            tree.set_area(id, area, ctx);
        }
    }
}

impl Default for Label {
    fn default() -> Self {
        Label::new()
    }
}

impl Behavior for Label {
    fn kind(&self) -> &'static ControlKind {
        &LABEL
    }

    fn init(&mut self, tree: &mut ControlTree, id: ControlId, ctx: &mut UiContext) {
        if self.font.is_none() {
            self.font = Some(ctx.assets.font(&ctx.theme.font, ctx.theme.font_size));
        }
        self.place(tree, id, ctx);
    }

    fn update(&mut self, tree: &mut ControlTree, id: ControlId, ctx: &mut UiContext, _dt: f32) {
        if self.needs_placement {
            self.place(tree, id, ctx);
            self.needs_placement = false;
        }
    }

    fn draw(&self, _tree: &ControlTree, _id: ControlId, ctx: &UiContext, frame: &mut Frame<'_>) {
        if self.text.is_empty() {
            return;
        }
        let Some(font) = self.font else {
            return;
        };
        let color = self.color.unwrap_or(ctx.theme.text_idle);
        frame.draw_text_shadowed(&self.text, font, Point::ZERO, color);
    }

    fn populate(&mut self, control: &mut Control, scope: &mut PopulateScope<'_>) {
        apply_bindings(self, BINDINGS, control, scope);
        if let Some(text) = scope.locale("Text") {
            self.text = text.to_string();
        }
        self.font = Some(resolve_font(scope));
        if let Some(area) = self.placed_area(control.area(), scope.metrics) {
            control.area = area;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::NullAssets;
    use crate::config::{ConfigNode, ConfigResolver};
    use crate::input::{CursorState, KeyboardState};
    use crate::render::{DrawOp, FixedMetrics, RecordingRenderer};
    use crate::strings::StringTable;

    fn context_with(config: ConfigNode) -> UiContext {
        UiContext::new(
            ConfigResolver::new(config),
            Box::new(NullAssets::new()),
            Box::new(StringTable::new()),
            Box::new(FixedMetrics::default()),
        )
    }

    fn context() -> UiContext {
        context_with(ConfigNode::mapping())
    }

    fn area_of(tree: &ControlTree, id: ControlId) -> Rect {
        tree.control(id).area()
    }

    #[test]
    fn test_anchor_parse() {
        assert_eq!(LabelAnchor::parse("CENTER"), LabelAnchor::Center);
        assert_eq!(LabelAnchor::parse("left"), LabelAnchor::Left);
        assert_eq!(LabelAnchor::parse("Right"), LabelAnchor::Right);
        assert_eq!(LabelAnchor::parse("NONE"), LabelAnchor::None);
        assert_eq!(LabelAnchor::parse("diagonal"), LabelAnchor::None);
    }

    #[test]
    fn test_anchors_place_measured_text() {
        let mut ctx = context();
        let mut tree = ControlTree::new();

        // Fixed metrics: "hi" measures 16x16.
        let center = tree.register(
            Control::new(),
            Label::new()
                .with_text("hi")
                .with_anchor(LabelAnchor::Center, Point::new(100, 50)),
        );
        let right = tree.register(
            Control::new(),
            Label::new()
                .with_text("hi")
                .with_anchor(LabelAnchor::Right, Point::new(100, 50)),
        );
        let left = tree.register(
            Control::new(),
            Label::new()
                .with_text("hi")
                .with_anchor(LabelAnchor::Left, Point::new(100, 50)),
        );
        tree.add_root(center, &mut ctx);
        tree.add_root(right, &mut ctx);
        tree.add_root(left, &mut ctx);

        assert_eq!(area_of(&tree, center), Rect::new(92, 42, 16, 16));
        assert_eq!(area_of(&tree, right), Rect::new(100, 50, 16, 16));
        assert_eq!(area_of(&tree, left), Rect::new(84, 50, 16, 16));
    }

    #[test]
    fn test_unanchored_label_keeps_position() {
        let mut ctx = context();
        let mut tree = ControlTree::new();
        let id = tree.register(
            Control::new().with_position(7, 9),
            Label::new().with_text("abc"),
        );
        tree.add_root(id, &mut ctx);

        assert_eq!(area_of(&tree, id), Rect::new(7, 9, 24, 16));
    }

    #[test]
    fn test_empty_label_keeps_area_and_draws_nothing() {
        let mut ctx = context();
        let mut tree = ControlTree::new();
        let id = tree.register(Control::new().with_size(30, 10), Label::new());
        tree.add_root(id, &mut ctx);

        assert_eq!(area_of(&tree, id), Rect::new(0, 0, 30, 10));

        let mut renderer = RecordingRenderer::new();
        tree.draw(&ctx, &mut renderer);
        assert!(renderer.ops.is_empty());
    }

    #[test]
    fn test_set_text_resizes_next_tick() {
        let mut ctx = context();
        let mut tree = ControlTree::new();
        let id = tree.register(Control::new(), Label::new().with_text("hi"));
        tree.add_root(id, &mut ctx);
        assert_eq!(area_of(&tree, id), Rect::new(0, 0, 16, 16));

        tree.behavior_mut::<Label>(id).unwrap().set_text("wide");
        ctx.begin_tick(0.016, CursorState::default(), KeyboardState::default());
        tree.update(&mut ctx);

        assert_eq!(area_of(&tree, id), Rect::new(0, 0, 32, 16));
    }

    #[test]
    fn test_draw_shadows_in_theme_color() {
        let mut ctx = context();
        ctx.theme.text_idle = Color::rgb(200, 210, 220);
        let mut tree = ControlTree::new();
        let id = tree.register(
            Control::new().with_position(5, 6),
            Label::new().with_text("hi"),
        );
        tree.add_root(id, &mut ctx);

        let mut renderer = RecordingRenderer::new();
        tree.draw(&ctx, &mut renderer);

        assert_eq!(
            renderer.ops,
            vec![
                DrawOp::Text {
                    text: "hi".to_string(),
                    position: Point::new(6, 7),
                    color: Color::BLACK,
                },
                DrawOp::Text {
                    text: "hi".to_string(),
                    position: Point::new(5, 6),
                    color: Color::rgb(200, 210, 220),
                },
            ]
        );
    }

    #[test]
    fn test_populate_anchors_from_config_and_locale() {
        let mut config = ConfigNode::mapping();
        config.set("title.TextAnchor", "CENTER");
        config.set("title.AnchorPoint", "60,40");
        config.set("Label.TextColor", "5,6,7");
        let mut ctx = context_with(config);
        let mut strings = StringTable::new();
        strings.insert("UI.title.Text", "Hello");
        ctx.strings = Box::new(strings);

        let mut tree = ControlTree::new();
        let id = tree.register(Control::new().with_name("title"), Label::new());
        tree.add_root(id, &mut ctx);
        tree.populate(id, &mut ctx);

        // "Hello" measures 40x16, centered on (60, 40).
        assert_eq!(area_of(&tree, id), Rect::new(40, 32, 40, 16));
        let label: &Label = tree.behavior(id).unwrap();
        assert_eq!(label.text(), "Hello");
        assert_eq!(label.color, Some(Color::rgb(5, 6, 7)));
    }
}
