//! The converter registry: semantic types and leaf-string decoding.
//!
//! Every property binding declares the [`Semantic`] it expects; the
//! resolver decodes the winning leaf string into a [`Value`] of that
//! semantic. Typed access goes through [`FromConfig`], which also narrows
//! integer widths with range checks. A failed decode or narrow is a miss,
//! never an error.

use crate::assets::TextureSpec;
use crate::color::Color;
use crate::geometry::{Point, Rect};

/// The semantic type a property expects from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Semantic {
    Bool,
    Int,
    UInt,
    Float,
    Color,
    Point,
    Rect,
    Texture,
    Sound,
    Text,
}

/// A decoded configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Color(Color),
    Point(Point),
    Rect(Rect),
    Texture(TextureSpec),
    Sound(String),
    Text(String),
}

/// Decodes a leaf string as one semantic. `None` is a conversion failure,
/// which the resolver reports as "not found".
pub(crate) fn decode(raw: &str, semantic: Semantic) -> Option<Value> {
    match semantic {
        Semantic::Bool => parse_bool(raw).map(Value::Bool),
        Semantic::Int => raw.trim().parse::<i64>().ok().map(Value::Int),
        Semantic::UInt => raw.trim().parse::<u64>().ok().map(Value::UInt),
        Semantic::Float => raw.trim().parse::<f64>().ok().map(Value::Float),
        Semantic::Color => Color::parse(raw).map(Value::Color),
        Semantic::Point => {
            let parts = parse_components(raw, 2)?;
            Some(Value::Point(Point::new(parts[0], parts[1])))
        }
        Semantic::Rect => {
            let parts = parse_components(raw, 4)?;
            Some(Value::Rect(Rect::new(
                parts[0], parts[1], parts[2], parts[3],
            )))
        }
        // Texture and sound specs always decode; whether the asset exists
        // is the loader's concern.
        Semantic::Texture => Some(Value::Texture(TextureSpec::parse(raw))),
        Semantic::Sound => Some(Value::Sound(raw.trim().to_string())),
        Semantic::Text => Some(Value::Text(raw.to_string())),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("yes") || raw == "1" {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") || raw.eq_ignore_ascii_case("no") || raw == "0" {
        Some(false)
    } else {
        None
    }
}

/// `X,Y` style component lists, with optional surrounding parentheses.
fn parse_components(raw: &str, count: usize) -> Option<Vec<i32>> {
    let raw = raw.trim().trim_start_matches('(').trim_end_matches(')');
    let parts: Vec<i32> = raw
        .split(',')
        .map(|part| part.trim().parse::<i32>())
        .collect::<Result<_, _>>()
        .ok()?;
    (parts.len() == count).then_some(parts)
}

/// Typed extraction from a decoded [`Value`].
pub trait FromConfig: Sized {
    const SEMANTIC: Semantic;

    fn from_value(value: Value) -> Option<Self>;
}

impl FromConfig for bool {
    const SEMANTIC: Semantic = Semantic::Bool;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! impl_from_config_int {
    ($($ty:ty),*) => {
        $(impl FromConfig for $ty {
            const SEMANTIC: Semantic = Semantic::Int;

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::Int(v) => <$ty>::try_from(v).ok(),
                    _ => None,
                }
            }
        })*
    };
}

macro_rules! impl_from_config_uint {
    ($($ty:ty),*) => {
        $(impl FromConfig for $ty {
            const SEMANTIC: Semantic = Semantic::UInt;

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::UInt(v) => <$ty>::try_from(v).ok(),
                    _ => None,
                }
            }
        })*
    };
}

impl_from_config_int!(i8, i16, i32, i64);
impl_from_config_uint!(u8, u16, u32, u64);

impl FromConfig for f32 {
    const SEMANTIC: Semantic = Semantic::Float;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(v as f32),
            _ => None,
        }
    }
}

impl FromConfig for f64 {
    const SEMANTIC: Semantic = Semantic::Float;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(v),
            _ => None,
        }
    }
}

impl FromConfig for Color {
    const SEMANTIC: Semantic = Semantic::Color;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Color(v) => Some(v),
            _ => None,
        }
    }
}

impl FromConfig for Point {
    const SEMANTIC: Semantic = Semantic::Point;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Point(v) => Some(v),
            _ => None,
        }
    }
}

impl FromConfig for Rect {
    const SEMANTIC: Semantic = Semantic::Rect;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Rect(v) => Some(v),
            _ => None,
        }
    }
}

impl FromConfig for TextureSpec {
    const SEMANTIC: Semantic = Semantic::Texture;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Texture(v) => Some(v),
            _ => None,
        }
    }
}

impl FromConfig for String {
    const SEMANTIC: Semantic = Semantic::Text;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}
