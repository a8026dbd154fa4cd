//! RGBA color and the configuration string forms.
//!
//! Two spellings are accepted from configuration:
//!
//! - `#` followed by 8 (AARRGGBB), 6 (RRGGBB), 4 (ARGB, nibbles doubled),
//!   3 (RGB, nibbles doubled), 2 (grey byte) or 1 (grey nibble doubled)
//!   hex digits.
//! - Decimal components `R,G,B` or `R,G,B,A`, where the alpha component may
//!   also be a fractional multiplier like `0.5`.

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    /// The marker color of the placeholder texture handed out for missing
    /// assets.
    pub const PLACEHOLDER: Color = Color::rgb(255, 54, 244);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Color { a, ..self }
    }

    /// Multiplies every channel by `factor`, clamped to 0..=1.
    ///
    /// Used for compositing tints, where alpha scales the whole color the
    /// way premultiplied blending expects.
    pub fn mul_alpha(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        Color {
            r: (self.r as f32 * f) as u8,
            g: (self.g as f32 * f) as u8,
            b: (self.b as f32 * f) as u8,
            a: (self.a as f32 * f) as u8,
        }
    }

    /// Parses either spelling; `None` when the string fits neither.
    pub fn parse(raw: &str) -> Option<Color> {
        let raw = raw.trim();
        if let Some(digits) = raw.strip_prefix('#') {
            Self::parse_hex(digits)
        } else if raw.contains(',') {
            Self::parse_components(raw)
        } else {
            None
        }
    }

    fn parse_hex(digits: &str) -> Option<Color> {
        let value = u32::from_str_radix(digits, 16).ok()?;
        let nibble = |shift: u32| (((value >> shift) & 0xF) as u8) * 0x11;
        let byte = |shift: u32| ((value >> shift) & 0xFF) as u8;
        match digits.len() {
            8 => Some(Color::rgba(byte(16), byte(8), byte(0), byte(24))),
            6 => Some(Color::rgb(byte(16), byte(8), byte(0))),
            4 => Some(Color::rgba(nibble(8), nibble(4), nibble(0), nibble(12))),
            3 => Some(Color::rgb(nibble(8), nibble(4), nibble(0))),
            2 => Some(Color::rgb(byte(0), byte(0), byte(0))),
            1 => Some(Color::rgb(nibble(0), nibble(0), nibble(0))),
            _ => None,
        }
    }

    fn parse_components(raw: &str) -> Option<Color> {
        let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return None;
        }
        let r = parts[0].parse::<u8>().ok()?;
        let g = parts[1].parse::<u8>().ok()?;
        let b = parts[2].parse::<u8>().ok()?;
        let a = match parts.get(3) {
            None => 255,
            Some(part) => match part.parse::<u8>() {
                Ok(byte) => byte,
                // A fractional alpha multiplies the full range.
                Err(_) => {
                    let fraction = part.parse::<f32>().ok()?;
                    (255.0 * fraction) as u8
                }
            },
        };
        Some(Color::rgba(r, g, b, a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_arities() {
        assert_eq!(
            Color::parse("#80ff0000"),
            Some(Color::rgba(255, 0, 0, 128))
        );
        assert_eq!(Color::parse("#ff8000"), Some(Color::rgb(255, 128, 0)));
        assert_eq!(Color::parse("#8f00"), Some(Color::rgba(255, 0, 0, 136)));
        assert_eq!(Color::parse("#f0f"), Some(Color::rgb(255, 0, 255)));
        assert_eq!(Color::parse("#80"), Some(Color::rgb(128, 128, 128)));
        assert_eq!(Color::parse("#f"), Some(Color::rgb(255, 255, 255)));
        assert_eq!(Color::parse("#12345"), None);
        assert_eq!(Color::parse("#xyz"), None);
    }

    #[test]
    fn test_parse_components() {
        assert_eq!(Color::parse("255, 54, 244"), Some(Color::PLACEHOLDER));
        assert_eq!(
            Color::parse("10,20,30,40"),
            Some(Color::rgba(10, 20, 30, 40))
        );
        assert_eq!(
            Color::parse("255,255,255,0.5"),
            Some(Color::rgba(255, 255, 255, 127))
        );
        assert_eq!(Color::parse("300,0,0"), None);
        assert_eq!(Color::parse("1,2"), None);
        assert_eq!(Color::parse("white"), None);
    }

    #[test]
    fn test_mul_alpha() {
        let tinted = Color::WHITE.mul_alpha(0.5);
        assert_eq!(tinted, Color::rgba(127, 127, 127, 127));
        assert_eq!(Color::WHITE.mul_alpha(2.0), Color::WHITE);
        assert_eq!(Color::WHITE.mul_alpha(-1.0), Color::rgba(0, 0, 0, 0));
    }
}
