//! Hex color parsing.

use tiny_skia::Color;

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn byte_at(hex: &[u8], idx: usize) -> Option<u8> {
    Some(hex_digit(hex[idx])? * 16 + hex_digit(hex[idx + 1])?)
}

/// Parse `#rgb`, `#rrggbb`, or `#rrggbbaa`.
#[must_use]
pub fn parse_color(value: &str) -> Option<Color> {
    let hex = value.trim().strip_prefix('#')?.as_bytes();
    match hex.len() {
        3 => {
            let r = hex_digit(hex[0])?;
            let g = hex_digit(hex[1])?;
            let b = hex_digit(hex[2])?;
            Some(Color::from_rgba8(r * 17, g * 17, b * 17, 255))
        }
        6 => Some(Color::from_rgba8(
            byte_at(hex, 0)?,
            byte_at(hex, 2)?,
            byte_at(hex, 4)?,
            255,
        )),
        8 => Some(Color::from_rgba8(
            byte_at(hex, 0)?,
            byte_at(hex, 2)?,
            byte_at(hex, 4)?,
            byte_at(hex, 6)?,
        )),
        _ => None,
    }
}

/// Parse a color, falling back to opaque black so a slide always renders.
#[must_use]
pub fn color_or_black(value: &str) -> Color {
    parse_color(value).unwrap_or_else(|| {
        tracing::debug!(value, "unparseable color, using black");
        Color::BLACK
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(c: Color) -> (u8, u8, u8, u8) {
        let c = c.to_color_u8();
        (c.red(), c.green(), c.blue(), c.alpha())
    }

    #[test]
    fn parses_six_digit_hex() {
        assert_eq!(rgba(parse_color("#7c7cff").expect("color")), (124, 124, 255, 255));
        assert_eq!(rgba(parse_color("#000012").expect("color")), (0, 0, 18, 255));
    }

    #[test]
    fn parses_short_and_alpha_forms() {
        assert_eq!(rgba(parse_color("#fff").expect("color")), (255, 255, 255, 255));
        assert_eq!(rgba(parse_color("#00000080").expect("color")), (0, 0, 0, 128));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_color("").is_none());
        assert!(parse_color("red").is_none());
        assert!(parse_color("#12345").is_none());
        assert!(parse_color("#gggggg").is_none());
    }

    #[test]
    fn fallback_is_black() {
        assert_eq!(rgba(color_or_black("nope")), (0, 0, 0, 255));
    }
}
