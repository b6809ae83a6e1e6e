//! Chroma-key constant and background color parsing.
//!
//! Background colors accept the usual CSS forms:
//! - Hex: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`
//! - Functional: `rgb()`, `rgba()`, `hsl()`, `hsla()`, `hwb()`
//! - Named: `white`, `black`, `rebeccapurple`, ...

use image::{Rgb, Rgba};
use lightningcss::traits::Parse;
use lightningcss::values::color::{CssColor, FloatColor};

use crate::error::{Error, Result};

/// The keyed-out background color, pure magenta `#FF00FF`.
pub const CHROMA_KEY: Rgb<u8> = Rgb([255, 0, 255]);

/// Parse a color string into an RGBA color.
///
/// ```
/// use smooth_edges::color::parse_color;
///
/// assert_eq!(parse_color("#ffffff").unwrap(), image::Rgba([255, 255, 255, 255]));
/// assert_eq!(parse_color("red").unwrap(), image::Rgba([255, 0, 0, 255]));
/// ```
///
/// # Errors
///
/// Returns [`Error::Argument`] if the string is empty or not a color.
pub fn parse_color(s: &str) -> Result<Rgba<u8>> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::Argument("empty color string".to_string()));
    }

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex);
    }

    let css = CssColor::parse_string(s)
        .map_err(|e| Error::Argument(format!("invalid color '{s}': {e}")))?;
    css_color_to_rgba(&css, s)
}

/// Parse the digits of a hex color (without the leading `#`).
fn parse_hex_color(hex: &str) -> Result<Rgba<u8>> {
    if let Some(c) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(Error::Argument(format!("invalid hex character '{c}'")));
    }

    // All digits are ASCII hex at this point, so byte indexing is safe.
    let digit = |i: usize| hex_value(hex.as_bytes()[i]);
    let pair = |i: usize| digit(i) * 16 + digit(i + 1);

    match hex.len() {
        3 => Ok(Rgba([digit(0) * 17, digit(1) * 17, digit(2) * 17, 255])),
        4 => Ok(Rgba([
            digit(0) * 17,
            digit(1) * 17,
            digit(2) * 17,
            digit(3) * 17,
        ])),
        6 => Ok(Rgba([pair(0), pair(2), pair(4), 255])),
        8 => Ok(Rgba([pair(0), pair(2), pair(4), pair(6)])),
        len => Err(Error::Argument(format!(
            "invalid color length {len}, expected 3, 4, 6, or 8 hex digits"
        ))),
    }
}

fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}

fn css_color_to_rgba(color: &CssColor, input: &str) -> Result<Rgba<u8>> {
    let rgb = color
        .to_rgb()
        .map_err(|_| Error::Argument(format!("color '{input}' has no sRGB equivalent")))?;

    match rgb {
        CssColor::RGBA(c) => Ok(Rgba([c.red, c.green, c.blue, c.alpha])),
        CssColor::Float(float) => match float.as_ref() {
            FloatColor::RGB(c) => Ok(Rgba([
                unit_to_u8(c.r),
                unit_to_u8(c.g),
                unit_to_u8(c.b),
                unit_to_u8(c.alpha),
            ])),
            _ => Err(Error::Argument(format!("color '{input}' is not sRGB"))),
        },
        _ => Err(Error::Argument(format!("color '{input}' is not sRGB"))),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
