//! Hex color codec
//!
//! Variable stores hold colors as normalized RGBA floats, while the token
//! graph and payload carry them as hex strings. `"transparent"` is the
//! resolver's spelling for "no value" and maps to fully transparent black.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Spelling used for COLOR tokens with no semantic mapping.
pub const TRANSPARENT: &str = "transparent";

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap()
});

/// Returns true for `#RGB`, `#RRGGBB` and `#RRGGBBAA` strings.
pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR.is_match(value)
}

/// A color with channels normalized to `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    /// Parse a hex color or the `"transparent"` keyword.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case(TRANSPARENT) {
            return Ok(Self::TRANSPARENT);
        }
        if !is_hex_color(trimmed) {
            return Err(Error::InvalidColor {
                value: value.to_string(),
            });
        }

        let digits = &trimmed[1..];
        let expanded: String = if digits.len() == 3 {
            digits.chars().flat_map(|c| [c, c]).collect()
        } else {
            digits.to_string()
        };

        let channel = |start: usize| -> Result<f64> {
            u8::from_str_radix(&expanded[start..start + 2], 16)
                .map(|v| f64::from(v) / 255.0)
                .map_err(|_| Error::InvalidColor {
                    value: value.to_string(),
                })
        };

        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if expanded.len() == 8 { channel(6)? } else { 1.0 },
        })
    }

    /// Render as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        if byte(self.a) == 255 {
            format!("#{:02X}{:02X}{:02X}", byte(self.r), byte(self.g), byte(self.b))
        } else {
            format!(
                "#{:02X}{:02X}{:02X}{:02X}",
                byte(self.r),
                byte(self.g),
                byte(self.b),
                byte(self.a)
            )
        }
    }
}

impl FromStr for Rgba {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("#FFFFFF", "#FFFFFF")]
    #[case("#1971c2", "#1971C2")]
    #[case("#abc", "#AABBCC")]
    #[case("#00000080", "#00000080")]
    fn parses_hex_forms(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Rgba::parse(input).unwrap().to_hex(), expected);
    }

    #[test]
    fn transparent_keyword_is_zero_alpha() {
        let color = Rgba::parse("transparent").unwrap();
        assert_eq!(color, Rgba::TRANSPARENT);
        assert_eq!(color.to_hex(), "#00000000");
    }

    #[test]
    fn channels_are_normalized() {
        let color = Rgba::parse("#FF0000").unwrap();
        assert_eq!(color.r, 1.0);
        assert_eq!(color.g, 0.0);
        assert_eq!(color.a, 1.0);
    }

    #[rstest]
    #[case("")]
    #[case("FFFFFF")]
    #[case("#GGGGGG")]
    #[case("#12345")]
    fn rejects_malformed(#[case] input: &str) {
        assert!(matches!(
            Rgba::parse(input),
            Err(Error::InvalidColor { .. })
        ));
    }
}
