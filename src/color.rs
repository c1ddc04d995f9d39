//! Hex color values used for layer defaults, picks and text fills.

use std::fmt;
use std::str::FromStr;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::{DesignerError, DesignerResult};

/// Preset swatches offered next to the custom color input.
pub const COLOR_PRESETS: [&str; 18] = [
    "#4A90E2", "#2C3E50", "#34495E", "#16A085", "#27AE60", "#2980B9", "#8E44AD", "#E74C3C",
    "#E67E22", "#F39C12", "#95A5A6", "#ECF0F1", "#34495E", "#7F8C8D", "#BDC3C7", "#E8F6F3",
    "#EBF5FB", "#FDF2E9",
];

/// An opaque sRGB color, always stored as uppercase `#RRGGBB`.
///
/// Accepts `#RGB` and `#RRGGBB` (the `#` is optional) and serializes as a
/// plain string, so configuration files stay hand-editable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct HexColor(String);

impl HexColor {
    pub const BLACK: &'static str = "#000000";
    pub const WHITE: &'static str = "#FFFFFF";

    /// Parses and normalizes a hex color.
    pub fn parse(value: &str) -> DesignerResult<Self> {
        let trimmed = value.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        // palette slices by byte offset, so anything but ASCII hex must stop here.
        if !matches!(digits.len(), 3 | 6) || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DesignerError::InvalidColor(value.to_string()));
        }
        let rgb: Srgb<u8> = trimmed
            .parse()
            .map_err(|_| DesignerError::InvalidColor(value.to_string()))?;
        Ok(Self::from_rgb(rgb.red, rgb.green, rgb.blue))
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(format!("#{r:02X}{g:02X}{b:02X}"))
    }

    pub fn black() -> Self {
        Self(Self::BLACK.to_string())
    }

    pub fn white() -> Self {
        Self(Self::WHITE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the color as straight-alpha RGBA with full opacity.
    pub fn to_rgba8(&self) -> [u8; 4] {
        // The stored string is always a valid `#RRGGBB`.
        let channel = |i: usize| u8::from_str_radix(&self.0[i..i + 2], 16).unwrap_or(0);
        [channel(1), channel(3), channel(5), 255]
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HexColor {
    type Err = DesignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = DesignerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_to_uppercase() {
        assert_eq!(HexColor::parse("#4a90e2").unwrap().as_str(), "#4A90E2");
        assert_eq!(HexColor::parse("4A90E2").unwrap().as_str(), "#4A90E2");
        assert_eq!(HexColor::parse("#fff").unwrap().as_str(), "#FFFFFF");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            HexColor::parse("blue"),
            Err(DesignerError::InvalidColor(_))
        ));
        assert!(HexColor::parse("#12345").is_err());
    }

    #[test]
    fn parse_rejects_multibyte_input() {
        for input in ["#aé123", "aé1234", "#é1", "#12345é"] {
            assert!(matches!(
                HexColor::parse(input),
                Err(DesignerError::InvalidColor(_))
            ));
        }
    }

    #[test]
    fn rgba_channels() {
        assert_eq!(HexColor::parse("#2C3E50").unwrap().to_rgba8(), [44, 62, 80, 255]);
    }

    #[test]
    fn serde_as_plain_string() {
        let color = HexColor::parse("#e74c3c").unwrap();
        let json = serde_json::to_string(&color).unwrap();
        assert_eq!(json, "\"#E74C3C\"");
        let back: HexColor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, color);
        assert!(serde_json::from_str::<HexColor>("\"nope\"").is_err());
    }

    #[test]
    fn presets_are_valid() {
        for preset in COLOR_PRESETS {
            assert_eq!(HexColor::parse(preset).unwrap().as_str(), preset);
        }
    }
}
