//! Packed Colors
//!
//! A board cell is one `u32`: alpha in the top byte (always 0xFF), then red, green, blue.

use serde::{Deserialize, Serialize};
use std::fmt;

const OPAQUE: u32 = 0xFF00_0000;

/// Packed ARGB color. Equality is bitwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(u32);

/// Ambient background ("air"). Out-of-range reads return this.
pub const BACKGROUND: Color = Color::pack(155, 215, 232);

impl Color {
    /// Pack channels, forcing full opacity.
    pub const fn pack(r: u8, g: u8, b: u8) -> Self {
        Color(OPAQUE | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    /// Build from a 24-bit `0xRRGGBB` value; any alpha bits given are overwritten.
    pub const fn from_rgb24(rgb: u32) -> Self {
        Color(OPAQUE | (rgb & 0x00FF_FFFF))
    }

    /// Parse exactly six hex digits (no leading `#`).
    pub fn from_hex(digits: &str) -> Option<Self> {
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::from_rgb24)
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    pub const fn to_u32(self) -> u32 {
        self.0
    }

    /// Add signed per-channel deltas. Each channel saturates at 0 and 255 independently,
    /// alpha is left untouched.
    pub fn offset_channels(self, dr: i8, dg: i8, db: i8) -> Self {
        Self::pack(
            self.r().saturating_add_signed(dr),
            self.g().saturating_add_signed(dg),
            self.b().saturating_add_signed(db),
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r(), self.g(), self.b())
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let digits = value.strip_prefix('#').unwrap_or(&value);
        Color::from_hex(digits).ok_or_else(|| format!("invalid color '{}'", value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_forces_opacity() {
        let c = Color::pack(1, 2, 3);
        assert_eq!(c.to_u32(), 0xFF01_0203);
        assert_eq!(Color::from_rgb24(0x1201_0203).to_u32(), 0xFF01_0203);
    }

    #[test]
    fn hex_requires_exactly_six_digits() {
        assert_eq!(Color::from_hex("ff0000"), Some(Color::pack(255, 0, 0)));
        assert_eq!(Color::from_hex("9BD7E8"), Some(BACKGROUND));
        assert_eq!(Color::from_hex("fff"), None);
        assert_eq!(Color::from_hex("ff00000"), None);
        assert_eq!(Color::from_hex("gg0000"), None);
    }

    #[test]
    fn channel_offsets_saturate_per_channel() {
        let c = Color::pack(250, 5, 100);
        let shifted = c.offset_channels(20, -20, -1);
        assert_eq!(shifted, Color::pack(255, 0, 99));
        assert_eq!(shifted.to_u32() >> 24, 0xFF);
    }

    #[test]
    fn display_round_trips_through_serde() {
        let c = Color::pack(0xAB, 0x01, 0xFF);
        assert_eq!(c.to_string(), "#AB01FF");
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#AB01FF\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
