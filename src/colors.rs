use anyhow::{bail, Context, Result};
use std::fmt;
use std::str::FromStr;

/// 8-bit RGB color, printed as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` or `RRGGBB`, case-insensitive.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("'{}' is not a #RRGGBB color", hex);
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .with_context(|| format!("Invalid channel in '{}'", hex))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn rgba(self, alpha: u8) -> [u8; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_with_and_without_hash() {
        assert_eq!(Color::from_hex("#F45656").unwrap(), Color::new(0xF4, 0x56, 0x56));
        assert_eq!(Color::from_hex("8bd45f").unwrap(), Color::new(0x8B, 0xD4, 0x5F));
    }

    #[test]
    fn prints_uppercase_hex() {
        assert_eq!(Color::new(0xB3, 0xD2, 0xA0).to_string(), "#B3D2A0");
        assert_eq!(Color::new(0, 0, 0).to_string(), "#000000");
    }

    #[test]
    fn rejects_malformed() {
        for bad in &["", "#", "#FFF", "#GGGGGG", "#1234567", "##123456", "#12 456"] {
            assert!(bad.parse::<Color>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn pixel_layouts() {
        let c = Color::new(1, 2, 3);
        assert_eq!(c.rgb(), [1, 2, 3]);
        assert_eq!(c.rgba(255), [1, 2, 3, 255]);
    }
}
