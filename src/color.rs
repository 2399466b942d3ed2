use std::fmt;
use std::str::FromStr;

use anyhow::{Context as _, anyhow};

/// An opaque sRGB color, written as `#rrggbb` in styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black or white, whichever reads better on `self`.
    pub fn contrasting(self) -> Color {
        let luma = 299 * u32::from(self.r) + 587 * u32::from(self.g) + 114 * u32::from(self.b);
        if luma >= 128_000 { Color::BLACK } else { Color::WHITE }
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, 0xff])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;

    /// Accepts `#rrggbb` and the `#rgb` shorthand.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| anyhow!("color {s:?} must start with '#'"))?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            anyhow::bail!("color {s:?} has a non-hex digit");
        }
        let expanded = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => hex.to_string(),
            _ => anyhow::bail!("color {s:?} must be #rgb or #rrggbb"),
        };
        let channel = |i: usize| {
            u8::from_str_radix(&expanded[i..i + 2], 16)
                .with_context(|| format!("color {s:?} has a non-hex digit"))
        };
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}
