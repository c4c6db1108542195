use std::fmt;
use std::str::FromStr;

use embedded_graphics::pixelcolor::Rgb888;
use thiserror::Error;

/// 3-channel pixel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(color: Color) -> Self {
        image::Rgb(color.0)
    }
}

impl From<Color> for Rgb888 {
    fn from(color: Color) -> Self {
        let [r, g, b] = color.0;
        Rgb888::new(r, g, b)
    }
}

impl From<colorous::Color> for Color {
    fn from(color: colorous::Color) -> Self {
        Self([color.r, color.g, color.b])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color {0:?}, expected #rrggbb or r,g,b")]
pub struct ParseColorError(String);

/// Accepts `#rrggbb` or `r,g,b`.
impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let s = s.trim();

        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(err());
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
            return Ok(Self([channel(0)?, channel(2)?, channel(4)?]));
        }

        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<u8>().map_err(|_| err()))
            .collect::<Result<Vec<u8>, _>>()?;
        match parts.as_slice() {
            [r, g, b] => Ok(Self([*r, *g, *b])),
            _ => Err(err()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_triplets() {
        assert_eq!("#0a0a14".parse::<Color>().unwrap(), Color::rgb(10, 10, 20));
        assert_eq!("0, 255,100".parse::<Color>().unwrap(), Color::rgb(0, 255, 100));
        assert_eq!(Color::rgb(255, 50, 50).to_string(), "#ff3232");
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "#12345", "#gg0000", "1,2", "1,2,3,4", "300,0,0"] {
            assert!(bad.parse::<Color>().is_err(), "{bad} should not parse");
        }
        let err = "teal".parse::<Color>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid color \"teal\", expected #rrggbb or r,g,b"
        );
    }
}
