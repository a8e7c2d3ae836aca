// src/entry/color.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PatternError;

const HUE_INITIAL: f64 = 0.558;
const HUE_STEP: f64 = 0.618;

/// Display color, channels in [0, 1].
///
/// Serialized as a `#RRGGBB` string.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue, alpha: 1.0 }
    }

    /// HSV to RGB, all components in [0, 1].
    pub fn from_hsv(h: f64, s: f64, v: f64) -> Self {
        let i = (h * 6.0) as i32;
        let f = h * 6.0 - i as f64;
        let p = v * (1.0 - s);
        let q = v * (1.0 - f * s);
        let t = v * (1.0 - (1.0 - f) * s);

        match i.rem_euclid(6) {
            0 => Self::rgb(v, t, p),
            1 => Self::rgb(q, v, p),
            2 => Self::rgb(p, v, t),
            3 => Self::rgb(p, q, v),
            4 => Self::rgb(t, p, v),
            _ => Self::rgb(v, p, q),
        }
    }

    /// `#RRGGBB`, uppercase; alpha is dropped.
    pub fn to_hex(&self) -> String {
        let byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02X}{:02X}{:02X}", byte(self.red), byte(self.green), byte(self.blue))
    }

    fn parse_hex(digits: &str) -> Option<Self> {
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        // #RGB, #RRGGBB, #RRRGGGBBB or #RRRRGGGGBBBB
        let width = match digits.len() {
            3 | 6 | 9 | 12 => digits.len() / 3,
            _ => return None,
        };
        let max = ((1u32 << (4 * width)) - 1) as f64;
        let channel = |n: usize| {
            u32::from_str_radix(&digits[n * width..(n + 1) * width], 16)
                .ok()
                .map(|v| v as f64 / max)
        };
        Some(Self::rgb(channel(0)?, channel(1)?, channel(2)?))
    }

    fn parse_functional(text: &str) -> Option<Self> {
        let (args, with_alpha) = if let Some(rest) = text.strip_prefix("rgba(") {
            (rest.strip_suffix(')')?, true)
        } else {
            (text.strip_prefix("rgb(")?.strip_suffix(')')?, false)
        };

        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        let expected = if with_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return None;
        }

        let channel = |s: &str| -> Option<f64> {
            let v = match s.strip_suffix('%') {
                Some(pct) => pct.parse::<f64>().ok()? / 100.0,
                None => s.parse::<f64>().ok()? / 255.0,
            };
            Some(v.clamp(0.0, 1.0))
        };

        let mut color = Self::rgb(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?);
        if with_alpha {
            color.alpha = parts[3].parse::<f64>().ok()?.clamp(0.0, 1.0);
        }
        Some(color)
    }

    fn named(name: &str) -> Option<Self> {
        let color = match name {
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "red" => Self::rgb(1.0, 0.0, 0.0),
            "green" => Self::rgb(0.0, 1.0, 0.0),
            "blue" => Self::rgb(0.0, 0.0, 1.0),
            "yellow" => Self::rgb(1.0, 1.0, 0.0),
            "cyan" => Self::rgb(0.0, 1.0, 1.0),
            "magenta" => Self::rgb(1.0, 0.0, 1.0),
            _ => return None,
        };
        Some(color)
    }
}

impl FromStr for Rgba {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        let parsed = match text.strip_prefix('#') {
            Some(digits) => Self::parse_hex(digits),
            None => Self::parse_functional(&text).or_else(|| Self::named(&text)),
        };
        parsed.ok_or_else(|| PatternError::InvalidColor(s.to_string()))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_hex()
    }
}

impl TryFrom<String> for Rgba {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Endless sequence of well separated colors for new captures.
///
/// Walks the hue circle by the golden ratio so neighbouring captures
/// never share a similar color.
#[derive(Clone, Debug)]
pub struct ColorSequence {
    hue: f64,
}

impl Default for ColorSequence {
    fn default() -> Self {
        Self { hue: HUE_INITIAL }
    }
}

impl ColorSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_color(&mut self) -> Rgba {
        self.hue -= HUE_STEP;
        if self.hue < 0.0 {
            self.hue += 1.0;
        }
        Rgba::from_hsv(self.hue, 1.0, 1.0)
    }
}

impl Iterator for ColorSequence {
    type Item = Rgba;

    fn next(&mut self) -> Option<Rgba> {
        Some(self.next_color())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let c: Rgba = "#1E90FF".parse().unwrap();
        assert_eq!(c.to_hex(), "#1E90FF");
        assert_eq!(c.alpha, 1.0);
        assert_eq!("#ff0000".parse::<Rgba>().unwrap(), Rgba::rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_short_and_long_hex() {
        assert_eq!("#F00".parse::<Rgba>().unwrap().to_hex(), "#FF0000");
        assert_eq!("#FFFF00000000".parse::<Rgba>().unwrap().to_hex(), "#FF0000");
    }

    #[test]
    fn test_functional_notation() {
        let c: Rgba = "rgb(255, 128, 0)".parse().unwrap();
        assert_eq!(c.to_hex(), "#FF8000");
        let c: Rgba = "rgba(0,0,255,0.5)".parse().unwrap();
        assert_eq!(c.alpha, 0.5);
        assert_eq!(c.to_hex(), "#0000FF");
        let c: Rgba = "rgb(100%, 0%, 50%)".parse().unwrap();
        assert_eq!(c.to_hex(), "#FF0080");
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(" White ".parse::<Rgba>().unwrap(), Rgba::WHITE);
        assert_eq!("BLUE".parse::<Rgba>().unwrap().to_hex(), "#0000FF");
    }

    #[test]
    fn test_invalid_colors() {
        for text in ["", "#12", "#GGGGGG", "rgb(1,2)", "rgba(1,2,3)", "chartreuse-ish"] {
            assert_eq!(
                text.parse::<Rgba>(),
                Err(PatternError::InvalidColor(text.to_string())),
                "{text:?}"
            );
        }
    }

    #[test]
    fn test_serde_as_hex_string() {
        let c = Rgba::rgb(0.0, 1.0, 0.0);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#00FF00\"");
        let back: Rgba = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
        assert!(serde_json::from_str::<Rgba>("\"nope\"").is_err());
    }

    #[test]
    fn test_sequence_is_deterministic_and_distinct() {
        let first: Vec<String> = ColorSequence::new().take(6).map(|c| c.to_hex()).collect();
        let again: Vec<String> = ColorSequence::new().take(6).map(|c| c.to_hex()).collect();
        assert_eq!(first, again);
        for (i, a) in first.iter().enumerate() {
            for b in &first[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(Rgba::from_hsv(0.0, 1.0, 1.0).to_hex(), "#FF0000");
        assert_eq!(Rgba::from_hsv(1.0 / 3.0, 1.0, 1.0).to_hex(), "#00FF00");
        assert_eq!(Rgba::from_hsv(2.0 / 3.0, 1.0, 1.0).to_hex(), "#0000FF");
    }
}
