//! Colour conversions shared by every renderer.
//!
//! Colours travel through the configuration as packed `#rrggbb` values and are
//! only expanded into [`Rgba`] at draw time.

use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::BeatVizError;

/// Hue advance, in degrees, for one frame at a cycle speed of `1.0`.
pub const HUE_STEP: f32 = 0.1;

/// Packed 8-bit RGB colour. Serialises as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Expands the packed colour into a drawable colour with opacity.
    /// `alpha` is clamped into `[0, 1]`.
    pub fn with_alpha(self, alpha: f32) -> Rgba {
        let a = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.0 };
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }

    pub fn opaque(self) -> Rgba {
        self.with_alpha(1.0)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = BeatVizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('#');
        let invalid = || BeatVizError::msg(format!("`{s}` is not a #rrggbb colour"));

        if digits.len() != 6 || !digits.is_ascii() {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl TryFrom<String> for Rgb {
    type Error = BeatVizError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// RGB colour with a floating point opacity in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub fn rgb(&self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Hue in degrees, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

/// Converts HSL (hue in degrees, saturation/lightness in `0..=100`) to RGB.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Rgb {
    let h = h.rem_euclid(360.0);
    let s = s.clamp(0.0, 100.0);
    let l = l.clamp(0.0, 100.0) / 100.0;
    let a = s * l.min(1.0 - l) / 100.0;

    let channel = |n: f32| {
        let k = (n + h / 30.0) % 12.0;
        let value = l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0);
        (255.0 * value).round().clamp(0.0, 255.0) as u8
    };

    Rgb::new(channel(0.0), channel(8.0), channel(4.0))
}

/// Inverse of [`hsl_to_rgb`], up to 8-bit rounding.
pub fn rgb_to_hsl(color: Rgb) -> Hsl {
    let r = color.r as f32 / 255.0;
    let g = color.g as f32 / 255.0;
    let b = color.b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let delta = max - min;

    if delta <= f32::EPSILON {
        return Hsl {
            h: 0.0,
            s: 0.0,
            l: l * 100.0,
        };
    }

    let s = delta / (1.0 - (2.0 * l - 1.0).abs());
    let h = if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    Hsl {
        h: h.rem_euclid(360.0),
        s: (s * 100.0).clamp(0.0, 100.0),
        l: l * 100.0,
    }
}

/// Advances a cycling hue by one frame. The result is always in `[0, 360)`.
pub fn advance_hue(hue: f32, cycle_speed: f32) -> f32 {
    let hue = if hue.is_finite() { hue } else { 0.0 };
    let step = if cycle_speed.is_finite() {
        cycle_speed * HUE_STEP
    } else {
        0.0
    };
    let next = (hue + step).rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if next >= 360.0 {
        0.0
    } else {
        next
    }
}

/// Picks a saturated, mid-lightness colour.
pub fn random_color<R: Rng>(rng: &mut R) -> Hsl {
    Hsl {
        h: rng.random_range(0..360) as f32,
        s: rng.random_range(70..=100) as f32,
        l: rng.random_range(40..=60) as f32,
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn converts_primary_hues() {
        assert_eq!(hsl_to_rgb(0.0, 100.0, 50.0), Rgb::new(255, 0, 0));
        assert_eq!(hsl_to_rgb(120.0, 100.0, 50.0), Rgb::new(0, 255, 0));
        assert_eq!(hsl_to_rgb(240.0, 100.0, 50.0), Rgb::new(0, 0, 255));
        assert_eq!(hsl_to_rgb(0.0, 0.0, 100.0), Rgb::new(255, 255, 255));
        assert_eq!(hsl_to_rgb(42.0, 80.0, 0.0), Rgb::BLACK);
    }

    #[test]
    fn hsl_survives_a_round_trip() {
        for color in [Rgb::new(255, 107, 53), Rgb::new(0, 119, 190), Rgb::new(148, 0, 211)] {
            let hsl = rgb_to_hsl(color);
            let back = hsl_to_rgb(hsl.h, hsl.s, hsl.l);
            assert!((back.r as i16 - color.r as i16).abs() <= 1, "{color} -> {back}");
            assert!((back.g as i16 - color.g as i16).abs() <= 1, "{color} -> {back}");
            assert!((back.b as i16 - color.b as i16).abs() <= 1, "{color} -> {back}");
        }
    }

    #[test]
    fn parses_and_prints_hex() {
        let color: Rgb = "#00CED1".parse().unwrap();
        assert_eq!(color, Rgb::new(0, 206, 209));
        assert_eq!(color.to_string(), "#00ced1");
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("zzzzzz".parse::<Rgb>().is_err());
    }

    #[test]
    fn serialises_as_hex_string() {
        let json = serde_json::to_string(&Rgb::new(255, 0, 0)).unwrap();
        assert_eq!(json, "\"#ff0000\"");
        let parsed: Rgb = serde_json::from_str("\"#0000ff\"").unwrap();
        assert_eq!(parsed, Rgb::new(0, 0, 255));
    }

    #[test]
    fn alpha_is_clamped() {
        let color = Rgb::new(1, 2, 3);
        assert_eq!(color.with_alpha(1.5).a, 1.0);
        assert_eq!(color.with_alpha(-0.2).a, 0.0);
        assert_eq!(color.with_alpha(0.25).to_string(), "rgba(1, 2, 3, 0.25)");
    }

    #[test]
    fn hue_wraps_into_range() {
        for speed in [0.1, 1.0, 6.0, 250.0, 3600.0] {
            let hue = advance_hue(359.0, speed);
            assert!((0.0..360.0).contains(&hue), "speed {speed} gave {hue}");
        }
        assert!((advance_hue(359.95, 1.0) - 0.05).abs() < 1e-3);
    }

    #[test]
    fn random_colors_stay_vivid() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..32 {
            let hsl = random_color(&mut rng);
            assert!((0.0..360.0).contains(&hsl.h));
            assert!((70.0..=100.0).contains(&hsl.s));
            assert!((40.0..=60.0).contains(&hsl.l));
        }
    }
}
