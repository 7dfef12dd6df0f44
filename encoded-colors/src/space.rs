//! Colorspace conversions between hex strings, RGB and HSV
//!
//! Hex is the canonical storage form; RGB and HSV only exist while a color is
//! being transformed. Conversions round 8-bit channels to the nearest integer,
//! which is the only source of loss in a hex → HSV → hex round trip.

use crate::cache::HsvCache;
use crate::error::{ColorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Luma above which a background counts as light.
const LIGHT_LUMA_THRESHOLD: u32 = 180;

/// 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a 7-character `#RRGGBB` string (either case).
    pub fn parse_hex(hex: &str) -> Result<Self> {
        let invalid = || ColorError::InvalidHex {
            value: hex.to_string(),
        };
        let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Lowercase `#rrggbb` form.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Rec. 601 luma in `0..=255`.
    pub fn luma(self) -> u32 {
        (299 * u32::from(self.r) + 587 * u32::from(self.g) + 114 * u32::from(self.b)) / 1000
    }

    /// Whether dark text reads better than light text on this color.
    pub fn is_light(self) -> bool {
        self.luma() > LIGHT_LUMA_THRESHOLD
    }

    pub fn to_hsv(self) -> Hsv {
        rgb_to_hsv(self)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// HSV triple: `h` in degrees `[0, 360)`, `s` and `v` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl Hsv {
    pub fn new(h: f64, s: f64, v: f64) -> Self {
        Self { h, s, v }
    }

    pub fn to_rgb(self) -> Rgb {
        hsv_to_rgb(self)
    }
}

/// Parse `#RRGGBB`. Malformed input yields black; use [`Rgb::parse_hex`]
/// when the caller needs to know.
pub fn hex_to_rgb(hex: &str) -> Rgb {
    Rgb::parse_hex(hex).unwrap_or_else(|e| {
        warn!("{e}; using black");
        Rgb::BLACK
    })
}

pub fn rgb_to_hex(rgb: Rgb) -> String {
    rgb.to_hex()
}

/// Min/max-channel HSV conversion. Achromatic input gives `h = 0, s = 0`.
pub fn rgb_to_hsv(rgb: Rgb) -> Hsv {
    let r = f64::from(rgb.r) / 255.0;
    let g = f64::from(rgb.g) / 255.0;
    let b = f64::from(rgb.b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max == 0.0 { 0.0 } else { delta / max };

    Hsv::new(h % 360.0, s, max)
}

/// Sector-based inverse of [`rgb_to_hsv`], channels rounded to nearest.
pub fn hsv_to_rgb(hsv: Hsv) -> Rgb {
    let s = hsv.s.clamp(0.0, 1.0);
    let v = hsv.v.clamp(0.0, 1.0);
    let h = hsv.h.rem_euclid(360.0) / 60.0;

    let c = v * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h.floor() as u8 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_channel = |value: f64| ((value + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb::new(to_channel(r), to_channel(g), to_channel(b))
}

/// Lighten `hex` by `factor`: saturation scales by `1 - factor` and value
/// moves toward 1 by `factor`. `0` leaves the color alone, `1` gives white.
pub fn tint(hex: &str, factor: f64) -> String {
    tint_with(HsvCache::global(), hex, factor)
}

pub(crate) fn tint_with(cache: &HsvCache, hex: &str, factor: f64) -> String {
    let factor = factor.clamp(0.0, 1.0);
    let hsv = cache.hsv(hex);
    let tinted = Hsv::new(hsv.h, hsv.s * (1.0 - factor), hsv.v + (1.0 - hsv.v) * factor);
    tinted.to_rgb().to_hex()
}

/// Luma test for choosing readable foreground text on a `hex` swatch.
pub fn is_light(hex: &str) -> bool {
    hex_to_rgb(hex).is_light()
}

/// Black text for light backgrounds, white otherwise.
pub fn foreground_for(hex: &str) -> &'static str {
    if is_light(hex) {
        "#000000"
    } else {
        "#ffffff"
    }
}
