//! Fixed chart palette

use crate::error::{ColorError, Result};
use crate::space::Rgb;

/// Color for keys outside the declared key set.
pub const UNKNOWN_COLOR: &str = "#808080";

/// Default chart palette. Keys take entries in order and wrap around.
pub const PALETTE: &[&str] = &[
    "#2f62cf", "#de3d3d", "#4ab04a", "#ffa600", "#8e43c6", "#0bb5c6",
    "#e06fb2", "#8c6239", "#9cc33a", "#1a4780", "#f4a6a6", "#b07bd9",
    "#5fa88e", "#c9a227", "#6a9fe8", "#a8323e", "#3f8f3f", "#e8783a",
];

/// Check that `palette` is non-empty and every entry is `#RRGGBB`.
pub fn validate_palette(palette: &[&str]) -> Result<()> {
    if palette.is_empty() {
        return Err(ColorError::EmptyPalette);
    }
    palette.iter().try_for_each(|hex| Rgb::parse_hex(hex).map(|_| ()))
}
