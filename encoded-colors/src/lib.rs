//! Chart color assignment for the ENCODE portal
//!
//! - [`DataColors`] maps an ordered key vocabulary onto a fixed palette, with
//!   optional tinting and positional ("merry-go-round") assignment.
//! - [`space`] holds the hex ↔ RGB ↔ HSV helpers, [`tint`] and [`is_light`].
//! - [`HsvCache`] memoizes hex → HSV conversions for tinting.
//!
//! ```
//! use encoded_colors::{ColorListOptions, DataColors, PALETTE};
//!
//! let projects = DataColors::new(["ENCODE", "Roadmap", "modENCODE"]);
//! let colors = projects.color_list(&["Roadmap", "GGR"], &ColorListOptions::new());
//! assert_eq!(colors, vec![PALETTE[1], "#808080"]);
//! ```

pub mod cache;
pub mod data_colors;
pub mod error;
pub mod palette;
pub mod space;

pub use cache::{HsvCache, DEFAULT_HSV_CACHE_CAPACITY};
pub use data_colors::{ColorListOptions, DataColors};
pub use error::{ColorError, Result};
pub use palette::{validate_palette, PALETTE, UNKNOWN_COLOR};
pub use space::{
    foreground_for, hex_to_rgb, hsv_to_rgb, is_light, rgb_to_hex, rgb_to_hsv, tint, Hsv, Rgb,
};

use encoded_config::ColorSettings;

/// Apply configured color settings. Call once at startup, before any chart
/// renders; returns `false` if the global cache was already in use.
pub fn configure(settings: &ColorSettings) -> bool {
    HsvCache::init_global(settings.hsv_cache_capacity)
}
