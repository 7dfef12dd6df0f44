//! Key → color assignment for one categorical domain
//!
//! A [`DataColors`] is built once per domain (e.g. the list of known project
//! names) and hands out the same color for the same key for as long as it
//! lives. The color of a key depends only on where it first appears in the
//! construction list.

use crate::error::Result;
use crate::palette::{validate_palette, PALETTE, UNKNOWN_COLOR};
use crate::space::tint;
use std::collections::HashMap;
use tracing::trace;

/// Options for [`DataColors::color_list`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorListOptions {
    /// Lighten each color by this fraction; `None` or `0` keeps it as is
    pub tint: Option<f64>,
    /// Assign colors by position in the query instead of by key lookup
    pub merry_go_round: bool,
}

impl ColorListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tint(mut self, factor: f64) -> Self {
        self.tint = Some(factor);
        self
    }

    pub fn merry_go_round(mut self) -> Self {
        self.merry_go_round = true;
        self
    }

    fn apply_tint(&self, hex: &str) -> String {
        match self.tint {
            Some(factor) if factor > 0.0 => tint(hex, factor),
            _ => hex.to_string(),
        }
    }
}

/// Deterministic color assignment over a fixed key set.
#[derive(Debug, Clone)]
pub struct DataColors {
    keys: Vec<String>,
    positions: HashMap<String, usize>,
    palette: &'static [&'static str],
}

impl DataColors {
    /// Assign the default palette to `keys` in order. The keys are copied.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(keys, PALETTE)
    }

    /// An instance with no fixed key set; only positional assignment and the
    /// raw palette are meaningful.
    pub fn empty() -> Self {
        Self::new(Vec::<String>::new())
    }

    /// Like [`new`](Self::new) with a caller-supplied palette.
    pub fn with_palette<I, S>(keys: I, palette: &'static [&'static str]) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        validate_palette(palette)?;
        Ok(Self::build(keys, palette))
    }

    fn build<I, S>(keys: I, palette: &'static [&'static str]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        let mut positions = HashMap::with_capacity(keys.len());
        for (index, key) in keys.iter().enumerate() {
            positions.entry(key.clone()).or_insert(index);
        }
        Self {
            keys,
            positions,
            palette,
        }
    }

    /// The construction key list, duplicates included.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn palette(&self) -> &'static [&'static str] {
        self.palette
    }

    /// Colors for `query_keys`, in the same order.
    ///
    /// Without `merry_go_round`, each key gets the palette entry for its
    /// first position in the construction list, or [`UNKNOWN_COLOR`] if it
    /// is not there. With `merry_go_round`, the key at query position `i`
    /// gets `palette[i % len]` whatever its value. An empty query returns
    /// the whole palette. Tinting applies to every emitted color, the
    /// unknown sentinel included.
    pub fn color_list<S: AsRef<str>>(
        &self,
        query_keys: &[S],
        options: &ColorListOptions,
    ) -> Vec<String> {
        if query_keys.is_empty() {
            return self
                .palette
                .iter()
                .map(|hex| options.apply_tint(hex))
                .collect();
        }

        query_keys
            .iter()
            .enumerate()
            .map(|(position, key)| {
                let index = if options.merry_go_round {
                    Some(position)
                } else {
                    self.positions.get(key.as_ref()).copied()
                };
                let base = match index {
                    Some(index) => self.palette[index % self.palette.len()],
                    None => {
                        trace!(key = key.as_ref(), "key outside color domain");
                        UNKNOWN_COLOR
                    }
                };
                options.apply_tint(base)
            })
            .collect()
    }

    /// Untinted color for a single key.
    pub fn color_for(&self, key: &str) -> &'static str {
        self.positions
            .get(key)
            .map(|index| self.palette[index % self.palette.len()])
            .unwrap_or(UNKNOWN_COLOR)
    }
}

impl Default for DataColors {
    fn default() -> Self {
        Self::empty()
    }
}
