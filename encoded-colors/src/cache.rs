//! Bounded memo of hex → HSV conversions
//!
//! Chart renders convert the same handful of palette entries over and over,
//! so conversions are memoized by exact hex string. The cache only affects
//! speed; every lookup returns what [`rgb_to_hsv`](crate::rgb_to_hsv) would.

use crate::space::{hex_to_rgb, Hsv};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, OnceLock};
use tracing::{debug, trace};

/// Capacity used when nothing configured the global cache.
pub const DEFAULT_HSV_CACHE_CAPACITY: usize = 256;

static GLOBAL_CACHE: OnceLock<HsvCache> = OnceLock::new();

/// LRU cache keyed by the exact hex string.
#[derive(Debug)]
pub struct HsvCache {
    entries: Mutex<LruCache<String, Hsv>>,
}

impl HsvCache {
    /// Cache holding up to `capacity` conversions (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Process-wide cache used by [`tint`](crate::tint).
    pub fn global() -> &'static HsvCache {
        GLOBAL_CACHE.get_or_init(|| HsvCache::new(DEFAULT_HSV_CACHE_CAPACITY))
    }

    /// Size the global cache. Only the first call before any conversion has
    /// an effect; returns whether this call did.
    pub fn init_global(capacity: usize) -> bool {
        let installed = GLOBAL_CACHE.set(HsvCache::new(capacity)).is_ok();
        if installed {
            debug!(capacity, "hsv cache configured");
        }
        installed
    }

    /// HSV for `hex`, computed on first request.
    pub fn hsv(&self, hex: &str) -> Hsv {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(hsv) = entries.get(hex) {
            trace!(hex, "hsv cache hit");
            return *hsv;
        }
        let hsv = hex_to_rgb(hex).to_hsv();
        entries.put(hex.to_string(), hsv);
        hsv
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .cap()
            .get()
    }
}
