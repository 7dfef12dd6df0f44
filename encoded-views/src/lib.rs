//! View registry for the ENCODE portal
//!
//! Maps the type of a backend object (its `@type` list) plus an optional
//! rendering mode to the renderer that should display it.
//!
//! - [`ViewRegistry`] - `(type, sub key) → renderer` with most-specific-first
//!   resolution and a fallback
//! - [`TypeHierarchy`] - explicit parent declarations with precomputed chains
//! - [`ProvidesTypes`] - how objects report their type list
//!
//! Registries are plain values: build them at startup, then pass them by
//! reference to whatever renders.

pub mod error;
pub mod hierarchy;
pub mod registry;
pub mod types;

pub use error::{Result, ViewsError};
pub use hierarchy::{ResolvedType, TypeHierarchy, TypeHierarchyBuilder};
pub use registry::{ViewRegistries, ViewRegistry};
pub use types::{ProvidesTypes, SubKey, TypeName, TYPE_FIELD};
