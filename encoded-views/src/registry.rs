//! Type-keyed registry of renderers
//!
//! View modules register a renderer for the types they handle; page code
//! looks a renderer up from the JSON object the backend returned. Lookup
//! walks the object's type list from most to least specific, so a renderer
//! registered for `Item` serves every type that does not have its own.
//!
//! Registries are built during application startup and only read afterwards.
//! Nothing enforces that ordering: finish registering before sharing a
//! registry (e.g. behind an `Arc`) with rendering code.

use crate::hierarchy::TypeHierarchy;
use crate::types::{ProvidesTypes, SubKey, TypeName};
use indexmap::IndexMap;
use tracing::{debug, trace};

/// Registry mapping `(type, sub key)` to a renderer handle `R`.
///
/// # Examples
///
/// ```
/// use encoded_views::{SubKey, ViewRegistry};
/// use serde_json::json;
///
/// let mut content = ViewRegistry::new("content");
/// content.register("item view", "Item", SubKey::Default);
/// content.register("experiment editor", "Experiment", "edit");
///
/// let experiment = json!({"@type": ["Experiment", "Dataset", "Item"]});
/// assert_eq!(content.lookup(&experiment, "edit"), Some(&"experiment editor"));
/// assert_eq!(content.lookup(&experiment, SubKey::Default), Some(&"item view"));
/// ```
#[derive(Debug, Clone)]
pub struct ViewRegistry<R> {
    name: &'static str,
    entries: IndexMap<TypeName, IndexMap<SubKey, R>>,
    fallback: Option<R>,
}

impl<R> ViewRegistry<R> {
    /// Empty registry; `name` only labels log output.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: IndexMap::new(),
            fallback: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Store `renderer` for `(type_key, sub_key)`, replacing any previous one.
    pub fn register(
        &mut self,
        renderer: R,
        type_key: impl Into<TypeName>,
        sub_key: impl Into<SubKey>,
    ) {
        let type_key = type_key.into();
        let sub_key = sub_key.into();
        let replaced = self
            .entries
            .entry(type_key.clone())
            .or_default()
            .insert(sub_key.clone(), renderer)
            .is_some();

        debug!(
            registry = self.name,
            type_key = %type_key,
            sub_key = %sub_key,
            replaced,
            "view registered"
        );
    }

    /// Remove the renderer for `(type_key, sub_key)` and return it.
    pub fn unregister(&mut self, type_key: &str, sub_key: impl Into<SubKey>) -> Option<R> {
        let sub_key = sub_key.into();
        let views = self.entries.get_mut(type_key)?;
        let removed = views.shift_remove(&sub_key);
        if views.is_empty() {
            self.entries.shift_remove(type_key);
        }
        removed
    }

    /// Renderer for `object`, or the fallback, or `None`.
    ///
    /// For each type in the object's list, most specific first, a renderer
    /// registered under `sub_key` wins, then one under the default sub key.
    /// Only when no type matches at all is the fallback used.
    pub fn lookup<O>(&self, object: &O, sub_key: impl Into<SubKey>) -> Option<&R>
    where
        O: ProvidesTypes + ?Sized,
    {
        let sub_key = sub_key.into();
        let types = object.provided_types();

        for type_key in &types {
            if let Some(renderer) = self.lookup_exact(type_key, &sub_key) {
                trace!(registry = self.name, type_key, sub_key = %sub_key, "view resolved");
                return Some(renderer);
            }
        }

        trace!(
            registry = self.name,
            types = ?types,
            sub_key = %sub_key,
            fallback = self.fallback.is_some(),
            "no view registered"
        );
        self.fallback.as_ref()
    }

    /// [`lookup`](Self::lookup) for a bare type name, using the chain
    /// precomputed in `hierarchy`.
    pub fn lookup_with_hierarchy(
        &self,
        type_key: &str,
        sub_key: impl Into<SubKey>,
        hierarchy: &TypeHierarchy,
    ) -> Option<&R> {
        self.lookup(&hierarchy.resolve(type_key), sub_key)
    }

    /// Renderer registered for exactly this type, with the default sub key
    /// standing in for a missing named one. No walk, no fallback.
    pub fn lookup_exact(&self, type_key: &str, sub_key: &SubKey) -> Option<&R> {
        let views = self.entries.get(type_key)?;
        views.get(sub_key).or_else(|| views.get(&SubKey::Default))
    }

    /// Every `(type, renderer)` registered under exactly `sub_key`, in
    /// registration order.
    pub fn get_all(&self, sub_key: impl Into<SubKey>) -> Vec<(&TypeName, &R)> {
        let sub_key = sub_key.into();
        self.entries
            .iter()
            .filter_map(|(type_key, views)| views.get(&sub_key).map(|r| (type_key, r)))
            .collect()
    }

    /// Renderer used when no type in an object's list is registered.
    pub fn set_fallback(&mut self, renderer: R) {
        debug!(registry = self.name, "fallback view set");
        self.fallback = Some(renderer);
    }

    pub fn clear_fallback(&mut self) -> Option<R> {
        self.fallback.take()
    }

    pub fn fallback(&self) -> Option<&R> {
        self.fallback.as_ref()
    }

    /// Registered types in registration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeName> {
        self.entries.keys()
    }

    /// Number of `(type, sub key)` registrations.
    pub fn len(&self) -> usize {
        self.entries.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The registries page code dispatches through.
#[derive(Debug, Clone)]
pub struct ViewRegistries<R> {
    /// Full item pages
    pub content: ViewRegistry<R>,
    /// Panels embedded in other pages
    pub panel: ViewRegistry<R>,
    /// Rows in search result listings
    pub listing: ViewRegistry<R>,
}

impl<R> ViewRegistries<R> {
    pub fn new() -> Self {
        Self {
            content: ViewRegistry::new("content"),
            panel: ViewRegistry::new("panel"),
            listing: ViewRegistry::new("listing"),
        }
    }
}

impl<R> Default for ViewRegistries<R> {
    fn default() -> Self {
        Self::new()
    }
}
