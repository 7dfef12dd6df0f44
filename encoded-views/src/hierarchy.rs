//! Explicit "is-a" chains between domain types
//!
//! Backend objects carry their own `@type` list, but code that only knows a
//! type name (a listing column, a search facet) needs the same chain. Types
//! declare their parent once; [`TypeHierarchyBuilder::build`] walks every
//! declaration a single time and stores the resulting chains.

use crate::error::{Result, ViewsError};
use crate::types::{ProvidesTypes, TypeName};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Collects `type → parent` declarations.
#[derive(Debug, Default, Clone)]
pub struct TypeHierarchyBuilder {
    parents: IndexMap<TypeName, Option<TypeName>>,
}

impl TypeHierarchyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a root type.
    pub fn root(self, name: &str) -> Self {
        self.declare(name, None)
    }

    /// Declare `name` as a kind of `parent`.
    pub fn child(self, name: &str, parent: &str) -> Self {
        self.declare(name, Some(parent))
    }

    /// Declare `name` with an optional parent. Redeclaring replaces.
    pub fn declare(mut self, name: &str, parent: Option<&str>) -> Self {
        self.parents
            .insert(TypeName::from(name), parent.map(TypeName::from));
        self
    }

    /// Compute every chain. Fails on cycles and on parents that were never
    /// declared.
    pub fn build(self) -> Result<TypeHierarchy> {
        let mut chains = HashMap::with_capacity(self.parents.len());

        for name in self.parents.keys() {
            let mut chain = vec![name.clone()];
            let mut seen: HashSet<&TypeName> = HashSet::from([name]);
            let mut current = name;

            while let Some(parent) = self.parents.get(current).and_then(Option::as_ref) {
                if !self.parents.contains_key(parent) {
                    return Err(ViewsError::UnknownParent {
                        type_name: current.to_string(),
                        parent: parent.to_string(),
                    });
                }
                if !seen.insert(parent) {
                    return Err(ViewsError::CyclicHierarchy {
                        type_name: name.to_string(),
                    });
                }
                chain.push(parent.clone());
                current = parent;
            }

            chains.insert(name.clone(), chain);
        }

        debug!(types = chains.len(), "type hierarchy built");
        Ok(TypeHierarchy { chains })
    }
}

/// Precomputed "is-a" chains, most specific first.
#[derive(Debug, Default, Clone)]
pub struct TypeHierarchy {
    chains: HashMap<TypeName, Vec<TypeName>>,
}

impl TypeHierarchy {
    pub fn builder() -> TypeHierarchyBuilder {
        TypeHierarchyBuilder::new()
    }

    /// Chain for `name`, starting with `name` itself.
    pub fn chain(&self, name: &str) -> Option<&[TypeName]> {
        self.chains.get(name).map(Vec::as_slice)
    }

    /// Whether `name` is `ancestor` or descends from it.
    pub fn is_a(&self, name: &str, ancestor: &str) -> bool {
        self.chain(name)
            .is_some_and(|chain| chain.iter().any(|t| t.as_str() == ancestor))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.chains.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// A type name resolved against this hierarchy, usable wherever a type
    /// list is expected. Undeclared names resolve to themselves.
    pub fn resolve<'a>(&'a self, name: &'a str) -> ResolvedType<'a> {
        ResolvedType {
            name,
            chain: self.chain(name),
        }
    }
}

/// A type name paired with its chain; see [`TypeHierarchy::resolve`].
#[derive(Debug, Clone, Copy)]
pub struct ResolvedType<'a> {
    name: &'a str,
    chain: Option<&'a [TypeName]>,
}

impl ProvidesTypes for ResolvedType<'_> {
    fn provided_types(&self) -> Vec<&str> {
        match self.chain {
            Some(chain) => chain.iter().map(TypeName::as_str).collect(),
            None => vec![self.name],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portal_types() -> TypeHierarchy {
        TypeHierarchy::builder()
            .root("Item")
            .child("Dataset", "Item")
            .child("Experiment", "Dataset")
            .child("Annotation", "Dataset")
            .child("Biosample", "Item")
            .build()
            .unwrap()
    }

    #[test]
    fn test_chain_is_most_specific_first() {
        let types = portal_types();
        let chain: Vec<&str> = types
            .chain("Experiment")
            .unwrap()
            .iter()
            .map(TypeName::as_str)
            .collect();
        assert_eq!(chain, vec!["Experiment", "Dataset", "Item"]);
        assert_eq!(types.chain("Item").unwrap().len(), 1);
        assert!(types.chain("Gene").is_none());
        assert_eq!(types.len(), 5);
    }

    #[test]
    fn test_is_a() {
        let types = portal_types();
        assert!(types.is_a("Annotation", "Item"));
        assert!(types.is_a("Annotation", "Annotation"));
        assert!(!types.is_a("Biosample", "Dataset"));
        assert!(!types.is_a("Gene", "Item"));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let result = TypeHierarchy::builder()
            .child("A", "B")
            .child("B", "A")
            .build();
        assert!(matches!(result, Err(ViewsError::CyclicHierarchy { .. })));
    }

    #[test]
    fn test_unknown_parent_is_rejected() {
        let result = TypeHierarchy::builder().child("Experiment", "Dataset").build();
        assert_eq!(
            result.unwrap_err(),
            ViewsError::UnknownParent {
                type_name: "Experiment".into(),
                parent: "Dataset".into(),
            }
        );
    }

    #[test]
    fn test_resolve_provides_chain_or_self() {
        let types = portal_types();
        assert_eq!(
            types.resolve("Experiment").provided_types(),
            vec!["Experiment", "Dataset", "Item"]
        );
        assert_eq!(types.resolve("Gene").provided_types(), vec!["Gene"]);
    }
}
