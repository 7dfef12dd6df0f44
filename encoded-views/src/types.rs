//! Discriminators used to key the registry

use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Key under which JSON objects declare their type list.
pub const TYPE_FIELD: &str = "@type";

/// Name of a domain object type, e.g. `Experiment` or `Item`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Arc<str>);

impl TypeName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl Borrow<str> for TypeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Secondary discriminator: the rendering mode within a type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum SubKey {
    /// The renderer used when no mode is requested
    #[default]
    Default,
    /// A named mode such as `edit` or `summary`
    Named(String),
}

impl SubKey {
    pub fn named(name: impl Into<String>) -> Self {
        SubKey::Named(name.into())
    }

    pub fn is_default(&self) -> bool {
        matches!(self, SubKey::Default)
    }
}

impl From<&str> for SubKey {
    fn from(name: &str) -> Self {
        SubKey::named(name)
    }
}

impl From<Option<&str>> for SubKey {
    fn from(name: Option<&str>) -> Self {
        name.map_or(SubKey::Default, SubKey::from)
    }
}

impl fmt::Display for SubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubKey::Default => f.write_str("<default>"),
            SubKey::Named(name) => f.write_str(name),
        }
    }
}

/// Anything that can report its effective type list, most specific first.
pub trait ProvidesTypes {
    fn provided_types(&self) -> Vec<&str>;
}

/// JSON objects provide their `@type` field: an array of names, or a single
/// string. Anything else provides nothing.
impl ProvidesTypes for Value {
    fn provided_types(&self) -> Vec<&str> {
        match self.get(TYPE_FIELD) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(name)) => vec![name.as_str()],
            _ => Vec::new(),
        }
    }
}

impl ProvidesTypes for str {
    fn provided_types(&self) -> Vec<&str> {
        vec![self]
    }
}

impl ProvidesTypes for TypeName {
    fn provided_types(&self) -> Vec<&str> {
        vec![self.as_str()]
    }
}

impl<T: AsRef<str>> ProvidesTypes for [T] {
    fn provided_types(&self) -> Vec<&str> {
        self.iter().map(AsRef::as_ref).collect()
    }
}

impl<T: AsRef<str>> ProvidesTypes for Vec<T> {
    fn provided_types(&self) -> Vec<&str> {
        self.as_slice().provided_types()
    }
}
