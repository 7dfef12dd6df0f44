//! Slot declarations and fetched values

use bytes::Bytes;
use encoded_views::ProvidesTypes;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// `@type` list carried by every synthesized error payload.
pub const ERROR_TYPES: &[&str] = &["AjaxError", "Error"];

/// Type name that marks a value as an error, wherever it appears in `@type`.
pub const ERROR_TYPE: &str = "Error";

/// How a slot's response body is parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedType {
    #[default]
    Json,
    Text,
    Blob,
}

impl ExpectedType {
    /// `Accept` header sent for this type.
    pub fn accept(self) -> &'static str {
        match self {
            ExpectedType::Json => "application/json",
            ExpectedType::Text => "text/plain, */*",
            ExpectedType::Blob => "*/*",
        }
    }
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExpectedType::Json => "json",
            ExpectedType::Text => "text",
            ExpectedType::Blob => "blob",
        })
    }
}

/// One named remote resource a view wants.
///
/// A slot without a URL is declared but not requesting; it neither blocks
/// readiness nor produces a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSpec {
    pub name: String,
    pub url: Option<String>,
    #[serde(default)]
    pub expected: ExpectedType,
    /// Store the response `ETag` in the results under this name
    #[serde(default)]
    pub etag_name: Option<String>,
}

impl SlotSpec {
    pub fn new(name: impl Into<String>, url: Option<String>, expected: ExpectedType) -> Self {
        Self {
            name: name.into(),
            url,
            expected,
            etag_name: None,
        }
    }

    pub fn json(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(name, Some(url.into()), ExpectedType::Json)
    }

    pub fn text(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(name, Some(url.into()), ExpectedType::Text)
    }

    pub fn blob(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(name, Some(url.into()), ExpectedType::Blob)
    }

    /// A slot whose URL is not known yet.
    pub fn inactive(name: impl Into<String>) -> Self {
        Self::new(name, None, ExpectedType::Json)
    }

    pub fn with_etag(mut self, etag_name: impl Into<String>) -> Self {
        self.etag_name = Some(etag_name.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.url.is_some()
    }
}

/// Error value stored in a slot when its fetch fails.
///
/// Serializes as
/// `{"@type": ["AjaxError", "Error"], "status": "error", "code": 404, "title": .., "description": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(rename = "@type")]
    pub types: Vec<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ErrorPayload {
    pub fn new(
        title: impl Into<String>,
        code: Option<u16>,
        description: Option<String>,
    ) -> Self {
        Self {
            types: ERROR_TYPES.iter().map(|t| t.to_string()).collect(),
            status: "error".to_string(),
            code,
            title: title.into(),
            description,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Null)
    }
}

impl ProvidesTypes for ErrorPayload {
    fn provided_types(&self) -> Vec<&str> {
        self.types.iter().map(String::as_str).collect()
    }
}

/// Parsed result of one slot.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchedValue {
    Json(Value),
    Text(String),
    Blob(Bytes),
    Error(ErrorPayload),
}

impl FetchedValue {
    /// Whether this value should put the session into its error state.
    ///
    /// Synthesized payloads always count; so does backend JSON whose `@type`
    /// list contains `Error`.
    pub fn is_error(&self) -> bool {
        match self {
            FetchedValue::Error(_) => true,
            FetchedValue::Json(value) => value.provided_types().contains(&ERROR_TYPE),
            FetchedValue::Text(_) | FetchedValue::Blob(_) => false,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            FetchedValue::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FetchedValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            FetchedValue::Blob(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorPayload> {
        match self {
            FetchedValue::Error(payload) => Some(payload),
            _ => None,
        }
    }
}

impl From<ErrorPayload> for FetchedValue {
    fn from(payload: ErrorPayload) -> Self {
        FetchedValue::Error(payload)
    }
}

/// Text and blobs have no type list; JSON reports its `@type`.
impl ProvidesTypes for FetchedValue {
    fn provided_types(&self) -> Vec<&str> {
        match self {
            FetchedValue::Json(value) => value.provided_types(),
            FetchedValue::Error(payload) => payload.provided_types(),
            FetchedValue::Text(_) | FetchedValue::Blob(_) => Vec::new(),
        }
    }
}

/// What a fetcher hands back for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub value: FetchedValue,
    pub etag: Option<String>,
}

impl From<FetchedValue> for FetchResponse {
    fn from(value: FetchedValue) -> Self {
        Self { value, etag: None }
    }
}

/// Slot values by name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedResults {
    values: IndexMap<String, FetchedValue>,
}

impl FetchedResults {
    pub(crate) fn insert(&mut self, name: impl Into<String>, value: FetchedValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FetchedValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FetchedValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// First error-shaped value, for rendering one error view for the whole
    /// session.
    pub fn error(&self) -> Option<(&str, &FetchedValue)> {
        self.iter().find(|(_, value)| value.is_error())
    }

    /// JSON object keyed by slot name. Errors become their payload, text
    /// becomes a string and blobs are left out.
    pub fn to_json(&self) -> Value {
        let object = self
            .values
            .iter()
            .filter_map(|(name, value)| {
                let json = match value {
                    FetchedValue::Json(value) => value.clone(),
                    FetchedValue::Text(text) => Value::String(text.clone()),
                    FetchedValue::Error(payload) => payload.to_value(),
                    FetchedValue::Blob(_) => return None,
                };
                Some((name.clone(), json))
            })
            .collect();
        Value::Object(object)
    }
}

impl<'a> IntoIterator for &'a FetchedResults {
    type Item = (&'a String, &'a FetchedValue);
    type IntoIter = indexmap::map::Iter<'a, String, FetchedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
