//! Domain models for bookmarklet descriptors and the manifest.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single manifest entry.
///
/// Stored as the raw field map so that key order and fields this tool does not
/// know about survive a rewrite untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bookmarklet {
    fields: Map<String, Value>,
}

impl Bookmarklet {
    pub fn name(&self) -> Option<&str> {
        self.text_field("name")
    }

    /// Source path relative to the manifest directory. Empty strings count as absent.
    pub fn file(&self) -> Option<&str> {
        self.text_field("file").filter(|file| !file.is_empty())
    }

    pub fn code(&self) -> Option<&str> {
        self.text_field("code")
    }

    /// Insert or overwrite the embedded source. Existing key position is kept.
    pub fn set_code(&mut self, code: impl Into<String>) {
        self.fields.insert("code".to_owned(), Value::String(code.into()));
    }

    /// Label used in progress output.
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or("<unnamed>")
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn text_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// Ordered list of descriptors as authored in `bookmarklets.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub bookmarklets: Vec<Bookmarklet>,
}

impl Manifest {
    /// Number of descriptors currently carrying embedded code.
    pub fn embedded_count(&self) -> usize {
        self.bookmarklets
            .iter()
            .filter(|bookmarklet| bookmarklet.code().is_some())
            .count()
    }
}

/// Normalized view of a descriptor as written into the generated JavaScript.
///
/// Present fields are copied as-is, whatever their JSON type; only absent ones get defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddedEntry<'a> {
    pub name: Cow<'a, Value>,
    pub description: Cow<'a, Value>,
    pub file: Cow<'a, Value>,
    pub icon: Cow<'a, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'a Value>,
}

impl<'a> EmbeddedEntry<'a> {
    pub fn from_bookmarklet(bookmarklet: &'a Bookmarklet, default_icon: &str) -> Self {
        let field = move |key: &str, default: &str| match bookmarklet.fields.get(key) {
            Some(value) => Cow::Borrowed(value),
            None => Cow::Owned(Value::String(default.to_owned())),
        };
        Self {
            name: field("name", ""),
            description: field("description", ""),
            file: field("file", ""),
            icon: field("icon", default_icon),
            code: bookmarklet.fields.get("code"),
        }
    }
}
