//! Normalized OpenAPI document

use crate::error::{CollectionError, CollectionResult};
use crate::schema::RefPointer;
use serde_json::{Map, Value};

/// An OpenAPI 3.x document held as an insertion-ordered JSON tree
#[derive(Debug, Clone)]
pub struct Document {
    root: Value,
    version: String,
}

impl Document {
    /// Wrap a loaded JSON tree, checking the few top-level shapes the extractor relies on
    pub fn from_value(root: Value) -> CollectionResult<Self> {
        let Some(map) = root.as_object() else {
            return Err(CollectionError::InvalidFormat(
                "document root must be a mapping".to_string(),
            ));
        };

        let version = map
            .get("openapi")
            .ok_or_else(|| CollectionError::MissingField("openapi".to_string()))?;
        // Unquoted `openapi: 3.1` in YAML arrives as a number
        let version = match version {
            Value::String(version) => version.clone(),
            Value::Number(number) => number.to_string(),
            other => return Err(CollectionError::UnsupportedVersion(other.to_string())),
        };
        if !version.starts_with("3.") {
            return Err(CollectionError::UnsupportedVersion(version));
        }

        match map.get("paths") {
            None | Some(Value::Object(_)) => {}
            Some(_) => {
                return Err(CollectionError::InvalidFormat(
                    "paths must be a mapping".to_string(),
                ));
            }
        }

        Ok(Self { root, version })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn title(&self) -> Option<&str> {
        self.root.get("info")?.get("title")?.as_str()
    }

    /// Path items in declaration order
    pub fn paths(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.root
            .get("paths")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(Map::iter)
            .map(|(path, item)| (path.as_str(), item))
    }

    /// Look up the node a pointer addresses; `None` for external or dangling pointers
    pub fn lookup(&self, pointer: &RefPointer) -> Option<&Value> {
        let fragment = pointer.fragment()?;
        if fragment.is_empty() {
            return Some(&self.root);
        }
        self.root.pointer(fragment)
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }
}
