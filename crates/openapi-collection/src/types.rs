//! Type definitions for operation records

use crate::schema::SchemaNode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP methods supported by OpenAPI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Lowercase method name as it appears as a path item key
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }

    /// Method for a path item key; `None` for non-operation keys like `summary`
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "get" => Some(HttpMethod::Get),
            "put" => Some(HttpMethod::Put),
            "post" => Some(HttpMethod::Post),
            "delete" => Some(HttpMethod::Delete),
            "options" => Some(HttpMethod::Options),
            "head" => Some(HttpMethod::Head),
            "patch" => Some(HttpMethod::Patch),
            "trace" => Some(HttpMethod::Trace),
            _ => None,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameter location in HTTP request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

/// A parameter for an operation, with its schema expanded
#[derive(Debug, Clone, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Remaining fields (style, explode, `x-` extensions) passed through
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Request body with each media type's schema expanded
#[derive(Debug, Clone, Serialize)]
pub struct RequestBodySpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    /// Keyed by the media type string exactly as declared
    pub content: IndexMap<String, SchemaNode>,
}

/// One declared response status
#[derive(Debug, Clone, Serialize)]
pub struct ResponseEntry {
    /// Status code or range as declared, e.g. "200", "4XX", "default"
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Keyed by the media type string exactly as declared
    pub responses: IndexMap<String, SchemaNode>,
}

impl ResponseEntry {
    pub fn schema(&self, media_type: &str) -> Option<&SchemaNode> {
        self.responses.get(media_type)
    }
}

/// A single verb+path operation with every schema resolved
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRecord {
    pub verb: HttpMethod,
    /// Path with `{param}` rewritten to `:param`
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    pub parameters: Vec<ParameterSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodySpec>,
    pub response: Vec<ResponseEntry>,
}

impl OperationRecord {
    /// Response entry for a status code
    pub fn response_for(&self, code: &str) -> Option<&ResponseEntry> {
        self.response.iter().find(|entry| entry.code == code)
    }

    pub fn parameter(&self, name: &str, location: ParameterLocation) -> Option<&ParameterSpec> {
        self.parameters
            .iter()
            .find(|p| p.name == name && p.location == location)
    }
}

// --- Raw OpenAPI 3.x operation structures for parsing ---

/// Either an inline item or a `$ref` to one
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ReferenceOr<T> {
    Reference {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Item(T),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawOperation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub parameters: Vec<ReferenceOr<RawParameter>>,
    pub request_body: Option<ReferenceOr<RawRequestBody>>,
    #[serde(default)]
    pub responses: IndexMap<String, ReferenceOr<RawResponse>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawParameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    pub description: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
    pub schema: Option<SchemaNode>,
    pub example: Option<Value>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawRequestBody {
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: IndexMap<String, RawMediaType>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawMediaType {
    pub schema: Option<SchemaNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawResponse {
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<IndexMap<String, RawMediaType>>,
}
