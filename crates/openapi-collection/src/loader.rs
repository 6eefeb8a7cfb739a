//! Document loading from text, files and URLs

use crate::document::Document;
use crate::error::{CollectionError, CollectionResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

static OVERSIZED_BOUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(\s*(?:minimum|maximum|exclusiveMinimum|exclusiveMaximum):\s*)(-?\d{16,})\s*$")
        .unwrap()
});

/// Loads OpenAPI 3.x documents
pub struct OpenApiLoader;

impl OpenApiLoader {
    /// Parse a document from a string (auto-detects JSON/YAML)
    pub fn parse(content: &str) -> CollectionResult<Document> {
        if content.trim_start().starts_with('{') {
            Self::parse_json(content)
        } else {
            Self::parse_yaml(content)
        }
    }

    /// Parse a document from JSON
    pub fn parse_json(content: &str) -> CollectionResult<Document> {
        let root: Value = serde_json::from_str(content)?;
        Self::finish(root)
    }

    /// Parse a document from YAML
    pub fn parse_yaml(content: &str) -> CollectionResult<Document> {
        let content = Self::clamp_oversized_bounds(content);
        let root: Value = serde_yaml::from_str(&content)?;
        Self::finish(root)
    }

    /// Read and parse a document from disk, choosing the format by extension
    pub fn load_file(path: impl AsRef<Path>) -> CollectionResult<Document> {
        let path = path.as_ref();
        info!("Loading OpenAPI document from {:?}", path);

        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&content),
            Some("yaml") | Some("yml") => Self::parse_yaml(&content),
            _ => Self::parse(&content),
        }
    }

    /// Fetch and parse a document from a URL
    pub async fn fetch(url: &str) -> CollectionResult<Document> {
        let parsed = url::Url::parse(url).map_err(|e| CollectionError::InvalidUrl(format!("{}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CollectionError::InvalidUrl(format!(
                "unsupported scheme {} in {}",
                parsed.scheme(),
                url
            )));
        }

        info!("Fetching OpenAPI document from: {}", url);

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| CollectionError::HttpError(e.to_string()))?;

        let response = client
            .get(parsed.clone())
            .header("Accept", "application/json, application/yaml, text/yaml")
            .send()
            .await
            .map_err(|e| CollectionError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CollectionError::FetchError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let content = response
            .text()
            .await
            .map_err(|e| CollectionError::FetchError(e.to_string()))?;

        let path = parsed.path();
        if content_type.contains("yaml") || path.ends_with(".yaml") || path.ends_with(".yml") {
            Self::parse_yaml(&content)
        } else {
            Self::parse(&content)
        }
    }

    fn finish(root: Value) -> CollectionResult<Document> {
        let document = Document::from_value(root)?;
        debug!(
            version = document.version(),
            title = document.title().unwrap_or("untitled"),
            "Loaded OpenAPI document"
        );
        Ok(document)
    }

    /// Clamp min/max bounds too large for a JSON number
    ///
    /// Some published documents use 64-bit sentinels here, which YAML accepts but
    /// JSON number conversion rejects. Only the magnitude matters for such bounds.
    fn clamp_oversized_bounds(content: &str) -> String {
        OVERSIZED_BOUND
            .replace_all(content, |caps: &regex::Captures| {
                if caps[2].starts_with('-') {
                    format!("{}-2147483648", &caps[1])
                } else {
                    format!("{}2147483647", &caps[1])
                }
            })
            .into_owned()
    }
}
