//! Operation extraction from OpenAPI documents

use crate::document::Document;
use crate::error::{CollectionError, CollectionResult};
use crate::expander::SchemaExpander;
use crate::options::ErrorPolicy;
use crate::schema::{RefPointer, SchemaNode};
use crate::types::*;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

static PATH_PARAMETER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}/]+)\}").unwrap());

/// Rewrite `{param}` placeholders to `:param`
pub fn to_colon_path(path: &str) -> String {
    PATH_PARAMETER.replace_all(path, ":$1").into_owned()
}

/// Extracts operation records from a document
pub struct OperationExtractor<'d> {
    document: &'d Document,
    expander: SchemaExpander<'d>,
    policy: ErrorPolicy,
}

impl<'d> OperationExtractor<'d> {
    pub fn new(document: &'d Document) -> Self {
        Self {
            document,
            expander: SchemaExpander::new(document),
            policy: ErrorPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Extract all operations, aborting on the first error
    pub fn extract(document: &'d Document) -> CollectionResult<Vec<OperationRecord>> {
        Self::new(document).run()
    }

    /// Extract all operations in path declaration order, then verb declaration order
    pub fn run(&self) -> CollectionResult<Vec<OperationRecord>> {
        let mut operations = Vec::new();

        for (path, path_item) in self.document.paths() {
            let Some(path_item) = path_item.as_object() else {
                self.handle(CollectionError::MalformedPathItem {
                    path: path.to_string(),
                    reason: "path item must be a mapping".to_string(),
                })?;
                continue;
            };

            // Path-level parameters
            let path_params = match path_item.get("parameters") {
                Some(value) => match Vec::<ReferenceOr<RawParameter>>::deserialize(value) {
                    Ok(params) => params,
                    Err(e) => {
                        self.handle(CollectionError::MalformedPathItem {
                            path: path.to_string(),
                            reason: e.to_string(),
                        })?;
                        continue;
                    }
                },
                None => Vec::new(),
            };

            for (key, operation) in path_item {
                let Some(method) = HttpMethod::from_key(key) else {
                    continue;
                };

                match self.extract_operation(path, method, operation, &path_params) {
                    Ok(record) => operations.push(record),
                    Err(e) => self.handle(e)?,
                }
            }
        }

        Ok(operations)
    }

    /// Apply the error policy: abort, or log and move on to the next operation
    fn handle(&self, error: CollectionError) -> CollectionResult<()> {
        match self.policy {
            ErrorPolicy::SkipOperation if error.is_operation_scoped() => {
                warn!(error = %error, "Skipping operation");
                Ok(())
            }
            _ => Err(error),
        }
    }

    /// Extract a single operation
    fn extract_operation(
        &self,
        path: &str,
        method: HttpMethod,
        operation: &Value,
        path_params: &[ReferenceOr<RawParameter>],
    ) -> CollectionResult<OperationRecord> {
        let malformed = |reason: String| CollectionError::MalformedOperation {
            verb: method.to_string(),
            path: path.to_string(),
            reason,
        };

        if !operation.is_object() {
            return Err(malformed("operation must be a mapping".to_string()));
        }
        let raw = RawOperation::deserialize(operation).map_err(|e| malformed(e.to_string()))?;

        debug!(verb = %method, path = path, "Extracting operation");

        // Combine path-level and operation-level parameters
        let mut parameters = Vec::new();
        for param in path_params {
            parameters.push(self.convert_parameter(param)?);
        }
        for param in &raw.parameters {
            let param = self.convert_parameter(param)?;
            // Operation-level wins over a path-level param with the same name and location
            parameters.retain(|existing: &ParameterSpec| {
                existing.name != param.name || existing.location != param.location
            });
            parameters.push(param);
        }

        let request_body = raw
            .request_body
            .as_ref()
            .map(|body| self.extract_request_body(body))
            .transpose()?;

        let response = raw
            .responses
            .iter()
            .map(|(code, response)| self.extract_response(code, response))
            .collect::<CollectionResult<Vec<_>>>()?;

        Ok(OperationRecord {
            verb: method,
            path: to_colon_path(path),
            operation_id: raw.operation_id,
            summary: raw.summary,
            description: raw.description,
            tags: raw.tags,
            deprecated: raw.deprecated,
            parameters,
            request_body,
            response,
        })
    }

    /// Convert a raw parameter, following `$ref` and expanding its schema
    fn convert_parameter(&self, param: &ReferenceOr<RawParameter>) -> CollectionResult<ParameterSpec> {
        let param = self.resolve_component(param)?;

        Ok(ParameterSpec {
            name: param.name,
            location: param.location,
            required: param.required || param.location == ParameterLocation::Path,
            description: param.description,
            deprecated: param.deprecated,
            schema: self.expand_schema(param.schema.as_ref())?,
            example: param.example,
            extra: param.extra,
        })
    }

    /// Extract request body information
    fn extract_request_body(
        &self,
        body: &ReferenceOr<RawRequestBody>,
    ) -> CollectionResult<RequestBodySpec> {
        let body = self.resolve_component(body)?;

        Ok(RequestBodySpec {
            description: body.description,
            required: body.required,
            content: self.expand_content(&body.content)?,
        })
    }

    /// Extract one response entry
    fn extract_response(
        &self,
        code: &str,
        response: &ReferenceOr<RawResponse>,
    ) -> CollectionResult<ResponseEntry> {
        let response = self.resolve_component(response)?;

        let responses = match &response.content {
            Some(content) => self.expand_content(content)?,
            None => IndexMap::new(),
        };

        Ok(ResponseEntry {
            code: code.to_string(),
            description: response.description,
            responses,
        })
    }

    /// Expand every media type's schema, each from a fresh resolution path
    fn expand_content(
        &self,
        content: &IndexMap<String, RawMediaType>,
    ) -> CollectionResult<IndexMap<String, SchemaNode>> {
        let mut expanded = IndexMap::new();
        for (media_type, media) in content {
            if let Some(schema) = self.expand_schema(media.schema.as_ref())? {
                expanded.insert(media_type.clone(), schema);
            }
        }
        Ok(expanded)
    }

    fn expand_schema(&self, schema: Option<&SchemaNode>) -> CollectionResult<Option<SchemaNode>> {
        schema.map(|s| self.expander.expand_root(s)).transpose()
    }

    /// Follow a `$ref` chain to an inline component
    fn resolve_component<T>(&self, entry: &ReferenceOr<T>) -> CollectionResult<T>
    where
        T: DeserializeOwned + Clone,
    {
        let mut reference = match entry {
            ReferenceOr::Item(item) => return Ok(item.clone()),
            ReferenceOr::Reference { reference } => RefPointer::new(reference.as_str()),
        };
        let mut seen = Vec::new();

        loop {
            if seen.contains(&reference) {
                return Err(CollectionError::UnresolvableReference(reference.to_string()));
            }

            let value = self
                .document
                .lookup(&reference)
                .ok_or_else(|| CollectionError::UnresolvableReference(reference.to_string()))?;
            let next = ReferenceOr::<T>::deserialize(value).map_err(|e| {
                CollectionError::MalformedComponent {
                    pointer: reference.to_string(),
                    reason: e.to_string(),
                }
            })?;

            match next {
                ReferenceOr::Item(item) => return Ok(item),
                ReferenceOr::Reference { reference: next } => {
                    seen.push(reference);
                    reference = RefPointer::new(next);
                }
            }
        }
    }
}
