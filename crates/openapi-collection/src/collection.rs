//! Collection assembly

use crate::document::Document;
use crate::error::CollectionResult;
use crate::operations::OperationExtractor;
use crate::options::GenerateOptions;
use crate::types::{HttpMethod, OperationRecord};
use serde::Serialize;
use tracing::{debug, info};

/// Ordered operation records, serialized as a bare JSON array
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Collection {
    operations: Vec<OperationRecord>,
}

impl Collection {
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OperationRecord> {
        self.operations.iter()
    }

    pub fn get(&self, index: usize) -> Option<&OperationRecord> {
        self.operations.get(index)
    }

    /// Find an operation by verb and rewritten path (e.g. `/users/:userId`)
    pub fn find(&self, verb: HttpMethod, path: &str) -> Option<&OperationRecord> {
        self.operations
            .iter()
            .find(|op| op.verb == verb && op.path == path)
    }

    pub fn as_slice(&self) -> &[OperationRecord] {
        &self.operations
    }

    pub fn into_vec(self) -> Vec<OperationRecord> {
        self.operations
    }
}

impl IntoIterator for Collection {
    type Item = OperationRecord;
    type IntoIter = std::vec::IntoIter<OperationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a OperationRecord;
    type IntoIter = std::slice::Iter<'a, OperationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

/// Fixes the final ordering of extracted operations
pub struct CollectionAssembler;

impl CollectionAssembler {
    /// Operations arrive in document order and are kept that way
    pub fn assemble(operations: Vec<OperationRecord>) -> Collection {
        debug!("Assembling {} operations", operations.len());
        Collection { operations }
    }
}

/// Build the operation collection for a document
pub fn generate_collection(
    document: &Document,
    options: &GenerateOptions,
) -> CollectionResult<Collection> {
    let operations = OperationExtractor::new(document)
        .with_policy(options.on_error)
        .run()?;

    let collection = CollectionAssembler::assemble(operations);
    info!(
        title = document.title().unwrap_or("untitled"),
        operations = collection.len(),
        "Generated operation collection"
    );

    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(verb: HttpMethod, path: &str) -> OperationRecord {
        OperationRecord {
            verb,
            path: path.to_string(),
            operation_id: None,
            summary: None,
            description: None,
            tags: Vec::new(),
            deprecated: false,
            parameters: Vec::new(),
            request_body: None,
            response: Vec::new(),
        }
    }

    #[test]
    fn test_assemble_keeps_order() {
        let collection = CollectionAssembler::assemble(vec![
            record(HttpMethod::Post, "/b"),
            record(HttpMethod::Get, "/a"),
        ]);

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get(0).unwrap().verb, HttpMethod::Post);
        assert_eq!(collection.get(1).unwrap().path, "/a");
        assert!(collection.find(HttpMethod::Get, "/a").is_some());
        assert!(collection.find(HttpMethod::Get, "/b").is_none());
    }

    #[test]
    fn test_serializes_as_array() {
        let collection = CollectionAssembler::assemble(vec![record(HttpMethod::Get, "/a")]);
        assert_eq!(
            serde_json::to_value(&collection).unwrap(),
            json!([{"verb": "get", "path": "/a", "parameters": [], "response": []}])
        );
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::from_value(json!({"openapi": "3.1.0", "info": {"title": "Empty", "version": "1"}}))
            .unwrap();
        let collection = generate_collection(&doc, &GenerateOptions::default()).unwrap();
        assert!(collection.is_empty());
    }
}
