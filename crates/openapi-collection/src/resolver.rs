//! JSON pointer `$ref` resolution with path-scoped cycle detection

use crate::document::Document;
use crate::error::{CollectionError, CollectionResult};
use crate::expander::SchemaExpander;
use crate::schema::{RefPointer, SchemaNode};
use std::ops::{Deref, DerefMut};
use tracing::{debug, trace};

/// Pointers currently being expanded along one recursive descent
///
/// Only ancestors of the node being expanded are on the path. Siblings are
/// expanded one after another and each pops its pointer before the next starts.
#[derive(Debug, Default, Clone)]
pub struct ResolutionPath {
    stack: Vec<RefPointer>,
}

impl ResolutionPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, pointer: &RefPointer) -> bool {
        self.stack.contains(pointer)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RefPointer> {
        self.stack.iter()
    }

    /// Push `pointer` for the lifetime of the returned scope
    pub fn enter(&mut self, pointer: RefPointer) -> PathScope<'_> {
        self.stack.push(pointer);
        PathScope { path: self }
    }
}

/// Pops its pointer when dropped, on success, `?` early return or unwinding alike
pub struct PathScope<'p> {
    path: &'p mut ResolutionPath,
}

impl Deref for PathScope<'_> {
    type Target = ResolutionPath;

    fn deref(&self) -> &ResolutionPath {
        self.path
    }
}

impl DerefMut for PathScope<'_> {
    fn deref_mut(&mut self) -> &mut ResolutionPath {
        self.path
    }
}

impl Drop for PathScope<'_> {
    fn drop(&mut self) {
        self.path.stack.pop();
    }
}

/// Resolves `$ref` pointers against a document
#[derive(Debug, Clone, Copy)]
pub struct RefResolver<'d> {
    document: &'d Document,
}

impl<'d> RefResolver<'d> {
    pub fn new(document: &'d Document) -> Self {
        Self { document }
    }

    /// Resolve `pointer` and expand its target
    ///
    /// A pointer already on `path` closes a cycle and resolves to `{}` without
    /// touching the document.
    pub fn resolve(
        &self,
        pointer: &RefPointer,
        path: &mut ResolutionPath,
    ) -> CollectionResult<SchemaNode> {
        if path.contains(pointer) {
            debug!(pointer = %pointer, depth = path.depth(), "Circular reference truncated");
            return Ok(SchemaNode::empty_object());
        }

        let target = self.lookup(pointer)?;
        trace!(pointer = %pointer, depth = path.depth(), "Expanding reference");

        let mut scope = path.enter(pointer.clone());
        SchemaExpander::new(self.document).expand(&target, &mut scope)
    }

    /// Find and adapt the schema a pointer addresses
    pub fn lookup(&self, pointer: &RefPointer) -> CollectionResult<SchemaNode> {
        let value = self
            .document
            .lookup(pointer)
            .ok_or_else(|| CollectionError::UnresolvableReference(pointer.to_string()))?;

        SchemaNode::from_value(value).map_err(|e| CollectionError::MalformedSchema {
            location: pointer.to_string(),
            reason: e.to_string(),
        })
    }
}
