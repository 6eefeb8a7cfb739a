//! # openapi-collection
//!
//! Turns an OpenAPI 3.x document into an ordered collection of operation
//! records, one per path and verb, with every schema `$ref` resolved.
//! Circular references are truncated per resolution path, so a schema shared by
//! unrelated branches is still expanded in full under each of them.

mod collection;
mod document;
mod error;
mod expander;
mod loader;
mod operations;
mod options;
mod resolver;
mod schema;
mod types;

pub use collection::{generate_collection, Collection, CollectionAssembler};
pub use document::Document;
pub use error::{CollectionError, CollectionResult};
pub use expander::SchemaExpander;
pub use loader::OpenApiLoader;
pub use operations::{to_colon_path, OperationExtractor};
pub use options::{ErrorPolicy, GenerateOptions};
pub use resolver::{PathScope, RefResolver, ResolutionPath};
pub use schema::{ArraySchema, Combinator, Composition, ObjectSchema, RefPointer, SchemaNode, ShapeError};
pub use types::{
    HttpMethod, OperationRecord, ParameterLocation, ParameterSpec, RequestBodySpec, ResponseEntry,
};
