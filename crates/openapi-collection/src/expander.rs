//! Recursive schema expansion

use crate::document::Document;
use crate::error::CollectionResult;
use crate::resolver::{RefResolver, ResolutionPath};
use crate::schema::{ArraySchema, Composition, ObjectSchema, SchemaNode};
use indexmap::IndexMap;

/// Expands schemas into fresh trees with every reachable `$ref` replaced
#[derive(Debug, Clone, Copy)]
pub struct SchemaExpander<'d> {
    document: &'d Document,
}

impl<'d> SchemaExpander<'d> {
    pub fn new(document: &'d Document) -> Self {
        Self { document }
    }

    /// Expand a schema starting from an empty resolution path
    pub fn expand_root(&self, node: &SchemaNode) -> CollectionResult<SchemaNode> {
        self.expand(node, &mut ResolutionPath::new())
    }

    /// Expand a schema under the given active path
    pub fn expand(&self, node: &SchemaNode, path: &mut ResolutionPath) -> CollectionResult<SchemaNode> {
        match node {
            SchemaNode::Reference(pointer) => RefResolver::new(self.document).resolve(pointer, path),
            SchemaNode::Composition(composition) => Ok(SchemaNode::Composition(Composition {
                all_of: self.expand_members(composition.all_of.as_deref(), path)?,
                one_of: self.expand_members(composition.one_of.as_deref(), path)?,
                any_of: self.expand_members(composition.any_of.as_deref(), path)?,
                not: self.expand_boxed(composition.not.as_deref(), path)?,
                base: Box::new(self.expand(&composition.base, path)?),
            })),
            SchemaNode::Object(object) => {
                let properties = match &object.properties {
                    Some(properties) => Some(
                        properties
                            .iter()
                            .map(|(name, schema)| Ok((name.clone(), self.expand(schema, path)?)))
                            .collect::<CollectionResult<IndexMap<_, _>>>()?,
                    ),
                    None => None,
                };
                let additional_properties =
                    self.expand_boxed(object.additional_properties.as_deref(), path)?;
                let items = self.expand_boxed(object.items.as_deref(), path)?;

                Ok(SchemaNode::Object(ObjectSchema {
                    properties,
                    additional_properties,
                    items,
                    fields: object.fields.clone(),
                }))
            }
            SchemaNode::Array(array) => Ok(SchemaNode::Array(ArraySchema {
                items: Box::new(self.expand(&array.items, path)?),
                fields: array.fields.clone(),
            })),
            SchemaNode::Leaf(value) => Ok(SchemaNode::Leaf(value.clone())),
        }
    }

    fn expand_boxed(
        &self,
        schema: Option<&SchemaNode>,
        path: &mut ResolutionPath,
    ) -> CollectionResult<Option<Box<SchemaNode>>> {
        schema
            .map(|schema| self.expand(schema, path).map(Box::new))
            .transpose()
    }

    /// Each member sees the same path, so a cycle through one member never blocks its siblings
    fn expand_members(
        &self,
        members: Option<&[SchemaNode]>,
        path: &mut ResolutionPath,
    ) -> CollectionResult<Option<Vec<SchemaNode>>> {
        members
            .map(|members| {
                members
                    .iter()
                    .map(|member| self.expand(member, path))
                    .collect::<CollectionResult<Vec<_>>>()
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectionError;
    use crate::schema::RefPointer;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn document(schemas: Value) -> Document {
        Document::from_value(json!({
            "openapi": "3.0.0",
            "info": {"title": "Expander", "version": "1"},
            "paths": {},
            "components": {"schemas": schemas}
        }))
        .unwrap()
    }

    fn expand(doc: &Document, schema: Value) -> CollectionResult<Value> {
        let node = SchemaNode::from_value(&schema).unwrap();
        SchemaExpander::new(doc).expand_root(&node).map(|n| n.to_value())
    }

    #[test]
    fn test_resolve_nested_ref() {
        let doc = document(json!({
            "Address": {
                "type": "object",
                "properties": {"street": {"type": "string"}}
            },
            "User": {
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "address": {"$ref": "#/components/schemas/Address"}
                }
            }
        }));

        let resolved = expand(&doc, json!({"$ref": "#/components/schemas/User"})).unwrap();

        assert_eq!(resolved["properties"]["address"]["type"], "object");
        assert!(resolved["properties"]["address"]["properties"]["street"].is_object());
    }

    #[test]
    fn test_mutual_cycle_truncates_to_empty_object() {
        let doc = document(json!({
            "A": {"allOf": [{"$ref": "#/components/schemas/B"}]},
            "B": {"allOf": [{"$ref": "#/components/schemas/A"}]}
        }));

        let resolved = expand(&doc, json!({"$ref": "#/components/schemas/A"})).unwrap();

        assert_eq!(resolved, json!({"allOf": [{"allOf": [{}]}]}));
    }

    #[test]
    fn test_self_reference_terminates() {
        let doc = document(json!({
            "Node": {
                "type": "object",
                "properties": {
                    "value": {"type": "integer"},
                    "children": {
                        "type": "array",
                        "items": {"$ref": "#/components/schemas/Node"}
                    }
                }
            }
        }));

        let resolved = expand(&doc, json!({"$ref": "#/components/schemas/Node"})).unwrap();

        assert_eq!(resolved["properties"]["value"]["type"], "integer");
        assert_eq!(resolved["properties"]["children"]["items"], json!({}));
    }

    #[test]
    fn test_long_cycle_terminates() {
        let doc = document(json!({
            "A": {"type": "object", "properties": {"next": {"$ref": "#/components/schemas/B"}}},
            "B": {"type": "object", "properties": {"next": {"$ref": "#/components/schemas/C"}}},
            "C": {"type": "object", "properties": {"next": {"$ref": "#/components/schemas/A"}}}
        }));

        let resolved = expand(&doc, json!({"$ref": "#/components/schemas/B"})).unwrap();

        let c = &resolved["properties"]["next"];
        let a = &c["properties"]["next"];
        assert_eq!(a["type"], "object");
        assert_eq!(a["properties"]["next"], json!({}));
    }

    #[test]
    fn test_shared_schema_expands_independently() {
        let doc = document(json!({
            "Entity": {
                "type": "object",
                "description": "Entity",
                "properties": {"id": {"type": "string", "format": "uuid"}}
            },
            "Pair": {
                "type": "object",
                "properties": {
                    "x": {"$ref": "#/components/schemas/Entity"},
                    "y": {"$ref": "#/components/schemas/Entity"}
                }
            }
        }));

        let node = SchemaNode::Reference(RefPointer::component_schema("Pair"));
        let mut resolved = SchemaExpander::new(&doc).expand_root(&node).unwrap();

        let expected = json!({
            "type": "object",
            "description": "Entity",
            "properties": {"id": {"type": "string", "format": "uuid"}}
        });
        assert_eq!(resolved.property("x").unwrap().to_value(), expected);
        assert_eq!(resolved.property("y").unwrap().to_value(), expected);

        if let SchemaNode::Object(object) = &mut resolved {
            let properties = object.properties.as_mut().unwrap();
            properties["x"] = SchemaNode::empty_object();
        }
        assert!(resolved.property("x").unwrap().is_empty_object());
        assert_eq!(resolved.property("y").unwrap().to_value(), expected);
    }

    #[test]
    fn test_sibling_members_are_not_cycles() {
        let doc = document(json!({
            "Tag": {"type": "object", "properties": {"label": {"type": "string"}}}
        }));

        let resolved = expand(
            &doc,
            json!({"allOf": [
                {"$ref": "#/components/schemas/Tag"},
                {"$ref": "#/components/schemas/Tag"}
            ]}),
        )
        .unwrap();

        assert_eq!(resolved["allOf"][0], resolved["allOf"][1]);
        assert_eq!(resolved["allOf"][1]["properties"]["label"]["type"], "string");
    }

    #[test]
    fn test_composition_is_not_flattened() {
        let doc = document(json!({
            "X": {"type": "object", "properties": {"x": {"type": "string"}}},
            "Y": {"type": "object", "properties": {"y": {"type": "number"}}}
        }));

        let resolved = expand(
            &doc,
            json!({"allOf": [
                {"$ref": "#/components/schemas/X"},
                {"$ref": "#/components/schemas/Y"}
            ]}),
        )
        .unwrap();

        let all_of = resolved["allOf"].as_array().unwrap();
        assert_eq!(all_of.len(), 2);
        assert_eq!(all_of[0]["properties"]["x"]["type"], "string");
        assert_eq!(all_of[1]["properties"]["y"]["type"], "number");
        assert!(resolved.get("properties").is_none());
    }

    #[test]
    fn test_one_of_any_of_and_additional_properties() {
        let doc = document(json!({
            "Cat": {"type": "object", "properties": {"meow": {"type": "boolean"}}},
            "Dog": {"type": "object", "properties": {"bark": {"type": "boolean"}}}
        }));

        let resolved = expand(
            &doc,
            json!({
                "type": "object",
                "additionalProperties": {
                    "oneOf": [
                        {"$ref": "#/components/schemas/Cat"},
                        {"$ref": "#/components/schemas/Dog"}
                    ],
                    "anyOf": [{"$ref": "#/components/schemas/Cat"}]
                }
            }),
        )
        .unwrap();

        let additional = &resolved["additionalProperties"];
        assert_eq!(additional["oneOf"][1]["properties"]["bark"]["type"], "boolean");
        assert_eq!(additional["anyOf"][0]["properties"]["meow"]["type"], "boolean");
    }

    #[test]
    fn test_items_next_to_properties_are_expanded() {
        let doc = document(json!({
            "X": {"type": "object", "properties": {"x": {"type": "string"}}}
        }));

        let resolved = expand(
            &doc,
            json!({
                "type": "object",
                "properties": {"a": {"type": "string"}},
                "items": {"$ref": "#/components/schemas/X"}
            }),
        )
        .unwrap();

        assert_eq!(resolved["items"]["properties"]["x"]["type"], "string");
        assert_eq!(resolved["properties"]["a"]["type"], "string");
        assert!(!resolved.to_string().contains("$ref"));
    }

    #[test]
    fn test_not_is_expanded() {
        let doc = document(json!({
            "Banned": {"type": "string", "enum": ["root"]}
        }));

        let resolved = expand(
            &doc,
            json!({
                "type": "string",
                "not": {"$ref": "#/components/schemas/Banned"}
            }),
        )
        .unwrap();

        assert_eq!(
            resolved,
            json!({"type": "string", "not": {"type": "string", "enum": ["root"]}})
        );
        assert!(!resolved.to_string().contains("$ref"));
    }

    #[test]
    fn test_cycle_through_not_terminates() {
        let doc = document(json!({
            "Odd": {"not": {"$ref": "#/components/schemas/Odd"}}
        }));

        let resolved = expand(&doc, json!({"$ref": "#/components/schemas/Odd"})).unwrap();
        assert_eq!(resolved, json!({"not": {}}));
    }

    #[test]
    fn test_leaf_passthrough() {
        let doc = document(json!({}));
        let leaf = json!({"type": "string", "enum": ["a", "b"], "description": "Letter"});
        assert_eq!(expand(&doc, leaf.clone()).unwrap(), leaf);
        assert_eq!(expand(&doc, json!(true)).unwrap(), json!(true));
    }

    #[test]
    fn test_missing_member_fails() {
        let doc = document(json!({}));
        let err = expand(&doc, json!({"allOf": [{"$ref": "#/components/schemas/Nope"}]})).unwrap_err();
        assert!(matches!(err, CollectionError::UnresolvableReference(_)));
    }
}
