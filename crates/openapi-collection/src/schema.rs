//! Closed schema node model
//!
//! Loosely typed JSON schemas from the document are adapted into [`SchemaNode`]
//! once, at the boundary, so the expander only ever sees a known set of shapes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// A JSON pointer into the document, e.g. `#/components/schemas/User`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefPointer(String);

impl RefPointer {
    pub fn new(pointer: impl Into<String>) -> Self {
        Self(pointer.into())
    }

    /// Pointer to a named entry under `components.schemas`
    pub fn component_schema(name: &str) -> Self {
        Self(format!(
            "#/components/schemas/{}",
            name.replace('~', "~0").replace('/', "~1")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The JSON pointer part after `#`, or `None` for references outside the document
    pub fn fragment(&self) -> Option<&str> {
        self.0.strip_prefix('#')
    }
}

impl fmt::Display for RefPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RefPointer {
    fn from(pointer: &str) -> Self {
        Self::new(pointer)
    }
}

/// A schema value whose shape cannot be adapted
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct ShapeError(String);

/// Which combinator a composition member list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    AllOf,
    OneOf,
    AnyOf,
}

impl Combinator {
    pub const ALL: [Combinator; 3] = [Combinator::AllOf, Combinator::OneOf, Combinator::AnyOf];

    pub fn keyword(&self) -> &'static str {
        match self {
            Combinator::AllOf => "allOf",
            Combinator::OneOf => "oneOf",
            Combinator::AnyOf => "anyOf",
        }
    }
}


/// Composed schema: member lists plus everything declared next to them
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub all_of: Option<Vec<SchemaNode>>,
    pub one_of: Option<Vec<SchemaNode>>,
    pub any_of: Option<Vec<SchemaNode>>,
    pub not: Option<Box<SchemaNode>>,
    /// Sibling keywords (description, type, properties, ...) adapted on their own
    pub base: Box<SchemaNode>,
}

impl Composition {
    pub fn members(&self, combinator: Combinator) -> Option<&[SchemaNode]> {
        match combinator {
            Combinator::AllOf => self.all_of.as_deref(),
            Combinator::OneOf => self.one_of.as_deref(),
            Combinator::AnyOf => self.any_of.as_deref(),
        }
    }
}

/// Object schema with nested property schemas
///
/// `fields` keeps every declared key in its original position; keys that hold
/// a nested schema carry a `null` placeholder there.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    pub properties: Option<IndexMap<String, SchemaNode>>,
    pub additional_properties: Option<Box<SchemaNode>>,
    /// `items` declared next to `properties`
    pub items: Option<Box<SchemaNode>>,
    pub fields: Map<String, Value>,
}

/// Array schema with a nested item schema
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub items: Box<SchemaNode>,
    pub fields: Map<String, Value>,
}

/// A schema as the resolution engine sees it
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum SchemaNode {
    Reference(RefPointer),
    Composition(Composition),
    Object(ObjectSchema),
    Array(ArraySchema),
    /// Anything without nested schemas; passed through unchanged
    Leaf(Value),
}

impl SchemaNode {
    /// The `{}` node a truncated cycle resolves to
    pub fn empty_object() -> Self {
        SchemaNode::Leaf(Value::Object(Map::new()))
    }

    pub fn is_empty_object(&self) -> bool {
        matches!(self, SchemaNode::Leaf(Value::Object(map)) if map.is_empty())
    }

    pub fn reference(&self) -> Option<&RefPointer> {
        match self {
            SchemaNode::Reference(pointer) => Some(pointer),
            _ => None,
        }
    }

    /// Property schema by name, looking through a composition's base
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        match self {
            SchemaNode::Object(object) => object.properties.as_ref()?.get(name),
            SchemaNode::Composition(composition) => composition.base.property(name),
            _ => None,
        }
    }

    pub fn all_of(&self) -> Option<&[SchemaNode]> {
        match self {
            SchemaNode::Composition(composition) => composition.all_of.as_deref(),
            _ => None,
        }
    }

    pub fn items(&self) -> Option<&SchemaNode> {
        match self {
            SchemaNode::Array(array) => Some(&array.items),
            SchemaNode::Object(object) => object.items.as_deref(),
            SchemaNode::Composition(composition) => composition.base.items(),
            _ => None,
        }
    }

    /// Adapt a raw JSON schema value into a node
    pub fn from_value(value: &Value) -> Result<Self, ShapeError> {
        let Value::Object(map) = value else {
            return Ok(SchemaNode::Leaf(value.clone()));
        };

        if let Some(reference) = map.get("$ref") {
            let pointer = reference
                .as_str()
                .ok_or_else(|| ShapeError(format!("$ref must be a string, found {}", reference)))?;
            return Ok(SchemaNode::Reference(RefPointer::new(pointer)));
        }

        let mut fields = map.clone();
        let all_of = take_members(&mut fields, Combinator::AllOf)?;
        let one_of = take_members(&mut fields, Combinator::OneOf)?;
        let any_of = take_members(&mut fields, Combinator::AnyOf)?;
        let not = take_schema(&mut fields, "not")?;

        if all_of.is_none() && one_of.is_none() && any_of.is_none() && not.is_none() {
            return adapt_plain(fields);
        }

        Ok(SchemaNode::Composition(Composition {
            all_of,
            one_of,
            any_of,
            not,
            base: Box::new(adapt_plain(fields)?),
        }))
    }

    /// Render the node back to a JSON value, nested schemas at their declared positions
    pub fn to_value(&self) -> Value {
        match self {
            SchemaNode::Reference(pointer) => {
                let mut map = Map::new();
                map.insert("$ref".to_string(), Value::String(pointer.to_string()));
                Value::Object(map)
            }
            SchemaNode::Composition(composition) => {
                let base = match composition.base.to_value() {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                let mut slots: Vec<(&str, Option<Value>)> = Combinator::ALL
                    .iter()
                    .map(|combinator| {
                        let rendered = composition
                            .members(*combinator)
                            .map(|members| Value::Array(members.iter().map(SchemaNode::to_value).collect()));
                        (combinator.keyword(), rendered)
                    })
                    .collect();
                slots.push(("not", composition.not.as_ref().map(|not| not.to_value())));
                Value::Object(render_slots(&base, slots))
            }
            SchemaNode::Object(object) => {
                let properties = object.properties.as_ref().map(|properties| {
                    Value::Object(
                        properties
                            .iter()
                            .map(|(name, schema)| (name.clone(), schema.to_value()))
                            .collect(),
                    )
                });
                Value::Object(render_slots(
                    &object.fields,
                    vec![
                        ("properties", properties),
                        ("additionalProperties", object.additional_properties.as_ref().map(|s| s.to_value())),
                        ("items", object.items.as_ref().map(|s| s.to_value())),
                    ],
                ))
            }
            SchemaNode::Array(array) => Value::Object(render_slots(
                &array.fields,
                vec![("items", Some(array.items.to_value()))],
            )),
            SchemaNode::Leaf(value) => value.clone(),
        }
    }
}

impl TryFrom<Value> for SchemaNode {
    type Error = ShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        SchemaNode::from_value(&value)
    }
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Take a keyword's value, leaving a `null` placeholder at its position
fn take_slot(fields: &mut Map<String, Value>, keyword: &str) -> Option<Value> {
    fields.get_mut(keyword).map(std::mem::take)
}

fn take_schema(
    fields: &mut Map<String, Value>,
    keyword: &str,
) -> Result<Option<Box<SchemaNode>>, ShapeError> {
    take_slot(fields, keyword)
        .map(|schema| SchemaNode::from_value(&schema).map(Box::new))
        .transpose()
}

fn take_members(
    fields: &mut Map<String, Value>,
    combinator: Combinator,
) -> Result<Option<Vec<SchemaNode>>, ShapeError> {
    match take_slot(fields, combinator.keyword()) {
        None => Ok(None),
        Some(Value::Array(members)) => members
            .iter()
            .map(SchemaNode::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(other) => Err(ShapeError(format!(
            "{} must be a sequence, found {}",
            combinator.keyword(),
            other
        ))),
    }
}

/// Adapt a schema that carries no combinators
fn adapt_plain(mut fields: Map<String, Value>) -> Result<SchemaNode, ShapeError> {
    let properties = match take_slot(&mut fields, "properties") {
        None => None,
        Some(Value::Object(properties)) => Some(
            properties
                .iter()
                .map(|(name, schema)| Ok((name.clone(), SchemaNode::from_value(schema)?)))
                .collect::<Result<IndexMap<_, _>, ShapeError>>()?,
        ),
        Some(other) => {
            return Err(ShapeError(format!("properties must be a mapping, found {}", other)));
        }
    };

    // Boolean additionalProperties stays a plain field
    let additional_properties = if matches!(fields.get("additionalProperties"), Some(Value::Object(_))) {
        take_schema(&mut fields, "additionalProperties")?
    } else {
        None
    };

    let items = take_schema(&mut fields, "items")?;

    if properties.is_some() || additional_properties.is_some() {
        return Ok(SchemaNode::Object(ObjectSchema {
            properties,
            additional_properties,
            items,
            fields,
        }));
    }

    if let Some(items) = items {
        return Ok(SchemaNode::Array(ArraySchema { items, fields }));
    }

    Ok(SchemaNode::Leaf(Value::Object(fields)))
}

/// Rebuild a field map, putting each rendered slot where its placeholder sits
///
/// Slots without a placeholder are appended; placeholders whose slot is empty are dropped.
fn render_slots(fields: &Map<String, Value>, mut slots: Vec<(&str, Option<Value>)>) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in fields {
        match slots.iter_mut().find(|(slot, _)| *slot == key.as_str()) {
            Some((_, rendered)) => {
                if let Some(rendered) = rendered.take() {
                    map.insert(key.clone(), rendered);
                }
            }
            None => {
                map.insert(key.clone(), value.clone());
            }
        }
    }
    for (slot, rendered) in slots {
        if let Some(rendered) = rendered {
            map.insert(slot.to_string(), rendered);
        }
    }
    map
}
