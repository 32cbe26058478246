// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Path nodes and the ordered collections evaluation works on

use std::fmt;
use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Value};

use super::node::Node;
use super::value::PrimitiveValue;

/// Element of a collection: a document node or a bare primitive
#[derive(Debug, Clone)]
pub enum PathNode {
    /// Structural node from an adapted document
    Node(Arc<Node>),
    /// Computed or literal primitive
    Value(PrimitiveValue),
}

impl PathNode {
    /// The primitive carried by this element, unwrapping nodes
    pub fn primitive(&self) -> Option<&PrimitiveValue> {
        match self {
            Self::Node(node) => node.primitive_value(),
            Self::Value(value) => Some(value),
        }
    }

    pub fn as_node(&self) -> Option<&Arc<Node>> {
        match self {
            Self::Node(node) => Some(node),
            Self::Value(_) => None,
        }
    }

    /// Qualified runtime type name
    pub fn type_name(&self) -> String {
        match self {
            Self::Node(node) => node.type_name().to_string(),
            Self::Value(value) => value.qualified_type_name(),
        }
    }

    /// Strict equality, unwrapping primitive-bearing nodes
    pub fn fhir_equals(&self, other: &PathNode) -> Option<bool> {
        match (self.primitive(), other.primitive()) {
            (Some(a), Some(b)) => a.fhir_equals(b),
            _ => match (self, other) {
                (Self::Node(a), Self::Node(b)) => Some(a.structurally_equals(b)),
                _ => Some(false),
            },
        }
    }

    pub fn equivalent(&self, other: &PathNode) -> bool {
        match (self.primitive(), other.primitive()) {
            (Some(a), Some(b)) => a.equivalent(b),
            _ => match (self, other) {
                (Self::Node(a), Self::Node(b)) => a.structurally_equals(b),
                _ => false,
            },
        }
    }

    /// JSON rendering used by the command line tool
    pub fn to_json(&self) -> Value {
        match self {
            Self::Value(value) => primitive_to_json(value),
            Self::Node(node) => node_to_json(node),
        }
    }
}

fn primitive_to_json(value: &PrimitiveValue) -> Value {
    match value {
        PrimitiveValue::Boolean(b) => Value::Bool(*b),
        PrimitiveValue::Integer(i) => Value::from(*i),
        PrimitiveValue::Decimal(d) => d
            .to_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(d.to_string())),
        PrimitiveValue::Quantity(q) => {
            let mut map = Map::new();
            map.insert(
                "value".to_string(),
                primitive_to_json(&PrimitiveValue::Decimal(q.value)),
            );
            map.insert("unit".to_string(), Value::String(q.unit.clone()));
            Value::Object(map)
        }
        other => Value::String(other.to_string()),
    }
}

fn node_to_json(node: &Node) -> Value {
    if node.children().is_empty() {
        return node
            .primitive_value()
            .map(primitive_to_json)
            .unwrap_or(Value::Null);
    }
    let mut map = Map::new();
    if let Some(value) = node.primitive_value() {
        map.insert("value".to_string(), primitive_to_json(value));
    }
    for child in node.children() {
        let rendered = node_to_json(child);
        match map.get_mut(child.name()) {
            Some(Value::Array(items)) => items.push(rendered),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, rendered]);
            }
            None => {
                map.insert(child.name().to_string(), rendered);
            }
        }
    }
    Value::Object(map)
}

impl From<Arc<Node>> for PathNode {
    fn from(node: Arc<Node>) -> Self {
        Self::Node(node)
    }
}

impl From<PrimitiveValue> for PathNode {
    fn from(value: PrimitiveValue) -> Self {
        Self::Value(value)
    }
}

impl fmt::Display for PathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value}"),
            Self::Node(node) => match node.primitive_value() {
                Some(value) => write!(f, "{value}"),
                None => write!(f, "{}({})", node.type_name(), node.name()),
            },
        }
    }
}

/// Immutable, ordered, duplicate-permitting sequence of path nodes
///
/// Cloning is cheap; operations build new collections.
#[derive(Debug, Clone)]
pub struct Collection(Arc<[PathNode]>);

impl Default for Collection {
    fn default() -> Self {
        Self::empty()
    }
}

impl Collection {
    pub fn empty() -> Self {
        Self(Arc::from(Vec::new()))
    }

    pub fn single(item: impl Into<PathNode>) -> Self {
        Self(Arc::from(vec![item.into()]))
    }

    /// Singleton boolean result
    pub fn boolean(value: bool) -> Self {
        Self::single(PrimitiveValue::Boolean(value))
    }

    /// Singleton boolean, or empty when the answer is unknown
    pub fn from_truth(value: Option<bool>) -> Self {
        value.map(Self::boolean).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathNode> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[PathNode] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&PathNode> {
        self.0.get(index)
    }

    pub fn first(&self) -> Option<&PathNode> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&PathNode> {
        self.0.last()
    }

    /// The only element, when there is exactly one
    pub fn singleton(&self) -> Option<&PathNode> {
        match self.as_slice() {
            [item] => Some(item),
            _ => None,
        }
    }

    /// Primitive value of a singleton collection
    pub fn singleton_primitive(&self) -> Option<&PrimitiveValue> {
        self.singleton().and_then(PathNode::primitive)
    }

    /// Three-valued boolean view
    ///
    /// Empty is unknown (`None`); a singleton boolean is its value; anything
    /// else counts as `false`.
    pub fn to_truth(&self) -> Option<bool> {
        if self.is_empty() {
            return None;
        }
        Some(
            self.singleton_primitive()
                .and_then(PrimitiveValue::as_boolean)
                .unwrap_or(false),
        )
    }

    /// Whether an equal element is present
    pub fn contains_item(&self, item: &PathNode) -> bool {
        self.iter().any(|x| x.fhir_equals(item) == Some(true))
    }

    /// Concatenation keeping duplicates
    pub fn combine(&self, other: &Collection) -> Collection {
        self.iter().chain(other.iter()).cloned().collect()
    }

    /// Union without duplicates, in first-occurrence order
    pub fn union(&self, other: &Collection) -> Collection {
        let mut result: Vec<PathNode> = Vec::with_capacity(self.len() + other.len());
        for item in self.iter().chain(other.iter()) {
            if !result.iter().any(|x| x.fhir_equals(item) == Some(true)) {
                result.push(item.clone());
            }
        }
        result.into()
    }

    /// Remove duplicates, keeping first occurrences
    pub fn distinct(&self) -> Collection {
        self.union(&Collection::empty())
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.iter().map(PathNode::to_json).collect())
    }
}

impl From<Vec<PathNode>> for Collection {
    fn from(items: Vec<PathNode>) -> Self {
        Self(Arc::from(items))
    }
}

impl From<PathNode> for Collection {
    fn from(item: PathNode) -> Self {
        Self::single(item)
    }
}

impl From<Arc<Node>> for Collection {
    fn from(node: Arc<Node>) -> Self {
        Self::single(node)
    }
}

impl From<Node> for Collection {
    fn from(node: Node) -> Self {
        Self::single(Arc::new(node))
    }
}

impl From<PrimitiveValue> for Collection {
    fn from(value: PrimitiveValue) -> Self {
        Self::single(value)
    }
}

impl FromIterator<PathNode> for Collection {
    fn from_iter<I: IntoIterator<Item = PathNode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a PathNode;
    type IntoIter = std::slice::Iter<'a, PathNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{item}")?;
        }
        write!(f, "]")
    }
}
