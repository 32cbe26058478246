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

//! Uniform document tree nodes
//!
//! Every adapted document ends up as a tree of [`Node`]s: a name used for
//! member navigation, a qualified runtime type, an optional primitive value
//! and ordered children. Trees are immutable and shared through `Arc`.

use std::sync::Arc;

use super::value::PrimitiveValue;

/// One position in a document tree
#[derive(Debug, Clone)]
pub struct Node {
    name: Arc<str>,
    type_name: Arc<str>,
    value: Option<PrimitiveValue>,
    children: Vec<Arc<Node>>,
}

impl Node {
    /// Start building a node with the given name and qualified type
    pub fn builder(name: impl Into<Arc<str>>, type_name: impl Into<Arc<str>>) -> NodeBuilder {
        NodeBuilder {
            name: name.into(),
            type_name: type_name.into(),
            value: None,
            children: Vec::new(),
        }
    }

    /// Leaf node carrying only a primitive value
    pub fn primitive(
        name: impl Into<Arc<str>>,
        type_name: impl Into<Arc<str>>,
        value: impl Into<PrimitiveValue>,
    ) -> Self {
        Self::builder(name, type_name).value(value).build()
    }

    /// Name used for member navigation
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualified runtime type, e.g. `FHIR.Patient`
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Immediate children in declaration order
    pub fn children(&self) -> &[Arc<Node>] {
        &self.children
    }

    /// Children whose name matches
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Arc<Node>> {
        self.children.iter().filter(move |c| c.name() == name)
    }

    pub fn has_primitive_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn primitive_value(&self) -> Option<&PrimitiveValue> {
        self.value.as_ref()
    }

    /// Pre-order flattening of the subtree, excluding this node
    pub fn descendants(&self) -> Vec<Arc<Node>> {
        let mut result = Vec::new();
        let mut stack: Vec<&Arc<Node>> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            result.push(Arc::clone(node));
            stack.extend(node.children.iter().rev());
        }
        result
    }

    /// Deep comparison of type, value and named children
    pub fn structurally_equals(&self, other: &Node) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if self.type_name != other.type_name || self.children.len() != other.children.len() {
            return false;
        }
        let values_match = match (&self.value, &other.value) {
            (Some(a), Some(b)) => a.fhir_equals(b) == Some(true),
            (None, None) => true,
            _ => false,
        };
        values_match
            && self
                .children
                .iter()
                .zip(other.children.iter())
                .all(|(a, b)| a.name == b.name && a.structurally_equals(b))
    }
}

/// Builder for [`Node`] trees
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    name: Arc<str>,
    type_name: Arc<str>,
    value: Option<PrimitiveValue>,
    children: Vec<Arc<Node>>,
}

impl NodeBuilder {
    /// Attach a primitive value
    pub fn value(mut self, value: impl Into<PrimitiveValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Append a child
    pub fn child(mut self, child: impl Into<Arc<Node>>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append a primitive leaf child
    pub fn leaf(
        self,
        name: impl Into<Arc<str>>,
        type_name: impl Into<Arc<str>>,
        value: impl Into<PrimitiveValue>,
    ) -> Self {
        self.child(Node::primitive(name, type_name, value))
    }

    pub fn push_child(&mut self, child: Arc<Node>) {
        self.children.push(child);
    }

    pub fn set_value(&mut self, value: PrimitiveValue) {
        self.value = Some(value);
    }

    pub fn build(self) -> Node {
        Node {
            name: self.name,
            type_name: self.type_name,
            value: self.value,
            children: self.children,
        }
    }
}

impl From<NodeBuilder> for Arc<Node> {
    fn from(builder: NodeBuilder) -> Self {
        Arc::new(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Node {
        Node::builder("root", "FHIR.Element")
            .child(
                Node::builder("a", "FHIR.Element")
                    .leaf("x", "FHIR.string", "1")
                    .leaf("y", "FHIR.string", "2"),
            )
            .leaf("a", "FHIR.string", "3")
            .leaf("b", "FHIR.string", "4")
            .build()
    }

    #[test]
    fn test_children_named_preserves_order() {
        let root = sample();
        let names: Vec<_> = root.children_named("a").map(|n| n.type_name()).collect();
        assert_eq!(names, vec!["FHIR.Element", "FHIR.string"]);
        assert_eq!(root.children_named("c").count(), 0);
    }

    #[test]
    fn test_descendants_pre_order() {
        let root = sample();
        let names: Vec<_> = root
            .descendants()
            .iter()
            .map(|n| n.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "x", "y", "a", "b"]);
    }

    #[test]
    fn test_leaf_has_no_children() {
        let leaf = Node::primitive("active", "FHIR.boolean", true);
        assert!(leaf.children().is_empty());
        assert!(leaf.descendants().is_empty());
        assert_eq!(leaf.primitive_value(), Some(&PrimitiveValue::Boolean(true)));
    }

    #[test]
    fn test_structural_equality() {
        assert!(sample().structurally_equals(&sample()));
        let other = Node::builder("root", "FHIR.Element")
            .leaf("a", "FHIR.string", "3")
            .build();
        assert!(!sample().structurally_equals(&other));
    }
}
