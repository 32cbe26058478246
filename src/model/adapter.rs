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

//! Adapters turning external documents into [`Node`] trees
//!
//! The JSON adapter follows the FHIR JSON conventions:
//! - `resourceType` names the type of a resource object and is not a child
//! - arrays become repeated siblings with the same name
//! - `_field` objects hold the id and extensions of primitive `field`

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use super::error::{ModelError, ModelResult};
use super::node::{Node, NodeBuilder};
use super::temporal::{PrecisionDate, PrecisionDateTime, PrecisionTime};
use super::value::PrimitiveValue;

/// Source of a document tree
pub trait TreeAdapter {
    /// Build the root node
    fn to_node(&self) -> ModelResult<Arc<Node>>;
}

impl TreeAdapter for Value {
    fn to_node(&self) -> ModelResult<Arc<Node>> {
        JsonAdapter::new().adapt(self)
    }
}

impl<T: TreeAdapter> TreeAdapter for Option<T> {
    fn to_node(&self) -> ModelResult<Arc<Node>> {
        match self {
            Some(inner) => inner.to_node(),
            None => Err(ModelError::invalid_argument("document is absent")),
        }
    }
}

impl TreeAdapter for Arc<Node> {
    fn to_node(&self) -> ModelResult<Arc<Node>> {
        Ok(Arc::clone(self))
    }
}

/// JSON to [`Node`] adapter
///
/// Element types come from type hints keyed by `Owner.element` (for example
/// `Patient.name`) or `*.element` for any owner. Unhinted objects are typed
/// `FHIR.Element`; unhinted scalars get the FHIR primitive type matching
/// their JSON kind.
#[derive(Debug, Clone)]
pub struct JsonAdapter {
    hints: FxHashMap<String, String>,
}

impl Default for JsonAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonAdapter {
    /// Adapter with the common FHIR R4 element type hints
    pub fn new() -> Self {
        let mut adapter = Self::without_hints();
        for (path, type_name) in [
            ("*.meta", "Meta"),
            ("*.text", "Narrative"),
            ("*.extension", "Extension"),
            ("*.modifierExtension", "Extension"),
            ("*.identifier", "Identifier"),
            ("*.coding", "Coding"),
            ("*.period", "Period"),
            ("*.telecom", "ContactPoint"),
            ("*.address", "Address"),
            ("*.subject", "Reference"),
            ("*.patient", "Reference"),
            ("*.encounter", "Reference"),
            ("*.code", "CodeableConcept"),
            ("*.category", "CodeableConcept"),
            ("*.valueQuantity", "Quantity"),
            ("*.valueCodeableConcept", "CodeableConcept"),
            ("*.valueDateTime", "dateTime"),
            ("*.effectiveDateTime", "dateTime"),
            ("*.onsetDateTime", "dateTime"),
            ("*.lastUpdated", "instant"),
            ("*.birthDate", "date"),
            ("*.issued", "instant"),
            ("*.start", "dateTime"),
            ("*.end", "dateTime"),
            ("Patient.name", "HumanName"),
            ("Practitioner.name", "HumanName"),
            ("Patient.gender", "code"),
            ("Patient.contact", "BackboneElement"),
            ("Bundle.entry", "BackboneElement"),
            ("Observation.status", "code"),
            ("Coding.code", "code"),
            ("Coding.system", "uri"),
            ("Quantity.code", "code"),
            ("Quantity.system", "uri"),
            ("Extension.url", "uri"),
            ("Identifier.system", "uri"),
        ] {
            adapter = adapter.with_type_hint(path, type_name);
        }
        adapter
    }

    /// Adapter that types everything from the JSON shape alone
    pub fn without_hints() -> Self {
        Self {
            hints: FxHashMap::default(),
        }
    }

    /// Add a hint; unqualified type names are placed in the FHIR namespace
    pub fn with_type_hint(mut self, path: &str, type_name: &str) -> Self {
        let qualified = if type_name.contains('.') {
            type_name.to_string()
        } else {
            format!("FHIR.{type_name}")
        };
        self.hints.insert(path.to_string(), qualified);
        self
    }

    fn hint(&self, owner_type: &str, element: &str) -> Option<&str> {
        let owner = owner_type.rsplit('.').next().unwrap_or(owner_type);
        self.hints
            .get(&format!("{owner}.{element}"))
            .or_else(|| self.hints.get(&format!("*.{element}")))
            .map(String::as_str)
    }

    /// Adapt a JSON document; `null` is rejected
    pub fn adapt(&self, value: &Value) -> ModelResult<Arc<Node>> {
        match value {
            Value::Null => Err(ModelError::invalid_argument("document is null")),
            Value::Object(map) => {
                let type_name = resource_type(map)
                    .map(|rt| format!("FHIR.{rt}"))
                    .unwrap_or_else(|| "FHIR.Element".to_string());
                let name = resource_type(map).unwrap_or_default();
                self.object(name, &type_name, map, None).map(Arc::new)
            }
            Value::Array(_) => Err(ModelError::invalid_argument(
                "document root must be an object or a primitive",
            )),
            scalar => self.scalar("value", None, scalar, None).map(Arc::new),
        }
    }

    fn object(
        &self,
        name: &str,
        type_name: &str,
        map: &Map<String, Value>,
        value: Option<PrimitiveValue>,
    ) -> ModelResult<Node> {
        let mut builder = Node::builder(name, type_name);
        if let Some(value) = value {
            builder.set_value(value);
        }
        for (key, child) in map {
            if key == "resourceType" {
                continue;
            }
            if let Some(base) = key.strip_prefix('_') {
                // Handled together with the primitive it extends, unless that
                // primitive is absent
                if !map.contains_key(base) {
                    self.push_children(&mut builder, type_name, base, &Value::Null, Some(child))?;
                }
                continue;
            }
            let extension = map.get(&format!("_{key}"));
            self.push_children(&mut builder, type_name, key, child, extension)?;
        }
        Ok(builder.build())
    }

    fn push_children(
        &self,
        builder: &mut NodeBuilder,
        owner_type: &str,
        key: &str,
        value: &Value,
        extension: Option<&Value>,
    ) -> ModelResult<()> {
        match (value, extension) {
            (Value::Array(items), ext) => {
                let ext_items = match ext {
                    Some(Value::Array(ext_items)) => ext_items.as_slice(),
                    _ => &[],
                };
                for (i, item) in items.iter().enumerate() {
                    if let Some(node) =
                        self.element(owner_type, key, item, ext_items.get(i))?
                    {
                        builder.push_child(Arc::new(node));
                    }
                }
            }
            (Value::Null, Some(Value::Array(ext_items))) => {
                for ext in ext_items {
                    if let Some(node) = self.element(owner_type, key, &Value::Null, Some(ext))? {
                        builder.push_child(Arc::new(node));
                    }
                }
            }
            (item, ext) => {
                if let Some(node) = self.element(owner_type, key, item, ext)? {
                    builder.push_child(Arc::new(node));
                }
            }
        }
        Ok(())
    }

    fn element(
        &self,
        owner_type: &str,
        key: &str,
        value: &Value,
        extension: Option<&Value>,
    ) -> ModelResult<Option<Node>> {
        let hint = self.hint(owner_type, key);
        let extension = match extension {
            Some(Value::Object(map)) => Some(map),
            _ => None,
        };
        match value {
            Value::Null => match extension {
                Some(ext) => {
                    let type_name = hint.unwrap_or("FHIR.Element");
                    self.object(key, type_name, ext, None).map(Some)
                }
                None => Ok(None),
            },
            Value::Object(map) => {
                let type_name = match resource_type(map) {
                    Some(rt) => format!("FHIR.{rt}"),
                    None => hint.unwrap_or("FHIR.Element").to_string(),
                };
                self.object(key, &type_name, map, None).map(Some)
            }
            Value::Array(_) => Err(ModelError::invalid_argument(format!(
                "nested array in element '{key}'"
            ))),
            scalar => self.scalar(key, hint, scalar, extension).map(Some),
        }
    }

    fn scalar(
        &self,
        key: &str,
        hint: Option<&str>,
        value: &Value,
        extension: Option<&Map<String, Value>>,
    ) -> ModelResult<Node> {
        let (default_type, primitive) = match value {
            Value::Bool(b) => ("FHIR.boolean", PrimitiveValue::Boolean(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ("FHIR.integer", PrimitiveValue::Integer(i)),
                None => {
                    let text = n.to_string();
                    let decimal = Decimal::from_str(&text)
                        .or_else(|_| Decimal::from_scientific(&text))
                        .map_err(|_| {
                            ModelError::invalid_argument(format!(
                                "number '{text}' in element '{key}' is not representable"
                            ))
                        })?;
                    ("FHIR.decimal", PrimitiveValue::Decimal(decimal))
                }
            },
            Value::String(s) => ("FHIR.string", typed_string(hint, s)),
            _ => {
                return Err(ModelError::invalid_argument(format!(
                    "element '{key}' is not a primitive"
                )));
            }
        };
        let type_name = hint.filter(|h| is_primitive_type(h)).unwrap_or(default_type);
        match extension {
            Some(ext) => self.object(key, type_name, ext, Some(primitive)),
            None => Ok(Node::primitive(key, type_name, primitive)),
        }
    }
}

/// Strings hinted as temporal FHIR types become temporal values when they parse
fn typed_string(hint: Option<&str>, text: &str) -> PrimitiveValue {
    let parsed = match hint {
        Some("FHIR.date") => PrecisionDate::parse(text).ok().map(PrimitiveValue::Date),
        Some("FHIR.dateTime") | Some("FHIR.instant") => {
            if text.contains('T') {
                PrecisionDateTime::parse(text).ok().map(PrimitiveValue::DateTime)
            } else {
                PrecisionDate::parse(text).ok().map(PrimitiveValue::Date)
            }
        }
        Some("FHIR.time") => PrecisionTime::parse(text).ok().map(PrimitiveValue::Time),
        _ => None,
    };
    parsed.unwrap_or_else(|| PrimitiveValue::string(text))
}

/// FHIR primitive type names start with a lowercase letter
fn is_primitive_type(qualified: &str) -> bool {
    qualified
        .rsplit('.')
        .next()
        .and_then(|name| name.chars().next())
        .is_some_and(|c| c.is_ascii_lowercase())
}

fn resource_type(map: &Map<String, Value>) -> Option<&str> {
    map.get("resourceType").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn patient() -> Value {
        json!({
            "resourceType": "Patient",
            "id": "example",
            "active": true,
            "birthDate": "1974-12-25",
            "_birthDate": {"extension": [{"url": "http://example.org/time", "valueDateTime": "1974-12-25T14:35:45-05:00"}]},
            "name": [
                {"use": "official", "given": ["Peter", "James"], "family": "Chalmers"},
                {"use": "usual", "given": ["Jim"]}
            ]
        })
    }

    #[test]
    fn test_root_typed_by_resource_type() {
        let root = patient().to_node().unwrap();
        assert_eq!(root.type_name(), "FHIR.Patient");
        assert_eq!(root.name(), "Patient");
        assert!(root.children_named("resourceType").next().is_none());
    }

    #[test]
    fn test_arrays_expand_to_siblings() {
        let root = patient().to_node().unwrap();
        let names: Vec<_> = root.children_named("name").collect();
        assert_eq!(names.len(), 2);
        assert_eq!(names[0].type_name(), "FHIR.HumanName");
        assert_eq!(names[0].children_named("given").count(), 2);
    }

    #[test]
    fn test_primitive_extension_merged() {
        let root = patient().to_node().unwrap();
        let birth = root.children_named("birthDate").next().unwrap();
        assert!(matches!(
            birth.primitive_value(),
            Some(PrimitiveValue::Date(_))
        ));
        assert_eq!(birth.children_named("extension").count(), 1);
        assert_eq!(root.children_named("_birthDate").count(), 0);
    }

    #[test]
    fn test_scalar_types() {
        let root = json!({"a": 1, "b": 1.5, "c": "x", "d": false})
            .to_node()
            .unwrap();
        let types: Vec<_> = root.children().iter().map(|c| c.type_name()).collect();
        assert_eq!(
            types,
            vec!["FHIR.integer", "FHIR.decimal", "FHIR.string", "FHIR.boolean"]
        );
    }

    #[test]
    fn test_null_input_rejected() {
        assert!(matches!(
            Value::Null.to_node(),
            Err(ModelError::InvalidArgument { .. })
        ));
        let absent: Option<Value> = None;
        assert!(absent.to_node().is_err());
    }
}
