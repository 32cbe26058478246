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

//! Type registry used by `is`, `as` and `ofType`
//!
//! Types are registered by namespace, name and base type. After every change
//! the registry recomputes, for each type, the ordered list of itself and all
//! of its supertypes, so assignability checks are a lookup plus a scan.

use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};

/// Namespace of the built-in FHIRPath types
pub const SYSTEM_NAMESPACE: &str = "System";

/// Namespace of the document model types
pub const FHIR_NAMESPACE: &str = "FHIR";

/// Descriptor of a registered type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// Namespace, `System` or `FHIR`
    pub namespace: String,
    /// Unqualified name
    pub name: String,
    /// Qualified name of the base type
    pub base: Option<String>,
}

impl TypeInfo {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

/// Split `FHIR.Patient` into namespace and name
pub fn split_qualified(name: &str) -> Option<(&str, &str)> {
    name.split_once('.')
}

/// Registry of known types with a precomputed supertype closure
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, TypeInfo>,
    closure: FxHashMap<String, Vec<String>>,
}

impl TypeRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with System types and the FHIR R4 base hierarchy
    pub fn fhir_r4() -> Self {
        let mut registry = Self::new();

        registry.insert(SYSTEM_NAMESPACE, "Any", None);
        for name in [
            "Boolean", "String", "Integer", "Decimal", "Date", "DateTime", "Time", "Quantity",
        ] {
            registry.insert(SYSTEM_NAMESPACE, name, Some("System.Any"));
        }

        registry.insert(FHIR_NAMESPACE, "Any", None);
        registry.insert(FHIR_NAMESPACE, "Base", Some("FHIR.Any"));
        registry.insert(FHIR_NAMESPACE, "Element", Some("FHIR.Base"));
        registry.insert(FHIR_NAMESPACE, "BackboneElement", Some("FHIR.Element"));
        registry.insert(FHIR_NAMESPACE, "Resource", Some("FHIR.Base"));
        registry.insert(FHIR_NAMESPACE, "DomainResource", Some("FHIR.Resource"));

        for name in [
            "boolean", "integer", "decimal", "string", "uri", "date", "dateTime", "instant",
            "time", "base64Binary", "xhtml",
        ] {
            registry.insert(FHIR_NAMESPACE, name, Some("FHIR.Element"));
        }
        for (name, base) in [
            ("code", "FHIR.string"),
            ("id", "FHIR.string"),
            ("markdown", "FHIR.string"),
            ("url", "FHIR.uri"),
            ("canonical", "FHIR.uri"),
            ("oid", "FHIR.uri"),
            ("uuid", "FHIR.uri"),
            ("positiveInt", "FHIR.integer"),
            ("unsignedInt", "FHIR.integer"),
        ] {
            registry.insert(FHIR_NAMESPACE, name, Some(base));
        }

        for name in [
            "Quantity", "Coding", "CodeableConcept", "Identifier", "HumanName", "Address",
            "ContactPoint", "Period", "Range", "Ratio", "Reference", "Attachment", "Annotation",
            "Meta", "Narrative", "Extension", "SampledData", "Signature",
        ] {
            registry.insert(FHIR_NAMESPACE, name, Some("FHIR.Element"));
        }
        for name in ["Age", "Count", "Distance", "Duration", "SimpleQuantity", "MoneyQuantity"] {
            registry.insert(FHIR_NAMESPACE, name, Some("FHIR.Quantity"));
        }
        for name in ["Timing", "Dosage", "ElementDefinition"] {
            registry.insert(FHIR_NAMESPACE, name, Some("FHIR.BackboneElement"));
        }

        for name in ["Bundle", "Binary", "Parameters"] {
            registry.insert(FHIR_NAMESPACE, name, Some("FHIR.Resource"));
        }
        for name in [
            "Patient",
            "Practitioner",
            "PractitionerRole",
            "Organization",
            "Location",
            "Observation",
            "Condition",
            "Encounter",
            "Procedure",
            "MedicationRequest",
            "MedicationStatement",
            "AllergyIntolerance",
            "DiagnosticReport",
            "Immunization",
            "Coverage",
            "Measure",
            "MeasureReport",
            "Library",
            "ValueSet",
            "CodeSystem",
            "StructureDefinition",
            "Questionnaire",
            "QuestionnaireResponse",
        ] {
            registry.insert(FHIR_NAMESPACE, name, Some("FHIR.DomainResource"));
        }

        registry.rebuild_closure();
        registry
    }

    fn insert(&mut self, namespace: &str, name: &str, base: Option<&str>) {
        let info = TypeInfo {
            namespace: namespace.to_string(),
            name: name.to_string(),
            base: base.map(str::to_string),
        };
        self.types.insert(info.qualified_name(), info);
    }

    /// Register or replace a type and refresh the supertype closure
    pub fn register(&mut self, namespace: &str, name: &str, base: Option<&str>) {
        self.insert(namespace, name, base);
        self.rebuild_closure();
    }

    fn rebuild_closure(&mut self) {
        let mut closure = FxHashMap::default();
        for qualified in self.types.keys() {
            let mut chain = Vec::new();
            let mut seen = FxHashSet::default();
            let mut current = Some(qualified.clone());
            while let Some(name) = current {
                if !seen.insert(name.clone()) {
                    log::debug!("cycle in type hierarchy at {name}");
                    break;
                }
                current = self.types.get(&name).and_then(|t| t.base.clone());
                chain.push(name);
            }
            closure.insert(qualified.clone(), chain);
        }
        self.closure = closure;
    }

    /// Resolve a type specifier; unqualified names try `FHIR` before `System`
    pub fn resolve(&self, specifier: &str) -> Option<&TypeInfo> {
        if split_qualified(specifier).is_some() {
            return self.types.get(specifier);
        }
        self.types
            .get(&format!("{FHIR_NAMESPACE}.{specifier}"))
            .or_else(|| self.types.get(&format!("{SYSTEM_NAMESPACE}.{specifier}")))
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The type itself followed by its supertypes, nearest first
    pub fn supertypes<'a>(&'a self, qualified: &'a str) -> impl Iterator<Item = &'a str> {
        let known = self.closure.get(qualified);
        let fallback = known.is_none().then_some(qualified);
        known
            .into_iter()
            .flat_map(|chain| chain.iter().map(String::as_str))
            .chain(fallback)
    }

    /// Whether a value of type `actual` can be used where `target` is expected
    ///
    /// Both names are qualified.
    pub fn is_assignable_from(&self, target: &str, actual: &str) -> bool {
        if target == actual {
            return true;
        }
        if let (Some((target_ns, "Any")), Some((actual_ns, _))) =
            (split_qualified(target), split_qualified(actual))
        {
            if target_ns == actual_ns {
                return true;
            }
        }
        self.supertypes(actual).any(|t| t == target)
    }

    /// Whether `actual` or one of its supertypes has this unqualified name
    pub fn has_type_named(&self, actual: &str, name: &str) -> bool {
        self.supertypes(actual)
            .filter_map(split_qualified)
            .any(|(_, type_name)| type_name == name)
    }
}

static DEFAULT_REGISTRY: Lazy<Arc<TypeRegistry>> = Lazy::new(|| Arc::new(TypeRegistry::fhir_r4()));

/// Shared registry seeded with [`TypeRegistry::fhir_r4`]
pub fn default_registry() -> Arc<TypeRegistry> {
    Arc::clone(&DEFAULT_REGISTRY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_prefers_fhir_namespace() {
        let registry = TypeRegistry::fhir_r4();
        assert_eq!(
            registry.resolve("Quantity").unwrap().qualified_name(),
            "FHIR.Quantity"
        );
        assert_eq!(
            registry.resolve("Boolean").unwrap().qualified_name(),
            "System.Boolean"
        );
        assert_eq!(
            registry.resolve("System.Quantity").unwrap().qualified_name(),
            "System.Quantity"
        );
        assert!(registry.resolve("Nonsense").is_none());
    }

    #[test]
    fn test_supertype_closure() {
        let registry = TypeRegistry::fhir_r4();
        let chain: Vec<_> = registry.supertypes("FHIR.Patient").collect();
        assert_eq!(
            chain,
            vec![
                "FHIR.Patient",
                "FHIR.DomainResource",
                "FHIR.Resource",
                "FHIR.Base",
                "FHIR.Any"
            ]
        );
        assert!(registry.is_assignable_from("FHIR.Resource", "FHIR.Patient"));
        assert!(registry.is_assignable_from("FHIR.string", "FHIR.code"));
        assert!(!registry.is_assignable_from("FHIR.Patient", "FHIR.Resource"));
        assert!(!registry.is_assignable_from("FHIR.Observation", "FHIR.Patient"));
    }

    #[test]
    fn test_any_accepts_same_namespace_only() {
        let registry = TypeRegistry::fhir_r4();
        assert!(registry.is_assignable_from("System.Any", "System.Integer"));
        assert!(registry.is_assignable_from("FHIR.Any", "FHIR.Unregistered"));
        assert!(!registry.is_assignable_from("System.Any", "FHIR.Patient"));
    }

    #[test]
    fn test_register_extends_hierarchy() {
        let mut registry = TypeRegistry::fhir_r4();
        registry.register(FHIR_NAMESPACE, "USCorePatient", Some("FHIR.Patient"));
        assert!(registry.is_assignable_from("FHIR.DomainResource", "FHIR.USCorePatient"));
        assert!(registry.has_type_named("FHIR.USCorePatient", "Patient"));
    }

    #[test]
    fn test_cycle_does_not_hang() {
        let mut registry = TypeRegistry::new();
        registry.register("X", "A", Some("X.B"));
        registry.register("X", "B", Some("X.A"));
        assert!(registry.is_assignable_from("X.B", "X.A"));
        assert_eq!(registry.len(), 2);
    }
}
