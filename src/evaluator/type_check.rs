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

//! Type specifier resolution for `is`, `as` and `ofType`

use smallvec::SmallVec;

use super::error::{EvaluationError, EvaluationResult};
use crate::model::{PathNode, TypeInfo, TypeRegistry};
use crate::model::types::{FHIR_NAMESPACE, SYSTEM_NAMESPACE, split_qualified};

/// A type specifier resolved against a registry
///
/// An unqualified name may denote both a FHIR and a System type (`Quantity`,
/// for example); an item matches when it matches either.
#[derive(Debug)]
pub struct TypeSpecifier<'r> {
    registry: &'r TypeRegistry,
    candidates: SmallVec<[&'r TypeInfo; 2]>,
}

impl<'r> TypeSpecifier<'r> {
    /// Resolve `specifier`, failing with [`EvaluationError::UnknownType`]
    pub fn resolve(registry: &'r TypeRegistry, specifier: &str) -> EvaluationResult<Self> {
        let candidates: SmallVec<[&TypeInfo; 2]> = if split_qualified(specifier).is_some() {
            registry.resolve(specifier).into_iter().collect()
        } else {
            [FHIR_NAMESPACE, SYSTEM_NAMESPACE]
                .iter()
                .filter_map(|namespace| registry.resolve(&format!("{namespace}.{specifier}")))
                .collect()
        };
        if candidates.is_empty() {
            return Err(EvaluationError::unknown_type(specifier));
        }
        Ok(Self {
            registry,
            candidates,
        })
    }

    /// Whether the item's runtime type is the specified type or a subtype
    pub fn matches(&self, item: &PathNode) -> bool {
        self.candidates.iter().any(|target| {
            let actual = match item.primitive() {
                Some(value) if target.namespace == SYSTEM_NAMESPACE => value.qualified_type_name(),
                _ => item.type_name(),
            };
            self.registry
                .is_assignable_from(&target.qualified_name(), &actual)
        })
    }
}
