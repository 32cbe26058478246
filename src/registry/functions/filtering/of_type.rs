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

//! ofType() function - keeps elements of a given type

use crate::ast::ExpressionNode;
use crate::evaluator::{EvaluationResult, TypeSpecifier};
use crate::model::Collection;
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// ofType() function - keeps elements of a given type
pub struct OfTypeFunction;

impl FhirPathFunction for OfTypeFunction {
    fn name(&self) -> &str {
        "ofType"
    }
    fn human_friendly_name(&self) -> &str {
        "Of Type"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "ofType",
                vec![ParameterInfo::required("type", ParameterKind::TypeSpecifier)],
                "Collection",
            )
        });
        &SIG
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn documentation(&self) -> &str {
        "Returns a collection that contains all items in the input collection that are of the given type or a subclass thereof."
    }

    fn evaluate(
        &self,
        args: &[ExpressionNode],
        context: &FunctionContext<'_>,
    ) -> EvaluationResult<Collection> {
        let Some(type_name) = context.type_argument(args, 0) else {
            return Ok(Collection::empty());
        };
        let specifier = TypeSpecifier::resolve(context.types(), &type_name)?;
        Ok(context
            .input
            .iter()
            .filter(|item| specifier.matches(item))
            .cloned()
            .collect())
    }
}
