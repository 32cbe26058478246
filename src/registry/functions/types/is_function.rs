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

//! is() function - type test

use crate::ast::ExpressionNode;
use crate::evaluator::{EvaluationResult, TypeSpecifier};
use crate::model::Collection;
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// is() function - type test, the function form of the `is` operator
pub struct IsFunction;

impl FhirPathFunction for IsFunction {
    fn name(&self) -> &str {
        "is"
    }
    fn human_friendly_name(&self) -> &str {
        "Is"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "is",
                vec![ParameterInfo::required("type", ParameterKind::TypeSpecifier)],
                "Boolean",
            )
        });
        &SIG
    }

    fn is_pure(&self) -> bool {
        true
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
        let matched = context
            .input
            .singleton()
            .is_some_and(|item| specifier.matches(item));
        Ok(Collection::boolean(matched))
    }
}
