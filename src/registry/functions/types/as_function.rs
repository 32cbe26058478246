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

//! as() function - type cast

use crate::ast::ExpressionNode;
use crate::evaluator::{EvaluationResult, TypeSpecifier};
use crate::model::Collection;
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// as() function - returns the singleton input when it is of the given type
pub struct AsFunction;

impl FhirPathFunction for AsFunction {
    fn name(&self) -> &str {
        "as"
    }
    fn human_friendly_name(&self) -> &str {
        "As"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "as",
                vec![ParameterInfo::required("type", ParameterKind::TypeSpecifier)],
                "Any",
            )
        });
        &SIG
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn documentation(&self) -> &str {
        "If the input is of the given type or a subtype, returns it unchanged; otherwise the result is empty. Inputs with more than one item yield empty."
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
        Ok(Collection::from_iter(
            context
                .input
                .singleton()
                .filter(|item| specifier.matches(item))
                .cloned(),
        ))
    }
}
