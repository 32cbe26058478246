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

//! exists() function - checks whether the input (optionally filtered) has elements

use crate::ast::ExpressionNode;
use crate::evaluator::EvaluationResult;
use crate::model::Collection;
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// exists() function - checks whether the input (optionally filtered) has elements
pub struct ExistsFunction;

impl FhirPathFunction for ExistsFunction {
    fn name(&self) -> &str {
        "exists"
    }
    fn human_friendly_name(&self) -> &str {
        "Exists"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "exists",
                vec![ParameterInfo::optional("criteria", ParameterKind::Expression)],
                "Boolean",
            )
        });
        &SIG
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn documentation(&self) -> &str {
        "Returns `true` if the input collection has any elements (optionally filtered by the criteria), and `false` otherwise."
    }

    fn evaluate(
        &self,
        args: &[ExpressionNode],
        context: &FunctionContext<'_>,
    ) -> EvaluationResult<Collection> {
        let Some(criteria) = args.first() else {
            return Ok(Collection::boolean(!context.input.is_empty()));
        };
        for (index, item) in context.input.iter().enumerate() {
            if context.evaluate_for_item(criteria, item, index)?.to_truth() == Some(true) {
                return Ok(Collection::boolean(true));
            }
        }
        Ok(Collection::boolean(false))
    }
}
