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

//! all() function - checks a criteria against every element

use crate::ast::ExpressionNode;
use crate::evaluator::EvaluationResult;
use crate::model::Collection;
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// all() function - checks a criteria against every element
pub struct AllFunction;

impl FhirPathFunction for AllFunction {
    fn name(&self) -> &str {
        "all"
    }
    fn human_friendly_name(&self) -> &str {
        "All"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "all",
                vec![ParameterInfo::required("criteria", ParameterKind::Expression)],
                "Boolean",
            )
        });
        &SIG
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn documentation(&self) -> &str {
        "Returns `true` if for every element in the input collection, `criteria` evaluates to `true`. Otherwise, the result is `false`. If the input collection is empty, the result is `true`."
    }

    fn evaluate(
        &self,
        args: &[ExpressionNode],
        context: &FunctionContext<'_>,
    ) -> EvaluationResult<Collection> {
        for (index, item) in context.input.iter().enumerate() {
            if context.evaluate_for_item(&args[0], item, index)?.to_truth() != Some(true) {
                return Ok(Collection::boolean(false));
            }
        }
        Ok(Collection::boolean(true))
    }
}
