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

//! endsWith() function - checks if string ends with

use super::input_string;
use crate::ast::ExpressionNode;
use crate::evaluator::EvaluationResult;
use crate::model::Collection;
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// endsWith() function - checks if string ends with
pub struct EndsWithFunction;

impl FhirPathFunction for EndsWithFunction {
    fn name(&self) -> &str {
        "endsWith"
    }
    fn human_friendly_name(&self) -> &str {
        "Ends With"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "endsWith",
                vec![ParameterInfo::required("suffix", ParameterKind::Value)],
                "Boolean",
            )
        });
        &SIG
    }
    fn is_pure(&self) -> bool {
        true
    }

    fn documentation(&self) -> &str {
        "Returns `true` when the input string ends with the given `suffix`. If `suffix` is the empty string (''), the result is `true`. Empty input or argument yields empty."
    }

    fn evaluate(
        &self,
        args: &[ExpressionNode],
        context: &FunctionContext<'_>,
    ) -> EvaluationResult<Collection> {
        let Some(text) = input_string(context.input) else {
            return Ok(Collection::empty());
        };
        let Some(suffix) = context.string_argument(args, 0)? else {
            return Ok(Collection::empty());
        };
        Ok(Collection::boolean(text.ends_with(suffix.as_str())))
    }
}
