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

//! iif() function - conditional expression (if-then-else)

use crate::ast::ExpressionNode;
use crate::evaluator::EvaluationResult;
use crate::model::Collection;
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// iif() function - conditional expression (if-then-else)
///
/// Only the selected branch is evaluated.
pub struct IifFunction;

impl FhirPathFunction for IifFunction {
    fn name(&self) -> &str {
        "iif"
    }
    fn human_friendly_name(&self) -> &str {
        "If"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "iif",
                vec![
                    ParameterInfo::required("criterion", ParameterKind::Expression),
                    ParameterInfo::required("true_result", ParameterKind::Expression),
                    ParameterInfo::optional("otherwise_result", ParameterKind::Expression),
                ],
                "Any",
            )
        });
        &SIG
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn documentation(&self) -> &str {
        "If `criterion` is true, the function returns the value of `true_result`; otherwise it returns `otherwise_result`, or empty when it is omitted. Applied to a collection with more than one item the result is empty."
    }

    fn evaluate(
        &self,
        args: &[ExpressionNode],
        context: &FunctionContext<'_>,
    ) -> EvaluationResult<Collection> {
        if context.input.len() > 1 {
            return Ok(Collection::empty());
        }
        let focus = context.input.clone();
        let criterion = context.evaluate_with(&args[0], focus.clone(), None, None)?;
        let branch = if criterion.to_truth() == Some(true) {
            args.get(1)
        } else {
            args.get(2)
        };
        match branch {
            Some(branch) => context.evaluate_with(branch, focus, None, None),
            None => Ok(Collection::empty()),
        }
    }
}
