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

//! select() function - projects each element and flattens the results

use crate::ast::ExpressionNode;
use crate::evaluator::EvaluationResult;
use crate::model::Collection;
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// select() function - projects each element and flattens the results
pub struct SelectFunction;

impl FhirPathFunction for SelectFunction {
    fn name(&self) -> &str {
        "select"
    }
    fn human_friendly_name(&self) -> &str {
        "Select"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "select",
                vec![ParameterInfo::required("projection", ParameterKind::Expression)],
                "Collection",
            )
        });
        &SIG
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn documentation(&self) -> &str {
        "Evaluates the `projection` expression for each item in the input collection. The result of each evaluation is added to the output collection, flattened and without removing duplicates."
    }

    fn evaluate(
        &self,
        args: &[ExpressionNode],
        context: &FunctionContext<'_>,
    ) -> EvaluationResult<Collection> {
        let mut projected = Vec::new();
        for (index, item) in context.input.iter().enumerate() {
            let result = context.evaluate_for_item(&args[0], item, index)?;
            projected.extend(result.iter().cloned());
        }
        Ok(projected.into())
    }
}
