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

//! aggregate() function - folds the input with `$total` as accumulator

use crate::ast::ExpressionNode;
use crate::evaluator::EvaluationResult;
use crate::model::Collection;
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// aggregate() function - folds the input with `$total` as accumulator
pub struct AggregateFunction;

impl FhirPathFunction for AggregateFunction {
    fn name(&self) -> &str {
        "aggregate"
    }
    fn human_friendly_name(&self) -> &str {
        "Aggregate"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "aggregate",
                vec![
                    ParameterInfo::required("aggregator", ParameterKind::Expression),
                    ParameterInfo::optional("init", ParameterKind::Value),
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
        "Performs general-purpose aggregation by evaluating the aggregator expression for each element of the input collection. Within the expression, `$this` is the element, `$index` its position and `$total` the value produced for the previous element (or `init`, empty when absent)."
    }

    fn evaluate(
        &self,
        args: &[ExpressionNode],
        context: &FunctionContext<'_>,
    ) -> EvaluationResult<Collection> {
        let mut total = match args.get(1) {
            Some(init) => context.evaluate(init)?,
            None => Collection::empty(),
        };
        for (index, item) in context.input.iter().enumerate() {
            total = context.evaluate_with(
                &args[0],
                Collection::single(item.clone()),
                Some(index),
                Some(total),
            )?;
        }
        Ok(total)
    }
}
