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

//! repeat() function - transitive closure of a projection

use crate::ast::ExpressionNode;
use crate::evaluator::EvaluationResult;
use crate::model::{Collection, PathNode};
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// repeat() function - transitive closure of a projection
///
/// The projection is applied to the input, then to everything it produced,
/// until a round yields nothing new. Items already collected are not
/// projected again, so cyclic projections terminate.
pub struct RepeatFunction;

impl FhirPathFunction for RepeatFunction {
    fn name(&self) -> &str {
        "repeat"
    }
    fn human_friendly_name(&self) -> &str {
        "Repeat"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "repeat",
                vec![ParameterInfo::required("projection", ParameterKind::Expression)],
                "Collection",
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
        let mut collected: Vec<PathNode> = Vec::new();
        let mut pending: Vec<PathNode> = context.input.iter().cloned().collect();

        while !pending.is_empty() {
            let mut discovered = Vec::new();
            for (index, item) in pending.iter().enumerate() {
                for found in context.evaluate_for_item(&args[0], item, index)?.iter() {
                    if !collected.iter().any(|seen| seen.fhir_equals(found) == Some(true)) {
                        collected.push(found.clone());
                        discovered.push(found.clone());
                    }
                }
            }
            pending = discovered;
        }

        Ok(collected.into())
    }
}
