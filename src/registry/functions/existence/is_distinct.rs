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

//! isDistinct() function - checks that no element appears twice

use crate::ast::ExpressionNode;
use crate::evaluator::EvaluationResult;
use crate::model::Collection;
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::FunctionSignature;

/// isDistinct() function - checks that no element appears twice
pub struct IsDistinctFunction;

impl FhirPathFunction for IsDistinctFunction {
    fn name(&self) -> &str {
        "isDistinct"
    }
    fn human_friendly_name(&self) -> &str {
        "Is Distinct"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> =
            std::sync::LazyLock::new(|| FunctionSignature::new("isDistinct", vec![], "Boolean"));
        &SIG
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn evaluate(
        &self,
        _args: &[ExpressionNode],
        context: &FunctionContext<'_>,
    ) -> EvaluationResult<Collection> {
        let distinct = context.input.distinct();
        Ok(Collection::boolean(distinct.len() == context.input.len()))
    }
}
