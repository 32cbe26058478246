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

//! distinct() function - removes duplicate elements

use crate::ast::ExpressionNode;
use crate::evaluator::EvaluationResult;
use crate::model::Collection;
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::FunctionSignature;

/// distinct() function - removes duplicate elements, keeping first occurrences
pub struct DistinctFunction;

impl FhirPathFunction for DistinctFunction {
    fn name(&self) -> &str {
        "distinct"
    }
    fn human_friendly_name(&self) -> &str {
        "Distinct"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> =
            std::sync::LazyLock::new(|| FunctionSignature::new("distinct", vec![], "Collection"));
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
        Ok(context.input.distinct())
    }
}
