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

//! combine() function - concatenates two collections keeping duplicates

use crate::ast::ExpressionNode;
use crate::evaluator::EvaluationResult;
use crate::model::Collection;
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// combine() function - concatenates two collections keeping duplicates
pub struct CombineFunction;

impl FhirPathFunction for CombineFunction {
    fn name(&self) -> &str {
        "combine"
    }
    fn human_friendly_name(&self) -> &str {
        "Combine"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "combine",
                vec![ParameterInfo::required("other", ParameterKind::Value)],
                "Collection",
            )
        });
        &SIG
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn documentation(&self) -> &str {
        "Merges the input and other collections into a single collection without eliminating duplicate values. No ordering is guaranteed beyond the input coming first."
    }

    fn evaluate(
        &self,
        args: &[ExpressionNode],
        context: &FunctionContext<'_>,
    ) -> EvaluationResult<Collection> {
        let other = context.evaluate(&args[0])?;
        Ok(context.input.combine(&other))
    }
}
