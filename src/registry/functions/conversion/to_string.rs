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

//! toString() function - string representation of a value

use crate::ast::ExpressionNode;
use crate::evaluator::EvaluationResult;
use crate::model::{Collection, PathNode, PrimitiveValue};
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::FunctionSignature;

/// toString() function - string representation of a value
pub struct ToStringFunction;

impl FhirPathFunction for ToStringFunction {
    fn name(&self) -> &str {
        "toString"
    }
    fn human_friendly_name(&self) -> &str {
        "To String"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> =
            std::sync::LazyLock::new(|| FunctionSignature::new("toString", vec![], "String"));
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
        Ok(Collection::from_iter(
            context
                .input
                .singleton_primitive()
                .map(|value| PathNode::Value(PrimitiveValue::string(value.to_string()))),
        ))
    }
}
