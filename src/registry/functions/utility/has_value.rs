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

//! hasValue() and getValue() functions - primitive value helpers for nodes

use crate::ast::ExpressionNode;
use crate::evaluator::EvaluationResult;
use crate::model::{Collection, PathNode, PrimitiveValue};
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::FunctionSignature;

/// Primitive carried by a singleton document node
///
/// Bare primitives do not count: they are values, not elements holding one.
fn node_value(input: &Collection) -> Option<&PrimitiveValue> {
    match input.singleton()? {
        PathNode::Node(node) => node.primitive_value(),
        PathNode::Value(_) => None,
    }
}

/// hasValue() function - whether a singleton element carries a primitive value
pub struct HasValueFunction;

impl FhirPathFunction for HasValueFunction {
    fn name(&self) -> &str {
        "hasValue"
    }
    fn human_friendly_name(&self) -> &str {
        "Has Value"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> =
            std::sync::LazyLock::new(|| FunctionSignature::new("hasValue", vec![], "Boolean"));
        &SIG
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn documentation(&self) -> &str {
        "Returns true if the input collection contains a single element and that element is a FHIR primitive with a value (as opposed to one that only carries extensions)."
    }

    fn evaluate(
        &self,
        _args: &[ExpressionNode],
        context: &FunctionContext<'_>,
    ) -> EvaluationResult<Collection> {
        Ok(Collection::boolean(node_value(context.input).is_some()))
    }
}

/// getValue() function - the primitive value of a singleton element
pub struct GetValueFunction;

impl FhirPathFunction for GetValueFunction {
    fn name(&self) -> &str {
        "getValue"
    }
    fn human_friendly_name(&self) -> &str {
        "Get Value"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> =
            std::sync::LazyLock::new(|| FunctionSignature::new("getValue", vec![], "Any"));
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
            node_value(context.input)
                .cloned()
                .map(PathNode::Value),
        ))
    }
}
