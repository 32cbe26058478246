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

//! allTrue(), anyTrue(), allFalse() and anyFalse() functions

use crate::ast::ExpressionNode;
use crate::evaluator::EvaluationResult;
use crate::model::{Collection, PrimitiveValue};
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::FunctionSignature;

fn booleans(input: &Collection) -> impl Iterator<Item = Option<bool>> + '_ {
    input
        .iter()
        .map(|item| item.primitive().and_then(PrimitiveValue::as_boolean))
}

fn is(expected: bool) -> impl Fn(Option<bool>) -> bool {
    move |value| value == Some(expected)
}

/// allTrue() function - every element is `true`; empty input yields `true`
pub struct AllTrueFunction;

impl FhirPathFunction for AllTrueFunction {
    fn name(&self) -> &str {
        "allTrue"
    }
    fn human_friendly_name(&self) -> &str {
        "All True"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> =
            std::sync::LazyLock::new(|| FunctionSignature::new("allTrue", vec![], "Boolean"));
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
        Ok(Collection::boolean(booleans(context.input).all(is(true))))
    }
}

/// anyTrue() function - at least one element is `true`
pub struct AnyTrueFunction;

impl FhirPathFunction for AnyTrueFunction {
    fn name(&self) -> &str {
        "anyTrue"
    }
    fn human_friendly_name(&self) -> &str {
        "Any True"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> =
            std::sync::LazyLock::new(|| FunctionSignature::new("anyTrue", vec![], "Boolean"));
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
        Ok(Collection::boolean(booleans(context.input).any(is(true))))
    }
}

/// allFalse() function - every element is `false`; empty input yields `true`
pub struct AllFalseFunction;

impl FhirPathFunction for AllFalseFunction {
    fn name(&self) -> &str {
        "allFalse"
    }
    fn human_friendly_name(&self) -> &str {
        "All False"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> =
            std::sync::LazyLock::new(|| FunctionSignature::new("allFalse", vec![], "Boolean"));
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
        Ok(Collection::boolean(booleans(context.input).all(is(false))))
    }
}

/// anyFalse() function - at least one element is `false`
pub struct AnyFalseFunction;

impl FhirPathFunction for AnyFalseFunction {
    fn name(&self) -> &str {
        "anyFalse"
    }
    fn human_friendly_name(&self) -> &str {
        "Any False"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> =
            std::sync::LazyLock::new(|| FunctionSignature::new("anyFalse", vec![], "Boolean"));
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
        Ok(Collection::boolean(booleans(context.input).any(is(false))))
    }
}
