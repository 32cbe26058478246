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

//! toInteger() function - converts a value to an integer

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::ast::ExpressionNode;
use crate::evaluator::EvaluationResult;
use crate::model::{Collection, PathNode, PrimitiveValue};
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::FunctionSignature;

/// Whether `text` is an optionally signed run of ASCII digits
pub(super) fn is_integer_text(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn to_integer(value: &PrimitiveValue) -> Option<i64> {
    match value {
        PrimitiveValue::Integer(i) => Some(*i),
        PrimitiveValue::Boolean(b) => Some(i64::from(*b)),
        PrimitiveValue::Decimal(d) if d.fract() == Decimal::ZERO => d.to_i64(),
        PrimitiveValue::String(s) if is_integer_text(s) => s.parse().ok(),
        _ => None,
    }
}

/// toInteger() function - converts a value to an integer
pub struct ToIntegerFunction;

impl FhirPathFunction for ToIntegerFunction {
    fn name(&self) -> &str {
        "toInteger"
    }
    fn human_friendly_name(&self) -> &str {
        "To Integer"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> =
            std::sync::LazyLock::new(|| FunctionSignature::new("toInteger", vec![], "Integer"));
        &SIG
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn documentation(&self) -> &str {
        "Converts the input to an Integer. Integers pass through, Booleans become 1 or 0, Decimals without a fractional part and Strings of the form `[+-]digits` are converted. Anything else, including collections with more than one item, yields empty."
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
                .and_then(to_integer)
                .map(|i| PathNode::Value(PrimitiveValue::Integer(i))),
        ))
    }
}
