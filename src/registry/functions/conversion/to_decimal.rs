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

//! toDecimal() function - converts a value to a decimal

use std::str::FromStr;

use rust_decimal::Decimal;

use super::to_integer::is_integer_text;

use crate::ast::ExpressionNode;
use crate::evaluator::EvaluationResult;
use crate::model::{Collection, PathNode, PrimitiveValue};
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::FunctionSignature;

fn is_decimal_text(text: &str) -> bool {
    match text.split_once('.') {
        Some((whole, fraction)) => {
            is_integer_text(whole)
                && !fraction.is_empty()
                && fraction.bytes().all(|b| b.is_ascii_digit())
        }
        None => is_integer_text(text),
    }
}

/// toDecimal() function - converts a value to a decimal
pub struct ToDecimalFunction;

impl ToDecimalFunction {
    fn convert(value: &PrimitiveValue) -> Option<Decimal> {
        match value {
            PrimitiveValue::Decimal(d) => Some(*d),
            PrimitiveValue::Integer(i) => Some(Decimal::from(*i)),
            PrimitiveValue::Boolean(true) => Some(Decimal::new(10, 1)),
            PrimitiveValue::Boolean(false) => Some(Decimal::new(0, 1)),
            PrimitiveValue::String(s) if is_decimal_text(s) => {
                Decimal::from_str(s.trim_start_matches('+')).ok()
            }
            _ => None,
        }
    }
}

impl FhirPathFunction for ToDecimalFunction {
    fn name(&self) -> &str {
        "toDecimal"
    }
    fn human_friendly_name(&self) -> &str {
        "To Decimal"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> =
            std::sync::LazyLock::new(|| FunctionSignature::new("toDecimal", vec![], "Decimal"));
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
                .and_then(Self::convert)
                .map(|d| PathNode::Value(PrimitiveValue::Decimal(d))),
        ))
    }
}
