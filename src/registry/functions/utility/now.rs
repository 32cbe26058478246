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

//! now() and today() functions - current date and time

use crate::ast::ExpressionNode;
use crate::evaluator::EvaluationResult;
use crate::model::{Collection, PrecisionDate, PrecisionDateTime, PrimitiveValue};
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::FunctionSignature;

/// now() function - returns the current date and time
pub struct NowFunction;

impl FhirPathFunction for NowFunction {
    fn name(&self) -> &str {
        "now"
    }
    fn human_friendly_name(&self) -> &str {
        "Now"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> =
            std::sync::LazyLock::new(|| FunctionSignature::new("now", vec![], "DateTime"));
        &SIG
    }

    fn documentation(&self) -> &str {
        "Returns the current date and time, including timezone offset."
    }

    fn evaluate(
        &self,
        _args: &[ExpressionNode],
        _context: &FunctionContext<'_>,
    ) -> EvaluationResult<Collection> {
        Ok(Collection::single(PrimitiveValue::DateTime(
            PrecisionDateTime::now(),
        )))
    }
}

/// today() function - returns the current date
pub struct TodayFunction;

impl FhirPathFunction for TodayFunction {
    fn name(&self) -> &str {
        "today"
    }
    fn human_friendly_name(&self) -> &str {
        "Today"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> =
            std::sync::LazyLock::new(|| FunctionSignature::new("today", vec![], "Date"));
        &SIG
    }

    fn evaluate(
        &self,
        _args: &[ExpressionNode],
        _context: &FunctionContext<'_>,
    ) -> EvaluationResult<Collection> {
        Ok(Collection::single(PrimitiveValue::Date(PrecisionDate::today())))
    }
}
